//! The unrecoverable half of the error model (spec §4.K): a single fatal
//! sink for conditions a running program cannot itself recover from (heap
//! exhaustion, a corrupt type-metadata table, an internal invariant
//! violation). Modeled directly on the teacher's thread-local last-error
//! slot and panic-payload formatting.

use std::cell::RefCell;

thread_local! {
    static LAST_HOST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Record `msg` as the last fatal error without unwinding. Used by callers
/// that want to leave a breadcrumb before a `panic!` a layer up, and by
/// tests that want to assert on the message without catching the panic.
pub fn set_last_host_error(msg: impl Into<String>) {
    let msg = msg.into();
    tracing::error!(%msg, "fatal runtime error");
    LAST_HOST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg));
}

pub fn take_last_host_error() -> Option<String> {
    LAST_HOST_ERROR.with(|slot| slot.borrow_mut().take())
}

pub fn has_last_host_error() -> bool {
    LAST_HOST_ERROR.with(|slot| slot.borrow().is_some())
}

/// Fail the host process. Never returns. Used for conditions outside the
/// typed `RuntimeException` model: out-of-memory, a corrupt compiler-emitted
/// table, or an internal invariant violation that indicates a bug in this
/// runtime rather than in the program it is running.
pub fn host_panic(msg: impl Into<String>) -> ! {
    let msg = msg.into();
    set_last_host_error(msg.clone());
    panic!("{msg}");
}

/// Render a caught panic payload the way the host boundary needs to report
/// it: `&'static str` and `String` payloads are shown verbatim, anything
/// else falls back to a generic label.
pub fn format_panic_payload(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "runtime panicked with a non-string payload".to_string()
    }
}
