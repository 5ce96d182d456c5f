//! Typed exceptions (spec §4.K): the recoverable half of the error model.
//! The other half, unrecoverable host failure, is `crate::panic::host_panic`.
//!
//! Mirrors `SerializeError`'s hand-written `Display`/`std::error::Error`
//! convention — no `thiserror` here, matching the rest of the workspace.

use std::fmt;

/// A recoverable runtime exception. Fallible primitives return
/// `Result<T, RuntimeException>`; there is no stack-threaded FFI surface in
/// this core (that belongs to the compiler-facing layer, out of scope here).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeException {
    /// A generic failure carrying a human-readable message.
    Failure(String),
    /// An argument did not satisfy a primitive's precondition.
    InvalidArgument(String),
    /// An index or length fell outside a container's bounds.
    IndexOutOfBounds { index: i64, length: u32 },
    /// A byte sequence was asserted to be UTF-8 but was not.
    MalformedUnicode { offset: u32 },
    /// An `assert` primitive's condition did not hold.
    AssertionError(String),
}

impl fmt::Display for RuntimeException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeException::Failure(msg) => write!(f, "Failure: {msg}"),
            RuntimeException::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            RuntimeException::IndexOutOfBounds { index, length } => {
                write!(f, "IndexOutOfBounds: index {index} out of bounds for length {length}")
            }
            RuntimeException::MalformedUnicode { offset } => {
                write!(f, "MalformedUnicode: invalid UTF-8 sequence at byte offset {offset}")
            }
            RuntimeException::AssertionError(msg) => write!(f, "AssertionError: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeException {}

impl RuntimeException {
    /// The tag name the pretty printer shows for a bare `raise`d exception
    /// that has no custom printer registered (spec §4.J).
    pub fn tag_name(&self) -> &'static str {
        match self {
            RuntimeException::Failure(_) => "Failure",
            RuntimeException::InvalidArgument(_) => "InvalidArgument",
            RuntimeException::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            RuntimeException::MalformedUnicode { .. } => "MalformedUnicode",
            RuntimeException::AssertionError(_) => "AssertionError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RuntimeException::Failure("boom".into()).to_string(),
            "Failure: boom"
        );
        assert_eq!(
            RuntimeException::IndexOutOfBounds { index: -1, length: 3 }.to_string(),
            "IndexOutOfBounds: index -1 out of bounds for length 3"
        );
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(RuntimeException::Failure("x".into()).tag_name(), "Failure");
        assert_eq!(
            RuntimeException::MalformedUnicode { offset: 4 }.tag_name(),
            "MalformedUnicode"
        );
    }

    #[test]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&RuntimeException::AssertionError("x".into()));
    }
}
