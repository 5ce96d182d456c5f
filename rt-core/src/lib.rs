//! Tagged-value and heap-layout contract for a 32-bit Wasm language runtime.
//!
//! This crate is a passive specification: it defines the bit layout of the
//! tagged 32-bit word (`tagged`) and the byte layout of every heap object
//! header (`layout`). Nothing here allocates, mutates the heap, or performs
//! I/O — `rt-runtime` is the crate that acts on this contract.
//!
//! # Modules
//!
//! - `tagged`: the 32-bit tagged word (simple numbers, heap pointers, short
//!   values, reserved constants).
//! - `layout`: heap object kinds and their header field offsets.

pub mod layout;
pub mod tagged;

pub use layout::{BuiltinTypeId, HeapKind, NumberSubTag};
pub use tagged::{ShortKind, TaggedValue};
