//! Runtime services built on the `rt-core` tagged-value and heap-layout
//! contract: the allocator, reference counting, the byte container and its
//! UTF-8 codec, numeric boxing, type metadata, structural equality/compare,
//! hashing, the pretty printer, and the exception/panic path.
//!
//! # Modules
//!
//! - `mem`: segregated free-list allocator over a growable linear-memory
//!   buffer (`Heap`).
//! - `refcount`: per-object reference counts and the finalizer registry.
//! - `utf8`: scalar-value encode/decode for UTF-8 byte sequences.
//! - `bytes`: the `String`/`Bytes` container and its typed accessors.
//! - `numeric`: the tower of boxed numeric representations and their
//!   cross-representation equality/ordering.
//! - `typemeta`: the compiler-emitted field/variant name table.
//! - `equality`: structural `equal`/`compare` over tagged values.
//! - `hashing`: the seeded structural hash, consistent with `equality`.
//! - `print`: the pretty printer.
//! - `exception`: the runtime's checked-exception enum.
//! - `panic`: the last-resort host panic path and its thread-local slot.

pub mod bytes;
pub mod equality;
pub mod exception;
pub mod hashing;
pub mod mem;
pub mod numeric;
pub mod panic;
pub mod print;
pub mod refcount;
pub mod typemeta;
pub mod utf8;

pub use equality::{compare, equal};
pub use exception::RuntimeException;
pub use hashing::HashInstance;
pub use mem::Heap;
pub use numeric::Number;
pub use print::Printer;
pub use refcount::RefCounts;
pub use typemeta::TypeMetaTable;
