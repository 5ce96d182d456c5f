//! Heap object layout: the kind tag every heap object carries at offset 0,
//! and the byte offsets of each kind's header fields.
//!
//! Every heap object begins with a 64-bit header word pair (offset 0: kind
//! tag; offset 4: kind-specific metadata). This module only names offsets and
//! discriminants — reading and writing them lives in `rt-runtime`.

/// The kind tag stored at header offset 0 of every heap object.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapKind {
    String = 0,
    Bytes = 1,
    Tuple = 2,
    Array = 3,
    Record = 4,
    AdtVariant = 5,
    Lambda = 6,
    Int32 = 7,
    Uint32 = 8,
    Float32 = 9,
    /// Boxed wide numbers: Int64/Uint64/Float64/BigInt/Rational.
    /// The sub-tag at offset 4 (see `NumberSubTag`) distinguishes them.
    BoxedNumber = 10,
}

impl HeapKind {
    pub fn from_u32(v: u32) -> Option<Self> {
        use HeapKind::*;
        Some(match v {
            0 => String,
            1 => Bytes,
            2 => Tuple,
            3 => Array,
            4 => Record,
            5 => AdtVariant,
            6 => Lambda,
            7 => Int32,
            8 => Uint32,
            9 => Float32,
            10 => BoxedNumber,
            _ => return None,
        })
    }
}

/// Sub-tag stored at offset 4 of a `BoxedNumber` header.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberSubTag {
    Int64 = 0,
    Uint64 = 1,
    Float64 = 2,
    BigInt = 3,
    Rational = 4,
}

impl NumberSubTag {
    pub fn from_u32(v: u32) -> Option<Self> {
        use NumberSubTag::*;
        Some(match v {
            0 => Int64,
            1 => Uint64,
            2 => Float64,
            3 => BigInt,
            4 => Rational,
            _ => return None,
        })
    }
}

/// Built-in type ids the compiler and runtime must agree on (spec §9, Open
/// Question): special-cased by the pretty printer and by ADT matching.
/// Fixed here since the compiler side is out of this core's scope.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTypeId {
    Option = 0,
    Result = 1,
    List = 2,
    Range = 3,
}

impl BuiltinTypeId {
    pub fn from_u32(v: u32) -> Option<Self> {
        use BuiltinTypeId::*;
        Some(match v {
            0 => Option,
            1 => Result,
            2 => List,
            3 => Range,
            _ => return None,
        })
    }
}

// =============================================================================
// Header field offsets
// =============================================================================

/// Every heap object's two-word header: kind tag, then kind-specific metadata.
pub const KIND_OFFSET: u32 = 0;
pub const META_OFFSET: u32 = 4;
/// Size, in bytes, of the two-word header common to every heap kind.
pub const HEADER_SIZE: u32 = 8;

pub mod string_bytes {
    //! String / Bytes: `0: kind; 4: byte length`, then raw bytes.
    pub const LENGTH_OFFSET: u32 = super::META_OFFSET;
    pub const PAYLOAD_OFFSET: u32 = super::HEADER_SIZE;
}

pub mod tuple_array {
    //! Tuple / Array (mutable): `0: kind; 4: arity`, then `arity` tagged words.
    pub const ARITY_OFFSET: u32 = super::META_OFFSET;
    pub const FIELDS_OFFSET: u32 = super::HEADER_SIZE;
}

pub mod record {
    //! Record: `0: kind; 4: module-hash; 8: type-hash; 12: arity`, then fields.
    pub const MODULE_HASH_OFFSET: u32 = super::META_OFFSET;
    pub const TYPE_HASH_OFFSET: u32 = 8;
    pub const ARITY_OFFSET: u32 = 12;
    pub const FIELDS_OFFSET: u32 = 16;
}

pub mod adt_variant {
    //! ADT variant: `0: kind; 4: type-hash; 8: type-id; 12: variant-id; 16: arity`, then fields.
    pub const TYPE_HASH_OFFSET: u32 = super::META_OFFSET;
    pub const TYPE_ID_OFFSET: u32 = 8;
    pub const VARIANT_ID_OFFSET: u32 = 12;
    pub const ARITY_OFFSET: u32 = 16;
    pub const FIELDS_OFFSET: u32 = 20;
}

pub mod lambda {
    //! Lambda (closure): `0: kind; 4: arity; 8: function index`, then captured words.
    pub const ARITY_OFFSET: u32 = super::META_OFFSET;
    pub const FN_INDEX_OFFSET: u32 = 8;
    pub const CAPTURES_OFFSET: u32 = 12;
}

pub mod narrow_number {
    //! Int32 / Uint32 / Float32: `0: kind; 4: payload`.
    pub const PAYLOAD_OFFSET: u32 = super::META_OFFSET;
    pub const SIZE: u32 = super::HEADER_SIZE;
}

pub mod boxed_number {
    //! Int64 / Uint64 / Float64 / Rational / BigInt: `0: kind (BoxedNumber); 4: sub-tag; 8+: payload`.
    pub const SUB_TAG_OFFSET: u32 = super::META_OFFSET;
    pub const PAYLOAD_OFFSET: u32 = 8;
}

/// The 64-byte allocation quantum used by the memory manager (spec §4.B / Glossary).
pub const UNIT_SIZE: u32 = 64;

/// Every heap pointer refers to an address whose low 3 bits are zero.
pub const HEAP_ALIGNMENT: u32 = 8;
