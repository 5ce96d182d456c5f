//! Type-metadata registry (spec §6): the compiler emits one bucketed hash
//! table per module mapping a type's `type_hash` to its field or variant
//! names, used by the pretty printer to render `Record { field: ... }` and
//! `Variant(...)`/`Variant{ field: ... }` forms instead of raw positional
//! tuples.
//!
//! # Wire format
//!
//! ```text
//! u32                     bucket_count
//! bucket_count x {
//!   u32 data_offset
//!   u32 entry_count
//! }
//! repeated, per bucket, entry_count x {
//!   u32 type_hash
//!   u32 descriptor_offset
//! }
//! descriptor (record):
//!   u32 section_length
//!   arity x {
//!     u32 field_length
//!     u8  field_name_utf8[field_length]
//!     pad to the next 8-byte absolute boundary
//!   }
//! descriptor (ADT):
//!   u32 section_length
//!   repeated variant_block:
//!     u32 block_length                        (this block's own byte length)
//!     u32 distance_to_inline_record_fields     (0 if not an inline-record variant)
//!     u32 variant_id
//!     u32 name_length
//!     u8  name_utf8[name_length]
//!     pad to the next 8-byte absolute boundary
//!     [optional inline-record field-name block, same layout as a record descriptor,
//!      at block_start + distance_to_inline_record_fields]
//! ```
//!
//! There is no stored "kind" tag distinguishing record from ADT descriptors:
//! the caller picks the accessor (`lookup_record_fields` vs `lookup_variant`)
//! that matches what it already knows the type is. All integers are
//! little-endian.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMetaError {
    Truncated { at: usize, needed: usize },
    InvalidUtf8Name,
}

impl fmt::Display for TypeMetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMetaError::Truncated { at, needed } => {
                write!(f, "type-metadata table truncated at byte {at}, needed {needed} more bytes")
            }
            TypeMetaError::InvalidUtf8Name => write!(f, "type-metadata table has a non-UTF-8 name"),
        }
    }
}

impl std::error::Error for TypeMetaError {}

/// A single ADT variant's name and, when it is an inline-record constructor,
/// its field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub variant_id: u32,
    pub name: String,
    pub inline_record_fields: Option<Vec<String>>,
}

fn read_u32(data: &[u8], at: usize) -> Result<u32, TypeMetaError> {
    data.get(at..at + 4)
        .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
        .ok_or(TypeMetaError::Truncated { at: data.len(), needed: (at + 4).saturating_sub(data.len()) })
}

/// Next 8-byte-aligned absolute offset at or after `at`.
fn align8(at: usize) -> usize {
    (at + 7) & !7
}

fn read_name(data: &[u8], at: usize) -> Result<(String, usize), TypeMetaError> {
    let len = read_u32(data, at)? as usize;
    let start = at + 4;
    let bytes = data
        .get(start..start + len)
        .ok_or(TypeMetaError::Truncated { at: data.len(), needed: (start + len).saturating_sub(data.len()) })?;
    let name = std::str::from_utf8(bytes).map_err(|_| TypeMetaError::InvalidUtf8Name)?.to_string();
    Ok((name, align8(start + len)))
}

/// Parses a record descriptor's field-name section starting at `offset`
/// (the `section_length` word itself). Shared between plain record
/// descriptors and an ADT variant's inline-record field block.
fn parse_record_fields(data: &[u8], offset: usize) -> Result<Vec<String>, TypeMetaError> {
    let section_length = read_u32(data, offset)? as usize;
    let end = offset + section_length;
    let mut cursor = offset + 4;
    let mut names = Vec::new();
    while cursor < end {
        let (name, next) = read_name(data, cursor)?;
        names.push(name);
        cursor = next;
    }
    Ok(names)
}

/// A parsed type-metadata table, indexed in memory by `type_hash` for O(1)
/// lookup after the one-time parse — the on-disk bucket table exists for the
/// compiler's emission convenience, not for repeated lookup cost here.
pub struct TypeMetaTable {
    data: Vec<u8>,
    index: HashMap<u32, u32>,
}

impl TypeMetaTable {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn parse(data: &[u8]) -> Result<Self, TypeMetaError> {
        let bucket_count = read_u32(data, 0)? as usize;
        let mut index = HashMap::new();
        for b in 0..bucket_count {
            let data_offset = read_u32(data, 4 + b * 8)? as usize;
            let entry_count = read_u32(data, 4 + b * 8 + 4)? as usize;
            for e in 0..entry_count {
                let entry_offset = data_offset + e * 8;
                let type_hash = read_u32(data, entry_offset)?;
                let descriptor_offset = read_u32(data, entry_offset + 4)?;
                index.insert(type_hash, descriptor_offset);
            }
        }
        Ok(TypeMetaTable { data: data.to_vec(), index })
    }

    /// Field names for a record type, by declaration order. `Ok(None)` means
    /// the table has no entry for `type_hash` at all.
    pub fn lookup_record_fields(&self, type_hash: u32) -> Result<Option<Vec<String>>, TypeMetaError> {
        let Some(&offset) = self.index.get(&type_hash) else { return Ok(None) };
        parse_record_fields(&self.data, offset as usize).map(Some)
    }

    /// The variant descriptor for `type_hash`'s `variant_id`, walking the
    /// ADT's variant_block chain via each block's own `block_length`.
    pub fn lookup_variant(&self, type_hash: u32, variant_id: u32) -> Result<Option<VariantDescriptor>, TypeMetaError> {
        let Some(&offset) = self.index.get(&type_hash) else { return Ok(None) };
        let data = &self.data;
        let section_length = read_u32(data, offset as usize)? as usize;
        let section_start = offset as usize + 4;
        let section_end = section_start + section_length;

        let mut block_start = section_start;
        while block_start < section_end {
            let block_length = read_u32(data, block_start)? as usize;
            let distance = read_u32(data, block_start + 4)?;
            let this_variant_id = read_u32(data, block_start + 8)?;
            if this_variant_id == variant_id {
                let (name, _) = read_name(data, block_start + 12)?;
                let inline_record_fields = if distance == 0 {
                    None
                } else {
                    Some(parse_record_fields(data, block_start + distance as usize)?)
                };
                return Ok(Some(VariantDescriptor { variant_id, name, inline_record_fields }));
            }
            block_start += block_length;
        }
        Ok(None)
    }
}
