//! Structural hashing (spec §4.I): a seeded MurmurHash3 instance that walks
//! the same value graph `equality.rs` compares, so that `equal(a, b)`
//! implies `hash(a) == hash(b)` for every representation this runtime boxes
//! a value as.
//!
//! No MurmurHash3 implementation exists anywhere in the example pack; the
//! mixing constants below are the public MurmurHash3 x86_32 round/finalizer
//! constants, written in the bit-twiddling register `nanbox.rs` uses
//! elsewhere in this workspace (`#[inline(always)]`, explicit shift/rotate).

use std::collections::HashSet;

use rt_core::layout::{adt_variant, record, string_bytes, tuple_array, HeapKind};
use rt_core::tagged::TaggedValue;

use crate::mem::Heap;
use crate::numeric;

/// Recursion stops descending into children past this depth and mixes in a
/// fixed "truncated" marker instead, bounding hash cost on pathologically
/// deep or cyclic structures.
const MAX_DEPTH: u32 = 31;

const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;

#[inline(always)]
fn rotl32(x: u32, r: u32) -> u32 {
    (x << r) | (x >> (32 - r))
}

#[inline(always)]
fn mix_block(mut h: u32, mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = rotl32(k, 15);
    k = k.wrapping_mul(C2);
    h ^= k;
    h = rotl32(h, 13);
    h = h.wrapping_mul(5).wrapping_add(0xe6546b64);
    h
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// MurmurHash3 x86_32 over `data`, seeded with `seed`.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    for chunk in chunks {
        let k = u32::from_le_bytes(chunk.try_into().unwrap());
        h = mix_block(h, k);
    }
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &b) in tail.iter().enumerate() {
            k |= (b as u32) << (8 * i);
        }
        k = k.wrapping_mul(C1);
        k = rotl32(k, 15);
        k = k.wrapping_mul(C2);
        h ^= k;
    }
    h ^= data.len() as u32;
    fmix32(h)
}

/// A seeded hashing session, mirroring how the runtime's single
/// `HashInstance` is threaded through every `hash` primitive call.
#[derive(Debug, Clone, Copy)]
pub struct HashInstance {
    seed: u32,
}

impl HashInstance {
    /// A fresh instance seeded from host randomness — stands in for the
    /// host VM's `random_get` import (see `crypto.rs`'s use of `rand` for
    /// the same purpose).
    pub fn make() -> Self {
        HashInstance { seed: rand::random() }
    }

    pub fn make_seeded(seed: u32) -> Self {
        HashInstance { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn hash(&self, heap: &Heap, tv: TaggedValue) -> u32 {
        let mut buf = Vec::new();
        let mut visited = HashSet::new();
        append_value(heap, tv, 0, &mut buf, &mut visited);
        murmur3_32(&buf, self.seed)
    }
}

fn is_numeric(tv: TaggedValue, heap: &Heap) -> bool {
    if tv.is_simple_int() {
        return true;
    }
    tv.is_heap_ptr()
        && matches!(
            HeapKind::from_u32(heap.read_u32(tv.as_heap_ptr())),
            Some(HeapKind::Int32 | HeapKind::Uint32 | HeapKind::Float32 | HeapKind::BoxedNumber)
        )
}

fn append_value(heap: &Heap, tv: TaggedValue, depth: u32, buf: &mut Vec<u8>, visited: &mut HashSet<u32>) {
    if depth > MAX_DEPTH {
        buf.push(0xFF); // truncated-depth marker
        return;
    }

    if is_numeric(tv, heap) {
        buf.push(0);
        buf.extend_from_slice(numeric::read_tagged(heap, tv).to_display_string().as_bytes());
        return;
    }

    if !tv.is_heap_ptr() {
        buf.push(1);
        buf.extend_from_slice(&tv.to_bits().to_le_bytes());
        return;
    }

    let ptr = tv.as_heap_ptr();
    if !visited.insert(ptr) {
        buf.push(0xFE); // cycle marker
        return;
    }

    let kind = HeapKind::from_u32(heap.read_u32(ptr)).expect("valid heap kind");
    match kind {
        HeapKind::String => {
            buf.push(2);
            let len = heap.read_u32(ptr + string_bytes::LENGTH_OFFSET);
            buf.extend_from_slice(heap.read_bytes(ptr + string_bytes::PAYLOAD_OFFSET, len));
        }
        HeapKind::Bytes => {
            buf.push(3);
            let len = heap.read_u32(ptr + string_bytes::LENGTH_OFFSET);
            buf.extend_from_slice(heap.read_bytes(ptr + string_bytes::PAYLOAD_OFFSET, len));
        }
        HeapKind::Tuple | HeapKind::Array => {
            buf.push(if kind == HeapKind::Tuple { 4 } else { 5 });
            let arity = heap.read_u32(ptr + tuple_array::ARITY_OFFSET);
            for i in 0..arity {
                let field = TaggedValue::from_bits(heap.read_u32(ptr + tuple_array::FIELDS_OFFSET + i * 4));
                append_value(heap, field, depth + 1, buf, visited);
            }
        }
        HeapKind::Record => {
            buf.push(6);
            buf.extend_from_slice(&heap.read_u32(ptr + record::MODULE_HASH_OFFSET).to_le_bytes());
            buf.extend_from_slice(&heap.read_u32(ptr + record::TYPE_HASH_OFFSET).to_le_bytes());
            let arity = heap.read_u32(ptr + record::ARITY_OFFSET);
            for i in 0..arity {
                let field = TaggedValue::from_bits(heap.read_u32(ptr + record::FIELDS_OFFSET + i * 4));
                append_value(heap, field, depth + 1, buf, visited);
            }
        }
        HeapKind::AdtVariant => {
            buf.push(7);
            buf.extend_from_slice(&heap.read_u32(ptr + adt_variant::TYPE_HASH_OFFSET).to_le_bytes());
            buf.extend_from_slice(&heap.read_u32(ptr + adt_variant::VARIANT_ID_OFFSET).to_le_bytes());
            let arity = heap.read_u32(ptr + adt_variant::ARITY_OFFSET);
            for i in 0..arity {
                let field = TaggedValue::from_bits(heap.read_u32(ptr + adt_variant::FIELDS_OFFSET + i * 4));
                append_value(heap, field, depth + 1, buf, visited);
            }
        }
        HeapKind::Lambda => {
            // Closures hash (and compare) by identity.
            buf.push(8);
            buf.extend_from_slice(&ptr.to_le_bytes());
        }
        HeapKind::Int32 | HeapKind::Uint32 | HeapKind::Float32 | HeapKind::BoxedNumber => {
            unreachable!("numeric kinds are handled by the is_numeric fast path")
        }
    }

    visited.remove(&ptr);
}
