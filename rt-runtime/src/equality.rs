//! Structural equality & compare (spec §4.H): walks two tagged-value graphs
//! in lockstep, comparing by kind before payload — the same idiom the
//! teacher uses for `MapKey`'s hand-written `Hash`/`PartialEq` pair
//! (discriminant first, then contents).
//!
//! Cycles are handled with an explicit set of in-progress pointer pairs
//! rather than mutating a reserved bit in the object header: if the walk
//! reaches a pair it is already in the middle of comparing, it assumes they
//! are equal (the standard coinductive treatment of cyclic structural
//! equality) and moves on.

use std::cmp::Ordering;
use std::collections::HashSet;

use rt_core::layout::{adt_variant, record, tuple_array, HeapKind};
use rt_core::tagged::TaggedValue;

use crate::bytes;
use crate::mem::Heap;
use crate::numeric;

/// Structural equality between two tagged values.
pub fn equal(heap: &Heap, a: TaggedValue, b: TaggedValue) -> bool {
    let mut in_progress = HashSet::new();
    equal_inner(heap, a, b, &mut in_progress)
}

/// A total order over tagged values: numbers order by value, strings/bytes
/// lexicographically, compound kinds element-by-element, and distinct kinds
/// order by an arbitrary but fixed kind rank.
pub fn compare(heap: &Heap, a: TaggedValue, b: TaggedValue) -> Ordering {
    let mut in_progress = HashSet::new();
    compare_inner(heap, a, b, &mut in_progress)
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

fn kind_rank(tv: TaggedValue, heap: &Heap) -> u32 {
    if is_numeric(tv, heap) {
        return 0;
    }
    if tv.is_short() || tv.is_reserved() {
        return 1;
    }
    if tv.is_heap_ptr() {
        let kind = HeapKind::from_u32(heap.read_u32(tv.as_heap_ptr()));
        return match kind {
            Some(HeapKind::String) => 2,
            Some(HeapKind::Bytes) => 3,
            Some(HeapKind::Tuple) => 4,
            Some(HeapKind::Array) => 5,
            Some(HeapKind::Record) => 6,
            Some(HeapKind::AdtVariant) => 7,
            Some(HeapKind::Lambda) => 8,
            _ => 9,
        };
    }
    9
}

fn equal_inner(heap: &Heap, a: TaggedValue, b: TaggedValue, in_progress: &mut HashSet<(u32, u32)>) -> bool {
    compare_inner(heap, a, b, in_progress) == Ordering::Equal
}

fn compare_inner(heap: &Heap, a: TaggedValue, b: TaggedValue, in_progress: &mut HashSet<(u32, u32)>) -> Ordering {
    if is_numeric(a, heap) && is_numeric(b, heap) {
        return numeric::compare(&numeric::read_tagged(heap, a), &numeric::read_tagged(heap, b));
    }

    let rank_a = kind_rank(a, heap);
    let rank_b = kind_rank(b, heap);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    // Non-heap words of the same rank: compare bit patterns directly
    // (covers Char/Int8/.../void/unit/true/false, which already compare
    // correctly by raw bits since each sub-kind's payload is monotonic in
    // its own bit position).
    if !a.is_heap_ptr() && !b.is_heap_ptr() {
        return a.to_bits().cmp(&b.to_bits());
    }

    let pa = a.as_heap_ptr();
    let pb = b.as_heap_ptr();
    if pa == pb {
        return Ordering::Equal;
    }
    if !in_progress.insert((pa, pb)) {
        // Already comparing this exact pair further up the call stack:
        // assume equal and let the rest of the structure decide.
        return Ordering::Equal;
    }
    let result = compare_heap_objects(heap, pa, pb, in_progress);
    in_progress.remove(&(pa, pb));
    result
}

fn compare_heap_objects(heap: &Heap, pa: u32, pb: u32, in_progress: &mut HashSet<(u32, u32)>) -> Ordering {
    let kind = HeapKind::from_u32(heap.read_u32(pa)).expect("valid heap kind");
    match kind {
        HeapKind::String | HeapKind::Bytes => {
            let len_a = bytes::length(heap, pa);
            let len_b = bytes::length(heap, pb);
            let shared = len_a.min(len_b);
            let base_a = pa + rt_core::layout::string_bytes::PAYLOAD_OFFSET;
            let base_b = pb + rt_core::layout::string_bytes::PAYLOAD_OFFSET;
            let data_a = heap.read_bytes(base_a, shared);
            let data_b = heap.read_bytes(base_b, shared);
            data_a.cmp(data_b).then(len_a.cmp(&len_b))
        }
        HeapKind::Tuple | HeapKind::Array => {
            let arity_a = heap.read_u32(pa + tuple_array::ARITY_OFFSET);
            let arity_b = heap.read_u32(pb + tuple_array::ARITY_OFFSET);
            compare_fields(
                heap,
                pa + tuple_array::FIELDS_OFFSET,
                arity_a,
                pb + tuple_array::FIELDS_OFFSET,
                arity_b,
                in_progress,
            )
        }
        HeapKind::Record => {
            let module_a = heap.read_u32(pa + record::MODULE_HASH_OFFSET);
            let module_b = heap.read_u32(pb + record::MODULE_HASH_OFFSET);
            if module_a != module_b {
                return module_a.cmp(&module_b);
            }
            let type_a = heap.read_u32(pa + record::TYPE_HASH_OFFSET);
            let type_b = heap.read_u32(pb + record::TYPE_HASH_OFFSET);
            if type_a != type_b {
                return type_a.cmp(&type_b);
            }
            let arity_a = heap.read_u32(pa + record::ARITY_OFFSET);
            let arity_b = heap.read_u32(pb + record::ARITY_OFFSET);
            compare_fields(
                heap,
                pa + record::FIELDS_OFFSET,
                arity_a,
                pb + record::FIELDS_OFFSET,
                arity_b,
                in_progress,
            )
        }
        HeapKind::AdtVariant => {
            let type_a = heap.read_u32(pa + adt_variant::TYPE_HASH_OFFSET);
            let type_b = heap.read_u32(pb + adt_variant::TYPE_HASH_OFFSET);
            let variant_a = heap.read_u32(pa + adt_variant::VARIANT_ID_OFFSET);
            let variant_b = heap.read_u32(pb + adt_variant::VARIANT_ID_OFFSET);
            if type_a != type_b {
                return type_a.cmp(&type_b);
            }
            if variant_a != variant_b {
                return variant_a.cmp(&variant_b);
            }
            let arity_a = heap.read_u32(pa + adt_variant::ARITY_OFFSET);
            let arity_b = heap.read_u32(pb + adt_variant::ARITY_OFFSET);
            compare_fields(
                heap,
                pa + adt_variant::FIELDS_OFFSET,
                arity_a,
                pb + adt_variant::FIELDS_OFFSET,
                arity_b,
                in_progress,
            )
        }
        // Closures compare by identity only: two distinct closures are
        // never structurally equal even if they capture equal environments.
        HeapKind::Lambda => pa.cmp(&pb),
        HeapKind::Int32 | HeapKind::Uint32 | HeapKind::Float32 | HeapKind::BoxedNumber => {
            unreachable!("numeric kinds are handled by the is_numeric fast path")
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn compare_fields(
    heap: &Heap,
    base_a: u32,
    arity_a: u32,
    base_b: u32,
    arity_b: u32,
    in_progress: &mut HashSet<(u32, u32)>,
) -> Ordering {
    let shared = arity_a.min(arity_b);
    for i in 0..shared {
        let fa = TaggedValue::from_bits(heap.read_u32(base_a + i * 4));
        let fb = TaggedValue::from_bits(heap.read_u32(base_b + i * 4));
        let c = compare_inner(heap, fa, fb, in_progress);
        if c != Ordering::Equal {
            return c;
        }
    }
    arity_a.cmp(&arity_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::Number;
    use rt_core::layout::HeapKind as HK;

    fn alloc_tuple(heap: &mut Heap, fields: &[TaggedValue]) -> u32 {
        let ptr = heap.malloc(8 + fields.len() as u32 * 4);
        heap.write_u32(ptr, HK::Tuple as u32);
        heap.write_u32(ptr + tuple_array::ARITY_OFFSET, fields.len() as u32);
        for (i, f) in fields.iter().enumerate() {
            heap.write_u32(ptr + tuple_array::FIELDS_OFFSET + i as u32 * 4, f.to_bits());
        }
        ptr
    }

    #[test]
    fn test_simple_numbers_equal_and_compare() {
        let heap = Heap::new();
        let a = TaggedValue::from_simple_int(3);
        let b = TaggedValue::from_simple_int(3);
        let c = TaggedValue::from_simple_int(4);
        assert!(equal(&heap, a, b));
        assert_eq!(compare(&heap, a, c), Ordering::Less);
    }

    #[test]
    fn test_numeric_cross_representation_equality() {
        let mut heap = Heap::new();
        let boxed = numeric::alloc_boxed(&mut heap, &Number::Float64(5.0));
        let simple = TaggedValue::from_simple_int(5);
        assert!(equal(&heap, simple, boxed));
    }

    #[test]
    fn test_string_equality_and_ordering() {
        let mut heap = Heap::new();
        let a = bytes::from_str(&mut heap, "abc");
        let b = bytes::from_str(&mut heap, "abc");
        let c = bytes::from_str(&mut heap, "abd");
        assert!(equal(&heap, TaggedValue::from_heap_ptr(a), TaggedValue::from_heap_ptr(b)));
        assert_eq!(
            compare(&heap, TaggedValue::from_heap_ptr(a), TaggedValue::from_heap_ptr(c)),
            Ordering::Less
        );
    }

    #[test]
    fn test_tuple_structural_equality() {
        let mut heap = Heap::new();
        let t1 = alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(1), TaggedValue::from_simple_int(2)]);
        let t2 = alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(1), TaggedValue::from_simple_int(2)]);
        let t3 = alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(1), TaggedValue::from_simple_int(3)]);
        assert!(equal(&heap, TaggedValue::from_heap_ptr(t1), TaggedValue::from_heap_ptr(t2)));
        assert!(!equal(&heap, TaggedValue::from_heap_ptr(t1), TaggedValue::from_heap_ptr(t3)));
    }

    #[test]
    fn test_reflexivity_and_symmetry_and_transitivity() {
        let mut heap = Heap::new();
        let a = TaggedValue::from_heap_ptr(alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(7)]));
        let b = TaggedValue::from_heap_ptr(alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(7)]));
        let c = TaggedValue::from_heap_ptr(alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(7)]));

        assert!(equal(&heap, a, a)); // reflexive
        assert_eq!(equal(&heap, a, b), equal(&heap, b, a)); // symmetric
        assert!(equal(&heap, a, b) && equal(&heap, b, c) && equal(&heap, a, c)); // transitive
    }

    #[test]
    fn test_cyclic_array_equality_terminates() {
        // Two 1-slot arrays that each point to themselves should compare equal
        // without the walk looping forever.
        let mut heap = Heap::new();
        let a = heap.malloc(8 + 4);
        heap.write_u32(a, HK::Array as u32);
        heap.write_u32(a + tuple_array::ARITY_OFFSET, 1);
        heap.write_u32(a + tuple_array::FIELDS_OFFSET, TaggedValue::from_heap_ptr(a).to_bits());

        let b = heap.malloc(8 + 4);
        heap.write_u32(b, HK::Array as u32);
        heap.write_u32(b + tuple_array::ARITY_OFFSET, 1);
        heap.write_u32(b + tuple_array::FIELDS_OFFSET, TaggedValue::from_heap_ptr(b).to_bits());

        assert!(equal(&heap, TaggedValue::from_heap_ptr(a), TaggedValue::from_heap_ptr(b)));
    }

    #[test]
    fn test_kind_rank_orders_numbers_before_strings() {
        let mut heap = Heap::new();
        let n = TaggedValue::from_simple_int(1);
        let s = TaggedValue::from_heap_ptr(bytes::from_str(&mut heap, "x"));
        assert_eq!(compare(&heap, n, s), Ordering::Less);
    }

    fn alloc_record(heap: &mut Heap, module_hash: u32, type_hash: u32, fields: &[TaggedValue]) -> u32 {
        let ptr = heap.malloc(16 + fields.len() as u32 * 4);
        heap.write_u32(ptr, HK::Record as u32);
        heap.write_u32(ptr + record::MODULE_HASH_OFFSET, module_hash);
        heap.write_u32(ptr + record::TYPE_HASH_OFFSET, type_hash);
        heap.write_u32(ptr + record::ARITY_OFFSET, fields.len() as u32);
        for (i, f) in fields.iter().enumerate() {
            heap.write_u32(ptr + record::FIELDS_OFFSET + i as u32 * 4, f.to_bits());
        }
        ptr
    }

    #[test]
    fn test_records_with_same_type_hash_but_different_module_hash_are_unequal() {
        let mut heap = Heap::new();
        let fields = [TaggedValue::from_simple_int(1)];
        let a = alloc_record(&mut heap, 0xAAAA, 0x1234, &fields);
        let b = alloc_record(&mut heap, 0xBBBB, 0x1234, &fields);
        assert!(!equal(&heap, TaggedValue::from_heap_ptr(a), TaggedValue::from_heap_ptr(b)));
    }
}
