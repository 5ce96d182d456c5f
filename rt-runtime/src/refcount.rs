//! Reference counting and the finalizer registry (spec §4.C).
//!
//! The per-object count is *not* stored in the object's header — the header
//! layout in `rt_core::layout` is exactly what the compiler emits and reads,
//! and nothing in that contract names a refcount field. Instead it lives in
//! a side table here, which is the shape the design notes recommend: one
//! runtime-state value (`RefCounts`) threaded alongside the heap rather than
//! smeared across object headers.

use std::collections::HashMap;

use rt_core::layout::{adt_variant, boxed_number, lambda, record, tuple_array, HeapKind, NumberSubTag};

use crate::mem::Heap;

/// A finalizer fires exactly once, when an object's count reaches zero.
pub type Finalizer = Box<dyn FnOnce(u32) + Send>;

/// Per-object reference counts and the finalizer registry, threaded
/// alongside `Heap`. Kept as a separate structure (rather than folded into
/// `Heap`) so callers that only need to inspect memory are not forced to
/// also carry bookkeeping state.
#[derive(Default)]
pub struct RefCounts {
    counts: HashMap<u32, u32>,
    finalizers: HashMap<u32, Finalizer>,
}

impl RefCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ptr` with an initial count of 1. Called once, right after
    /// the allocator hands back a fresh object.
    pub fn register(&mut self, ptr: u32) {
        self.counts.insert(ptr, 1);
    }

    pub fn count(&self, ptr: u32) -> u32 {
        *self.counts.get(&ptr).unwrap_or(&0)
    }

    /// Install a finalizer for `ptr`, replacing any previous one.
    pub fn set_finalizer(&mut self, ptr: u32, f: Finalizer) {
        if !self.counts.contains_key(&ptr) {
            tracing::warn!(ptr, "setFinalizer on a pointer with no refcount entry");
        }
        self.finalizers.insert(ptr, f);
    }

    /// Deregister `ptr`'s finalizer without running it.
    pub fn cancel_finalizer(&mut self, ptr: u32) {
        self.finalizers.remove(&ptr);
    }

    fn take_finalizer(&mut self, ptr: u32) -> Option<Finalizer> {
        self.finalizers.remove(&ptr)
    }

    /// Increment `ptr`'s count. A no-op on values that aren't heap objects
    /// at all is the caller's responsibility — this assumes `ptr` is valid.
    pub fn inc_ref(&mut self, ptr: u32) {
        let entry = self.counts.entry(ptr).or_insert(0);
        *entry += 1;
    }

    /// Decrement `ptr`'s count; at zero, recursively decrements every child
    /// reference (per `child_offsets`), fires and removes any finalizer,
    /// and frees the block.
    pub fn dec_ref(&mut self, heap: &mut Heap, ptr: u32) {
        let count = self.counts.get_mut(&ptr);
        let Some(count) = count else {
            tracing::warn!(ptr, "decRef on untracked pointer");
            return;
        };
        debug_assert!(*count > 0, "refcount underflow at {:#x}", ptr);
        *count -= 1;
        if *count > 0 {
            return;
        }
        self.counts.remove(&ptr);
        tracing::debug!(ptr, "refcount reached zero, releasing");

        for child in child_pointers(heap, ptr) {
            self.dec_ref(heap, child);
        }

        if let Some(finalizer) = self.take_finalizer(ptr) {
            tracing::debug!(ptr, "running finalizer");
            finalizer(ptr);
        }

        heap.free(ptr);
    }
}

/// Enumerate the heap pointers directly reachable as child fields of the
/// object at `ptr`, per spec §4.C's kind table. Tagged words that are not
/// themselves heap pointers are skipped.
fn child_pointers(heap: &Heap, ptr: u32) -> Vec<u32> {
    use rt_core::tagged::TaggedValue;

    let Some(kind) = HeapKind::from_u32(heap.read_u32(ptr)) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut push_word = |word: u32| {
        let tv = TaggedValue::from_bits(word);
        if tv.is_heap_ptr() {
            out.push(tv.as_heap_ptr());
        }
    };

    match kind {
        HeapKind::String | HeapKind::Bytes => {}
        HeapKind::Tuple | HeapKind::Array => {
            let arity = heap.read_u32(ptr + tuple_array::ARITY_OFFSET);
            let base = ptr + tuple_array::FIELDS_OFFSET;
            for i in 0..arity {
                push_word(heap.read_u32(base + i * 4));
            }
        }
        HeapKind::Record => {
            let arity = heap.read_u32(ptr + record::ARITY_OFFSET);
            let base = ptr + record::FIELDS_OFFSET;
            for i in 0..arity {
                push_word(heap.read_u32(base + i * 4));
            }
        }
        HeapKind::AdtVariant => {
            let arity = heap.read_u32(ptr + adt_variant::ARITY_OFFSET);
            let base = ptr + adt_variant::FIELDS_OFFSET;
            for i in 0..arity {
                push_word(heap.read_u32(base + i * 4));
            }
        }
        HeapKind::Lambda => {
            let arity = heap.read_u32(ptr + lambda::ARITY_OFFSET);
            let base = ptr + lambda::CAPTURES_OFFSET;
            for i in 0..arity {
                push_word(heap.read_u32(base + i * 4));
            }
        }
        HeapKind::Int32 | HeapKind::Uint32 | HeapKind::Float32 => {}
        // Every boxed number is a leaf except Rational, whose numerator and
        // denominator are each their own boxed BigInt child (spec §4.C).
        HeapKind::BoxedNumber => {
            if let Some(NumberSubTag::Rational) =
                NumberSubTag::from_u32(heap.read_u32(ptr + boxed_number::SUB_TAG_OFFSET))
            {
                let payload = ptr + boxed_number::PAYLOAD_OFFSET;
                push_word(heap.read_u32(payload));
                push_word(heap.read_u32(payload + 4));
            }
        }
    }
    out
}
