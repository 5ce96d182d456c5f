//! The byte container (spec §4.D): `String` and `Bytes` share this layout
//! (`0: kind; 4: length`, then raw bytes) and differ only in the kind tag
//! stamped at allocation time and in whether `fromString`/`toString` accept
//! the payload without a validity check.

use rt_core::layout::{string_bytes, HeapKind};

use crate::exception::RuntimeException;
use crate::mem::Heap;
use crate::utf8;

/// Allocate a new byte object of `kind` (`String` or `Bytes`) holding a copy
/// of `data`.
pub fn make(heap: &mut Heap, kind: HeapKind, data: &[u8]) -> u32 {
    debug_assert!(matches!(kind, HeapKind::String | HeapKind::Bytes));
    let ptr = heap.malloc(8 + data.len() as u32);
    heap.write_u32(ptr, kind as u32);
    heap.write_u32(ptr + string_bytes::LENGTH_OFFSET, data.len() as u32);
    heap.write_bytes(ptr + string_bytes::PAYLOAD_OFFSET, data);
    ptr
}

pub fn length(heap: &Heap, ptr: u32) -> u32 {
    heap.read_u32(ptr + string_bytes::LENGTH_OFFSET)
}

fn payload_base(ptr: u32) -> u32 {
    ptr + string_bytes::PAYLOAD_OFFSET
}

fn check_bounds(len: u32, index: u32, access_len: u32) -> Result<(), RuntimeException> {
    if index.checked_add(access_len).is_none_or(|end| end > len) {
        return Err(RuntimeException::IndexOutOfBounds {
            index: index as i64,
            length: len,
        });
    }
    Ok(())
}

/// Copy `len` bytes starting at `src_offset` in `src` into a brand-new
/// `Bytes` object.
pub fn copy(heap: &mut Heap, src: u32, src_offset: u32, len: u32) -> Result<u32, RuntimeException> {
    let src_len = length(heap, src);
    check_bounds(src_len, src_offset, len)?;
    let data = heap.read_bytes(payload_base(src) + src_offset, len).to_vec();
    Ok(make(heap, HeapKind::Bytes, &data))
}

/// Alias of `copy`, named the way spec §4.D names the read-only view op.
pub fn slice(heap: &mut Heap, src: u32, start: u32, len: u32) -> Result<u32, RuntimeException> {
    copy(heap, src, start, len)
}

/// Produce a new object of the same kind as `src`, grown or shrunk
/// independently from either end: `left`/`right` are signed deltas applied to
/// the front/back of the byte range. A positive delta inserts that many
/// zero bytes; a negative delta drops that many existing bytes from that
/// end. Errors if the resulting length would be negative.
pub fn resize(heap: &mut Heap, src: u32, left: i32, right: i32) -> Result<u32, RuntimeException> {
    let kind = HeapKind::from_u32(heap.read_u32(src)).expect("valid kind tag");
    let old_len = length(heap, src) as i64;
    let new_len = old_len + left as i64 + right as i64;
    if new_len < 0 {
        return Err(RuntimeException::InvalidArgument(format!(
            "resize(left={left}, right={right}) on length {old_len} would produce a negative length"
        )));
    }
    let new_len = new_len as u32;
    let mut data = vec![0u8; new_len as usize];

    // Surviving source range, after dropping `-left` leading / `-right`
    // trailing bytes; `dst_start` shifts it right by `left` when growing.
    let src_start = (-left).max(0) as i64;
    let src_end = (old_len + right.min(0) as i64).max(src_start);
    let copy_len = (src_end - src_start) as u32;
    let dst_start = left.max(0) as u32;

    if copy_len > 0 {
        data[dst_start as usize..(dst_start + copy_len) as usize]
            .copy_from_slice(heap.read_bytes(payload_base(src) + src_start as u32, copy_len));
    }

    Ok(make(heap, kind, &data))
}

/// Move `len` bytes from `src[src_offset..]` to `dst[dst_offset..]`,
/// correct even when `src == dst` and the ranges overlap.
pub fn move_bytes(
    heap: &mut Heap,
    src: u32,
    src_offset: u32,
    dst: u32,
    dst_offset: u32,
    len: u32,
) -> Result<(), RuntimeException> {
    check_bounds(length(heap, src), src_offset, len)?;
    check_bounds(length(heap, dst), dst_offset, len)?;
    let data = heap.read_bytes(payload_base(src) + src_offset, len).to_vec();
    heap.write_bytes(payload_base(dst) + dst_offset, &data);
    Ok(())
}

/// Concatenate two byte objects of the same kind into a new one.
pub fn concat(heap: &mut Heap, a: u32, b: u32) -> u32 {
    let kind = HeapKind::from_u32(heap.read_u32(a)).expect("valid kind tag");
    let a_len = length(heap, a);
    let b_len = length(heap, b);
    let mut data = vec![0u8; (a_len + b_len) as usize];
    data[..a_len as usize].copy_from_slice(heap.read_bytes(payload_base(a), a_len));
    data[a_len as usize..].copy_from_slice(heap.read_bytes(payload_base(b), b_len));
    make(heap, kind, &data)
}

/// Fill `len` bytes starting at `offset` with `value`, in place.
pub fn fill(heap: &mut Heap, ptr: u32, offset: u32, len: u32, value: u8) -> Result<(), RuntimeException> {
    check_bounds(length(heap, ptr), offset, len)?;
    let base = payload_base(ptr) + offset;
    for i in 0..len {
        heap.write_u8(base + i, value);
    }
    Ok(())
}

pub fn clear(heap: &mut Heap, ptr: u32) -> Result<(), RuntimeException> {
    let len = length(heap, ptr);
    fill(heap, ptr, 0, len, 0)
}

/// Build a `String` object from a Rust `&str` (always valid UTF-8 by
/// construction).
pub fn from_str(heap: &mut Heap, s: &str) -> u32 {
    make(heap, HeapKind::String, s.as_bytes())
}

/// Read a `String` object's payload back out as a Rust `String`, failing if
/// it does not hold well-formed UTF-8 (a caller that only ever builds
/// strings via `from_str`/`fromString` primitives will never hit this; it
/// exists for defense against a corrupt/foreign pointer).
pub fn to_string(heap: &Heap, ptr: u32) -> Result<String, RuntimeException> {
    let len = length(heap, ptr);
    let bytes = heap.read_bytes(payload_base(ptr), len);
    let mut offset = 0usize;
    let mut out = String::with_capacity(len as usize);
    while offset < bytes.len() {
        let decoded = utf8::read_code_point(bytes, offset)
            .ok_or(RuntimeException::MalformedUnicode { offset: offset as u32 })?;
        out.push(char::from_u32(decoded.scalar).expect("validated scalar value"));
        offset += decoded.len as usize;
    }
    Ok(out)
}

// =============================================================================
// Little-endian typed accessors
// =============================================================================

macro_rules! typed_accessor {
    ($get:ident, $set:ident, $ty:ty, $size:expr, $read:ident, $write:ident) => {
        pub fn $get(heap: &Heap, ptr: u32, offset: u32) -> Result<$ty, RuntimeException> {
            check_bounds(length(heap, ptr), offset, $size)?;
            Ok(heap.$read(payload_base(ptr) + offset))
        }

        pub fn $set(heap: &mut Heap, ptr: u32, offset: u32, value: $ty) -> Result<(), RuntimeException> {
            check_bounds(length(heap, ptr), offset, $size)?;
            heap.$write(payload_base(ptr) + offset, value);
            Ok(())
        }
    };
}

typed_accessor!(get_i8, set_i8, i8, 1, read_i8, write_i8);
typed_accessor!(get_u8, set_u8, u8, 1, read_u8, write_u8);
typed_accessor!(get_i16, set_i16, i16, 2, read_i16, write_i16);
typed_accessor!(get_u16, set_u16, u16, 2, read_u16, write_u16);
typed_accessor!(get_i32, set_i32, i32, 4, read_i32, write_i32);
typed_accessor!(get_u32, set_u32, u32, 4, read_u32, write_u32);
typed_accessor!(get_i64, set_i64, i64, 8, read_i64, write_i64);
typed_accessor!(get_u64, set_u64, u64, 8, read_u64, write_u64);
typed_accessor!(get_f32, set_f32, f32, 4, read_f32, write_f32);
typed_accessor!(get_f64, set_f64, f64, 8, read_f64, write_f64);

/// Decode one Unicode scalar value at `offset`, returning its length too.
pub fn get_char(heap: &Heap, ptr: u32, offset: u32) -> Result<utf8::DecodedChar, RuntimeException> {
    let len = length(heap, ptr);
    if offset >= len {
        return Err(RuntimeException::IndexOutOfBounds { index: offset as i64, length: len });
    }
    let bytes = heap.read_bytes(payload_base(ptr), len);
    utf8::read_code_point(bytes, offset as usize).ok_or(RuntimeException::MalformedUnicode { offset })
}

/// Write the UTF-8 encoding of `scalar` at `offset`, bounds-checked against
/// the number of bytes that encoding requires.
pub fn set_char(heap: &mut Heap, ptr: u32, offset: u32, scalar: u32) -> Result<(), RuntimeException> {
    let needed = utf8::encode_length(scalar);
    check_bounds(length(heap, ptr), offset, needed)?;
    let mut buf = [0u8; 4];
    let written = utf8::write_code_point(&mut buf, 0, scalar);
    heap.write_bytes(payload_base(ptr) + offset, &buf[..written as usize]);
    Ok(())
}
