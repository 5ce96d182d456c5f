//! The pretty printer (spec §4.J): renders a tagged value as the source-like
//! text a program's `toString`/`print` builtins produce, using the same
//! kind dispatch as `equality.rs` and `hashing.rs`, plus `typemeta.rs` to
//! recover field and variant names when a module's type-metadata table is
//! available.
//!
//! Shared/cyclic structure is rendered the way a `write`-with-sharing Lisp
//! printer does: a value reached a second time while its own printing is
//! still on the call stack is a genuine cycle and gets a back-reference
//! (`<cycle to <1>>`) instead of being printed again; the node that closes
//! the cycle is tagged with the matching label (`<1>=...`) at its first
//! occurrence.
//!
//! `List`/`Option`/`Result`/`Range` are ordinary ADT variants at the heap
//! level, but the printer special-cases them by `BuiltinTypeId` rather than
//! going through the type-metadata table, the way the runtime's built-in
//! types need no compiler-emitted descriptor to print correctly.

use std::collections::HashMap;

use rt_core::layout::{adt_variant, record, string_bytes, tuple_array, BuiltinTypeId, HeapKind};
use rt_core::tagged::{ShortKind, TaggedValue};

use crate::exception::RuntimeException;
use crate::mem::Heap;
use crate::numeric;
use crate::panic::host_panic;
use crate::typemeta::TypeMetaTable;

const MAX_DEPTH: u32 = 31;

/// Built-in `Option` variant ids (Open Question: arbitrary but fixed, the
/// compiler must agree — see `BuiltinTypeId`'s own doc comment).
const OPTION_SOME: u32 = 0;
const OPTION_NONE: u32 = 1;
/// Built-in `Result` variant ids.
const RESULT_OK: u32 = 0;
const RESULT_ERR: u32 = 1;
/// Built-in `List` variant ids: `Cons(head, tail)` / `Nil`.
const LIST_NIL: u32 = 1;

/// A custom printer may render a value its own way; returning `None` falls
/// through to the next custom printer, and finally to the base printer.
pub type CustomPrinter = Box<dyn Fn(&Heap, TaggedValue) -> Option<String>>;

/// Holds the optional type-metadata table and any program-installed custom
/// printers, the way the teacher's `Renderer` holds its format registry.
#[derive(Default)]
pub struct Printer<'a> {
    type_meta: Option<&'a TypeMetaTable>,
    custom: Vec<CustomPrinter>,
}

impl<'a> Printer<'a> {
    pub fn new() -> Self {
        Printer { type_meta: None, custom: Vec::new() }
    }

    pub fn with_type_meta(type_meta: &'a TypeMetaTable) -> Self {
        Printer { type_meta: Some(type_meta), custom: Vec::new() }
    }

    /// Installs `f` on top of the custom-printer stack; later pushes are
    /// tried first.
    pub fn push_custom_printer(&mut self, f: CustomPrinter) {
        self.custom.push(f);
    }

    pub fn to_string(&self, heap: &Heap, tv: TaggedValue) -> String {
        let mut labels = HashMap::new();
        find_cycle_labels(heap, tv, &mut HashMap::new(), &mut labels, &mut 1, 0);
        let mut in_progress = std::collections::HashSet::new();
        self.render(heap, tv, &labels, &mut in_progress, 0)
    }

    pub fn print(&self, heap: &Heap, tv: TaggedValue, suffix: &str) {
        print!("{}{}", self.to_string(heap, tv), suffix);
    }

    fn try_custom(&self, heap: &Heap, tv: TaggedValue) -> Option<String> {
        self.custom.iter().rev().find_map(|f| f(heap, tv))
    }

    fn render(
        &self,
        heap: &Heap,
        tv: TaggedValue,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> String {
        if let Some(s) = self.try_custom(heap, tv) {
            return s;
        }
        if depth > MAX_DEPTH {
            return "...".to_string();
        }

        if is_numeric(heap, tv) {
            return numeric::read_tagged(heap, tv).to_display_string();
        }
        if !tv.is_heap_ptr() {
            return render_scalar(tv);
        }

        let ptr = tv.as_heap_ptr();
        if in_progress.contains(&ptr) {
            let label = labels.get(&ptr).copied().unwrap_or(0);
            return format!("<cycle to <{label}>>");
        }
        in_progress.insert(ptr);
        let body = self.render_heap_object(heap, ptr, labels, in_progress, depth);
        in_progress.remove(&ptr);

        match labels.get(&ptr) {
            Some(label) => format!("<{label}>={body}"),
            None => body,
        }
    }

    fn render_heap_object(
        &self,
        heap: &Heap,
        ptr: u32,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> String {
        let kind = HeapKind::from_u32(heap.read_u32(ptr)).expect("valid heap kind");
        match kind {
            HeapKind::String => {
                let len = heap.read_u32(ptr + string_bytes::LENGTH_OFFSET);
                let bytes = heap.read_bytes(ptr + string_bytes::PAYLOAD_OFFSET, len);
                match std::str::from_utf8(bytes) {
                    Ok(s) if depth == 0 => s.to_string(),
                    Ok(s) => render_quoted_string(s),
                    Err(_) => "<malformed string>".to_string(),
                }
            }
            HeapKind::Bytes => {
                let len = heap.read_u32(ptr + string_bytes::LENGTH_OFFSET);
                let bytes = heap.read_bytes(ptr + string_bytes::PAYLOAD_OFFSET, len);
                render_bytes_hex(bytes)
            }
            HeapKind::Tuple => {
                let arity = heap.read_u32(ptr + tuple_array::ARITY_OFFSET);
                let items = self.render_fields(heap, ptr + tuple_array::FIELDS_OFFSET, arity, labels, in_progress, depth);
                if arity == 1 {
                    format!("box({})", items[0])
                } else {
                    format!("({})", items.join(", "))
                }
            }
            HeapKind::Array => {
                let arity = heap.read_u32(ptr + tuple_array::ARITY_OFFSET);
                let items = self.render_fields(heap, ptr + tuple_array::FIELDS_OFFSET, arity, labels, in_progress, depth);
                if items.is_empty() {
                    "[>]".to_string()
                } else {
                    format!("[> {}]", items.join(", "))
                }
            }
            HeapKind::Record => {
                let type_hash = heap.read_u32(ptr + record::TYPE_HASH_OFFSET);
                let arity = heap.read_u32(ptr + record::ARITY_OFFSET);
                let items = self.render_fields(heap, ptr + record::FIELDS_OFFSET, arity, labels, in_progress, depth);
                self.render_record(type_hash, &items, depth)
            }
            HeapKind::AdtVariant => {
                let type_hash = heap.read_u32(ptr + adt_variant::TYPE_HASH_OFFSET);
                let type_id = heap.read_u32(ptr + adt_variant::TYPE_ID_OFFSET);
                let variant_id = heap.read_u32(ptr + adt_variant::VARIANT_ID_OFFSET);
                let arity = heap.read_u32(ptr + adt_variant::ARITY_OFFSET);
                match BuiltinTypeId::from_u32(type_id) {
                    Some(BuiltinTypeId::Option) => self.render_option(heap, ptr, variant_id, labels, in_progress, depth),
                    Some(BuiltinTypeId::Result) => self.render_result(heap, ptr, variant_id, labels, in_progress, depth),
                    Some(BuiltinTypeId::List) => self.render_list(heap, ptr, labels, in_progress, depth),
                    Some(BuiltinTypeId::Range) => self.render_range(heap, ptr, labels, in_progress, depth),
                    None => {
                        let items =
                            self.render_fields(heap, ptr + adt_variant::FIELDS_OFFSET, arity, labels, in_progress, depth);
                        self.render_adt_variant(type_hash, variant_id, &items)
                    }
                }
            }
            HeapKind::Lambda => "<lambda>".to_string(),
            HeapKind::Int32 | HeapKind::Uint32 | HeapKind::Float32 | HeapKind::BoxedNumber => {
                unreachable!("numeric kinds are handled by the is_numeric fast path")
            }
        }
    }

    /// `{\n  field: value,\n  ...\n}`, 2-space indented per nesting level.
    /// Field names come from the type-metadata table; a configured table
    /// that has no entry (or a malformed one) for `type_hash` is a fatal
    /// panic (spec §7) since printing a record the compiler emitted requires
    /// its field names to exist. With no table configured at all (tests, or
    /// a printer used before any module's metadata is wired in), fields fall
    /// back to positional names.
    fn render_record(&self, type_hash: u32, items: &[String], depth: u32) -> String {
        let names: Vec<String> = match self.type_meta {
            None => (0..items.len()).map(|i| format!("_{i}")).collect(),
            Some(table) => match table.lookup_record_fields(type_hash) {
                Ok(Some(names)) if names.len() == items.len() => names,
                Ok(Some(_)) => host_panic(format!(
                    "type-metadata field count mismatch for record type {type_hash:#x}"
                )),
                Ok(None) => host_panic(format!("no type-metadata entry for record type {type_hash:#x}")),
                Err(e) => host_panic(format!("corrupt type-metadata table: {e}")),
            },
        };

        if items.is_empty() {
            return "{}".to_string();
        }
        let field_indent = "  ".repeat(depth as usize + 1);
        let close_indent = "  ".repeat(depth as usize);
        let mut out = String::from("{\n");
        for (name, value) in names.iter().zip(items.iter()) {
            out.push_str(&field_indent);
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str(",\n");
        }
        out.push_str(&close_indent);
        out.push('}');
        out
    }

    /// Tuple-call (`Name(a, b)`) or inline-record (`Name{ field: val, ... }`)
    /// form for a user-defined ADT variant, per the type-metadata table's
    /// `distance_to_inline_record_fields`.
    fn render_adt_variant(&self, type_hash: u32, variant_id: u32, items: &[String]) -> String {
        let Some(table) = self.type_meta else {
            let name = format!("Variant#{variant_id}");
            return if items.is_empty() { name } else { format!("{name}({})", items.join(", ")) };
        };
        let desc = match table.lookup_variant(type_hash, variant_id) {
            Ok(Some(desc)) => desc,
            Ok(None) => host_panic(format!("no type-metadata entry for variant {type_hash:#x}/{variant_id}")),
            Err(e) => host_panic(format!("corrupt type-metadata table: {e}")),
        };
        match &desc.inline_record_fields {
            Some(field_names) if field_names.len() == items.len() => {
                let fields: Vec<String> =
                    field_names.iter().zip(items.iter()).map(|(n, v)| format!("{n}: {v}")).collect();
                format!("{}{{ {} }}", desc.name, fields.join(", "))
            }
            Some(_) => host_panic(format!(
                "type-metadata inline-record field count mismatch for variant {type_hash:#x}/{variant_id}"
            )),
            None if items.is_empty() => desc.name,
            None => format!("{}({})", desc.name, items.join(", ")),
        }
    }

    fn render_option(
        &self,
        heap: &Heap,
        ptr: u32,
        variant_id: u32,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> String {
        if variant_id == OPTION_NONE {
            return "None".to_string();
        }
        debug_assert_eq!(variant_id, OPTION_SOME);
        let v = TaggedValue::from_bits(heap.read_u32(ptr + adt_variant::FIELDS_OFFSET));
        format!("Some({})", self.render(heap, v, labels, in_progress, depth + 1))
    }

    fn render_result(
        &self,
        heap: &Heap,
        ptr: u32,
        variant_id: u32,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> String {
        let v = TaggedValue::from_bits(heap.read_u32(ptr + adt_variant::FIELDS_OFFSET));
        let rendered = self.render(heap, v, labels, in_progress, depth + 1);
        if variant_id == RESULT_ERR {
            format!("Err({rendered})")
        } else {
            debug_assert_eq!(variant_id, RESULT_OK);
            format!("Ok({rendered})")
        }
    }

    /// Flattens a `Cons`/`Nil` chain into `[a, b, c]`. Guards against a
    /// cyclic spine (not a normal list, but the allocator contract doesn't
    /// rule one out) with a local visited set rather than relying on the
    /// generic cycle-label pass, which only labels the head values, not the
    /// spine pointers this walks directly.
    fn render_list(
        &self,
        heap: &Heap,
        ptr: u32,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> String {
        let mut items = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut cur = ptr;
        loop {
            if !seen.insert(cur) {
                items.push("...".to_string());
                break;
            }
            let variant_id = heap.read_u32(cur + adt_variant::VARIANT_ID_OFFSET);
            if variant_id == LIST_NIL {
                break;
            }
            let head = TaggedValue::from_bits(heap.read_u32(cur + adt_variant::FIELDS_OFFSET));
            items.push(self.render(heap, head, labels, in_progress, depth + 1));
            let tail = TaggedValue::from_bits(heap.read_u32(cur + adt_variant::FIELDS_OFFSET + 4));
            if !tail.is_heap_ptr() {
                break;
            }
            cur = tail.as_heap_ptr();
        }
        format!("[{}]", items.join(", "))
    }

    /// The built-in `Range` type's two known fields, rendered inline-record
    /// style without a constructor-name prefix (Open Question: field names
    /// fixed as `start`/`end` — `Range` is a runtime built-in with no
    /// compiler-emitted descriptor of its own, so the names can't come from
    /// `typemeta.rs`).
    fn render_range(
        &self,
        heap: &Heap,
        ptr: u32,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> String {
        let start = TaggedValue::from_bits(heap.read_u32(ptr + adt_variant::FIELDS_OFFSET));
        let end = TaggedValue::from_bits(heap.read_u32(ptr + adt_variant::FIELDS_OFFSET + 4));
        format!(
            "{{ start: {}, end: {} }}",
            self.render(heap, start, labels, in_progress, depth + 1),
            self.render(heap, end, labels, in_progress, depth + 1),
        )
    }

    fn render_fields(
        &self,
        heap: &Heap,
        base: u32,
        arity: u32,
        labels: &HashMap<u32, u32>,
        in_progress: &mut std::collections::HashSet<u32>,
        depth: u32,
    ) -> Vec<String> {
        (0..arity)
            .map(|i| {
                let field = TaggedValue::from_bits(heap.read_u32(base + i * 4));
                self.render(heap, field, labels, in_progress, depth + 1)
            })
            .collect()
    }
}

fn is_numeric(heap: &Heap, tv: TaggedValue) -> bool {
    if tv.is_simple_int() {
        return true;
    }
    tv.is_heap_ptr()
        && matches!(
            HeapKind::from_u32(heap.read_u32(tv.as_heap_ptr())),
            Some(HeapKind::Int32 | HeapKind::Uint32 | HeapKind::Float32 | HeapKind::BoxedNumber)
        )
}

fn render_scalar(tv: TaggedValue) -> String {
    if tv.is_void() {
        "void".to_string()
    } else if tv.is_unit() {
        "()".to_string()
    } else if tv.is_bool() {
        tv.as_bool().to_string()
    } else if let Some(ShortKind::Char) = tv.short_kind() {
        render_char(tv)
    } else if let Some(kind) = tv.short_kind() {
        format!("{kind:?}({:#x})", tv.to_bits())
    } else {
        format!("<reserved {:#x}>", tv.to_bits())
    }
}

/// Single-quoted with backslash escapes for `\b \f \n \r \t \v \\ \'`.
fn render_char(tv: TaggedValue) -> String {
    let scalar = tv.as_char_scalar();
    let c = char::from_u32(scalar).unwrap_or('\u{FFFD}');
    let mut out = String::with_capacity(4);
    out.push('\'');
    match c {
        '\u{8}' => out.push_str("\\b"),
        '\u{c}' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{b}' => out.push_str("\\v"),
        '\\' => out.push_str("\\\\"),
        '\'' => out.push_str("\\'"),
        other => out.push(other),
    }
    out.push('\'');
    out
}

fn render_quoted_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `<bytes: HH HH HH ...>` hex, truncated after 32 bytes with a trailing
/// `...>`.
fn render_bytes_hex(bytes: &[u8]) -> String {
    let truncated = bytes.len() > 32;
    let shown = &bytes[..bytes.len().min(32)];
    let mut out = String::from("<bytes:");
    for b in shown {
        out.push(' ');
        out.push_str(&format!("{b:02x}"));
    }
    if truncated {
        out.push_str(" ...");
    }
    out.push('>');
    out
}

/// Convenience entry point using the base printer with no type metadata.
pub fn to_string(heap: &Heap, tv: TaggedValue) -> String {
    Printer::new().to_string(heap, tv)
}

pub fn print(heap: &Heap, tv: TaggedValue, suffix: &str) {
    Printer::new().print(heap, tv, suffix)
}

/// Render a caught `RuntimeException` the way the pretty printer surfaces an
/// uncaught exception at the top level. `RuntimeException`'s `Display` impl
/// already leads with the tag name (`"Failure: boom"`); this just names that
/// contract from the printer's side.
pub fn print_exception(e: &RuntimeException) -> String {
    e.to_string()
}

/// First pass: find pointers that close a cycle (reached again while still
/// on the active recursion stack) and assign each one a label in the order
/// the back-edge was discovered.
fn find_cycle_labels(
    heap: &Heap,
    tv: TaggedValue,
    open: &mut HashMap<u32, ()>,
    labels: &mut HashMap<u32, u32>,
    next_label: &mut u32,
    depth: u32,
) {
    if depth > MAX_DEPTH || !tv.is_heap_ptr() || is_numeric(heap, tv) {
        return;
    }
    let ptr = tv.as_heap_ptr();
    if open.contains_key(&ptr) {
        labels.entry(ptr).or_insert_with(|| {
            let label = *next_label;
            *next_label += 1;
            label
        });
        return;
    }
    let Some(kind) = HeapKind::from_u32(heap.read_u32(ptr)) else { return };
    open.insert(ptr, ());
    match kind {
        HeapKind::Tuple | HeapKind::Array => {
            walk_fields(heap, ptr + tuple_array::ARITY_OFFSET, ptr + tuple_array::FIELDS_OFFSET, open, labels, next_label, depth);
        }
        HeapKind::Record => {
            walk_fields(heap, ptr + record::ARITY_OFFSET, ptr + record::FIELDS_OFFSET, open, labels, next_label, depth);
        }
        HeapKind::AdtVariant => {
            walk_fields(heap, ptr + adt_variant::ARITY_OFFSET, ptr + adt_variant::FIELDS_OFFSET, open, labels, next_label, depth);
        }
        _ => {}
    }
    open.remove(&ptr);
}

fn walk_fields(
    heap: &Heap,
    arity_offset: u32,
    base_offset: u32,
    open: &mut HashMap<u32, ()>,
    labels: &mut HashMap<u32, u32>,
    next_label: &mut u32,
    depth: u32,
) {
    let arity = heap.read_u32(arity_offset);
    for i in 0..arity {
        let field = TaggedValue::from_bits(heap.read_u32(base_offset + i * 4));
        find_cycle_labels(heap, field, open, labels, next_label, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes;
    use crate::numeric::Number;
    use rt_core::layout::tuple_array as ta;

    fn alloc_tuple(heap: &mut Heap, fields: &[TaggedValue]) -> u32 {
        let ptr = heap.malloc(8 + fields.len() as u32 * 4);
        heap.write_u32(ptr, HeapKind::Tuple as u32);
        heap.write_u32(ptr + ta::ARITY_OFFSET, fields.len() as u32);
        for (i, f) in fields.iter().enumerate() {
            heap.write_u32(ptr + ta::FIELDS_OFFSET + i as u32 * 4, f.to_bits());
        }
        ptr
    }

    fn alloc_array(heap: &mut Heap, fields: &[TaggedValue]) -> u32 {
        let ptr = heap.malloc(8 + fields.len() as u32 * 4);
        heap.write_u32(ptr, HeapKind::Array as u32);
        heap.write_u32(ptr + ta::ARITY_OFFSET, fields.len() as u32);
        for (i, f) in fields.iter().enumerate() {
            heap.write_u32(ptr + ta::FIELDS_OFFSET + i as u32 * 4, f.to_bits());
        }
        ptr
    }

    fn alloc_adt_variant(heap: &mut Heap, type_hash: u32, type_id: u32, variant_id: u32, fields: &[TaggedValue]) -> u32 {
        let ptr = heap.malloc(20 + fields.len() as u32 * 4);
        heap.write_u32(ptr, HeapKind::AdtVariant as u32);
        heap.write_u32(ptr + adt_variant::TYPE_HASH_OFFSET, type_hash);
        heap.write_u32(ptr + adt_variant::TYPE_ID_OFFSET, type_id);
        heap.write_u32(ptr + adt_variant::VARIANT_ID_OFFSET, variant_id);
        heap.write_u32(ptr + adt_variant::ARITY_OFFSET, fields.len() as u32);
        for (i, f) in fields.iter().enumerate() {
            heap.write_u32(ptr + adt_variant::FIELDS_OFFSET + i as u32 * 4, f.to_bits());
        }
        ptr
    }

    const NOT_BUILTIN: u32 = 0xFFFF_FFFF;

    #[test]
    fn test_simple_number() {
        let heap = Heap::new();
        assert_eq!(to_string(&heap, TaggedValue::from_simple_int(42)), "42");
    }

    #[test]
    fn test_string_is_bare_at_top_level() {
        let mut heap = Heap::new();
        let s = bytes::from_str(&mut heap, "hi\n");
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(s)), "hi\n");
    }

    #[test]
    fn test_string_is_quoted_when_nested() {
        let mut heap = Heap::new();
        let s = bytes::from_str(&mut heap, "hi\n");
        let t = alloc_tuple(&mut heap, &[TaggedValue::from_heap_ptr(s), TaggedValue::from_heap_ptr(s)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(t)), "(\"hi\\n\", \"hi\\n\")");
    }

    #[test]
    fn test_char_renders_single_quoted_with_escapes() {
        let newline = TaggedValue::from_char_scalar('\n' as u32);
        assert_eq!(to_string(&Heap::new(), newline), "'\\n'");
        let x = TaggedValue::from_char_scalar('x' as u32);
        assert_eq!(to_string(&Heap::new(), x), "'x'");
    }

    #[test]
    fn test_bytes_renders_as_hex() {
        let mut heap = Heap::new();
        let b = bytes::make(&mut heap, HeapKind::Bytes, &[0x01, 0x02, 0xff]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(b)), "<bytes: 01 02 ff>");
    }

    #[test]
    fn test_bytes_truncates_after_32_bytes() {
        let mut heap = Heap::new();
        let b = bytes::make(&mut heap, HeapKind::Bytes, &[0u8; 40]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(b)).matches("00").count(), 32);
        assert!(to_string(&heap, TaggedValue::from_heap_ptr(b)).ends_with("...>"));
    }

    #[test]
    fn test_unary_tuple_renders_as_box() {
        let mut heap = Heap::new();
        let t = alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(7)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(t)), "box(7)");
    }

    #[test]
    fn test_tuple_rendering() {
        let mut heap = Heap::new();
        let t = alloc_tuple(&mut heap, &[TaggedValue::from_simple_int(1), TaggedValue::from_simple_int(2)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(t)), "(1, 2)");
    }

    #[test]
    fn test_array_uses_angle_bracket_syntax() {
        let mut heap = Heap::new();
        let a = alloc_array(&mut heap, &[TaggedValue::from_simple_int(1), TaggedValue::from_simple_int(2), TaggedValue::from_simple_int(3)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(a)), "[> 1, 2, 3]");
    }

    #[test]
    fn test_cyclic_array_prints_cycle_label() {
        let mut heap = Heap::new();
        let a = heap.malloc(8 + 4);
        heap.write_u32(a, HeapKind::Array as u32);
        heap.write_u32(a + ta::ARITY_OFFSET, 1);
        heap.write_u32(a + ta::FIELDS_OFFSET, TaggedValue::from_heap_ptr(a).to_bits());

        let rendered = to_string(&heap, TaggedValue::from_heap_ptr(a));
        assert_eq!(rendered, "<1>=[> <cycle to <1>>]");
    }

    #[test]
    fn test_list_flattens_cons_chain() {
        let mut heap = Heap::new();
        let nil = alloc_adt_variant(&mut heap, 0, BuiltinTypeId::List as u32, LIST_NIL, &[]);
        let cons2 = alloc_adt_variant(
            &mut heap,
            0,
            BuiltinTypeId::List as u32,
            0,
            &[TaggedValue::from_simple_int(3), TaggedValue::from_heap_ptr(nil)],
        );
        let cons1 = alloc_adt_variant(
            &mut heap,
            0,
            BuiltinTypeId::List as u32,
            0,
            &[TaggedValue::from_simple_int(2), TaggedValue::from_heap_ptr(cons2)],
        );
        let cons0 = alloc_adt_variant(
            &mut heap,
            0,
            BuiltinTypeId::List as u32,
            0,
            &[TaggedValue::from_simple_int(1), TaggedValue::from_heap_ptr(cons1)],
        );
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(cons0)), "[1, 2, 3]");
    }

    #[test]
    fn test_option_some_and_none() {
        let mut heap = Heap::new();
        let some = alloc_adt_variant(&mut heap, 0, BuiltinTypeId::Option as u32, OPTION_SOME, &[TaggedValue::from_simple_int(5)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(some)), "Some(5)");
        let none = alloc_adt_variant(&mut heap, 0, BuiltinTypeId::Option as u32, OPTION_NONE, &[]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(none)), "None");
    }

    #[test]
    fn test_option_of_result() {
        let mut heap = Heap::new();
        let err = alloc_adt_variant(&mut heap, 0, BuiltinTypeId::Result as u32, RESULT_ERR, &[TaggedValue::from_simple_int(42)]);
        let some_err =
            alloc_adt_variant(&mut heap, 0, BuiltinTypeId::Option as u32, OPTION_SOME, &[TaggedValue::from_heap_ptr(err)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(some_err)), "Some(Err(42))");
    }

    #[test]
    fn test_range_renders_inline_record_without_name() {
        let mut heap = Heap::new();
        let r = alloc_adt_variant(
            &mut heap,
            0,
            BuiltinTypeId::Range as u32,
            0,
            &[TaggedValue::from_simple_int(0), TaggedValue::from_simple_int(10)],
        );
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(r)), "{ start: 0, end: 10 }");
    }

    #[test]
    fn test_record_renders_multiline_with_positional_fallback_names() {
        use rt_core::layout::record;
        let mut heap = Heap::new();
        let ptr = heap.malloc(24);
        heap.write_u32(ptr, HeapKind::Record as u32);
        heap.write_u32(ptr + record::MODULE_HASH_OFFSET, 1);
        heap.write_u32(ptr + record::TYPE_HASH_OFFSET, 2);
        heap.write_u32(ptr + record::ARITY_OFFSET, 2);
        heap.write_u32(ptr + record::FIELDS_OFFSET, TaggedValue::from_simple_int(1).to_bits());
        heap.write_u32(ptr + record::FIELDS_OFFSET + 4, TaggedValue::from_simple_int(2).to_bits());
        assert_eq!(
            to_string(&heap, TaggedValue::from_heap_ptr(ptr)),
            "{\n  _0: 1,\n  _1: 2,\n}"
        );
    }

    #[test]
    fn test_nested_record_indents_by_an_extra_level() {
        use rt_core::layout::record;
        let mut heap = Heap::new();
        let inner = heap.malloc(20);
        heap.write_u32(inner, HeapKind::Record as u32);
        heap.write_u32(inner + record::MODULE_HASH_OFFSET, 1);
        heap.write_u32(inner + record::TYPE_HASH_OFFSET, 2);
        heap.write_u32(inner + record::ARITY_OFFSET, 1);
        heap.write_u32(inner + record::FIELDS_OFFSET, TaggedValue::from_simple_int(9).to_bits());

        let outer = heap.malloc(20);
        heap.write_u32(outer, HeapKind::Record as u32);
        heap.write_u32(outer + record::MODULE_HASH_OFFSET, 1);
        heap.write_u32(outer + record::TYPE_HASH_OFFSET, 3);
        heap.write_u32(outer + record::ARITY_OFFSET, 1);
        heap.write_u32(outer + record::FIELDS_OFFSET, TaggedValue::from_heap_ptr(inner).to_bits());

        assert_eq!(
            to_string(&heap, TaggedValue::from_heap_ptr(outer)),
            "{\n  _0: {\n    _0: 9,\n  },\n}"
        );
    }

    #[test]
    fn test_adt_variant_without_type_meta_uses_positional_fallback() {
        let mut heap = Heap::new();
        let v = alloc_adt_variant(&mut heap, 0xABCD, NOT_BUILTIN, 3, &[TaggedValue::from_simple_int(1)]);
        assert_eq!(to_string(&heap, TaggedValue::from_heap_ptr(v)), "Variant#3(1)");
    }

    #[test]
    fn test_rational_prints_as_a_fraction() {
        let mut heap = Heap::new();
        let half = numeric::alloc_boxed(&mut heap, &Number::Rational(crate::numeric::Rational::new(1, 2)));
        assert_eq!(to_string(&heap, half), "1/2");
    }

    #[test]
    fn test_custom_printer_overrides_base() {
        let mut heap = Heap::new();
        let mut printer = Printer::new();
        printer.push_custom_printer(Box::new(|_heap, tv| {
            (tv.is_simple_int() && tv.as_simple_int() == 99).then(|| "ninety-nine".to_string())
        }));
        let v = TaggedValue::from_simple_int(99);
        assert_eq!(printer.to_string(&heap, v), "ninety-nine");
        let other = TaggedValue::from_simple_int(1);
        assert_eq!(printer.to_string(&heap, other), "1");
        let _ = &mut heap; // heap unused beyond allocation-free values here
    }
}
