use super::*;

#[test]
fn first_offset_is_origin() {
    let source = "const a = 1;\nconst b = 2;";
    let map = LineMap::build(source);
    assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
}

#[test]
fn offsets_after_newline_move_to_next_line() {
    let source = "const a = 1;\nconst b = 2;";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 2);
    assert_eq!(map.offset_to_position(13, source), Position::new(1, 0));
    assert_eq!(map.offset_to_position(19, source), Position::new(1, 6));
}

#[test]
fn crlf_counts_as_a_single_line_break() {
    let source = "a\r\nb\rc";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(3, source), Position::new(1, 0));
    assert_eq!(map.offset_to_position(5, source), Position::new(2, 0));
}

#[test]
fn columns_are_counted_in_utf16_units() {
    // "é" is 2 bytes in UTF-8 and 1 UTF-16 unit; the emoji is 4 bytes and 2 units.
    let source = "é😀x";
    let map = LineMap::build(source);
    assert_eq!(map.offset_to_position(2, source), Position::new(0, 1));
    assert_eq!(map.offset_to_position(6, source), Position::new(0, 3));
}

#[test]
fn span_to_range_converts_both_ends() {
    let source = "export function Button() {}\n";
    let map = LineMap::build(source);
    let range = map.span_to_range(crate::ByteSpan::new(16, 22), source);
    assert_eq!(range.start, Position::new(0, 16));
    assert_eq!(range.end, Position::new(0, 22));
}

#[test]
fn shifted_span_points_into_outer_text() {
    let span = crate::ByteSpan::new(3, 9).shifted(100);
    assert_eq!(span, crate::ByteSpan::new(103, 109));
    assert_eq!(crate::ByteSpan::new(2, 5).slice("abcdefg"), "cde");
    assert_eq!(crate::ByteSpan::new(5, 50).slice("abcdefg"), "fg");
}
