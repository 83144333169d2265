//! Integration coverage for the pretty-printer (component F): render-form
//! selection (leaf / key-value / key-value-with-attributes / container),
//! `=`-alignment across sibling leaves, and compact-mode whitespace
//! minimization.

use xmq::document::Document;
use xmq::printer::{PrintSettings, Printer, RenderTarget};

fn print(src: &str, settings: PrintSettings) -> String {
    let doc = Document::parse_bytes(src.as_bytes(), None);
    let tree = doc.tree().expect("source should parse");
    Printer::new(settings).unwrap().print(tree)
}

#[test]
fn leaf_value_prints_with_padded_equals() {
    assert_eq!(print("car = saab", PrintSettings::default()), "car = saab");
}

#[test]
fn key_value_with_attributes_keeps_attrs_before_equals() {
    let out = print("car(color=blue wheels=4) = saab", PrintSettings::default());
    assert_eq!(out, "car(color=blue wheels=4) = saab");
}

#[test]
fn container_form_indents_children_one_level() {
    let out = print("car{brand=saab model=900}", PrintSettings::default());
    let expected = "car {\n    brand = saab\n    model = 900\n}";
    assert_eq!(out, expected);
}

#[test]
fn nested_containers_indent_each_level() {
    let out = print("garage{car{brand=saab}}", PrintSettings::default());
    let expected = "garage {\n    car {\n        brand = saab\n    }\n}";
    assert_eq!(out, expected);
}

#[test]
fn sibling_leaves_align_their_equals_column() {
    // `model` is the widest name among the three leaves, so `id` and `yr`
    // pick up padding to bring their `=` into the same column.
    let out = print("car{id=1 model=900 yr=1979}", PrintSettings::default());
    let lines: Vec<&str> = out.lines().collect();
    let eq_col = |line: &str| line.find('=').unwrap();
    assert_eq!(eq_col(lines[1]), eq_col(lines[2]));
    assert_eq!(eq_col(lines[2]), eq_col(lines[3]));
}

#[test]
fn alignment_does_not_apply_when_a_sibling_is_a_container() {
    // `engine` has its own children, so it isn't a `name = value` leaf and
    // alignment across the remaining leaves is skipped rather than padded
    // around a form it doesn't participate in.
    let out = print("car{id=1 engine{cyl=4} yr=1979}", PrintSettings::default());
    assert!(out.contains("id = 1"));
    assert!(out.contains("yr = 1979"));
}

#[test]
fn compact_mode_drops_all_cosmetic_whitespace() {
    let out = print("car{brand=saab model=900}", PrintSettings::compact());
    assert_eq!(out, "car{brand=saab model=900}");
}

#[test]
fn compact_mode_still_separates_sibling_elements() {
    let out = print("a=1\nb=2", PrintSettings::compact());
    assert_eq!(out, "a=1 b=2");
}

#[test]
fn force_quotes_wraps_values_that_would_otherwise_print_bare() {
    let settings = PrintSettings { force_quotes: true, ..Default::default() };
    assert_eq!(print("car = saab", settings), "car = 'saab'");
}

#[test]
fn values_needing_quotes_use_the_quote_engine_regardless_of_force_quotes() {
    let out = print("car = 'saab 900'", PrintSettings::default());
    assert_eq!(out, "car = 'saab 900'");
}

#[test]
fn single_line_comment_round_trips_with_its_prefix() {
    let out = print("// a note\ncar=saab", PrintSettings::default());
    assert!(out.starts_with("// a note"));
}

#[test]
fn terminal_render_target_resolves_without_error() {
    let settings = PrintSettings { render_to: RenderTarget::Terminal, use_color: true, ..Default::default() };
    let out = print("car = saab", settings);
    assert!(out.contains("saab"));
}

#[test]
fn html_render_target_resolves_without_error() {
    let settings = PrintSettings { render_to: RenderTarget::Html, use_color: true, ..Default::default() };
    let out = print("car = saab", settings);
    assert!(out.contains("saab"));
}

#[test]
fn html_coloring_wraps_the_key_value_text_and_not_just_the_name() {
    // A key-value element's value is its most common render form (spec
    // §4.F); it must come back wrapped in its own `<span>`, not pushed raw
    // after the colored name.
    let settings = PrintSettings { render_to: RenderTarget::Html, use_color: true, ..Default::default() };
    let out = print("car = saab", settings);
    let spans = out.matches("<span").count();
    assert_eq!(out.matches("</span>").count(), spans);
    assert!(spans >= 2, "expected both the name and the value colored, got: {out}");
}

#[test]
fn html_coloring_wraps_every_attribute_value_kind() {
    let settings = PrintSettings { render_to: RenderTarget::Html, use_color: true, ..Default::default() };
    let out = print("car(color=blue ref=&amp;) = saab", settings);
    let spans = out.matches("<span").count();
    assert_eq!(out.matches("</span>").count(), spans);
    // name, two attr keys, and two attr values, plus the key-value text.
    assert!(spans >= 6, "expected attribute values to be individually colored, got: {out}");
}

#[test]
fn indentation_space_override_replaces_the_padding_character() {
    let settings = PrintSettings { indentation_space: '.', ..Default::default() };
    let out = print("car{brand=saab}", settings);
    assert_eq!(out, "car {\n....brand = saab\n}");
}

#[test]
fn own_compound_value_reprints_through_the_compound_syntax_and_round_trips() {
    let src = "car = ('a'&amp;'b')";
    let out = print(src, PrintSettings::default());
    assert_eq!(out, "car = ('a'&amp;'b')");

    // Reparsing must recover the same three fragments under `car`, not
    // scatter them into sibling elements or fail on a bare entity.
    let reparsed = Document::parse_bytes(out.as_bytes(), None);
    assert!(reparsed.error().is_none());
    assert_eq!(reparsed.get_string("car").as_deref(), Some("ab"));
}

#[test]
fn text_sibling_in_a_mixed_container_reprints_quoted_and_round_trips() {
    let out = print("root{'hello' car{x=1}}", PrintSettings::default());
    assert!(out.contains("'hello'"), "expected the text sibling to print quoted, got: {out}");

    let reparsed = Document::parse_bytes(out.as_bytes(), None);
    assert!(reparsed.error().is_none());
    assert_eq!(reparsed.get_int("root/car/x"), Some(1));
}

#[test]
fn explicit_space_override_replaces_multiline_quote_padding() {
    let settings = PrintSettings { explicit_space: '.', ..Default::default() };
    let out = print("note = 'first\nsecond'", settings);
    // The re-indented quote body pads each continuation line with the
    // `explicit_space` character rather than a literal ASCII space.
    let quote_start = out.find('\'').unwrap();
    let pad_width = quote_start; // column of the opening quote, 0-indexed
    let expected_pad = ".".repeat(pad_width);
    assert!(out.contains(&format!("\n{expected_pad}second")));
}
