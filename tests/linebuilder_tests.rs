//! Integration coverage for the line builder (component H) through the
//! public `xmq`/`line_args!` surface — worked compact and human-readable
//! examples, plus a couple of group-boundary edge cases the unit
//! tests inside `linebuilder.rs` don't exercise from outside the crate.

use xmq::linebuilder::{line_printf, LineConfig};
use xmq::line_args;

#[test]
fn compact_mixed_groups_with_newline_and_triple_quote() {
    let config = LineConfig::new();
    let args = line_args![
        "car{", "nw=", "%d", 36, "model=", "%s %d", "car go ", 3, "decription=", "%s", "howdy\ndowdy",
        "more=", "'''%s'''", "===", "key=", "", "}"
    ];
    assert_eq!(
        line_printf(&config, &args),
        "car{nw=36 model='car go  3'decription=('howdy'&#10;'dowdy')more=(&#39;&#39;&#39;'==='&#39;&#39;&#39;)key=''}"
    );
}

#[test]
fn compact_float_format() {
    let config = LineConfig::new();
    let args = line_args!["work=", "pi is %f", 3.141590];
    assert_eq!(line_printf(&config, &args), "work='pi is 3.141590'");
}

#[test]
fn human_readable_float_format() {
    let mut config = LineConfig::new();
    config.set_human_readable(true);
    let args = line_args!["work=", "pi is %f", 3.141590];
    assert_eq!(line_printf(&config, &args), "(work) pi is 3.141590");
}

#[test]
fn bare_literal_fragments_pass_through_unchanged() {
    let config = LineConfig::new();
    let args = line_args!["root{", "}"];
    assert_eq!(line_printf(&config, &args), "root{}");
}

#[test]
fn two_key_value_groups_get_a_separating_space_when_both_boundaries_are_bare() {
    let config = LineConfig::new();
    let args = line_args!["a=", "%s", "1", "b=", "%s", "2"];
    // `1` (digit) and `b` (letter) are both bare-text chars, so a space is
    // inserted between the groups to avoid them merging into `1b`.
    assert_eq!(line_printf(&config, &args), "a=1 b=2");
}

#[test]
fn literal_fragment_touching_a_key_value_group_only_separates_when_ambiguous() {
    let config = LineConfig::new();
    let args = line_args!["{", "a=", "%s", "1"];
    assert_eq!(line_printf(&config, &args), "{a=1");
}
