//! Element/attribute name grammar.
//!
//! An element or attribute name starts with a letter or `_`; body
//! characters are letters, digits, `-`, `_`, `.`, `:`, `#`. An embedded `:`
//! splits a namespace prefix from the local name; at most one `:` is
//! allowed. Entity names are validated separately via `regex`.

use regex::Regex;
use std::sync::OnceLock;

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_body(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '#')
}

/// Does `s` satisfy the element/attribute-name grammar (ignoring the
/// single-colon constraint, checked separately by [`split_namespace`])?
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_name_start(c) => {}
        _ => return false,
    }
    chars.all(is_name_body)
}

/// Split `name` into an optional namespace prefix and the local name,
/// enforcing "at most one `:` per name".
pub fn split_namespace(name: &str) -> Option<(Option<&str>, &str)> {
    let colon_count = name.matches(':').count();
    if colon_count == 0 {
        return Some((None, name));
    }
    if colon_count > 1 {
        return None;
    }
    let idx = name.find(':').unwrap();
    Some((Some(&name[..idx]), &name[idx + 1..]))
}

fn entity_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#[0-9]+|#x[0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*)$").unwrap())
}

/// Validate an entity name: a W3C-style named entity, or `#decimal` /
/// `#xHEX`.
pub fn is_valid_entity_name(name: &str) -> bool {
    entity_name_re().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(is_valid_name("car"));
        assert!(is_valid_name("_private"));
        assert!(is_valid_name("num-wheels"));
        assert!(is_valid_name("xmlns:p"));
    }

    #[test]
    fn rejects_names_starting_with_digit() {
        assert!(!is_valid_name("1car"));
    }

    #[test]
    fn splits_namespace_prefix() {
        assert_eq!(split_namespace("xmlns:p"), Some((Some("xmlns"), "p")));
        assert_eq!(split_namespace("car"), Some((None, "car")));
        assert_eq!(split_namespace("a:b:c"), None);
    }

    #[test]
    fn validates_entity_names() {
        assert!(is_valid_entity_name("amp"));
        assert!(is_valid_entity_name("#10"));
        assert!(is_valid_entity_name("#x2F"));
        assert!(!is_valid_entity_name("10"));
        assert!(!is_valid_entity_name(""));
    }
}
