//! Line builder (component H)
//!
//! Accepts a variadic sequence of key/format/value groups and assembles
//! them into a single compact XMQ fragment, driving [`crate::quote`]
//! directly instead of going through the lexer/parser/printer pipeline.
//! Rust has no variadic functions, so the varargs walk (`key=`, then a
//! `%s`/`%d`/`%f` format string, then that many positional arguments)
//! becomes a flat `&[Arg]` slice plus a small `line_args!` macro for
//! building one conveniently at call sites, each call building one output
//! line rather than accumulating state across calls.

use crate::lexer::token::is_reserved_char;
use crate::quote::{self, EscapePolicy, QuotePart, QuotePlan};

/// One positional argument to a format group. Unlike an untyped varargs
/// slot, each value carries its own type here, and the format string only
/// controls rendering (decimal vs. 6-decimal-place float vs. verbatim).
#[derive(Debug, Clone)]
pub enum Arg {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Int(n as i64)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Int(n)
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Float(n)
    }
}

impl Arg {
    fn as_display(&self) -> String {
        match self {
            Arg::Str(s) => s.clone(),
            Arg::Int(n) => n.to_string(),
            Arg::Float(f) => format!("{f:.6}"),
        }
    }

    fn as_decimal(&self) -> String {
        match self {
            Arg::Int(n) => n.to_string(),
            Arg::Float(f) => (*f as i64).to_string(),
            Arg::Str(s) => s.clone(),
        }
    }

    fn as_fixed_float(&self) -> String {
        match self {
            Arg::Float(f) => format!("{f:.6}"),
            Arg::Int(n) => format!("{:.6}", *n as f64),
            Arg::Str(s) => s.clone(),
        }
    }
}

/// Build a `&[Arg]` from a mixed literal list: `line_args!["key=", "%d", 36]`.
#[macro_export]
macro_rules! line_args {
    ($($x:expr),* $(,)?) => {
        vec![$($crate::linebuilder::Arg::from($x)),*]
    };
}

/// Persistent configuration for [`line_printf`] — just the human-readable
/// toggle, reused across calls.
#[derive(Debug, Clone, Default)]
pub struct LineConfig {
    human_readable: bool,
}

impl LineConfig {
    pub fn new() -> Self {
        LineConfig::default()
    }

    pub fn set_human_readable(&mut self, value: bool) {
        self.human_readable = value;
    }

    pub fn is_human_readable(&self) -> bool {
        self.human_readable
    }
}

/// Assemble `args` into one compact XMQ fragment. Each group is either a
/// bare literal fragment (any string not ending in `=`, e.g. `"car{"` or
/// `"}"`) or a `"key="` prefix followed by a format string and the
/// positional arguments its `%s`/`%d`/`%f` directives consume. Malformed
/// input (a format specifier with no matching argument, a stray argument
/// with no preceding `key=`) is the caller's bug; it degrades to an empty
/// substitution rather than a panic.
pub fn line_printf(config: &LineConfig, args: &[Arg]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < args.len() {
        match &args[i] {
            Arg::Str(s) if s.ends_with('=') && s.len() > 1 => {
                let key = &s[..s.len() - 1];
                i += 1;
                let format_str = match args.get(i) {
                    Some(Arg::Str(f)) => f.clone(),
                    _ => String::new(),
                };
                i += 1;
                let needed = count_specifiers(&format_str);
                let mut values = Vec::with_capacity(needed);
                for _ in 0..needed {
                    match args.get(i) {
                        Some(a) => {
                            values.push(a.clone());
                            i += 1;
                        }
                        None => break, // caller's bug: fewer args than specifiers
                    }
                }
                let substituted = substitute(&format_str, &values);
                append_fragment(&mut out, &render_group(config, key, &substituted));
            }
            Arg::Str(s) => {
                append_fragment(&mut out, s);
                i += 1;
            }
            // A bare numeric argument with no preceding `key=` group is the
            // caller's bug; skip it rather than panicking.
            _ => i += 1,
        }
    }
    out
}

fn render_group(config: &LineConfig, key: &str, value: &str) -> String {
    if config.human_readable {
        format!("({key}) {value}")
    } else {
        format!("{key}={}", render_value_compact(value))
    }
}

/// How many `%s`/`%d`/`%f` directives `format` contains. `%%` is a literal
/// percent and consumes no argument.
fn count_specifiers(format: &str) -> usize {
    let bytes = format.as_bytes();
    let mut n = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b's' | b'd' | b'f' => {
                    n += 1;
                    i += 2;
                    continue;
                }
                b'%' => {
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        i += 1;
    }
    n
}

/// Substitute `format`'s `%s`/`%d`/`%f`/`%%` directives with `values` in
/// order, producing the literal payload to be quoted (or, in human-
/// readable mode, printed verbatim).
fn substitute(format: &str, values: &[Arg]) -> String {
    let mut out = String::new();
    let bytes = format.as_bytes();
    let mut i = 0;
    let mut arg_idx = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b's' => {
                    if let Some(v) = values.get(arg_idx) {
                        out.push_str(&v.as_display());
                        arg_idx += 1;
                    }
                    i += 2;
                    continue;
                }
                b'd' => {
                    if let Some(v) = values.get(arg_idx) {
                        out.push_str(&v.as_decimal());
                        arg_idx += 1;
                    }
                    i += 2;
                    continue;
                }
                b'f' => {
                    if let Some(v) = values.get(arg_idx) {
                        out.push_str(&v.as_fixed_float());
                        arg_idx += 1;
                    }
                    i += 2;
                    continue;
                }
                b'%' => {
                    out.push('%');
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        // Safe: format strings here are ASCII-only (%-directives are
        // single bytes); push the raw byte as a char.
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Quote `value` the way a single-line compact XMQ element would (always
/// compact: the line builder never emits multi-line fragments).
fn render_value_compact(value: &str) -> String {
    let policy = EscapePolicy::for_compact();
    if !value.is_empty() && !value.chars().any(|c| policy.must_escape(c)) && !value.bytes().any(is_reserved_char) {
        return value.to_string();
    }
    match quote::plan_quote(value, true, false) {
        QuotePlan::Simple(part) => render_part(&part),
        QuotePlan::Compound(parts) => {
            let mut s = String::from("(");
            for part in &parts {
                s.push_str(&render_part(part));
            }
            s.push(')');
            s
        }
    }
}

fn render_part(part: &QuotePart) -> String {
    match part {
        QuotePart::Quoted { depth, body } => quote::render_quoted(*depth, body, 1, ' '),
        QuotePart::Entity(e) => format!("&{e};"),
    }
}

/// Append `fragment` to `out`, inserting a single space only when the
/// boundary would otherwise merge two adjacent bare-text runs into one —
/// the same "minimal whitespace... only where required to avoid
/// ambiguity" rule the printer applies in compact mode.
fn append_fragment(out: &mut String, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    let prev_last = out.chars().last();
    let next_first = fragment.chars().next();
    if let (Some(p), Some(n)) = (prev_last, next_first) {
        if is_bare_text_char(p) && is_bare_text_char(n) {
            out.push(' ');
        }
    }
    out.push_str(fragment);
}

fn is_bare_text_char(c: char) -> bool {
    c.is_ascii() && !is_reserved_char(c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_worked_example_from_spec() {
        let config = LineConfig::new();
        let args = line_args![
            "car{", "nw=", "%d", 36, "model=", "%s %d", "car go ", 3, "decription=", "%s",
            "howdy\ndowdy", "more=", "'''%s'''", "===", "key=", "", "}"
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
    fn plain_key_value() {
        let config = LineConfig::new();
        let args = line_args!["level=", "%s", "info"];
        assert_eq!(line_printf(&config, &args), "level=info");
    }

    #[test]
    fn human_readable_key_value() {
        let mut config = LineConfig::new();
        config.set_human_readable(true);
        let args = line_args!["level=", "%s", "info"];
        assert_eq!(line_printf(&config, &args), "(level) info");
    }
}
