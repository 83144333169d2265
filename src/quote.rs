//! Quote engine (component C)
//!
//! The hardest piece of the core: balancing N-quote runs, stripping
//! incidental indentation from multi-line quoted bodies and comments, and
//! the printer-side inverse that decides how many quotes (or whether a
//! compound `( ... )`) a payload needs.

use crate::cursor::Cursor;
use crate::parser::error::{ErrorKind, LocationHints, ParseError};

/// Count the run of consecutive `'` bytes starting at `cursor`'s current
/// position, without consuming anything.
fn peek_quote_run(cursor: &Cursor) -> usize {
    let rest = cursor.remaining();
    let mut n = 0;
    while rest.get(n) == Some(&b'\'') {
        n += 1;
    }
    n
}

/// Read a quoted run starting at `cursor` (which must be positioned on the
/// opening `'`). Returns the unquoted, indentation-stripped body.
pub fn read_quote(cursor: &mut Cursor, hints: &mut LocationHints) -> Result<String, ParseError> {
    let start_pos = cursor.position();
    hints.last_quote_start = Some(start_pos);

    let depth = peek_quote_run(cursor);
    cursor.advance(depth);

    if depth == 2 {
        // Two quotes always denote the empty string.
        return Ok(String::new());
    }

    let body_start = cursor.offset();
    let rest = cursor.remaining();
    let mut i = 0usize;
    let (body_len, consumed) = loop {
        if i >= rest.len() {
            return Err(ParseError::new(start_pos, ErrorKind::QuoteNotClosed, "<eof>")
                .with_hints(hints.clone()));
        }
        if rest[i] == b'\'' {
            let run_start = i;
            let mut j = i;
            while j < rest.len() && rest[j] == b'\'' {
                j += 1;
            }
            let run_len = j - run_start;
            if run_len == depth {
                break (run_start, j);
            } else if run_len > depth {
                hints.last_suspicious_quote_end = Some(start_pos);
                let near = String::from_utf8_lossy(&rest[run_start..j]).into_owned();
                return Err(ParseError::new(
                    start_pos,
                    ErrorKind::QuoteClosedWithTooManyQuotes,
                    near,
                )
                .with_hints(hints.clone()));
            } else {
                i = j;
            }
        } else {
            i += 1;
        }
    };

    let raw = String::from_utf8_lossy(&rest[..body_len]).into_owned();
    cursor.advance(consumed);

    Ok(strip_incidental_indentation(&raw, start_pos.col))
}

/// Strip the leading/trailing newline-adjacent whitespace and the common
/// incidental indentation from a multi-line quoted body.
/// `quote_col` is the source column the opening quote character appeared
/// at, used as the assumed indent of the first line.
pub fn strip_incidental_indentation(body: &str, quote_col: usize) -> String {
    if !body.contains('\n') {
        return body.to_string();
    }

    let (after_leading, did_leading_trim) = strip_leading_blank_line(body);
    let after_trailing = strip_trailing_blank_line(after_leading);

    if after_trailing.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = after_trailing.split('\n').collect();
    let mut common_indent: Option<usize> = None;
    for (idx, line) in lines.iter().enumerate() {
        let actual = line.bytes().take_while(|&b| b == b' ').count();
        let is_blank = actual == line.len();
        if is_blank {
            continue;
        }
        let effective = if idx == 0 && !did_leading_trim { quote_col } else { actual };
        common_indent = Some(match common_indent {
            None => effective,
            Some(c) => c.min(effective),
        });
    }
    let indent = common_indent.unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            let actual = line.bytes().take_while(|&b| b == b' ').count();
            let strip = indent.min(actual);
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// If `body`'s first line (up to the first `\n`) is entirely ASCII spaces,
/// drop it (and the newline). Returns whether the trim happened.
fn strip_leading_blank_line(body: &str) -> (&str, bool) {
    if let Some(idx) = body.find('\n') {
        let first_line = &body[..idx];
        if first_line.bytes().all(|b| b == b' ') {
            return (&body[idx + 1..], true);
        }
    }
    (body, false)
}

/// Symmetric trailing counterpart of [`strip_leading_blank_line`].
fn strip_trailing_blank_line(body: &str) -> &str {
    if let Some(idx) = body.rfind('\n') {
        let last_line = &body[idx + 1..];
        if last_line.bytes().all(|b| b == b' ') {
            return &body[..idx];
        }
    }
    body
}

/// Which control characters must be rendered as numeric entities rather
/// than literal bytes. `compact` output always escapes all three; outside
/// compact mode the individual print-settings flags apply.
#[derive(Debug, Clone, Copy)]
pub struct EscapePolicy {
    pub newlines: bool,
    pub tabs: bool,
    pub carriage_returns: bool,
    pub non_7bit: bool,
}

impl EscapePolicy {
    pub fn for_compact() -> Self {
        EscapePolicy { newlines: true, tabs: true, carriage_returns: true, non_7bit: false }
    }

    pub fn none() -> Self {
        EscapePolicy { newlines: false, tabs: false, carriage_returns: false, non_7bit: false }
    }

    pub(crate) fn must_escape(&self, c: char) -> bool {
        match c {
            '\n' => self.newlines,
            '\t' => self.tabs,
            '\r' => self.carriage_returns,
            c if (c as u32) >= 0x7F => self.non_7bit,
            _ => false,
        }
    }
}

/// One piece of a rendered value: either a quoted run or an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum QuotePart {
    Quoted { depth: usize, body: String },
    Entity(String),
}

/// The full render plan for a payload: either a single quoted run, or a
/// compound sequence of quoted runs and entities.
#[derive(Debug, Clone, PartialEq)]
pub enum QuotePlan {
    Simple(QuotePart),
    Compound(Vec<QuotePart>),
}

/// The minimal depth `N >= 1` such that no run of exactly `N` consecutive
/// `'` occurs in `payload`. Depth 2 is reserved for the empty string and
/// is always skipped for non-empty payloads.
pub fn necessary_depth(payload: &str) -> usize {
    if payload.is_empty() {
        return 2;
    }
    let mut n = 1;
    loop {
        if n != 2 && !has_run_of_exactly(payload, n) {
            return n;
        }
        n += 1;
    }
}

fn has_run_of_exactly(payload: &str, n: usize) -> bool {
    let bytes = payload.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'\'' {
                i += 1;
            }
            if i - start == n {
                return true;
            }
        } else {
            i += 1;
        }
    }
    false
}

/// Decide how to render `payload` as a value: a single quoted run where
/// possible, or a compound of quoted runs and per-character entities.
///
/// Three independent conditions force a compound: (1) the payload mixes a
/// quoted run with a control-character entity under `policy`/`compact`;
/// (2) `is_attribute` and the payload has leading or trailing whitespace;
/// (3) the payload starts or ends with one or more `'` characters —
/// forced by the grammar: a quote delimiter is always byte-adjacent to the
/// payload, so a boundary `'` would merge into the delimiter's run and
/// change its apparent depth. Boundary quote characters are always peeled
/// off into individual entities (one `&#39;` per character).
pub fn plan_quote(payload: &str, compact: bool, is_attribute: bool) -> QuotePlan {
    let policy = if compact { EscapePolicy::for_compact() } else { EscapePolicy::none() };

    let needs_boundary_peel = payload.starts_with('\'') || payload.ends_with('\'');
    let needs_control_split = payload.chars().any(|c| policy.must_escape(c));
    let needs_whitespace_compound = is_attribute
        && (payload.starts_with(' ')
            || payload.ends_with(' ')
            || payload.starts_with('\t')
            || payload.ends_with('\t'));

    if !needs_boundary_peel && !needs_control_split && !needs_whitespace_compound {
        let depth = necessary_depth(payload);
        return QuotePlan::Simple(QuotePart::Quoted { depth, body: payload.to_string() });
    }

    let mut parts = Vec::new();
    let mut text_run = String::new();
    let flush = |text_run: &mut String, parts: &mut Vec<QuotePart>| {
        if text_run.is_empty() {
            return;
        }
        push_text_chunk_as_parts(text_run, parts);
        text_run.clear();
    };

    for c in payload.chars() {
        if policy.must_escape(c) {
            flush(&mut text_run, &mut parts);
            parts.push(QuotePart::Entity(numeric_entity(c)));
        } else {
            text_run.push(c);
        }
    }
    flush(&mut text_run, &mut parts);

    if parts.is_empty() {
        // Payload was entirely boundary apostrophes, e.g. "'".
        return QuotePlan::Compound(vec![]);
    }

    QuotePlan::Compound(parts)
}

/// Split one maximal non-control-char chunk into entity parts for its
/// leading/trailing run of `'` (which can never be the edge of a quoted
/// run) and a single quoted part for the safe middle, if any.
fn push_text_chunk_as_parts(chunk: &str, parts: &mut Vec<QuotePart>) {
    let mut s = chunk;
    while let Some(rest) = s.strip_prefix('\'') {
        parts.push(QuotePart::Entity(numeric_entity('\'')));
        s = rest;
    }
    let mut trailing = Vec::new();
    while let Some(rest) = s.strip_suffix('\'') {
        trailing.push(QuotePart::Entity(numeric_entity('\'')));
        s = rest;
    }
    if !s.is_empty() {
        let depth = necessary_depth(s);
        parts.push(QuotePart::Quoted { depth, body: s.to_string() });
    }
    parts.extend(trailing);
}

/// Render `c` as a numeric XML entity name (without `&`/`;`), e.g. `#10`
/// for newline.
pub fn numeric_entity(c: char) -> String {
    format!("#{}", c as u32)
}

/// Re-indent a multi-line body for emission at render column `col` (1
/// indexed), using the leading/trailing-blank-line convention so the
/// parser's incidental-indentation stripping recovers it byte for byte
/// regardless of `col`. `pad_char` is the "deliberate space" character the
/// `explicit_space` print-setting overrides; it defaults to `' '` but a
/// custom value still round-trips since the parser's indentation stripping
/// only counts leading ASCII spaces — callers that pick a non-space
/// `pad_char` are opting out of that round-trip in exchange for diffable
/// output. Single-line bodies are returned unchanged.
pub fn reindent_for_emit(body: &str, col: usize, pad_char: char) -> String {
    if !body.contains('\n') {
        return body.to_string();
    }
    let pad: String = std::iter::repeat(pad_char).take(col.saturating_sub(1)).collect();
    let mut out = String::from("\n");
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(line);
    }
    out.push('\n');
    out.push_str(&pad);
    out
}

/// Render a [`QuotePart::Quoted`] as literal XMQ source: `N` single-quotes,
/// the body (re-indented if multi-line), `N` single-quotes.
pub fn render_quoted(depth: usize, body: &str, col: usize, pad_char: char) -> String {
    if body.is_empty() {
        return "''".to_string();
    }
    let quotes = "'".repeat(depth);
    format!("{}{}{}", quotes, reindent_for_emit(body, col, pad_char), quotes)
}

// --- Comments -------------------------------------------------------------
//
// `//text\n` is a one-line comment. `/*...*/` uses the same run-counting
// mechanism as quotes but with `/` instead of `'`: a depth-D block comment
// opens with D slashes followed by `*` and closes with `*` followed by D
// slashes (so `/*`/`*/` is depth 1, `////*`/`*////` is depth 4). Incidental
// indentation stripping applies to multi-line bodies exactly as for quotes.
// A close immediately followed by a same-depth open is a continuation of
// the same logical comment.

/// Read a `//...` single-line comment body, assuming `cursor` is positioned
/// on the first `/`. Consumes through (but not including) the newline.
pub fn read_line_comment(cursor: &mut Cursor) -> String {
    cursor.advance(2); // the leading "//"
    let rest = cursor.remaining();
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    let text = String::from_utf8_lossy(&rest[..end]).into_owned();
    cursor.advance(end);
    text.trim().to_string()
}

fn peek_slash_run(cursor: &Cursor) -> usize {
    let rest = cursor.remaining();
    let mut n = 0;
    while rest.get(n) == Some(&b'/') {
        n += 1;
    }
    n
}

/// Read a `/*...*/`-style block comment (any depth), assuming `cursor` is
/// positioned on the opening slash run. Returns the concatenated,
/// indentation-stripped body of the comment and any same-depth
/// continuations that immediately follow it.
pub fn read_block_comment(
    cursor: &mut Cursor,
    hints: &mut LocationHints,
) -> Result<String, ParseError> {
    let mut segments = Vec::new();
    loop {
        let start_pos = cursor.position();
        let depth = peek_slash_run(cursor);
        cursor.advance(depth); // the opening slashes
        cursor.advance(1); // the '*'

        let body_start_col = cursor.position().col;
        let rest = cursor.remaining();
        let mut i = 0usize;
        let consumed = loop {
            if i >= rest.len() {
                return Err(ParseError::new(start_pos, ErrorKind::CommentNotClosed, "<eof>")
                    .with_hints(hints.clone()));
            }
            if rest[i] == b'*' {
                let mut j = i + 1;
                let mut slashes = 0;
                while rest.get(j) == Some(&b'/') {
                    slashes += 1;
                    j += 1;
                }
                if slashes == depth {
                    let raw = String::from_utf8_lossy(&rest[..i]).into_owned();
                    segments.push(strip_incidental_indentation(&raw, body_start_col));
                    break j;
                } else if slashes > depth {
                    return Err(ParseError::new(
                        start_pos,
                        ErrorKind::CommentClosedWithTooManySlashes,
                        String::from_utf8_lossy(&rest[i..j]).into_owned(),
                    )
                    .with_hints(hints.clone()));
                } else {
                    i += 1;
                }
            } else {
                i += 1;
            }
        };
        cursor.advance(consumed);

        // A close immediately followed by a same-depth open continues the
        // same logical comment.
        let next_depth = peek_slash_run(cursor);
        if next_depth == depth && cursor.peek_at(depth) == b'*' {
            continue;
        }
        break;
    }
    Ok(segments.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(src: &str) -> String {
        let mut cursor = Cursor::new(src.as_bytes());
        let mut hints = LocationHints::default();
        read_quote(&mut cursor, &mut hints).unwrap()
    }

    #[test]
    fn empty_quote() {
        assert_eq!(read("''"), "");
    }

    #[test]
    fn triple_quoted_apostrophe_content() {
        assert_eq!(read("'''There's a man.'''"), "There's a man.");
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let mut cursor = Cursor::new(b"'abc");
        let mut hints = LocationHints::default();
        let err = read_quote(&mut cursor, &mut hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuoteNotClosed);
    }

    #[test]
    fn too_many_closing_quotes_is_an_error() {
        let mut cursor = Cursor::new(b"'abc''");
        let mut hints = LocationHints::default();
        let err = read_quote(&mut cursor, &mut hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuoteClosedWithTooManyQuotes);
    }

    #[test]
    fn only_spaces_and_one_newline_trims_to_empty() {
        let mut cursor = Cursor::new("'  \n  '".as_bytes());
        let mut hints = LocationHints::default();
        assert_eq!(read_quote(&mut cursor, &mut hints).unwrap(), "");
    }

    #[test]
    fn incidental_indentation_example_from_spec() {
        // alfa = 'hello\n world' with the opening quote at column 8.
        assert_eq!(strip_incidental_indentation("hello\n world", 8), "hello\nworld");
    }

    #[test]
    fn incidental_stripping_is_idempotent() {
        let once = strip_incidental_indentation("  a\n  b\n  c", 3);
        let twice = strip_incidental_indentation(&once, 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn necessary_depth_skips_two() {
        assert_eq!(necessary_depth("plain text"), 1);
        assert_eq!(necessary_depth("it's"), 3); // single isolated apostrophe
        assert_eq!(necessary_depth(""), 2);
    }

    #[test]
    fn plan_quote_simple_for_ordinary_text() {
        let plan = plan_quote("car go  3", false, false);
        assert_eq!(
            plan,
            QuotePlan::Simple(QuotePart::Quoted { depth: 1, body: "car go  3".to_string() })
        );
    }

    #[test]
    fn plan_quote_compound_for_compact_mixed_control_chars() {
        let plan = plan_quote("howdy\ndowdy", true, false);
        assert_eq!(
            plan,
            QuotePlan::Compound(vec![
                QuotePart::Quoted { depth: 1, body: "howdy".to_string() },
                QuotePart::Entity("#10".to_string()),
                QuotePart::Quoted { depth: 1, body: "dowdy".to_string() },
            ])
        );
    }

    #[test]
    fn plan_quote_peels_boundary_apostrophes() {
        // Literal value of the format pattern "'''%s'''" substituted with "===".
        let payload = "'''===='''".replace("====", "===");
        let plan = plan_quote(&payload, false, false);
        assert_eq!(
            plan,
            QuotePlan::Compound(vec![
                QuotePart::Entity("#39".to_string()),
                QuotePart::Entity("#39".to_string()),
                QuotePart::Entity("#39".to_string()),
                QuotePart::Quoted { depth: 1, body: "===".to_string() },
                QuotePart::Entity("#39".to_string()),
                QuotePart::Entity("#39".to_string()),
                QuotePart::Entity("#39".to_string()),
            ])
        );
    }

    #[test]
    fn line_comment_is_trimmed() {
        let mut cursor = Cursor::new("// hello world  \nrest".as_bytes());
        assert_eq!(read_line_comment(&mut cursor), "hello world");
    }

    #[test]
    fn block_comment_basic_depth_one() {
        let mut cursor = Cursor::new("/* hello */".as_bytes());
        let mut hints = LocationHints::default();
        assert_eq!(read_block_comment(&mut cursor, &mut hints).unwrap(), " hello ");
    }

    #[test]
    fn block_comment_higher_depth() {
        let mut cursor = Cursor::new("////* hello *////".as_bytes());
        let mut hints = LocationHints::default();
        assert_eq!(read_block_comment(&mut cursor, &mut hints).unwrap(), " hello ");
    }

    #[test]
    fn block_comment_continuation_joins_segments() {
        let mut cursor = Cursor::new("/* a *//* b */".as_bytes());
        let mut hints = LocationHints::default();
        assert_eq!(read_block_comment(&mut cursor, &mut hints).unwrap(), " a \n b ");
    }

    #[test]
    fn block_comment_unterminated_is_comment_not_closed() {
        let mut cursor = Cursor::new("/* hello".as_bytes());
        let mut hints = LocationHints::default();
        let err = read_block_comment(&mut cursor, &mut hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CommentNotClosed);
    }

    #[test]
    fn block_comment_closed_with_too_many_slashes() {
        let mut cursor = Cursor::new("/* hello *//".as_bytes());
        let mut hints = LocationHints::default();
        let err = read_block_comment(&mut cursor, &mut hints).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CommentClosedWithTooManySlashes);
    }

    #[test]
    fn render_quoted_roundtrips_multiline_body_at_any_column() {
        for col in [1usize, 4, 8, 20] {
            let body = "line one\nline two\nline three";
            let rendered = render_quoted(1, body, col, ' ');
            let full = format!("{}{}", " ".repeat(col.saturating_sub(1)), rendered);
            let mut cursor = Cursor::new(full.as_bytes());
            cursor.advance(col.saturating_sub(1));
            let mut hints = LocationHints::default();
            assert_eq!(read_quote(&mut cursor, &mut hints).unwrap(), body);
        }
    }
}
