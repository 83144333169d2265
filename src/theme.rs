//! Color themes (component G)
//!
//! Token categories map to `(pre, post)` byte strings; the same table
//! serves `terminal` (written via `termcolor`'s ANSI generation),
//! `html`, and `tex` render targets; `plain` uses the empty theme.
//! `DARK_BG`/`LIGHT_BG` map a closed set of 13 named anchor colors onto
//! the token categories a theme can color.

use std::collections::HashMap;
use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::error::XmqError;
use crate::printer::RenderTarget;

/// The closed set of lexical categories a theme can color, per spec §4.G:
/// element and attribute positions get distinct categories even where they
/// render identically today (`element-value-quote` vs `attr-value-quote`),
/// because the original keeps them on separate anchors (`colors.h`'s
/// `XMQ_COLOR_EKV`/`XMQ_COLOR_AKV`) and a custom theme may want to tell
/// them apart even when the built-in ones don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Whitespace,
    UnicodeWhitespace,
    IndentationWhitespace,
    Equals,
    BraceOpen,
    BraceClose,
    ParenOpen,
    ParenClose,
    Quote,
    Entity,
    Comment,
    CommentContinuation,
    NamespaceColon,
    ElementNamespace,
    ElementName,
    ElementKey,
    ElementValueText,
    ElementValueQuote,
    ElementValueEntity,
    ElementValueCompoundQuote,
    ElementValueCompoundEntity,
    AttrNamespace,
    AttrKey,
    AttrValueText,
    AttrValueQuote,
    AttrValueEntity,
    AttrValueCompoundQuote,
    AttrValueCompoundEntity,
    NsDeclaration,
    XslOverride,
}

/// A single anchor color from the 13-anchor palette, stored as 24-bit RGB
/// so it can be converted into any render target's native color syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A resolved theme: a `(pre, post)` byte-string pair per category, ready
/// to wrap rendered tokens regardless of render target.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    spans: HashMap<TokenCategory, (String, String)>,
}

impl Theme {
    pub fn plain() -> Self {
        Theme { spans: HashMap::new() }
    }

    pub fn wrap(&self, category: TokenCategory, text: &str) -> String {
        match self.spans.get(&category) {
            Some((pre, post)) => format!("{pre}{text}{post}"),
            None => text.to_string(),
        }
    }

    fn from_anchors(anchors: &[(TokenCategory, Rgb)], target: RenderTarget) -> Self {
        let mut spans = HashMap::new();
        for &(category, rgb) in anchors {
            spans.insert(category, render_span(rgb, target));
        }
        Theme { spans }
    }
}

/// 13 named anchor colors the built-in themes are composed from.
mod anchors {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const DARK_GRAY: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const LIGHT_GRAY: Rgb = Rgb(0xc0, 0xc0, 0xc0);
    pub const RED: Rgb = Rgb(0xc0, 0x00, 0x00);
    pub const DARK_RED: Rgb = Rgb(0x80, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb(0x00, 0xa0, 0x00);
    pub const DARK_GREEN: Rgb = Rgb(0x00, 0x60, 0x00);
    pub const YELLOW: Rgb = Rgb(0xc0, 0xa0, 0x00);
    pub const BLUE: Rgb = Rgb(0x20, 0x60, 0xd0);
    pub const DARK_BLUE: Rgb = Rgb(0x10, 0x30, 0x80);
    pub const MAGENTA: Rgb = Rgb(0xa0, 0x20, 0xa0);
    pub const CYAN: Rgb = Rgb(0x00, 0x90, 0x90);
    pub const ORANGE: Rgb = Rgb(0xd0, 0x70, 0x00);
}

fn dark_bg_anchors() -> Vec<(TokenCategory, Rgb)> {
    use anchors::*;
    use TokenCategory::*;
    vec![
        (Whitespace, DARK_GRAY),
        (UnicodeWhitespace, RED),
        (IndentationWhitespace, DARK_GRAY),
        (Equals, LIGHT_GRAY),
        (BraceOpen, LIGHT_GRAY),
        (BraceClose, LIGHT_GRAY),
        (ParenOpen, LIGHT_GRAY),
        (ParenClose, LIGHT_GRAY),
        (Quote, GREEN),
        (Entity, ORANGE),
        (Comment, DARK_GRAY),
        (CommentContinuation, DARK_GRAY),
        (NamespaceColon, MAGENTA),
        (ElementNamespace, MAGENTA),
        (ElementName, BLUE),
        (ElementKey, BLUE),
        (ElementValueText, WHITE),
        (ElementValueQuote, GREEN),
        (ElementValueEntity, ORANGE),
        (ElementValueCompoundQuote, GREEN),
        (ElementValueCompoundEntity, ORANGE),
        (AttrNamespace, MAGENTA),
        (AttrKey, CYAN),
        (AttrValueText, WHITE),
        (AttrValueQuote, BLUE),
        (AttrValueEntity, ORANGE),
        (AttrValueCompoundQuote, BLUE),
        (AttrValueCompoundEntity, ORANGE),
        (NsDeclaration, MAGENTA),
        (XslOverride, YELLOW),
    ]
}

fn light_bg_anchors() -> Vec<(TokenCategory, Rgb)> {
    use anchors::*;
    use TokenCategory::*;
    vec![
        (Whitespace, LIGHT_GRAY),
        (UnicodeWhitespace, DARK_RED),
        (IndentationWhitespace, LIGHT_GRAY),
        (Equals, DARK_GRAY),
        (BraceOpen, DARK_GRAY),
        (BraceClose, DARK_GRAY),
        (ParenOpen, DARK_GRAY),
        (ParenClose, DARK_GRAY),
        (Quote, DARK_GREEN),
        (Entity, ORANGE),
        (Comment, LIGHT_GRAY),
        (CommentContinuation, LIGHT_GRAY),
        (NamespaceColon, MAGENTA),
        (ElementNamespace, MAGENTA),
        (ElementName, DARK_BLUE),
        (ElementKey, DARK_BLUE),
        (ElementValueText, Rgb(0x20, 0x20, 0x20)),
        (ElementValueQuote, DARK_GREEN),
        (ElementValueEntity, ORANGE),
        (ElementValueCompoundQuote, DARK_GREEN),
        (ElementValueCompoundEntity, ORANGE),
        (AttrNamespace, MAGENTA),
        (AttrKey, CYAN),
        (AttrValueText, Rgb(0x20, 0x20, 0x20)),
        (AttrValueQuote, DARK_BLUE),
        (AttrValueEntity, ORANGE),
        (AttrValueCompoundQuote, DARK_BLUE),
        (AttrValueCompoundEntity, ORANGE),
        (NsDeclaration, MAGENTA),
        (XslOverride, YELLOW),
    ]
}

pub fn dark_bg(target: RenderTarget) -> Theme {
    Theme::from_anchors(&dark_bg_anchors(), target)
}

pub fn light_bg(target: RenderTarget) -> Theme {
    Theme::from_anchors(&light_bg_anchors(), target)
}

/// Resolve the theme named by `settings.theme_name` for `settings.render_to`.
/// `None` or `"dark"` selects [`dark_bg`]; `"light"` selects [`light_bg`];
/// anything else is a path to a custom JSON theme.
pub fn resolve_theme(settings: &crate::printer::PrintSettings) -> Result<Theme, XmqError> {
    if !settings.use_color || settings.render_raw {
        return Ok(Theme::plain());
    }
    match settings.theme_name.as_deref() {
        None | Some("dark") => Ok(dark_bg(settings.render_to)),
        Some("light") => Ok(light_bg(settings.render_to)),
        Some(path) => load_custom(path, settings.render_to),
    }
}

/// A custom theme file: a flat JSON object mapping category names (as in
/// [`TokenCategory`]'s `serde` rename, snake_case) to `[r, g, b]` triples.
#[derive(serde::Deserialize)]
struct CustomThemeFile {
    #[serde(flatten)]
    colors: HashMap<String, [u8; 3]>,
}

fn category_from_name(name: &str) -> Option<TokenCategory> {
    use TokenCategory::*;
    Some(match name {
        "whitespace" => Whitespace,
        "unicode_whitespace" => UnicodeWhitespace,
        "indentation_whitespace" => IndentationWhitespace,
        "equals" => Equals,
        "brace_open" => BraceOpen,
        "brace_close" => BraceClose,
        "paren_open" => ParenOpen,
        "paren_close" => ParenClose,
        "quote" => Quote,
        "entity" => Entity,
        "comment" => Comment,
        "comment_continuation" => CommentContinuation,
        "namespace_colon" => NamespaceColon,
        "element_ns" => ElementNamespace,
        "element_name" => ElementName,
        "element_key" => ElementKey,
        "element_value_text" => ElementValueText,
        "element_value_quote" => ElementValueQuote,
        "element_value_entity" => ElementValueEntity,
        "element_value_compound_quote" => ElementValueCompoundQuote,
        "element_value_compound_entity" => ElementValueCompoundEntity,
        "attr_ns" => AttrNamespace,
        "attr_key" => AttrKey,
        "attr_value_text" => AttrValueText,
        "attr_value_quote" => AttrValueQuote,
        "attr_value_entity" => AttrValueEntity,
        "attr_value_compound_quote" => AttrValueCompoundQuote,
        "attr_value_compound_entity" => AttrValueCompoundEntity,
        "ns_declaration" => NsDeclaration,
        "xsl_override" => XslOverride,
        _ => return None,
    })
}

pub fn load_custom(path: &str, target: RenderTarget) -> Result<Theme, XmqError> {
    let raw = std::fs::read_to_string(path).map_err(|e| XmqError::ThemeIo { path: path.to_string(), source: e })?;
    let file: CustomThemeFile = serde_json::from_str(&raw)
        .map_err(|e| XmqError::ThemeParse { path: path.to_string(), source: e })?;
    let mut anchors = Vec::new();
    for (name, [r, g, b]) in file.colors {
        if let Some(category) = category_from_name(&name) {
            anchors.push((category, Rgb(r, g, b)));
        }
    }
    Ok(Theme::from_anchors(&anchors, target))
}

fn render_span(rgb: Rgb, target: RenderTarget) -> (String, String) {
    match target {
        RenderTarget::Plain => (String::new(), String::new()),
        RenderTarget::Terminal => terminal_span(rgb),
        RenderTarget::Html => (html_color_span(rgb), "</span>".to_string()),
        RenderTarget::Tex => tex_color_span(rgb),
    }
}

/// Generate a 24-bit ANSI color span via `termcolor`, by writing a no-op
/// colored byte sequence into an in-memory buffer and reusing its escape
/// bytes as the theme's literal `pre`/`post` strings — so the same theme
/// table drives `html`/`tex` rendering too without ever touching a real
/// terminal.
fn terminal_span(rgb: Rgb) -> (String, String) {
    let mut buf = Buffer::ansi();
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Rgb(rgb.0, rgb.1, rgb.2)));
    let _ = buf.set_color(&spec);
    let pre = String::from_utf8_lossy(buf.as_slice()).into_owned();

    let mut reset_buf = Buffer::ansi();
    let _ = reset_buf.reset();
    let post = String::from_utf8_lossy(reset_buf.as_slice()).into_owned();

    (pre, post)
}

/// `<span style="color:#rrggbb">`. Returns the formatted span directly
/// rather than an out-parameter plus a success flag.
fn html_color_span(rgb: Rgb) -> String {
    format!("<span style=\"color:#{:02x}{:02x}{:02x}\">", rgb.0, rgb.1, rgb.2)
}

fn tex_color_span(rgb: Rgb) -> (String, String) {
    let r = rgb.0 as f32 / 255.0;
    let g = rgb.1 as f32 / 255.0;
    let b = rgb.2 as f32 / 255.0;
    (
        format!("\\textcolor[rgb]{{{r:.3},{g:.3},{b:.3}}}{{"),
        "}".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_wraps_with_nothing() {
        let theme = Theme::plain();
        assert_eq!(theme.wrap(TokenCategory::ElementName, "car"), "car");
    }

    #[test]
    fn html_span_uses_lowercase_hex() {
        let span = html_color_span(Rgb(0x20, 0x60, 0xd0));
        assert_eq!(span, "<span style=\"color:#2060d0\">");
    }

    #[test]
    fn dark_bg_covers_every_category() {
        let theme = dark_bg(RenderTarget::Html);
        for category in [
            TokenCategory::ElementName,
            TokenCategory::ElementKey,
            TokenCategory::ElementValueText,
            TokenCategory::ElementValueQuote,
            TokenCategory::ElementValueEntity,
            TokenCategory::ElementValueCompoundQuote,
            TokenCategory::ElementValueCompoundEntity,
            TokenCategory::AttrKey,
            TokenCategory::AttrValueText,
            TokenCategory::AttrValueQuote,
            TokenCategory::AttrValueEntity,
            TokenCategory::AttrValueCompoundQuote,
            TokenCategory::AttrValueCompoundEntity,
            TokenCategory::Quote,
            TokenCategory::Comment,
            TokenCategory::Entity,
            TokenCategory::NsDeclaration,
            TokenCategory::XslOverride,
        ] {
            assert_ne!(theme.wrap(category, "x"), "x");
        }
    }

    #[test]
    fn element_value_quote_and_attr_value_quote_use_distinct_anchors() {
        // Per `colors.h`'s XMQ_COLOR_EKV != XMQ_COLOR_AKV split, an
        // element's key-value text and an attribute's value text must not
        // collapse onto the same anchor.
        let theme = dark_bg(RenderTarget::Html);
        assert_ne!(
            theme.wrap(TokenCategory::ElementValueQuote, "x"),
            theme.wrap(TokenCategory::AttrValueQuote, "x")
        );
    }

    #[test]
    fn custom_theme_resolves_new_category_names() {
        assert_eq!(category_from_name("element_value_quote"), Some(TokenCategory::ElementValueQuote));
        assert_eq!(category_from_name("attr_value_compound_entity"), Some(TokenCategory::AttrValueCompoundEntity));
        assert_eq!(category_from_name("not_a_category"), None);
    }
}
