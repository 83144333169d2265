//! Printer configuration.
//!
//! A plain settings struct rather than a builder: these fields have no
//! validation that would justify one, so a `Default` impl is enough.

/// Where rendered output is headed — each target shares the same quote/
/// indentation engine but escapes control characters and color
/// differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Plain,
    Terminal,
    Html,
    Tex,
}

/// The print-settings record, plus the `force_quotes`/
/// `indentation_space`/`explicit_space` fields.
#[derive(Debug, Clone)]
pub struct PrintSettings {
    /// Number of [`Self::indentation_space`] characters per nesting level.
    pub add_indent: usize,
    /// Single-line, whitespace-minimal output; forces compound-splitting
    /// of any value containing a control character.
    pub compact: bool,
    pub escape_newlines: bool,
    pub escape_tabs: bool,
    pub escape_non_7bit: bool,
    pub render_to: RenderTarget,
    /// Skip theme coloring/markup even when `render_to` would normally add
    /// it, emitting the bare textual form.
    pub render_raw: bool,
    pub use_color: bool,
    /// `None` selects the target's default theme; `Some("dark" | "light")`
    /// picks a built-in theme; any other name is resolved as a path to a
    /// custom JSON theme (`theme::load_custom`).
    pub theme_name: Option<String>,
    /// Omit a leading declaration line (used by `xml2xmq` when the source
    /// document had an XML declaration with nothing worth preserving).
    pub omit_decl: bool,
    /// Always wrap a leaf value in quotes, even when an unquoted `Text`
    /// token would round-trip unambiguously.
    pub force_quotes: bool,
    pub indentation_space: char,
    pub explicit_space: char,
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            add_indent: 4,
            compact: false,
            escape_newlines: false,
            escape_tabs: false,
            escape_non_7bit: false,
            render_to: RenderTarget::Plain,
            render_raw: false,
            use_color: false,
            theme_name: None,
            omit_decl: false,
            force_quotes: false,
            indentation_space: ' ',
            explicit_space: ' ',
        }
    }
}

impl PrintSettings {
    pub fn compact() -> Self {
        PrintSettings { compact: true, add_indent: 0, ..Default::default() }
    }

    pub fn escape_policy(&self) -> crate::quote::EscapePolicy {
        if self.compact {
            crate::quote::EscapePolicy::for_compact()
        } else {
            crate::quote::EscapePolicy {
                newlines: self.escape_newlines,
                tabs: self.escape_tabs,
                carriage_returns: false,
                non_7bit: self.escape_non_7bit,
            }
        }
    }
}
