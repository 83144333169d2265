//! Shared driver for the `xmq2xml`/`xml2xmq` binaries, split out of the
//! binaries themselves so each stays a thin wrapper around a shared API
//! layer.
//!
//! The core contract is deliberately narrow: a file argument or stdin in,
//! stdout out, exit code 1 with a stderr diagnostic on any parse error.
//! Flags beyond that (render target, theme, compact) are conveniences this
//! crate's own binaries add; they are not part of the wire contract other
//! tools must honor.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;

use crate::document::Document;
use crate::log::{Level, LogContext};
use crate::printer::{PrintSettings, Printer, RenderTarget};

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Input file; reads stdin when omitted.
    pub path: Option<PathBuf>,

    /// Element name to wrap multiple top-level elements in.
    #[arg(long, short = 'r', default_value = "root")]
    pub root: String,

    /// Single-line, whitespace-minimal output.
    #[arg(long)]
    pub compact: bool,

    /// Spaces per indentation level.
    #[arg(long, default_value_t = 4)]
    pub indent: usize,

    /// Render target for escaping/coloring.
    #[arg(long, value_enum, default_value = "plain")]
    pub render_to: RenderTargetArg,

    /// Enable theme color emission.
    #[arg(long)]
    pub color: bool,

    /// `dark` or `light`, or a path to a custom JSON theme.
    #[arg(long)]
    pub theme: Option<String>,

    /// Emit verbose diagnostics to stderr.
    #[arg(long)]
    pub verbose: bool,

    /// Emit debug diagnostics to stderr (implies `--verbose`).
    #[arg(long)]
    pub debug: bool,

    /// Emit trace diagnostics to stderr (implies `--debug`).
    #[arg(long)]
    pub trace: bool,

    /// Restrict `--debug`/`--trace` output to components whose name
    /// contains this substring.
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum RenderTargetArg {
    Plain,
    Terminal,
    Html,
    Tex,
}

impl From<RenderTargetArg> for RenderTarget {
    fn from(value: RenderTargetArg) -> Self {
        match value {
            RenderTargetArg::Plain => RenderTarget::Plain,
            RenderTargetArg::Terminal => RenderTarget::Terminal,
            RenderTargetArg::Html => RenderTarget::Html,
            RenderTargetArg::Tex => RenderTarget::Tex,
        }
    }
}

impl Args {
    fn print_settings(&self) -> PrintSettings {
        PrintSettings {
            add_indent: self.indent,
            compact: self.compact,
            render_to: self.render_to.into(),
            use_color: self.color,
            theme_name: self.theme.clone(),
            ..PrintSettings::default()
        }
    }

    fn read_input(&self) -> io::Result<Vec<u8>> {
        match &self.path {
            Some(path) => std::fs::read(path),
            None => {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }

    fn log_context(&self) -> LogContext {
        let level = if self.trace {
            Level::Trace
        } else if self.debug {
            Level::Debug
        } else if self.verbose {
            Level::Verbose
        } else {
            Level::Warn
        };
        let mut ctx = LogContext::new(level);
        if let Some(filter) = &self.log_filter {
            ctx = ctx.with_filter(filter.clone());
        }
        ctx
    }
}

/// Parse XMQ from the argument file/stdin and print it back out (round-trip
/// smoke-test entry point for `xmq2xml`'s XMQ-reading half and `xml2xmq`'s
/// XMQ-writing half — the XML-side adapters are external collaborators, so
/// both binaries share this XMQ-to-XMQ path until an adapter is wired in).
pub fn run(args: Args) -> i32 {
    let src = match args.read_input() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let log = args.log_context();
    let doc = Document::parse_bytes_with_log(&src, Some(&args.root), &log);
    let Some(tree) = doc.tree() else {
        let err = doc.error().expect("tree absent implies error present");
        eprintln!("{err}");
        return 1;
    };

    let printer = match Printer::new(args.print_settings()) {
        Ok(p) => p.with_log(log),
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let rendered = printer.print(tree);
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    if writeln!(lock, "{rendered}").is_err() {
        return 1;
    }
    0
}
