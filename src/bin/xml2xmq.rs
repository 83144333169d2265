//! `xml2xmq` — the XML-to-XMQ direction of the CLI surface.
//!
//! The XML adapter is an external collaborator sitting behind the
//! `Actions` interface; this binary drives the same `Document`/`Printer`
//! pair as `xmq2xml` until that adapter lands, so both directions
//! round-trip through XMQ in the meantime.

use clap::Parser;
use xmq::cli::Args;

fn main() {
    let args = Args::parse();
    std::process::exit(xmq::cli::run(args));
}
