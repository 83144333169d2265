//! `xmq2xml` — parses XMQ from a file or stdin and prints it back out.
//!
//! The XML-emission adapter is an external collaborator, so this binary's
//! core contract is narrow: read XMQ, write XMQ, exit 1 with a stderr
//! diagnostic on a parse error. A full XML renderer hangs off the same
//! `Document`/`Printer` API this binary already drives.

use clap::Parser;
use xmq::cli::Args;

fn main() {
    let args = Args::parse();
    std::process::exit(xmq::cli::run(args));
}
