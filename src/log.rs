//! Diagnostic logging context
//!
//! trace/debug/verbose/error toggles live on a context object threaded
//! through calls rather than as mutable process-wide flags. No `log`/
//! `tracing` dependency is pulled in; this stays `eprintln!`-based,
//! matching plain CLI diagnostics.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Verbose,
    Debug,
    Trace,
}

/// Threaded through parse/print calls so diagnostics can be emitted
/// without a global mutable flag. `filter` narrows `Trace`/`Debug` output
/// to a substring match against the emitting component's name.
#[derive(Debug, Clone)]
pub struct LogContext {
    level: Level,
    filter: Option<String>,
}

impl Default for LogContext {
    fn default() -> Self {
        LogContext { level: Level::Warn, filter: None }
    }
}

impl LogContext {
    pub fn new(level: Level) -> Self {
        LogContext { level, filter: None }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn enabled(&self, level: Level, component: &str) -> bool {
        if level > self.level {
            return false;
        }
        match &self.filter {
            Some(f) => component.contains(f.as_str()),
            None => true,
        }
    }

    pub fn log(&self, level: Level, component: &str, args: fmt::Arguments<'_>) {
        if self.enabled(level, component) {
            eprintln!("{component}: {args}");
        }
    }

    pub fn error(&self, component: &str, args: fmt::Arguments<'_>) {
        self.log(Level::Error, component, args);
    }

    pub fn trace(&self, component: &str, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, component, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_gates_output() {
        let ctx = LogContext::new(Level::Warn);
        assert!(ctx.enabled(Level::Error, "parser"));
        assert!(ctx.enabled(Level::Warn, "parser"));
        assert!(!ctx.enabled(Level::Debug, "parser"));
    }

    #[test]
    fn filter_restricts_to_matching_component() {
        let ctx = LogContext::new(Level::Trace).with_filter("quote");
        assert!(ctx.enabled(Level::Trace, "quote::plan"));
        assert!(!ctx.enabled(Level::Trace, "printer::mod"));
    }
}
