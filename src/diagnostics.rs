//! Structured diagnostic channel.
//!
//! The engine never prints. Anything worth telling a caller (a repaired
//! configuration value, a skipped slice, an omitted child during breeding) is
//! written as a [`Diagnostic`] to whatever [`DiagnosticSink`] the caller hands
//! in. The caller decides whether to collect, forward to `tracing`, or drop.
//!
//! ```rust
//! use cleave::diagnostics::{DiagnosticLog, DiagnosticSink, Severity};
//!
//! let log = DiagnosticLog::new();
//! log.warn("numParents must be positive", Some("using 50".to_string()));
//!
//! assert_eq!(log.at_level(Severity::Warning).len(), 1);
//! println!("{log}");
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Informational.
    Info,
    /// Something was repaired or skipped; the run continues.
    Warning,
    /// Something failed locally; the run continues without it.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single `{level, summary, detail}` record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Severity of the record.
    pub severity: Severity,
    /// One-line summary.
    pub summary: String,
    /// Optional longer explanation.
    pub detail: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic without detail.
    pub fn new(severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
        }
    }

    /// Attach detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn maybe_detail(self, detail: Option<String>) -> Self {
        match detail {
            Some(d) => self.with_detail(d),
            None => self,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.summary)?;
        if let Some(detail) = &self.detail {
            write!(f, " - {}", detail)?;
        }
        Ok(())
    }
}

/// Destination for diagnostics.
///
/// Sinks are shared across worker threads when slices run in parallel, so
/// implementations must be `Send + Sync`.
pub trait DiagnosticSink: Send + Sync {
    /// Record one diagnostic.
    fn record(&self, diagnostic: Diagnostic);

    /// Record an info-level diagnostic.
    fn info(&self, summary: &str, detail: Option<String>) {
        self.record(Diagnostic::new(Severity::Info, summary).maybe_detail(detail));
    }

    /// Record a warning-level diagnostic.
    fn warn(&self, summary: &str, detail: Option<String>) {
        self.record(Diagnostic::new(Severity::Warning, summary).maybe_detail(detail));
    }

    /// Record an error-level diagnostic.
    fn error(&self, summary: &str, detail: Option<String>) {
        self.record(Diagnostic::new(Severity::Error, summary).maybe_detail(detail));
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Sink that forwards to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, d: Diagnostic) {
        let detail = d.detail.as_deref().unwrap_or("");
        match d.severity {
            Severity::Info => tracing::info!(detail, "{}", d.summary),
            Severity::Warning => tracing::warn!(detail, "{}", d.summary),
            Severity::Error => tracing::error!(detail, "{}", d.summary),
        }
    }
}

/// Sink that collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded diagnostics, in arrival order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Diagnostics of a given severity or higher.
    pub fn at_level(&self, min_severity: Severity) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.severity >= min_severity)
            .cloned()
            .collect()
    }

    /// True when nothing has been recorded.
    pub fn is_clean(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Count diagnostics by severity.
    pub fn counts(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for d in self.entries.lock().iter() {
            *counts.entry(d.severity).or_default() += 1;
        }
        counts
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn record(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}

impl std::fmt::Display for DiagnosticLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_clean() {
            return write!(f, "no diagnostics");
        }

        let counts = self.counts();
        let parts: Vec<String> = [
            (Severity::Error, "errors"),
            (Severity::Warning, "warnings"),
            (Severity::Info, "info"),
        ]
        .iter()
        .filter_map(|(sev, name)| counts.get(sev).map(|c| format!("{} {}", c, name)))
        .collect();
        writeln!(f, "diagnostics: {}", parts.join(", "))?;

        for d in self.entries.lock().iter() {
            writeln!(f, "  {}", d)?;
        }
        Ok(())
    }
}
