//! Diagnostic collection for one compile call.
//!
//! The engine reports problems as events while it runs; the reporter is
//! the collector handed to it for the duration of a single compile. It
//! maps the engine's check level onto the protocol's two severities,
//! appends one [`Diagnostic`] per qualifying event in report order, and
//! keeps running counts the engine's reporting interface expects. No
//! deduplication, no filtering beyond the level cutoff.

use crate::daemon::protocol::{Diagnostic, Severity};

/// Check level attached to an engine event.
///
/// Anything below `Warning` is discarded entirely: not counted, not
/// recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLevel {
    Error,
    Warning,
    Off,
}

/// A problem as the engine describes it.
#[derive(Debug, Clone)]
pub struct EngineDiagnostic {
    pub description: String,
    pub location: Option<SourceLocation>,
}

impl EngineDiagnostic {
    /// Event with no source location.
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), location: None }
    }

    /// Event anchored to a position in a source file.
    pub fn at(
        description: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            description: description.into(),
            location: Some(SourceLocation {
                file: file.into(),
                line: Some(line),
                column: Some(column),
            }),
        }
    }

    /// Event tied to a file as a whole, with no position.
    pub fn in_file(description: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: Some(SourceLocation { file: file.into(), line: None, column: None }),
        }
    }
}

/// Where an event occurred; position is optional within the file.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// Accumulates engine events into the response-bound diagnostic list.
///
/// Owned by the compiler adapter, one fresh instance per compile call.
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    errors: Vec<EngineDiagnostic>,
    warnings: Vec<EngineDiagnostic>,
    diagnostics: Vec<Diagnostic>,
    typed_percent: f64,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one engine event.
    pub fn report(&mut self, level: CheckLevel, event: EngineDiagnostic) {
        let severity = match level {
            CheckLevel::Error => Severity::Error,
            CheckLevel::Warning => Severity::Warning,
            CheckLevel::Off => return,
        };

        let mut diagnostic = Diagnostic {
            severity,
            message: event.description.clone(),
            file: None,
            line: None,
            column: None,
        };
        if let Some(location) = &event.location {
            diagnostic.file = Some(location.file.clone());
            diagnostic.line = location.line;
            diagnostic.column = location.column;
        }
        self.diagnostics.push(diagnostic);

        match severity {
            Severity::Error => self.errors.push(event),
            Severity::Warning => self.warnings.push(event),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[EngineDiagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[EngineDiagnostic] {
        &self.warnings
    }

    /// Statistic the engine's reporting interface carries; stored, never
    /// interpreted.
    pub fn set_typed_percent(&mut self, typed_percent: f64) {
        self.typed_percent = typed_percent;
    }

    pub fn typed_percent(&self) -> f64 {
        self.typed_percent
    }

    /// The accumulated diagnostics, in report order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
