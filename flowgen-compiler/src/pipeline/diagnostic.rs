//! Diagnostic types for the compilation pipeline.
//!
//! All validation and generation issues flow through these records rather
//! than aborting the pass; one step's failure never blocks its siblings.

use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// The offending step is dropped or the pass aborts; siblings continue.
    Error,
    /// Generation for one target is skipped or degraded.
    Warning,
    /// Informational message about the compilation process.
    Note,
}

impl Severity {
    /// Returns true if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message from a compilation phase.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The phase that produced this diagnostic.
    pub phase: String,
    /// The diagnostic message.
    pub message: String,
    /// The step declaration this diagnostic is attributed to, for
    /// step-scoped findings. Pass-global findings carry no attribution.
    pub step: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            phase: phase.into(),
            message: message.into(),
            step: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            phase: phase.into(),
            message: message.into(),
            step: None,
        }
    }

    /// Create a new note diagnostic.
    pub fn note(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            phase: phase.into(),
            message: message.into(),
            step: None,
        }
    }

    /// Attribute this diagnostic to a step declaration.
    pub fn for_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(step) = &self.step {
            write!(f, " (step '{}')", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error("extract", "delegate not found");
        assert!(diag.severity.is_error());
        assert_eq!(diag.phase, "extract");
    }

    #[test]
    fn test_diagnostic_step_attribution() {
        let diag = Diagnostic::warning("bind", "no descriptor").for_step("enrich");
        assert_eq!(diag.step.as_deref(), Some("enrich"));
        assert_eq!(diag.to_string(), "warning: no descriptor (step 'enrich')");
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Note.to_string(), "note");
    }
}
