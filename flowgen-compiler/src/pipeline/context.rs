//! Compilation context passed through pipeline phases.

use std::path::PathBuf;

use flowgen_model::{
    AspectModel, Binding, DescriptorSet, OrchestratorModel, PlatformMode, StepModel, TransportMode,
};
use indexmap::IndexMap;

use super::diagnostic::{Diagnostic, Severity};
use crate::{input::CompilationInput, options::CompilerOptions};

/// Process-scoped mutable state for one compilation pass.
///
/// Each phase reads completed state from its predecessors and populates its
/// own section; no phase mutates IR it does not own after handing it
/// downstream. The context is rebuilt fresh for every compilation round.
#[derive(Debug)]
pub struct CompilationContext {
    /// The read-only compilation input.
    pub input: CompilationInput,
    /// Typed option view (populated by DiscoveryPhase).
    pub options: CompilerOptions,
    /// Generated-output root (populated by DiscoveryPhase).
    pub output_root: PathBuf,
    /// Module identity (populated by DiscoveryPhase).
    pub module_name: String,
    /// Pipeline-wide transport (populated by DiscoveryPhase).
    pub transport: TransportMode,
    /// Deployment platform (populated by DiscoveryPhase).
    pub platform: PlatformMode,
    /// Whether this pass runs in a plugin-host context.
    pub plugin_host: bool,
    /// Runtime layout mapping, when configured.
    pub runtime_layout: Option<String>,
    /// Step models (populated by ExtractPhase, targets replaced by
    /// ResolveTargetsPhase).
    pub models: Vec<StepModel>,
    /// Declared aspects (populated by DiscoveryPhase).
    pub aspects: Vec<AspectModel>,
    /// Orchestrator models (populated by BindPhase).
    pub orchestrators: Vec<OrchestratorModel>,
    /// Whether an orchestrator artifact should be generated (decided by
    /// AnalyzePhase).
    pub generate_orchestrator: bool,
    /// Bindings keyed `"<serviceName>_<kind>"` (populated by BindPhase).
    pub bindings: IndexMap<String, Binding>,
    /// Protocol descriptor set, loaded lazily by BindPhase.
    pub descriptors: Option<DescriptorSet>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a new compilation context from an input.
    pub fn new(input: CompilationInput) -> Self {
        Self {
            input,
            options: CompilerOptions::default(),
            output_root: PathBuf::new(),
            module_name: String::new(),
            transport: TransportMode::Grpc,
            platform: PlatformMode::Standard,
            plugin_host: false,
            runtime_layout: None,
            models: Vec::new(),
            aspects: Vec::new(),
            orchestrators: Vec::new(),
            generate_orchestrator: false,
            bindings: IndexMap::new(),
            descriptors: None,
            diagnostics: Vec::new(),
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    /// Add a note diagnostic.
    pub fn add_note(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::note(phase, message));
    }

    /// Add a diagnostic with full detail.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// Look up a step model by service name.
    pub fn model(&self, service_name: &str) -> Option<&StepModel> {
        self.models.iter().find(|m| m.service_name == service_name)
    }

    /// Look up a binding by service name and kind.
    pub fn binding(&self, service_name: &str, kind: flowgen_model::BindingKind) -> Option<&Binding> {
        self.bindings
            .get(&flowgen_model::binding_key(service_name, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = CompilationContext::new(CompilationInput::default());
        assert!(ctx.models.is_empty());
        assert!(ctx.bindings.is_empty());
        assert!(ctx.descriptors.is_none());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = CompilationContext::new(CompilationInput::default());

        ctx.add_error("extract", "test error");
        ctx.add_warning("bind", "test warning");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn test_context_no_errors() {
        let mut ctx = CompilationContext::new(CompilationInput::default());

        ctx.add_warning("bind", "just a warning");
        ctx.add_note("dispatch", "just a note");

        assert!(!ctx.has_errors());
        assert!(ctx.has_warnings());
    }
}
