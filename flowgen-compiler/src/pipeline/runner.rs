//! Pipeline orchestrator.

use std::sync::Arc;

use eyre::Result;

use super::{
    CompilationContext, Phase, PhaseInfo, Plugin,
    phases::{
        AnalyzePhase, BindPhase, DiscoveryPhase, DispatchPhase, ExtractPhase, ResolveTargetsPhase,
    },
};
use crate::{
    input::CompilationInput,
    render::{ArtifactRenderer, SourceRenderer},
};

/// The compilation pipeline orchestrator.
///
/// The pipeline manages the execution of compilation phases and plugin
/// hooks. It runs the built-in phases (discovery, extract, analyze, resolve,
/// bind, dispatch) followed by any user phases, calling plugin hooks before
/// and after each phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new().plugin(MyPlugin::new());
/// let ctx = pipeline.run(input)?;
/// ```
pub struct Pipeline {
    renderer: Arc<dyn ArtifactRenderer>,
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a new pipeline with the built-in source renderer.
    pub fn new() -> Self {
        Self {
            renderer: Arc::new(SourceRenderer::new()),
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Replace the renderer used by the dispatch phase.
    pub fn with_renderer(mut self, renderer: impl ArtifactRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run the full pipeline on a compilation input.
    ///
    /// Executes all built-in phases in order, then user phases. Plugin hooks
    /// are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally (global configuration
    /// errors, binding invariant violations). Step-local failures surface as
    /// diagnostics on the returned context instead.
    pub fn run(&self, input: CompilationInput) -> Result<CompilationContext> {
        self.execute(input, true)
    }

    /// Run the pipeline up to binding construction, without generating any
    /// artifacts. Used by check-style drivers.
    pub fn check(&self, input: CompilationInput) -> Result<CompilationContext> {
        self.execute(input, false)
    }

    /// Get information about all phases in execution order.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        self.builtin_phases(true)
            .iter()
            .chain(self.phases.iter())
            .map(|phase| phase.info())
            .collect()
    }

    fn builtin_phases(&self, dispatch: bool) -> Vec<Box<dyn Phase>> {
        let mut phases: Vec<Box<dyn Phase>> = vec![
            Box::new(DiscoveryPhase),
            Box::new(ExtractPhase::new()),
            Box::new(AnalyzePhase),
            Box::new(ResolveTargetsPhase),
            Box::new(BindPhase),
        ];
        if dispatch {
            phases.push(Box::new(DispatchPhase::new(self.renderer.clone())));
        }
        phases
    }

    fn execute(&self, input: CompilationInput, dispatch: bool) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(input);

        // Built-in phases in execution order
        let builtin_phases = self.builtin_phases(dispatch);

        // Run built-in phases, then user phases
        for phase in builtin_phases.iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use flowgen_definition::keys;
    use flowgen_model::StepDeclaration;

    use super::*;

    struct CountingPlugin {
        before_count: Arc<AtomicUsize>,
        after_count: Arc<AtomicUsize>,
    }

    impl CountingPlugin {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let before = Arc::new(AtomicUsize::new(0));
            let after = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    before_count: before.clone(),
                    after_count: after.clone(),
                },
                before,
                after,
            )
        }
    }

    impl Plugin for CountingPlugin {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn on_before_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.before_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_after_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.after_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn make_test_input(output_root: &std::path::Path) -> CompilationInput {
        let mut input = CompilationInput::default()
            .with_option(keys::MODULE_NAME, "orders")
            .with_option(keys::OUTPUT_ROOT, output_root.display().to_string());
        let mut declaration = StepDeclaration::internal("enrich", "com.acme.EnrichService");
        declaration.input = Some("com.acme.Order".into());
        declaration.output = Some("com.acme.EnrichedOrder".into());
        input.declarations.push(declaration);
        input
    }

    #[test]
    fn test_pipeline_runs_phases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = Pipeline::new();

        let ctx = pipeline
            .run(make_test_input(dir.path()))
            .expect("pipeline should succeed");

        assert_eq!(ctx.models.len(), 1);
        assert!(!ctx.models[0].enabled_targets.is_empty());
    }

    #[test]
    fn test_pipeline_plugin_hooks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (plugin, before_count, after_count) = CountingPlugin::new();

        let pipeline = Pipeline::new().plugin(plugin);
        let _ = pipeline
            .run(make_test_input(dir.path()))
            .expect("pipeline should succeed");

        // 6 built-in phases = 6 before + 6 after hooks
        assert_eq!(before_count.load(Ordering::SeqCst), 6);
        assert_eq!(after_count.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_check_skips_dispatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output_root = dir.path().join("generated");
        let pipeline = Pipeline::new();

        let ctx = pipeline
            .check(make_test_input(&output_root))
            .expect("check should succeed");

        assert_eq!(ctx.models.len(), 1);
        // No dispatch ran, so nothing was written
        assert!(!output_root.exists());
    }
}
