use std::path::{Path, PathBuf};

use clap::Args;
use eyre::{Context, Result};
use flowgen_compiler::{CompilationInput, Pipeline};

use super::UnwrapOrExit;

#[derive(Args)]
pub struct ExplainCommand {
    /// Path to the pipeline definition (defaults to ./pipeline.toml)
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: PathBuf,
}

impl ExplainCommand {
    pub fn run(&self) -> Result<()> {
        let definition = flowgen_definition::parse_file(&self.config).unwrap_or_exit();
        let base_dir = self.config.parent().unwrap_or(Path::new("."));
        let input = CompilationInput::from_definition(&definition, base_dir);

        let pipeline = Pipeline::new();

        println!("Flowgen Pipeline Explanation");
        println!("============================");
        println!();

        println!("Input: {}", self.config.display());
        println!();

        // Show phases (descriptions come from the Phase trait)
        println!("Compilation Phases:");
        for (i, phase) in pipeline.phase_info().iter().enumerate() {
            println!("  {}. {} - {}", i + 1, phase.name, phase.description);
        }
        println!();

        // Run up to binding construction to get resolved state
        let ctx = pipeline.check(input).wrap_err("compilation failed")?;

        println!("Analysis Results:");
        println!("  Module: {}", ctx.module_name);
        println!("  Transport: {}", ctx.transport);
        println!("  Platform: {}", ctx.platform.as_str());
        println!(
            "  Plugin host: {}",
            if ctx.plugin_host { "yes" } else { "no" }
        );
        println!(
            "  Orchestrator: {}",
            if ctx.generate_orchestrator {
                "generated"
            } else {
                "none"
            }
        );
        println!();

        if !ctx.models.is_empty() {
            println!("Steps:");
            for model in &ctx.models {
                println!(
                    "  - {} ({}, {})",
                    model.service_name, model.role, model.streaming
                );
                let targets: Vec<String> = model
                    .enabled_targets
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                println!("    targets: {}", targets.join(", "));
                if let Some(delegate) = &model.delegate {
                    println!("    delegate: {}", delegate);
                }
            }
            println!();
        }

        if !ctx.bindings.is_empty() {
            println!("Bindings:");
            for key in ctx.bindings.keys() {
                println!("  - {}", key);
            }
            println!();
        }

        if ctx.error_count() > 0 || ctx.warning_count() > 0 {
            println!(
                "Diagnostics: {} error(s), {} warning(s); run `flowgen check` for details",
                ctx.error_count(),
                ctx.warning_count()
            );
        }

        Ok(())
    }
}
