use std::path::{Path, PathBuf};

use clap::Args;
use eyre::{Context, Result};
use flowgen_compiler::{CompilationInput, Pipeline, Severity};

use super::UnwrapOrExit;

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the pipeline definition (defaults to ./pipeline.toml)
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let definition = flowgen_definition::parse_file(&self.config).unwrap_or_exit();
        let base_dir = self.config.parent().unwrap_or(Path::new("."));
        let input = CompilationInput::from_definition(&definition, base_dir);

        // Run the pipeline up to binding construction; nothing is written
        let pipeline = Pipeline::new();
        let ctx = pipeline.check(input).wrap_err("validation failed")?;

        let mut has_errors = false;
        for diag in &ctx.diagnostics {
            match diag.severity {
                Severity::Error => {
                    has_errors = true;
                    eprintln!("error: {}", diag.message);
                    if let Some(step) = &diag.step {
                        eprintln!("  --> step '{}'", step);
                    }
                }
                Severity::Warning => {
                    eprintln!("warning: {}", diag.message);
                    if let Some(step) = &diag.step {
                        eprintln!("  --> step '{}'", step);
                    }
                }
                Severity::Note => {
                    println!("note: {}", diag.message);
                }
            }
        }

        if has_errors {
            std::process::exit(1);
        }

        println!("✓ {} is valid", self.config.display());
        println!(
            "  module '{}', transport {}, {} step{}",
            ctx.module_name,
            ctx.transport,
            ctx.models.len(),
            if ctx.models.len() == 1 { "" } else { "s" },
        );
        if ctx.generate_orchestrator {
            println!("  orchestrator: {} generated", ctx.orchestrators.len());
        }
        Ok(())
    }
}
