use std::path::{Path, PathBuf};

use clap::Args;
use eyre::{Context, Result};
use flowgen_compiler::{CompilationInput, Pipeline, Severity};
use flowgen_definition::keys;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct CompileCommand {
    /// Path to the pipeline definition (defaults to ./pipeline.toml)
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: PathBuf,

    /// Output root for generated artifacts (overrides the definition)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompileCommand {
    /// Run the compile command
    pub fn run(&self) -> Result<()> {
        let definition = flowgen_definition::parse_file(&self.config).unwrap_or_exit();
        let base_dir = self.config.parent().unwrap_or(Path::new("."));

        let mut input = CompilationInput::from_definition(&definition, base_dir);
        if let Some(output) = &self.output {
            input = input.with_option(keys::OUTPUT_ROOT, output.display().to_string());
        }

        let pipeline = Pipeline::new();
        let ctx = pipeline.run(input).wrap_err("compilation failed")?;

        for diag in &ctx.diagnostics {
            match diag.severity {
                Severity::Error => eprintln!("error: {}", diag.message),
                Severity::Warning => eprintln!("warning: {}", diag.message),
                Severity::Note => {}
            }
        }

        println!(
            "compiled {} step{} -> {}",
            ctx.models.len(),
            if ctx.models.len() == 1 { "" } else { "s" },
            ctx.output_root.display()
        );

        // Artifacts for the surviving steps were still written; a nonzero
        // exit tells build tooling the definition needs attention
        if ctx.has_errors() {
            std::process::exit(1);
        }
        Ok(())
    }
}
