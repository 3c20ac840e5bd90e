mod check;
mod compile;
mod explain;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use compile::CompileCommand;
use explain::ExplainCommand;
use eyre::Result;

/// Extension trait for exiting on definition errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for flowgen_definition::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "flowgen")]
#[command(version)]
#[command(about = "Compile declarative pipeline definitions into deployment artifacts")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Compile(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Explain(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a pipeline definition and write generated artifacts
    Compile(CompileCommand),

    /// Validate a pipeline definition without generating artifacts
    Check(CheckCommand),

    /// Show the compilation phases and resolved model for a definition
    Explain(ExplainCommand),
}
