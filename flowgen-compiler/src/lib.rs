//! Pipeline model compiler.
//!
//! Turns declarative step definitions into deployment-ready artifacts
//! through a fixed sequence of phases: discovery, model extraction, semantic
//! analysis, target resolution, binding construction, and generation
//! dispatch. Issues are accumulated as diagnostics on the compilation
//! context; one step's failure never blocks its siblings, and only global
//! configuration errors abort a pass.
//!
//! # Example
//!
//! ```ignore
//! use flowgen_compiler::{input::CompilationInput, pipeline::Pipeline};
//!
//! let definition = flowgen_definition::parse_file("pipeline.toml")?;
//! let input = CompilationInput::from_definition(&definition, base_dir);
//! let ctx = Pipeline::new().run(input)?;
//! ```

pub mod descriptor;
pub mod expand;
pub mod input;
pub mod metadata;
pub mod naming;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod symbols;

pub use input::CompilationInput;
pub use options::CompilerOptions;
pub use pipeline::{CompilationContext, Diagnostic, Phase, Pipeline, Plugin, Severity};
pub use render::{ArtifactRenderer, RenderedArtifact, SourceRenderer};
pub use symbols::{SymbolTable, TypeSymbol};
