//! The multi-phase compilation pipeline.
//!
//! This module provides a [`Pipeline`] orchestrator that manages the
//! compilation phases from declaration input to rendered artifacts:
//!
//! ```text
//! discovery → extract → analyze → resolve → bind → dispatch
//! ```
//!
//! The pipeline provides:
//!
//! - Explicit phase boundaries with strictly sequential execution
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection in [`CompilationContext`]
//! - A renderer seam for the dispatch phase
//!
//! # Example
//!
//! ```ignore
//! use flowgen_compiler::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let ctx = pipeline.run(input)?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("{diag}");
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
