//! Semantic IR types for the flowgen pipeline compiler.
//!
//! This crate provides the unified type definitions used across the flowgen
//! compilation pipeline. These types serve as the single source of truth for
//! pipeline steps, deployment roles, generation targets, and renderer-facing
//! bindings.
//!
//! # Architecture
//!
//! ```text
//! pipeline.toml → flowgen-definition (parsing) → flowgen-model (IR) → dispatch
//! ```
//!
//! The IR types are designed to be:
//! - Transport-agnostic (gRPC, REST, and in-process share one model)
//! - Renderer-agnostic (bindings carry data, never templates)
//! - Self-contained (no dependencies beyond serde)

mod aspect;
mod binding;
mod descriptor;
mod modes;
mod orchestrator;
mod step;
mod types;

pub use aspect::{AspectModel, AspectScope, PLUGIN_IMPLEMENTATION_KEY};
pub use binding::{
    Binding, BindingKind, ExternalAdapterBinding, GrpcBinding, LocalBinding, OrchestratorBinding,
    RestBinding, binding_key,
};
pub use descriptor::{DescriptorSet, MethodDescriptor, ServiceDescriptor};
pub use modes::{
    DeploymentRole, GenerationTarget, PlatformMode, StreamingShape, TransportMode,
};
pub use orchestrator::{OrchestratorDeclaration, OrchestratorModel};
pub use step::{
    Cardinality, MapperFallback, OrderingRequirement, StepDeclaration, StepModel, ThreadSafety,
    TypeMapping,
};
pub use types::TypeRef;
