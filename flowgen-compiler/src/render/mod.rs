//! Renderer seam.
//!
//! The dispatch phase decides *whether* and *with what binding* an artifact
//! is rendered; how text is produced stays behind the [`ArtifactRenderer`]
//! trait. The built-in [`SourceRenderer`] emits deterministic source stubs;
//! a full template engine can be swapped in without touching dispatch.

mod source;

use flowgen_model::{
    ExternalAdapterBinding, GrpcBinding, LocalBinding, OrchestratorBinding, RestBinding, StepModel,
};
pub use source::SourceRenderer;

/// One named text artifact produced by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Fully-qualified name of the generated class, recorded in role metadata.
    pub qualified_name: String,
    /// File name relative to the role directory.
    pub file_name: String,
    /// Rendered source text.
    pub content: String,
}

/// Renderer collaborators invoked by generation dispatch.
///
/// One method per artifact kind, each taking the resolved binding for that
/// kind. Implementations must be deterministic: the same binding always
/// yields the same artifact.
pub trait ArtifactRenderer: Send + Sync {
    /// gRPC service adapter hosting a step implementation.
    fn grpc_service(&self, binding: &GrpcBinding) -> RenderedArtifact;

    /// gRPC client stub calling a remote step.
    fn client_step(&self, binding: &GrpcBinding) -> RenderedArtifact;

    /// REST resource hosting a step implementation.
    fn rest_resource(&self, binding: &RestBinding) -> RenderedArtifact;

    /// REST client stub calling a remote step.
    fn rest_client_step(&self, binding: &RestBinding) -> RenderedArtifact;

    /// In-process client wrapper.
    fn local_client_step(&self, binding: &LocalBinding) -> RenderedArtifact;

    /// Adapter forwarding execution to a delegate service.
    fn external_adapter(&self, binding: &ExternalAdapterBinding) -> RenderedArtifact;

    /// Client stub calling a delegated step through its adapter.
    fn delegated_client_step(&self, binding: &ExternalAdapterBinding) -> RenderedArtifact;

    /// Side-effect wrapper bean for a plugin step variant.
    fn side_effect_bean(&self, model: &StepModel) -> RenderedArtifact;

    /// Orchestrator server artifact.
    fn orchestrator_server(&self, binding: &OrchestratorBinding) -> RenderedArtifact;

    /// Orchestrator command-line client.
    fn orchestrator_cli_client(&self, binding: &OrchestratorBinding) -> RenderedArtifact;

    /// Orchestrator ingest client.
    fn orchestrator_ingest_client(&self, binding: &OrchestratorBinding) -> RenderedArtifact;
}
