//! Orchestrator declarations and models.

use serde::{Deserialize, Serialize};

use crate::{TransportMode, TypeRef};

/// Declarative orchestrator template: base package, ordered step list,
/// transport, and optional client artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorDeclaration {
    /// Base package for generated orchestrator artifacts.
    pub base_package: String,
    /// Ordered step names making up the pipeline.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Transport for the orchestrator server artifact. Defaults to the
    /// pipeline-wide transport when unspecified.
    pub transport: Option<TransportMode>,
    /// Generate a command-line client for the orchestrator.
    #[serde(default)]
    pub cli_client: bool,
    /// Generate an ingest client feeding the pipeline entry point.
    #[serde(default)]
    pub ingest: bool,
}

impl OrchestratorDeclaration {
    pub fn new(base_package: impl Into<String>) -> Self {
        Self {
            base_package: base_package.into(),
            steps: Vec::new(),
            transport: None,
            cli_client: false,
            ingest: false,
        }
    }
}

/// Resolved orchestrator model, built during binding construction once the
/// step models it refers to are final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorModel {
    /// Service name of the orchestrator itself.
    pub service_name: String,
    /// Base package for generated artifacts.
    pub base_package: String,
    /// Ordered service names of the orchestrated steps.
    pub step_order: Vec<String>,
    /// Effective transport.
    pub transport: TransportMode,
    /// Pipeline entry input type (first step's domain input).
    pub input_type: Option<TypeRef>,
    /// Pipeline exit output type (last step's domain output).
    pub output_type: Option<TypeRef>,
    /// Whether the entry point consumes a stream.
    pub client_streaming: bool,
    /// Whether the exit point produces a stream.
    pub server_streaming: bool,
    /// Generate a command-line client.
    pub cli_client: bool,
    /// Generate an ingest client.
    pub ingest: bool,
}
