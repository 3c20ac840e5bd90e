//! Closed mode and target enums.
//!
//! Every dispatch over these enums in the compiler uses exhaustive matching,
//! so adding a variant is a compile-time obligation to handle it everywhere.

use serde::{Deserialize, Serialize};

/// Transport used between pipeline participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    Grpc,
    Rest,
    Local,
}

impl TransportMode {
    /// Get the lowercase string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Grpc => "grpc",
            TransportMode::Rest => "rest",
            TransportMode::Local => "local",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform the generated artifacts are deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformMode {
    /// Long-running service deployment.
    Standard,
    /// Function-as-a-service deployment. Requires REST transport.
    Function,
}

impl PlatformMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformMode::Standard => "standard",
            PlatformMode::Function => "function",
        }
    }
}

/// Which physical deployment context a generated artifact belongs to.
///
/// Each role maps to one output subdirectory under the generated-output root,
/// named in lower-kebab-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentRole {
    PipelineServer,
    PluginServer,
    PluginClient,
    OrchestratorClient,
    RestServer,
}

impl DeploymentRole {
    /// Output subdirectory name for artifacts of this role.
    pub fn dir_name(&self) -> &'static str {
        match self {
            DeploymentRole::PipelineServer => "pipeline-server",
            DeploymentRole::PluginServer => "plugin-server",
            DeploymentRole::PluginClient => "plugin-client",
            DeploymentRole::OrchestratorClient => "orchestrator-client",
            DeploymentRole::RestServer => "rest-server",
        }
    }

    /// Remap a server role to its client-side counterpart.
    ///
    /// Client stubs generated for a server-role step belong to the deployment
    /// that calls the step, not the one that hosts it. Roles that are already
    /// client-side (or REST-hosted) are unchanged.
    pub fn client_counterpart(&self) -> DeploymentRole {
        match self {
            DeploymentRole::PipelineServer => DeploymentRole::OrchestratorClient,
            DeploymentRole::PluginServer => DeploymentRole::PluginClient,
            DeploymentRole::PluginClient => DeploymentRole::PluginClient,
            DeploymentRole::OrchestratorClient => DeploymentRole::OrchestratorClient,
            DeploymentRole::RestServer => DeploymentRole::RestServer,
        }
    }

    /// Returns true for roles that consume, rather than host, a step.
    pub fn is_client_like(&self) -> bool {
        matches!(
            self,
            DeploymentRole::OrchestratorClient | DeploymentRole::PluginClient
        )
    }
}

impl std::fmt::Display for DeploymentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// One kind of artifact to render for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationTarget {
    /// gRPC service adapter hosting the step implementation.
    GrpcService,
    /// gRPC client stub calling a remote step.
    ClientStep,
    /// REST resource hosting the step implementation.
    RestResource,
    /// REST client stub calling a remote step.
    RestClientStep,
    /// In-process client wrapper around the step implementation.
    LocalClientStep,
    /// Adapter forwarding execution to a pre-existing delegate service.
    ExternalAdapter,
}

impl GenerationTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationTarget::GrpcService => "grpc-service",
            GenerationTarget::ClientStep => "client-step",
            GenerationTarget::RestResource => "rest-resource",
            GenerationTarget::RestClientStep => "rest-client-step",
            GenerationTarget::LocalClientStep => "local-client-step",
            GenerationTarget::ExternalAdapter => "external-adapter",
        }
    }

    /// Returns true for targets rendered into a client-side deployment.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            GenerationTarget::ClientStep
                | GenerationTarget::RestClientStep
                | GenerationTarget::LocalClientStep
        )
    }

    /// Returns true for targets that host the step implementation.
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            GenerationTarget::GrpcService | GenerationTarget::RestResource
        )
    }

    /// Returns true for targets resolved against the protocol descriptor set.
    pub fn needs_descriptors(&self) -> bool {
        matches!(
            self,
            GenerationTarget::GrpcService | GenerationTarget::ClientStep
        )
    }
}

impl std::fmt::Display for GenerationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Call shape of a step, in gRPC streaming terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamingShape {
    UnaryUnary,
    UnaryStreaming,
    StreamingUnary,
    StreamingStreaming,
}

impl StreamingShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamingShape::UnaryUnary => "unary-unary",
            StreamingShape::UnaryStreaming => "unary-streaming",
            StreamingShape::StreamingUnary => "streaming-unary",
            StreamingShape::StreamingStreaming => "streaming-streaming",
        }
    }

    /// Whether the step consumes a client-side stream.
    pub fn client_streaming(&self) -> bool {
        matches!(
            self,
            StreamingShape::StreamingUnary | StreamingShape::StreamingStreaming
        )
    }

    /// Whether the step produces a server-side stream.
    pub fn server_streaming(&self) -> bool {
        matches!(
            self,
            StreamingShape::UnaryStreaming | StreamingShape::StreamingStreaming
        )
    }
}

impl std::fmt::Display for StreamingShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_dir_names_are_kebab_case() {
        let roles = [
            DeploymentRole::PipelineServer,
            DeploymentRole::PluginServer,
            DeploymentRole::PluginClient,
            DeploymentRole::OrchestratorClient,
            DeploymentRole::RestServer,
        ];
        for role in roles {
            let dir = role.dir_name();
            assert!(
                dir.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
                "{dir} is not lower-kebab-case"
            );
        }
    }

    #[test]
    fn test_client_counterpart_mapping() {
        assert_eq!(
            DeploymentRole::PipelineServer.client_counterpart(),
            DeploymentRole::OrchestratorClient
        );
        assert_eq!(
            DeploymentRole::PluginServer.client_counterpart(),
            DeploymentRole::PluginClient
        );
        // Already-client roles are unchanged
        assert_eq!(
            DeploymentRole::OrchestratorClient.client_counterpart(),
            DeploymentRole::OrchestratorClient
        );
        assert_eq!(
            DeploymentRole::PluginClient.client_counterpart(),
            DeploymentRole::PluginClient
        );
        assert_eq!(
            DeploymentRole::RestServer.client_counterpart(),
            DeploymentRole::RestServer
        );
    }

    #[test]
    fn test_streaming_flags() {
        assert!(!StreamingShape::UnaryUnary.client_streaming());
        assert!(!StreamingShape::UnaryUnary.server_streaming());
        assert!(StreamingShape::UnaryStreaming.server_streaming());
        assert!(StreamingShape::StreamingUnary.client_streaming());
        assert!(StreamingShape::StreamingStreaming.client_streaming());
        assert!(StreamingShape::StreamingStreaming.server_streaming());
    }

    #[test]
    fn test_target_classification() {
        assert!(GenerationTarget::GrpcService.is_server_side());
        assert!(GenerationTarget::RestResource.is_server_side());
        assert!(GenerationTarget::ClientStep.is_client_side());
        assert!(GenerationTarget::RestClientStep.is_client_side());
        assert!(GenerationTarget::LocalClientStep.is_client_side());
        assert!(!GenerationTarget::ExternalAdapter.is_server_side());
        assert!(!GenerationTarget::ExternalAdapter.is_client_side());
    }
}
