//! Renderer-facing bindings.
//!
//! A binding is the fully-resolved data needed to emit one artifact kind for
//! one step. Bindings are constructed after target resolution and stored in
//! the compilation context keyed by `"<serviceName>_<kind>"`.

use serde::{Deserialize, Serialize};

use crate::{
    MethodDescriptor, OrchestratorModel, ServiceDescriptor, StepModel, TypeRef,
};

/// Discriminator for the binding map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingKind {
    Grpc,
    Rest,
    Local,
    ExternalAdapter,
    Orchestrator,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Grpc => "grpc",
            BindingKind::Rest => "rest",
            BindingKind::Local => "local",
            BindingKind::ExternalAdapter => "external-adapter",
            BindingKind::Orchestrator => "orchestrator",
        }
    }
}

/// Binding map key for a service and binding kind.
pub fn binding_key(service_name: &str, kind: BindingKind) -> String {
    format!("{}_{}", service_name, kind.as_str())
}

/// gRPC binding: step model resolved against the protocol descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcBinding {
    pub model: StepModel,
    pub service: ServiceDescriptor,
    pub method: MethodDescriptor,
}

/// REST binding with an optionally overridden resource path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestBinding {
    pub model: StepModel,
    /// Resource path override from configuration; defaults to the service
    /// name when absent.
    pub path_override: Option<String>,
}

impl RestBinding {
    /// The effective resource path.
    pub fn path(&self) -> String {
        match &self.path_override {
            Some(path) => path.clone(),
            None => format!("/{}", self.model.service_name),
        }
    }
}

/// In-process binding; the step is invoked without a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBinding {
    pub model: StepModel,
}

/// Binding for a delegated step's external adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAdapterBinding {
    pub model: StepModel,
    pub service_name: String,
    pub service_package: String,
    pub delegate_service: TypeRef,
    pub external_mapper: Option<TypeRef>,
}

/// Binding for the orchestrator artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorBinding {
    pub model: OrchestratorModel,
}

/// Any binding, as stored in the compilation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    Grpc(GrpcBinding),
    Rest(RestBinding),
    Local(LocalBinding),
    ExternalAdapter(ExternalAdapterBinding),
    Orchestrator(OrchestratorBinding),
}

impl Binding {
    /// The binding kind used in the map key.
    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Grpc(_) => BindingKind::Grpc,
            Binding::Rest(_) => BindingKind::Rest,
            Binding::Local(_) => BindingKind::Local,
            Binding::ExternalAdapter(_) => BindingKind::ExternalAdapter,
            Binding::Orchestrator(_) => BindingKind::Orchestrator,
        }
    }

    /// The service name this binding belongs to.
    pub fn service_name(&self) -> &str {
        match self {
            Binding::Grpc(b) => &b.model.service_name,
            Binding::Rest(b) => &b.model.service_name,
            Binding::Local(b) => &b.model.service_name,
            Binding::ExternalAdapter(b) => &b.service_name,
            Binding::Orchestrator(b) => &b.model.service_name,
        }
    }

    /// The map key for this binding.
    pub fn key(&self) -> String {
        binding_key(self.service_name(), self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_key_format() {
        assert_eq!(binding_key("enrich", BindingKind::Grpc), "enrich_grpc");
        assert_eq!(
            binding_key("enrich", BindingKind::ExternalAdapter),
            "enrich_external-adapter"
        );
    }
}
