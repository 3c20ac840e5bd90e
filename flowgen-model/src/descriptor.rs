//! Protocol descriptor set data model.
//!
//! The descriptor set describes the wire-level services and methods the
//! generated gRPC adapters bind against. It is loaded from a JSON resource by
//! the compiler, lazily and at most once per compilation pass.

use serde::{Deserialize, Serialize};

/// One RPC method within a service descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Fully-qualified input message type.
    pub input_type: String,
    /// Fully-qualified output message type.
    pub output_type: String,
    /// Whether the client sends a stream.
    #[serde(default)]
    pub client_streaming: bool,
    /// Whether the server sends a stream.
    #[serde(default)]
    pub server_streaming: bool,
}

/// One service within the descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service name, matched against step service names.
    pub name: String,
    /// Protocol package of the service.
    #[serde(default)]
    pub package: String,
    /// Declared RPC methods.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Fully-qualified service name.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// The full descriptor set for one compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorSet {
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

impl DescriptorSet {
    /// Empty descriptor set, used when no descriptor resource resolves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a service by simple or fully-qualified name.
    pub fn find_service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services
            .iter()
            .find(|s| s.name == name || s.qualified_name() == name)
    }
}
