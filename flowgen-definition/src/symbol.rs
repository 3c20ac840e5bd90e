//! Type symbol definitions.
//!
//! The compiler inspects delegate and mapper types through a symbol table
//! rather than live reflection. The `[[types]]` section of the definition
//! file supplies that table: each entry describes one foreign type the
//! compiler may need to resolve.

use flowgen_model::{OrderingRequirement, ThreadSafety};
use serde::Deserialize;

/// Interfaces the compiler recognizes on foreign types.
///
/// The four operator interfaces correspond to the four streaming shapes; a
/// delegate must implement exactly one of them. `TypeMapper` marks mapper
/// candidates and carries exactly four type arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceKind {
    UnaryOperator,
    ServerStreamOperator,
    ClientStreamOperator,
    BidiStreamOperator,
    TypeMapper,
}

impl InterfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceKind::UnaryOperator => "unary-operator",
            InterfaceKind::ServerStreamOperator => "server-stream-operator",
            InterfaceKind::ClientStreamOperator => "client-stream-operator",
            InterfaceKind::BidiStreamOperator => "bidi-stream-operator",
            InterfaceKind::TypeMapper => "type-mapper",
        }
    }
}

/// One implemented interface, with its type arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImplementsDef {
    pub interface: InterfaceKind,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Implementation-provided service identity, overridden by the declaration
/// for internal steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityDef {
    pub name: String,
    pub package: String,
}

/// One `[[types]]` entry in the pipeline definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDef {
    /// Fully-qualified type name.
    pub name: String,
    /// Interfaces the type implements, with type arguments.
    #[serde(default)]
    pub implements: Vec<ImplementsDef>,
    /// Declared generic type parameters.
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Types this one is assignable to, beyond itself.
    #[serde(default)]
    pub assignable_to: Vec<String>,
    /// Declared thread-safety, for parallelism analysis.
    pub thread_safety: Option<ThreadSafety>,
    /// Declared ordering requirement, for parallelism analysis.
    pub ordering: Option<OrderingRequirement>,
    /// Identity the implementation provides for itself, if any.
    pub identity: Option<IdentityDef>,
}
