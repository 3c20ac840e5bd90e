//! Symbol table over foreign types.
//!
//! The compiler validates delegate and mapper references against a type
//! system it does not control. Rather than reflecting over live types, it
//! consults a pre-built symbol table: one [`TypeSymbol`] per foreign type,
//! carrying the implemented operator interfaces (with type arguments),
//! declared generic parameters, assignability edges, and the optional
//! parallelism hint used by semantic analysis.

use std::collections::BTreeMap;

use flowgen_definition::{InterfaceKind, TypeDef};
use flowgen_model::{OrderingRequirement, StreamingShape, ThreadSafety, TypeRef};

/// Service identity an implementation provides for itself.
///
/// For internal steps the declaration is authoritative and this identity is
/// deliberately ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub name: String,
    pub package: String,
}

/// Parallelism hint declared on a step or plugin implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismHint {
    pub thread_safety: ThreadSafety,
    pub ordering: OrderingRequirement,
}

impl ParallelismHint {
    /// True when the hinted implementation cannot safely run under a
    /// non-sequential policy.
    pub fn sequential_only(&self) -> bool {
        self.thread_safety == ThreadSafety::Unsafe || self.ordering == OrderingRequirement::Strict
    }
}

/// One foreign type known to the compiler.
#[derive(Debug, Clone)]
pub struct TypeSymbol {
    name: TypeRef,
    implements: Vec<(InterfaceKind, Vec<TypeRef>)>,
    type_params: Vec<String>,
    assignable_to: Vec<TypeRef>,
    thread_safety: Option<ThreadSafety>,
    ordering: Option<OrderingRequirement>,
    identity: Option<ServiceIdentity>,
}

impl TypeSymbol {
    pub fn new(name: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            implements: Vec::new(),
            type_params: Vec::new(),
            assignable_to: Vec::new(),
            thread_safety: None,
            ordering: None,
            identity: None,
        }
    }

    pub fn with_interface(mut self, interface: InterfaceKind, args: &[&str]) -> Self {
        self.implements
            .push((interface, args.iter().map(|a| TypeRef::new(*a)).collect()));
        self
    }

    pub fn with_type_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_assignable_to(mut self, types: &[&str]) -> Self {
        self.assignable_to = types.iter().map(|t| TypeRef::new(*t)).collect();
        self
    }

    pub fn with_thread_safety(mut self, thread_safety: ThreadSafety) -> Self {
        self.thread_safety = Some(thread_safety);
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingRequirement) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn with_identity(mut self, name: impl Into<String>, package: impl Into<String>) -> Self {
        self.identity = Some(ServiceIdentity {
            name: name.into(),
            package: package.into(),
        });
        self
    }

    /// The fully-qualified type name.
    pub fn name(&self) -> &TypeRef {
        &self.name
    }

    /// Declared generic type parameters.
    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    /// Implementation-provided identity, if any.
    pub fn identity(&self) -> Option<&ServiceIdentity> {
        self.identity.as_ref()
    }

    /// All implemented reactive operator interfaces, as
    /// (streaming shape, type arguments) pairs. Mapper interfaces are not
    /// operator interfaces and are excluded.
    pub fn operator_shapes(&self) -> Vec<(StreamingShape, &[TypeRef])> {
        self.implements
            .iter()
            .filter_map(|(kind, args)| {
                operator_shape(*kind).map(|shape| (shape, args.as_slice()))
            })
            .collect()
    }

    /// Type arguments of the mapper interface, when this type is a mapper
    /// candidate. A well-formed mapper carries exactly four arguments:
    /// {declaredIn, delegateIn, declaredOut, delegateOut}.
    pub fn mapper_args(&self) -> Option<&[TypeRef]> {
        self.implements
            .iter()
            .find(|(kind, _)| *kind == InterfaceKind::TypeMapper)
            .map(|(_, args)| args.as_slice())
    }

    /// The declared parallelism hint, when either component is declared.
    pub fn parallelism_hint(&self) -> Option<ParallelismHint> {
        if self.thread_safety.is_none() && self.ordering.is_none() {
            return None;
        }
        Some(ParallelismHint {
            thread_safety: self.thread_safety.unwrap_or_default(),
            ordering: self.ordering.unwrap_or_default(),
        })
    }
}

/// Map a recognized operator interface to its streaming shape.
fn operator_shape(kind: InterfaceKind) -> Option<StreamingShape> {
    match kind {
        InterfaceKind::UnaryOperator => Some(StreamingShape::UnaryUnary),
        InterfaceKind::ServerStreamOperator => Some(StreamingShape::UnaryStreaming),
        InterfaceKind::ClientStreamOperator => Some(StreamingShape::StreamingUnary),
        InterfaceKind::BidiStreamOperator => Some(StreamingShape::StreamingStreaming),
        InterfaceKind::TypeMapper => None,
    }
}

/// The symbol table for one compilation pass.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, TypeSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from definition-file type records.
    pub fn from_defs(defs: &[TypeDef]) -> Self {
        let mut table = Self::new();
        for def in defs {
            let mut symbol = TypeSymbol::new(def.name.as_str());
            for imp in &def.implements {
                let args: Vec<&str> = imp.args.iter().map(String::as_str).collect();
                symbol = symbol.with_interface(imp.interface, &args);
            }
            if !def.type_params.is_empty() {
                let params: Vec<&str> = def.type_params.iter().map(String::as_str).collect();
                symbol = symbol.with_type_params(&params);
            }
            if !def.assignable_to.is_empty() {
                let types: Vec<&str> = def.assignable_to.iter().map(String::as_str).collect();
                symbol = symbol.with_assignable_to(&types);
            }
            if let Some(thread_safety) = def.thread_safety {
                symbol = symbol.with_thread_safety(thread_safety);
            }
            if let Some(ordering) = def.ordering {
                symbol = symbol.with_ordering(ordering);
            }
            if let Some(identity) = &def.identity {
                symbol = symbol.with_identity(&identity.name, &identity.package);
            }
            table.insert(symbol);
        }
        table
    }

    /// Insert a symbol, replacing any previous entry for the same name.
    pub fn insert(&mut self, symbol: TypeSymbol) {
        self.symbols
            .insert(symbol.name.qualified().to_string(), symbol);
    }

    /// Resolve a type by fully-qualified name.
    pub fn resolve(&self, name: &str) -> Option<&TypeSymbol> {
        self.symbols.get(name)
    }

    /// Test whether `from` is assignable to `to`: identity or a declared
    /// assignability edge.
    pub fn is_assignable(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        self.resolve(from)
            .map(|s| s.assignable_to.iter().any(|t| t.qualified() == to))
            .unwrap_or(false)
    }

    /// All mapper candidates in the current compilation input, in name order.
    pub fn mapper_candidates(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.symbols.values().filter(|s| s.mapper_args().is_some())
    }
}
