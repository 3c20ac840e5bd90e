//! Qualified type references.

use serde::{Deserialize, Serialize};

/// A reference to a type by its fully-qualified name.
///
/// The compiler never owns the type system it compiles against; every type it
/// touches (step implementations, delegates, mappers, domain I/O types) is
/// identified by a dotted qualified name and resolved through the symbol
/// table when structure is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    /// Create a type reference from a qualified name.
    pub fn new(qualified: impl Into<String>) -> Self {
        Self(qualified.into())
    }

    /// The fully-qualified name.
    pub fn qualified(&self) -> &str {
        &self.0
    }

    /// The simple (unqualified) name, i.e. the last dotted segment.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The package portion of the qualified name, empty for bare names.
    pub fn package(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name_and_package() {
        let ty = TypeRef::new("com.acme.enrich.EnrichService");
        assert_eq!(ty.simple_name(), "EnrichService");
        assert_eq!(ty.package(), "com.acme.enrich");
    }

    #[test]
    fn test_bare_name() {
        let ty = TypeRef::new("Order");
        assert_eq!(ty.simple_name(), "Order");
        assert_eq!(ty.package(), "");
    }
}
