//! Naming helpers for generated artifacts.

/// Convert a kebab-case or snake_case name to PascalCase
/// (e.g., "enrich-orders" -> "EnrichOrders")
pub fn to_pascal_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// The generated artifact class name for a step service name.
pub fn generated_step_name(service_name: &str) -> String {
    format!("{}Step", to_pascal_case(service_name))
}

/// The generated orchestrator service name for a module.
pub fn orchestrator_service_name(module: &str) -> String {
    format!("{}-orchestrator", module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("enrich"), "Enrich");
        assert_eq!(to_pascal_case("enrich-orders"), "EnrichOrders");
        assert_eq!(to_pascal_case("enrich_orders"), "EnrichOrders");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_generated_step_name() {
        assert_eq!(generated_step_name("enrich-orders"), "EnrichOrdersStep");
    }

    #[test]
    fn test_orchestrator_service_name() {
        assert_eq!(orchestrator_service_name("orders"), "orders-orchestrator");
    }
}
