//! Deployment metadata resources.
//!
//! Alongside the source artifacts, each pass writes a small set of metadata
//! resources at the output root describing the deployment: the role map,
//! the execution order, telemetry counters, and the platform record. All
//! content is rendered from ordered collections so repeated runs produce
//! byte-identical files. A metadata write failure degrades the resource, not
//! the pass.

use std::collections::BTreeMap;

use serde_json::json;

use crate::{output, pipeline::CompilationContext, session::DispatchSession};

pub const ROLE_MAP_FILE: &str = "role-map.json";
pub const EXECUTION_ORDER_FILE: &str = "execution-order.json";
pub const TELEMETRY_FILE: &str = "telemetry.json";
pub const PLATFORM_FILE: &str = "platform.json";
pub const ORCHESTRATOR_CLIENT_FILE: &str = "orchestrator-client.properties";

/// Write every metadata resource for the pass. Individual write failures are
/// reported as warnings and do not affect the remaining resources.
pub fn write_all(ctx: &mut CompilationContext, session: &DispatchSession) {
    let mut resources = vec![
        (ROLE_MAP_FILE, role_map(session)),
        (EXECUTION_ORDER_FILE, execution_order(ctx)),
        (TELEMETRY_FILE, telemetry(ctx, session)),
        (PLATFORM_FILE, platform(ctx)),
    ];
    if let Some(properties) = orchestrator_client_properties(ctx) {
        resources.push((ORCHESTRATOR_CLIENT_FILE, properties));
    }

    for (file_name, content) in resources {
        if let Err(err) = output::write_metadata(&ctx.output_root, file_name, &content) {
            ctx.add_warning(
                "dispatch",
                format!("failed to write metadata '{}': {:#}", file_name, err),
            );
        }
    }
}

/// Role directory name → sorted generated class names.
fn role_map(session: &DispatchSession) -> String {
    let map: BTreeMap<&str, Vec<&String>> = session
        .role_map()
        .iter()
        .map(|(role, names)| (role.dir_name(), names.iter().collect()))
        .collect();
    pretty(&json!(map))
}

/// Declared pipeline order, falling back to model order when no orchestrator
/// was built.
fn execution_order(ctx: &CompilationContext) -> String {
    let steps: Vec<&str> = match ctx.orchestrators.first() {
        Some(orchestrator) => orchestrator.step_order.iter().map(String::as_str).collect(),
        None => ctx
            .models
            .iter()
            .filter(|m| !m.side_effect)
            .map(|m| m.service_name.as_str())
            .collect(),
    };
    pretty(&json!({ "steps": steps }))
}

fn telemetry(ctx: &CompilationContext, session: &DispatchSession) -> String {
    pretty(&json!({
        "artifacts": session.rendered_count(),
        "errors": ctx.error_count(),
        "steps": ctx.models.len(),
        "warnings": ctx.warning_count(),
    }))
}

fn platform(ctx: &CompilationContext) -> String {
    pretty(&json!({
        "module": ctx.module_name,
        "platform": ctx.platform.as_str(),
        "transport": ctx.transport.as_str(),
    }))
}

/// Connection properties for orchestrator clients; absent when no
/// orchestrator was built.
fn orchestrator_client_properties(ctx: &CompilationContext) -> Option<String> {
    let orchestrator = ctx.orchestrators.first()?;
    Some(format!(
        "orchestrator.package={}\norchestrator.service={}\norchestrator.transport={}\n",
        orchestrator.base_package, orchestrator.service_name, orchestrator.transport
    ))
}

fn pretty(value: &serde_json::Value) -> String {
    let mut rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    rendered.push('\n');
    rendered
}

#[cfg(test)]
mod tests {
    use flowgen_model::DeploymentRole;

    use super::*;
    use crate::input::CompilationInput;

    #[test]
    fn test_role_map_is_sorted() {
        let mut session = DispatchSession::new();
        session.record(DeploymentRole::PipelineServer, "com.acme.ZStep");
        session.record(DeploymentRole::PipelineServer, "com.acme.AStep");

        let rendered = role_map(&session);
        let a = rendered.find("AStep").expect("AStep present");
        let z = rendered.find("ZStep").expect("ZStep present");
        assert!(a < z);
    }

    #[test]
    fn test_orchestrator_properties_absent_without_orchestrator() {
        let ctx = CompilationContext::new(CompilationInput::default());
        assert!(orchestrator_client_properties(&ctx).is_none());
    }
}
