//! Dispatch session state.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use flowgen_model::DeploymentRole;

/// Mutable state scoped to one generation-dispatch pass.
///
/// The session is created at the start of dispatch, passed by reference
/// through every target branch, and discarded when the pass ends. It carries
/// the two pieces of shared state dispatch needs: the side-effect bean dedup
/// set and the role metadata accumulator. Dispatch is single-threaded; a
/// concurrent dispatcher would need to gate the dedup set behind a lock.
#[derive(Debug, Default)]
pub struct DispatchSession {
    beans: HashSet<(String, String)>,
    roles: BTreeMap<DeploymentRole, BTreeSet<String>>,
    rendered: usize,
}

impl DispatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the side-effect bean for a (package, service) pair.
    ///
    /// Returns true on the first claim only. Multiple target branches (gRPC
    /// and REST) may both reach the same bean; only the first render wins.
    pub fn claim_bean(&mut self, package: &str, service_name: &str) -> bool {
        self.beans
            .insert((package.to_string(), service_name.to_string()))
    }

    /// Record a generated artifact's qualified name under its role.
    pub fn record(&mut self, role: DeploymentRole, qualified_name: impl Into<String>) {
        self.roles.entry(role).or_default().insert(qualified_name.into());
        self.rendered += 1;
    }

    /// Role → generated class names, for the role-map metadata resource.
    pub fn role_map(&self) -> &BTreeMap<DeploymentRole, BTreeSet<String>> {
        &self.roles
    }

    /// Number of artifacts rendered in this pass.
    pub fn rendered_count(&self) -> usize {
        self.rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_bean_once() {
        let mut session = DispatchSession::new();
        assert!(session.claim_bean("com.acme", "enrich"));
        assert!(!session.claim_bean("com.acme", "enrich"));
        // A different package is a different bean
        assert!(session.claim_bean("com.other", "enrich"));
    }

    #[test]
    fn test_role_map_accumulates() {
        let mut session = DispatchSession::new();
        session.record(DeploymentRole::PipelineServer, "com.acme.EnrichStep");
        session.record(DeploymentRole::PipelineServer, "com.acme.ScoreStep");
        session.record(DeploymentRole::OrchestratorClient, "com.acme.EnrichClient");

        assert_eq!(session.rendered_count(), 3);
        assert_eq!(
            session.role_map()[&DeploymentRole::PipelineServer].len(),
            2
        );
    }
}
