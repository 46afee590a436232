//! Pod node environment admission plugin.
//!
//! Keeps a pod's node selector compatible with its namespace's default node
//! selector. The mutating phase merges the namespace selector into the pod;
//! the validating phase re-checks the same rule without mutating, so a later
//! mutator cannot reintroduce a conflict.

use std::sync::Arc;

use nodeenv_core::error::{NodeEnvError, Result};
use nodeenv_core::selector::{self, NodeSelector};

use crate::admission::{
    Attributes, Handler, InitializationValidator, Interface, MutationInterface, Operation,
    Plugins, ValidationInterface, WantsClusterClient, WantsNamespaceCache,
};
use crate::cache::NamespaceCache;
use crate::client::ClusterClient;
use crate::policy::{decide, AdmissionOutcome, PodRequest};

pub const PLUGIN_NAME: &str = "scheduling.openshift.io/OriginPodNodeEnvironment";

/// Register the plugin. The factory takes no configuration.
pub fn register(plugins: &Plugins) -> Result<()> {
    plugins.register(PLUGIN_NAME, || {
        Ok(Box::new(PodNodeEnvironment::new()) as Box<dyn Interface>)
    })
}

pub struct PodNodeEnvironment {
    handler: Handler,
    cache: Option<Arc<dyn NamespaceCache>>,
    client: Option<Arc<dyn ClusterClient>>,
}

impl Default for PodNodeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl PodNodeEnvironment {
    /// Unconfigured instance; inject a cache before use.
    pub fn new() -> Self {
        Self {
            handler: Handler::new(&[Operation::Create]),
            cache: None,
            client: None,
        }
    }

    pub fn client(&self) -> Option<&Arc<dyn ClusterClient>> {
        self.client.as_ref()
    }

    /// Run the rule; returns the replacement selector when the pod must change.
    fn evaluate(&self, attributes: &Attributes, mutation_allowed: bool) -> Result<Option<NodeSelector>> {
        let Some(request) = PodRequest::from_attributes(attributes) else {
            return Ok(None);
        };
        let cache = self.cache.as_ref().ok_or_else(|| {
            NodeEnvError::Configuration("project node environment plugin needs a project cache".into())
        })?;

        match decide(cache.as_ref(), &request, mutation_allowed)? {
            AdmissionOutcome::Allow => Ok(None),
            AdmissionOutcome::AllowWithMutation(merged) => {
                if selector::equals(&merged, request.node_selector) {
                    return Ok(None);
                }
                tracing::info!(
                    namespace = %request.namespace,
                    pod = %request.name,
                    node_selector = %selector::to_selector_string(&merged),
                    "applying project node selector"
                );
                Ok(Some(merged))
            }
            AdmissionOutcome::Deny(reason) => {
                tracing::warn!(
                    namespace = %request.namespace,
                    pod = %request.name,
                    %reason,
                    mutating = mutation_allowed,
                    "pod rejected by project node selector"
                );
                Err(NodeEnvError::forbidden(
                    &attributes.resource().to_string(),
                    request.name,
                    reason,
                ))
            }
        }
    }
}

impl Interface for PodNodeEnvironment {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }

    fn as_mutator(&self) -> Option<&dyn MutationInterface> {
        Some(self)
    }
    fn as_validator(&self) -> Option<&dyn ValidationInterface> {
        Some(self)
    }
    fn as_initialization_validator(&self) -> Option<&dyn InitializationValidator> {
        Some(self)
    }
    fn as_namespace_cache_receiver(&mut self) -> Option<&mut dyn WantsNamespaceCache> {
        Some(self)
    }
    fn as_cluster_client_receiver(&mut self) -> Option<&mut dyn WantsClusterClient> {
        Some(self)
    }
}

impl MutationInterface for PodNodeEnvironment {
    fn admit(&self, attributes: &mut Attributes) -> Result<()> {
        if let Some(merged) = self.evaluate(attributes, true)? {
            if let Some(pod) = attributes.pod_mut() {
                pod.spec.node_selector = merged;
            }
        }
        Ok(())
    }
}

impl ValidationInterface for PodNodeEnvironment {
    fn validate(&self, attributes: &Attributes) -> Result<()> {
        self.evaluate(attributes, false).map(|_| ())
    }
}

impl WantsNamespaceCache for PodNodeEnvironment {
    fn set_namespace_cache(&mut self, cache: Arc<dyn NamespaceCache>) {
        self.cache = Some(cache);
    }
}

impl WantsClusterClient for PodNodeEnvironment {
    fn set_cluster_client(&mut self, client: Arc<dyn ClusterClient>) {
        self.client = Some(client);
    }
}

impl InitializationValidator for PodNodeEnvironment {
    fn validate_initialization(&self) -> Result<()> {
        if self.cache.is_none() {
            return Err(NodeEnvError::Configuration(
                "project node environment plugin needs a project cache".into(),
            ));
        }
        Ok(())
    }
}
