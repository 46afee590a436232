use nodeenv_core::error::{NodeEnvError, Result};
use nodeenv_core::selector::{self, NodeSelector};

use super::resolver;
use crate::admission::{Attributes, GroupResource};
use crate::cache::NamespaceCache;

pub const REASON_CONFLICT: &str =
    "pod node label selector conflicts with its project node label selector";
pub const REASON_NOT_EXTENDED: &str =
    "pod node label selector does not extend project node label selector";

/// Result of evaluating one pod against its namespace policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Allow,
    /// Replace the pod's node selector wholesale with this one.
    AllowWithMutation(NodeSelector),
    Deny(String),
}

/// The pod-shaped slice of an admission request the rule looks at.
#[derive(Debug, Clone, Copy)]
pub struct PodRequest<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
    pub node_selector: &'a NodeSelector,
}

impl<'a> PodRequest<'a> {
    /// Narrow a request to a pod request. `None` means the rule does not apply:
    /// not core `pods`, a pods subresource, or a payload that is not a pod.
    pub fn from_attributes(attributes: &'a Attributes) -> Option<Self> {
        if *attributes.resource() != GroupResource::core("pods") {
            return None;
        }
        if !attributes.subresource().is_empty() {
            return None;
        }
        let pod = attributes.pod()?;
        Some(Self {
            namespace: attributes.namespace(),
            name: pod.name(),
            node_selector: &pod.spec.node_selector,
        })
    }
}

/// Decide whether `request` may be admitted under its namespace policy.
///
/// Only a failure to derive the namespace selector is returned as `Err`;
/// every policy violation is a `Deny`.
pub fn decide(
    cache: &dyn NamespaceCache,
    request: &PodRequest<'_>,
    mutation_allowed: bool,
) -> Result<AdmissionOutcome> {
    if !cache.running() {
        tracing::warn!(
            namespace = %request.namespace,
            pod = %request.name,
            "namespace cache not synced; admitting pod without node selector policy"
        );
        return Ok(AdmissionOutcome::Allow);
    }

    let policy = match resolver::resolve(cache, request.namespace) {
        Ok(policy) => policy,
        Err(e @ NodeEnvError::Resolution(_)) => {
            tracing::error!(namespace = %request.namespace, error = %e, "node selector resolution failed");
            return Err(e);
        }
        Err(e) => return Ok(AdmissionOutcome::Deny(e.to_string())),
    };

    if policy.opt_out {
        tracing::debug!(namespace = %request.namespace, "namespace opted out of project node selector");
        return Ok(AdmissionOutcome::Allow);
    }

    // Must run before the size comparison below, which is only a subset
    // test when no shared key disagrees.
    if selector::conflicts(&policy.default_selector, request.node_selector) {
        return Ok(AdmissionOutcome::Deny(REASON_CONFLICT.to_string()));
    }

    let merged = selector::merge(&policy.default_selector, request.node_selector);

    if !mutation_allowed {
        if merged.len() != request.node_selector.len() {
            return Ok(AdmissionOutcome::Deny(REASON_NOT_EXTENDED.to_string()));
        }
        return Ok(AdmissionOutcome::Allow);
    }

    Ok(AdmissionOutcome::AllowWithMutation(merged))
}
