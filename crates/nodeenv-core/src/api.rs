//! Minimal views of the Kubernetes objects this admission plugin reads.
//!
//! Only the fields the node environment rule needs are modelled. Unknown
//! fields in incoming JSON are ignored on decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::selector::NodeSelector;

/// Namespace annotation whose presence opts the namespace out of the rule.
/// Shared with the scheduler's own namespace node selector handling, so the
/// exact string is a wire contract.
pub const KUBE_PROJECT_NODE_SELECTOR: &str = "scheduler.alpha.kubernetes.io/node-selector";

/// Namespace annotation carrying the project default node selector.
pub const PROJECT_NODE_SELECTOR: &str = "openshift.io/node-selector";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Namespace (project) record as held by the namespace cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                ..ObjectMeta::default()
            },
        }
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.metadata
            .annotations
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    /// True when the namespace manages its node selector through the
    /// scheduler annotation and must be left alone.
    pub fn opts_out(&self) -> bool {
        self.metadata
            .annotations
            .contains_key(KUBE_PROJECT_NODE_SELECTOR)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: NodeSelector,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
}

impl Pod {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
                ..ObjectMeta::default()
            },
            spec: PodSpec::default(),
        }
    }

    pub fn with_node_selector(mut self, node_selector: NodeSelector) -> Self {
        self.spec.node_selector = node_selector;
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn pod_decode_ignores_unrelated_fields() {
        let raw = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": "web-0", "namespace": "team-a", "uid": "abc" },
            "spec": {
                "containers": [{ "name": "web", "image": "nginx" }],
                "nodeSelector": { "zone": "east" }
            }
        });
        let pod: Pod = serde_json::from_value(raw).unwrap();
        assert_eq!(pod.name(), "web-0");
        assert_eq!(pod.metadata.namespace, "team-a");
        assert_eq!(pod.spec.node_selector.get("zone").map(String::as_str), Some("east"));
    }

    #[test]
    fn pod_without_spec_has_empty_selector() {
        let pod: Pod = serde_json::from_value(json!({ "metadata": { "name": "p" } })).unwrap();
        assert!(pod.spec.node_selector.is_empty());
    }

    #[test]
    fn opt_out_is_presence_based() {
        let ns = Namespace::new("infra").with_annotation(KUBE_PROJECT_NODE_SELECTOR, "");
        assert!(ns.opts_out());
        assert!(!Namespace::new("plain").opts_out());
    }
}
