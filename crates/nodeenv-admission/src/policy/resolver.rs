use nodeenv_core::error::Result;
use nodeenv_core::selector::NodeSelector;

use crate::cache::NamespaceCache;

/// Per-request view of a namespace's node placement policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespacePolicy {
    /// Namespace manages its own node selector; the rule does not apply.
    pub opt_out: bool,
    /// Effective default selector. Left empty when `opt_out` is set.
    pub default_selector: NodeSelector,
}

/// Resolve the policy of `namespace` from the cache.
///
/// Fails with `NotFound` when the namespace is unknown and with `Resolution`
/// when its selector cannot be derived. Callers check `cache.running()` first.
pub fn resolve(cache: &dyn NamespaceCache, namespace: &str) -> Result<NamespacePolicy> {
    let ns = cache.get_namespace(namespace)?;

    if ns.opts_out() {
        return Ok(NamespacePolicy {
            opt_out: true,
            default_selector: NodeSelector::new(),
        });
    }

    Ok(NamespacePolicy {
        opt_out: false,
        default_selector: cache.node_selector_map(&ns)?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::cache::ProjectCache;
    use nodeenv_core::api::{Namespace, KUBE_PROJECT_NODE_SELECTOR, PROJECT_NODE_SELECTOR};
    use nodeenv_core::NodeEnvError;

    #[test]
    fn opt_out_skips_selector_derivation() {
        let cache = ProjectCache::new("");
        // Unparsable selector would fail derivation if it were attempted.
        cache.upsert(
            Namespace::new("infra")
                .with_annotation(KUBE_PROJECT_NODE_SELECTOR, "role=infra")
                .with_annotation(PROJECT_NODE_SELECTOR, "not a selector"),
        );
        let policy = resolve(&cache, "infra").unwrap();
        assert!(policy.opt_out);
        assert!(policy.default_selector.is_empty());
    }

    #[test]
    fn unknown_namespace_is_not_found() {
        let cache = ProjectCache::new("");
        assert!(matches!(
            resolve(&cache, "ghost").unwrap_err(),
            NodeEnvError::NotFound { .. }
        ));
    }

    #[test]
    fn default_selector_falls_back_to_cluster_default() {
        let cache = ProjectCache::new("region=primary");
        cache.upsert(Namespace::new("team-a"));
        let policy = resolve(&cache, "team-a").unwrap();
        assert!(!policy.opt_out);
        assert_eq!(policy.default_selector.get("region").map(String::as_str), Some("primary"));
    }
}
