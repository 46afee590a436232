//! Namespace (project) cache.
//!
//! The admission plugin only reads from it. Population and freshness belong
//! to whoever owns the cache (config seeding at startup, or a watcher).

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use nodeenv_core::api::{Namespace, PROJECT_NODE_SELECTOR};
use nodeenv_core::error::{NodeEnvError, Result};
use nodeenv_core::selector::{self, NodeSelector};

/// Read-only view the admission plugin needs.
pub trait NamespaceCache: Send + Sync {
    /// False until the cache has synced; callers fail open while false.
    fn running(&self) -> bool;

    fn get_namespace(&self, name: &str) -> Result<Namespace>;

    /// Effective default node selector of `namespace`.
    fn node_selector_map(&self, namespace: &Namespace) -> Result<NodeSelector>;
}

/// In-memory namespace cache with a cluster-wide default node selector.
#[derive(Debug, Default)]
pub struct ProjectCache {
    namespaces: DashMap<String, Namespace>,
    default_node_selector: String,
    running: AtomicBool,
}

impl ProjectCache {
    pub fn new(default_node_selector: &str) -> Self {
        Self {
            namespaces: DashMap::new(),
            default_node_selector: default_node_selector.to_string(),
            running: AtomicBool::new(false),
        }
    }

    pub fn default_node_selector(&self) -> &str {
        &self.default_node_selector
    }

    pub fn upsert(&self, namespace: Namespace) {
        self.namespaces
            .insert(namespace.name().to_string(), namespace);
    }

    pub fn remove(&self, name: &str) -> Option<Namespace> {
        self.namespaces.remove(name).map(|(_, ns)| ns)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Raw selector string for `namespace`: its own annotation when present
    /// (even if empty), otherwise the cluster default.
    pub fn node_selector<'a>(&'a self, namespace: &'a Namespace) -> &'a str {
        namespace
            .annotation(PROJECT_NODE_SELECTOR)
            .unwrap_or(&self.default_node_selector)
    }
}

impl NamespaceCache for ProjectCache {
    fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn get_namespace(&self, name: &str) -> Result<Namespace> {
        self.namespaces
            .get(name)
            .map(|r| r.value().clone())
            .ok_or_else(|| NodeEnvError::NotFound {
                kind: "namespaces",
                name: name.to_string(),
            })
    }

    fn node_selector_map(&self, namespace: &Namespace) -> Result<NodeSelector> {
        selector::parse(self.node_selector(namespace)).map_err(|e| {
            NodeEnvError::Resolution(format!("namespace {}: {e}", namespace.name()))
        })
    }
}
