//! Shared application state for the admission service.
//!
//! Seeds the namespace cache, builds the plugin chain through the registry,
//! and injects collaborators. Startup errors are returned, never panicked.

use std::sync::Arc;

use nodeenv_core::error::Result;

use crate::admission::{AdmissionChain, PluginInitializer, Plugins};
use crate::cache::{NamespaceCache, ProjectCache};
use crate::client::StaticClusterClient;
use crate::config::AdmissionConfig;
use crate::obs::AdmissionMetrics;
use crate::plugin;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AdmissionConfig,
    cache: Arc<ProjectCache>,
    chain: AdmissionChain,
    metrics: AdmissionMetrics,
}

impl AppState {
    /// Build state with the cache seeded from config and marked synced.
    pub fn new(cfg: AdmissionConfig) -> Result<Self> {
        let cache = Arc::new(ProjectCache::new(&cfg.project_cache.default_node_selector));
        for seed in &cfg.project_cache.namespaces {
            cache.upsert(seed.to_namespace());
        }
        cache.set_running(true);
        tracing::info!(
            namespaces = cache.len(),
            default_node_selector = %cache.default_node_selector(),
            "project cache seeded"
        );
        Self::with_cache(cfg, cache)
    }

    /// Build state around a caller-owned cache (which may not be synced yet).
    pub fn with_cache(cfg: AdmissionConfig, cache: Arc<ProjectCache>) -> Result<Self> {
        let registry = Plugins::new();
        plugin::register_all(&registry)?;

        let client = Arc::new(StaticClusterClient::new(&cfg.cluster.api_server));
        let initializer = PluginInitializer::new(
            Arc::clone(&cache) as Arc<dyn NamespaceCache>,
            client,
        );
        let chain = AdmissionChain::new_from_plugins(&registry, &cfg.admission.plugins, &initializer)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                cache,
                chain,
                metrics: AdmissionMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &AdmissionConfig {
        &self.inner.cfg
    }

    pub fn cache(&self) -> &Arc<ProjectCache> {
        &self.inner.cache
    }

    pub fn chain(&self) -> &AdmissionChain {
        &self.inner.chain
    }

    pub fn metrics(&self) -> &AdmissionMetrics {
        &self.inner.metrics
    }

    pub fn is_ready(&self) -> bool {
        self.inner.cache.running()
    }

    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("nodeenv_cache_namespaces", self.inner.cache.len() as u64),
            ("nodeenv_cache_running", u64::from(self.is_ready())),
        ]
    }
}
