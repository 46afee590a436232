//! Plugin registry and initializer.
//!
//! Factories take no configuration payload; collaborators are injected after
//! construction by `PluginInitializer`, then each plugin's readiness is
//! validated before it joins a chain.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use nodeenv_core::error::{NodeEnvError, Result};

use super::Interface;
use crate::cache::NamespaceCache;
use crate::client::ClusterClient;

/// Builds a fresh, unconfigured plugin instance.
pub type PluginFactory = Arc<dyn Fn() -> Result<Box<dyn Interface>> + Send + Sync>;

/// Registry of named plugin factories.
#[derive(Default)]
pub struct Plugins {
    factories: DashMap<String, PluginFactory>,
}

impl Plugins {
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Register a factory under `name`. Names are unique.
    pub fn register<F>(&self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Result<Box<dyn Interface>> + Send + Sync + 'static,
    {
        match self.factories.entry(name.to_string()) {
            Entry::Occupied(_) => Err(NodeEnvError::Configuration(format!(
                "admission plugin {name:?} was registered twice"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(factory));
                tracing::debug!(plugin = %name, "registered admission plugin");
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Instantiate the plugin registered under `name`.
    pub fn new_plugin(&self, name: &str) -> Result<Box<dyn Interface>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| {
                NodeEnvError::Configuration(format!("unknown admission plugin: {name}"))
            })?
            .value()
            .clone();
        factory()
    }
}

/// Injects shared collaborators into plugins that ask for them.
#[derive(Clone)]
pub struct PluginInitializer {
    cache: Arc<dyn NamespaceCache>,
    client: Arc<dyn ClusterClient>,
}

impl PluginInitializer {
    pub fn new(cache: Arc<dyn NamespaceCache>, client: Arc<dyn ClusterClient>) -> Self {
        Self { cache, client }
    }

    pub fn initialize(&self, plugin: &mut dyn Interface) {
        if let Some(p) = plugin.as_namespace_cache_receiver() {
            p.set_namespace_cache(Arc::clone(&self.cache));
        }
        if let Some(p) = plugin.as_cluster_client_receiver() {
            p.set_cluster_client(Arc::clone(&self.client));
        }
    }
}

/// Validate a plugin's initialization, if it checks one.
pub fn validate_initialization(name: &str, plugin: &dyn Interface) -> Result<()> {
    match plugin.as_initialization_validator() {
        Some(v) => v.validate_initialization().map_err(|e| {
            NodeEnvError::Configuration(format!("plugin {name} failed initialization: {e}"))
        }),
        None => Ok(()),
    }
}
