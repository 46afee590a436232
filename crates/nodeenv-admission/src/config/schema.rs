use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;

use serde::Deserialize;

use nodeenv_core::api::{Namespace, ObjectMeta, PROJECT_NODE_SELECTOR};
use nodeenv_core::error::{NodeEnvError, Result};
use nodeenv_core::selector;

use crate::admission::Plugins;
use crate::plugin::{self, nodeenv::PLUGIN_NAME};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub cluster: ClusterSection,

    #[serde(default)]
    pub project_cache: ProjectCacheSection,

    #[serde(default)]
    pub admission: AdmissionSection,
}

impl AdmissionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(NodeEnvError::UnsupportedVersion(self.version));
        }

        self.server.validate()?;
        self.project_cache.validate()?;
        self.admission.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|_| {
            NodeEnvError::BadRequest(format!(
                "server.listen must be a socket address, got {:?}",
                self.listen
            ))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8443".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSection {
    #[serde(default = "default_api_server")]
    pub api_server: String,
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            api_server: default_api_server(),
        }
    }
}

fn default_api_server() -> String {
    "https://kubernetes.default.svc".into()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectCacheSection {
    /// Cluster-wide selector for namespaces without their own annotation.
    #[serde(default)]
    pub default_node_selector: String,

    #[serde(default)]
    pub namespaces: Vec<NamespaceSeed>,
}

impl ProjectCacheSection {
    pub fn validate(&self) -> Result<()> {
        selector::parse(&self.default_node_selector).map_err(|e| {
            NodeEnvError::BadRequest(format!("project_cache.default_node_selector: {e}"))
        })?;

        let mut seen = HashSet::new();
        for ns in &self.namespaces {
            if ns.name.trim().is_empty() {
                return Err(NodeEnvError::BadRequest(
                    "project_cache.namespaces[].name must not be empty".into(),
                ));
            }
            if !seen.insert(ns.name.as_str()) {
                return Err(NodeEnvError::BadRequest(format!(
                    "project_cache.namespaces: duplicate namespace {}",
                    ns.name
                )));
            }
            if let Some(raw) = ns.annotations.get(PROJECT_NODE_SELECTOR) {
                selector::parse(raw).map_err(|e| {
                    NodeEnvError::BadRequest(format!("namespace {}: {e}", ns.name))
                })?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceSeed {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl NamespaceSeed {
    pub fn to_namespace(&self) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: self.name.clone(),
                labels: self.labels.clone(),
                annotations: self.annotations.clone(),
                ..ObjectMeta::default()
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionSection {
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,
}

impl Default for AdmissionSection {
    fn default() -> Self {
        Self {
            plugins: default_plugins(),
        }
    }
}

impl AdmissionSection {
    pub fn validate(&self) -> Result<()> {
        if self.plugins.is_empty() {
            return Err(NodeEnvError::BadRequest(
                "admission.plugins must not be empty".into(),
            ));
        }
        let registry = Plugins::new();
        plugin::register_all(&registry)?;

        let mut seen = HashSet::new();
        for p in &self.plugins {
            if !seen.insert(p.as_str()) {
                return Err(NodeEnvError::BadRequest(format!(
                    "admission.plugins: {p} listed twice"
                )));
            }
            if !registry.is_registered(p) {
                return Err(NodeEnvError::BadRequest(format!(
                    "admission.plugins: unknown plugin {p} (registered: {})",
                    registry.registered().join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn default_plugins() -> Vec<String> {
    vec![PLUGIN_NAME.to_string()]
}
