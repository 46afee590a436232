//! Admission framework surface.
//!
//! Plugins implement the base `Interface` and opt into further capabilities
//! (mutation, validation, dependency injection, readiness validation) through
//! the `as_*` accessors. Capabilities are separate traits so the chain and the
//! initializer only see what they need.

pub mod attributes;
pub mod chain;
pub mod plugins;

use std::sync::Arc;

use nodeenv_core::error::Result;

use crate::cache::NamespaceCache;
use crate::client::ClusterClient;

pub use attributes::{AdmissionObject, Attributes, GroupResource, Operation};
pub use chain::AdmissionChain;
pub use plugins::{PluginInitializer, Plugins};

/// Base plugin interface.
pub trait Interface: Send + Sync {
    /// Whether the plugin runs for this operation at all.
    fn handles(&self, operation: Operation) -> bool;

    fn as_mutator(&self) -> Option<&dyn MutationInterface> {
        None
    }
    fn as_validator(&self) -> Option<&dyn ValidationInterface> {
        None
    }
    fn as_initialization_validator(&self) -> Option<&dyn InitializationValidator> {
        None
    }
    fn as_namespace_cache_receiver(&mut self) -> Option<&mut dyn WantsNamespaceCache> {
        None
    }
    fn as_cluster_client_receiver(&mut self) -> Option<&mut dyn WantsClusterClient> {
        None
    }
}

/// Mutating phase: may rewrite the object in `attributes`.
pub trait MutationInterface: Send + Sync {
    fn admit(&self, attributes: &mut Attributes) -> Result<()>;
}

/// Validating phase: accept or reject only.
pub trait ValidationInterface: Send + Sync {
    fn validate(&self, attributes: &Attributes) -> Result<()>;
}

/// Refuses to run until required collaborators were injected.
pub trait InitializationValidator {
    fn validate_initialization(&self) -> Result<()>;
}

pub trait WantsNamespaceCache {
    fn set_namespace_cache(&mut self, cache: Arc<dyn NamespaceCache>);
}

pub trait WantsClusterClient {
    fn set_cluster_client(&mut self, client: Arc<dyn ClusterClient>);
}

/// Operation filter embedded by plugins.
#[derive(Debug, Clone)]
pub struct Handler {
    operations: Vec<Operation>,
}

impl Handler {
    pub fn new(operations: &[Operation]) -> Self {
        Self {
            operations: operations.to_vec(),
        }
    }

    pub fn handles(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }
}
