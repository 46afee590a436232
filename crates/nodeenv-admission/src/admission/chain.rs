//! Ordered plugin chain: every mutator runs before any validator.

use std::sync::Arc;

use nodeenv_core::error::Result;

use super::plugins::{validate_initialization, PluginInitializer, Plugins};
use super::{Attributes, Interface};

struct NamedPlugin {
    name: String,
    plugin: Arc<dyn Interface>,
}

/// Initialized, validated plugins in configuration order.
#[derive(Clone, Default)]
pub struct AdmissionChain {
    plugins: Arc<Vec<NamedPlugin>>,
}

impl AdmissionChain {
    /// Instantiate, inject and validate each named plugin.
    pub fn new_from_plugins(
        registry: &Plugins,
        names: &[String],
        initializer: &PluginInitializer,
    ) -> Result<Self> {
        let mut plugins = Vec::with_capacity(names.len());
        for name in names {
            let mut plugin = registry.new_plugin(name)?;
            initializer.initialize(&mut *plugin);
            validate_initialization(name, &*plugin)?;
            tracing::info!(plugin = %name, "admission plugin enabled");
            plugins.push(NamedPlugin {
                name: name.clone(),
                plugin: Arc::from(plugin),
            });
        }
        Ok(Self {
            plugins: Arc::new(plugins),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    /// Mutating phase. Stops at the first rejection.
    pub fn admit(&self, attributes: &mut Attributes) -> Result<()> {
        for p in self.plugins.iter() {
            if !p.plugin.handles(attributes.operation()) {
                continue;
            }
            if let Some(m) = p.plugin.as_mutator() {
                m.admit(attributes)?;
            }
        }
        Ok(())
    }

    /// Validating phase. Stops at the first rejection.
    pub fn validate(&self, attributes: &Attributes) -> Result<()> {
        for p in self.plugins.iter() {
            if !p.plugin.handles(attributes.operation()) {
                continue;
            }
            if let Some(v) = p.plugin.as_validator() {
                v.validate(attributes)?;
            }
        }
        Ok(())
    }
}
