//! Built-in admission plugins.

pub mod nodeenv;

pub use nodeenv::PodNodeEnvironment;

use nodeenv_core::error::Result;

use crate::admission::Plugins;

/// Register every built-in plugin.
pub fn register_all(plugins: &Plugins) -> Result<()> {
    nodeenv::register(plugins)
}
