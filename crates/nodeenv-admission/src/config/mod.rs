//! Admission service config loader (strict parsing).

pub mod schema;

use std::fs;

use nodeenv_core::error::{NodeEnvError, Result};

pub use schema::{
    AdmissionConfig, AdmissionSection, ClusterSection, NamespaceSeed, ProjectCacheSection,
    ServerSection,
};

pub fn load_from_file(path: &str) -> Result<AdmissionConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| NodeEnvError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AdmissionConfig> {
    let cfg: AdmissionConfig = serde_yaml::from_str(s)
        .map_err(|e| NodeEnvError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
