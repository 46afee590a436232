//! Cluster client handle injected into plugins.
//!
//! The node environment rule never calls the API server; the handle exists
//! because plugins receive it through the same injection path as the cache.

pub trait ClusterClient: Send + Sync {
    /// Base URL of the API server.
    fn api_server(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct StaticClusterClient {
    api_server: String,
}

impl StaticClusterClient {
    pub fn new(api_server: &str) -> Self {
        Self {
            api_server: api_server.to_string(),
        }
    }
}

impl ClusterClient for StaticClusterClient {
    fn api_server(&self) -> &str {
        &self.api_server
    }
}
