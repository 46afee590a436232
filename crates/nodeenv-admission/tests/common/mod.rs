//! Shared fixtures for admission integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::Arc;

use nodeenv_admission::admission::{
    AdmissionObject, Attributes, GroupResource, Interface, Operation, PluginInitializer,
};
use nodeenv_admission::cache::{NamespaceCache, ProjectCache};
use nodeenv_admission::client::StaticClusterClient;
use nodeenv_admission::plugin::PodNodeEnvironment;
use nodeenv_core::api::{Namespace, Pod, KUBE_PROJECT_NODE_SELECTOR, PROJECT_NODE_SELECTOR};
use nodeenv_core::selector::{self, NodeSelector};

pub fn sel(s: &str) -> NodeSelector {
    selector::parse(s).unwrap()
}

/// Running cache with one namespace whose project selector is `project`.
pub fn cache_with(namespace: &str, project: &str) -> Arc<ProjectCache> {
    let cache = Arc::new(ProjectCache::new(""));
    cache.upsert(Namespace::new(namespace).with_annotation(PROJECT_NODE_SELECTOR, project));
    cache.set_running(true);
    cache
}

/// Running cache with one opted-out namespace that still carries a project selector.
pub fn opted_out_cache(namespace: &str, project: &str) -> Arc<ProjectCache> {
    let cache = Arc::new(ProjectCache::new(""));
    cache.upsert(
        Namespace::new(namespace)
            .with_annotation(PROJECT_NODE_SELECTOR, project)
            .with_annotation(KUBE_PROJECT_NODE_SELECTOR, ""),
    );
    cache.set_running(true);
    cache
}

/// Plugin with `cache` and a static client injected.
pub fn plugin_with(cache: Arc<ProjectCache>) -> PodNodeEnvironment {
    let mut plugin = PodNodeEnvironment::new();
    let init = PluginInitializer::new(
        cache as Arc<dyn NamespaceCache>,
        Arc::new(StaticClusterClient::new("https://api.test:6443")),
    );
    init.initialize(&mut plugin as &mut dyn Interface);
    plugin
}

pub fn pod_create(namespace: &str, name: &str, node_selector: &str) -> Attributes {
    let pod = Pod::new(name, namespace).with_node_selector(sel(node_selector));
    Attributes::new(Operation::Create, GroupResource::core("pods"), namespace, name)
        .with_object(AdmissionObject::Pod(pod))
}

pub fn node_selector_of(attrs: &Attributes) -> NodeSelector {
    attrs.pod().expect("pod payload").spec.node_selector.clone()
}
