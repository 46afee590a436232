#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use nodeenv_admission::config;
use nodeenv_admission::plugin::nodeenv::PLUGIN_NAME;
use nodeenv_core::NodeEnvError;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
project_cache:
  default_node_selectr: "region=primary" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.status_reason().as_str(), "BadRequest");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8443");
    assert_eq!(cfg.admission.plugins, vec![PLUGIN_NAME.to_string()]);
    assert!(cfg.project_cache.namespaces.is_empty());
}

#[test]
fn ok_full_config() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9443"
cluster:
  api_server: "https://api.example:6443"
project_cache:
  default_node_selector: "region=primary"
  namespaces:
    - name: "team-a"
      annotations:
        openshift.io/node-selector: "zone=east"
    - name: "infra"
      annotations:
        scheduler.alpha.kubernetes.io/node-selector: "role=infra"
admission:
  plugins: ["scheduling.openshift.io/OriginPodNodeEnvironment"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.cluster.api_server, "https://api.example:6443");
    assert_eq!(cfg.project_cache.namespaces.len(), 2);
    let ns = cfg.project_cache.namespaces[1].to_namespace();
    assert!(ns.opts_out());
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert!(matches!(err, NodeEnvError::UnsupportedVersion(2)));
}

#[test]
fn invalid_listen_address() {
    let bad = "version: 1\nserver:\n  listen: \"not-an-addr\"\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn invalid_default_node_selector() {
    let bad = "version: 1\nproject_cache:\n  default_node_selector: \"region!=primary\"\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("default_node_selector"));
}

#[test]
fn duplicate_namespace_seed() {
    let bad = r#"
version: 1
project_cache:
  namespaces:
    - name: "a"
    - name: "a"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn invalid_namespace_selector_annotation() {
    let bad = r#"
version: 1
project_cache:
  namespaces:
    - name: "a"
      annotations:
        openshift.io/node-selector: "zone"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn empty_plugin_list() {
    let bad = "version: 1\nadmission:\n  plugins: []\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn unregistered_plugin_name() {
    let bad = "version: 1\nadmission:\n  plugins: [\"scheduling.openshift.io/NoSuchPlugin\"]\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.status_reason().as_str(), "BadRequest");
    assert!(err.to_string().contains("unknown plugin"));
}
