//! `AdmissionReview` wire types and the request -> `Attributes` decode step.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

use nodeenv_core::api::Pod;
use nodeenv_core::error::{NodeEnvError, Result};
use nodeenv_core::selector::NodeSelector;

use crate::admission::{AdmissionObject, Attributes, GroupResource, Operation};

pub const API_VERSION: &str = "admission.k8s.io/v1";
pub const KIND: &str = "AdmissionReview";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

fn default_api_version() -> String {
    API_VERSION.into()
}
fn default_kind() -> String {
    KIND.into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionResource {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub resource: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,
    pub resource: GroupVersionResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<serde_json::Value>,
}

impl AdmissionRequest {
    /// Decode into framework attributes. Pods resources are narrowed to
    /// `AdmissionObject::Pod` when the payload decodes as a pod.
    pub fn to_attributes(&self) -> Result<Attributes> {
        let operation = Operation::parse(&self.operation)?;
        if self.resource.resource.is_empty() {
            return Err(NodeEnvError::BadRequest("request.resource.resource is empty".into()));
        }
        let resource = GroupResource::new(&self.resource.group, &self.resource.resource);

        let object = self.object.as_ref().map(|raw| {
            if resource == GroupResource::core("pods") {
                if let Ok(pod) = serde_json::from_value::<Pod>(raw.clone()) {
                    return AdmissionObject::Pod(pod);
                }
            }
            let kind = raw
                .get("kind")
                .and_then(|k| k.as_str())
                .unwrap_or("Unknown");
            AdmissionObject::Other(kind.to_string())
        });

        let mut namespace = self.namespace.clone();
        if namespace.is_empty() {
            if let Some(AdmissionObject::Pod(pod)) = &object {
                namespace = pod.metadata.namespace.clone();
            }
        }

        let mut attrs = Attributes::new(operation, resource, &namespace, &self.name)
            .with_subresource(self.sub_resource.as_deref().unwrap_or(""));
        if let Some(object) = object {
            attrs = attrs.with_object(object);
        }
        Ok(attrs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: u16,
    pub reason: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<String>,
}

impl AdmissionResponse {
    pub fn allow(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            allowed: true,
            ..Self::default()
        }
    }

    pub fn deny(uid: &str, err: &NodeEnvError) -> Self {
        let reason = err.status_reason();
        Self {
            uid: uid.to_string(),
            allowed: false,
            status: Some(Status {
                code: reason.http_code(),
                reason: reason.as_str().to_string(),
                message: err.to_string(),
            }),
            ..Self::default()
        }
    }

    /// Allow and replace `/spec/nodeSelector` with `node_selector`.
    pub fn patched(uid: &str, node_selector: &NodeSelector) -> Result<Self> {
        let ops = json!([{
            "op": "add",
            "path": "/spec/nodeSelector",
            "value": node_selector,
        }]);
        let bytes = serde_json::to_vec(&ops)
            .map_err(|e| NodeEnvError::Internal(format!("encode patch failed: {e}")))?;
        Ok(Self {
            uid: uid.to_string(),
            allowed: true,
            patch: Some(STANDARD.encode(bytes)),
            patch_type: Some("JSONPatch".into()),
            ..Self::default()
        })
    }
}

impl AdmissionReview {
    pub fn respond(api_version: &str, response: AdmissionResponse) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: KIND.into(),
            request: None,
            response: Some(response),
        }
    }
}
