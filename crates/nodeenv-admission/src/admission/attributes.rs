use std::fmt;

use nodeenv_core::api::Pod;
use nodeenv_core::error::{NodeEnvError, Result};

/// Admission operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl Operation {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "CREATE" => Ok(Operation::Create),
            "UPDATE" => Ok(Operation::Update),
            "DELETE" => Ok(Operation::Delete),
            "CONNECT" => Ok(Operation::Connect),
            other => Err(NodeEnvError::BadRequest(format!("unknown operation: {other}"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
        }
    }
}

/// API group + resource, e.g. `("", "pods")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn new(group: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Resource in the core ("") API group.
    pub fn core(resource: &str) -> Self {
        Self::new("", resource)
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.group)
        }
    }
}

/// Request payload, narrowed at the boundary.
/// Only `Pod` is ever inspected by policy code.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionObject {
    Pod(Pod),
    /// Any other object; carries the kind for logging.
    Other(String),
}

/// Everything an admission plugin may look at for one request.
#[derive(Debug, Clone)]
pub struct Attributes {
    name: String,
    namespace: String,
    resource: GroupResource,
    subresource: String,
    operation: Operation,
    object: Option<AdmissionObject>,
}

impl Attributes {
    pub fn new(operation: Operation, resource: GroupResource, namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            resource,
            subresource: String::new(),
            operation,
            object: None,
        }
    }

    pub fn with_subresource(mut self, subresource: &str) -> Self {
        self.subresource = subresource.to_string();
        self
    }

    pub fn with_object(mut self, object: AdmissionObject) -> Self {
        self.object = Some(object);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
    pub fn resource(&self) -> &GroupResource {
        &self.resource
    }
    pub fn subresource(&self) -> &str {
        &self.subresource
    }
    pub fn operation(&self) -> Operation {
        self.operation
    }
    pub fn object(&self) -> Option<&AdmissionObject> {
        self.object.as_ref()
    }

    pub fn pod(&self) -> Option<&Pod> {
        match &self.object {
            Some(AdmissionObject::Pod(pod)) => Some(pod),
            _ => None,
        }
    }

    pub fn pod_mut(&mut self) -> Option<&mut Pod> {
        match &mut self.object {
            Some(AdmissionObject::Pod(pod)) => Some(pod),
            _ => None,
        }
    }
}
