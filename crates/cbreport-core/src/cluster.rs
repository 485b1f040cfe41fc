//! Cluster topology lookups
//!
//! Rows only name their namespace and pod. Which node a pod ran on, and
//! whether all client pods shared one node, comes from the API objects
//! captured alongside the run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Label marking the pods that run benchmark clients
pub const CLIENT_LABEL: &str = "clusterbuster-client";

/// Resolves execution nodes for rows
pub trait NodeResolver {
    /// The node a pod ran on, if known
    fn node_for_pod(&self, namespace: &str, pod: &str) -> Option<String>;

    /// Whether every client pod ran on the same node
    fn clients_share_node(&self) -> bool;
}

/// A Kubernetes object recorded with the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiObject {
    pub kind: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub labels: Option<Map<String, Value>>,
}

impl ApiObject {
    pub fn is_pod(&self) -> bool {
        self.kind == "Pod"
    }

    /// Pods carrying a truthy client label
    pub fn is_client_pod(&self) -> bool {
        self.is_pod()
            && self
                .labels
                .as_ref()
                .and_then(|labels| labels.get(CLIENT_LABEL))
                .map(is_truthy)
                .unwrap_or(false)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// [`NodeResolver`] backed by the document's `api_objects`
#[derive(Debug, Clone, Default)]
pub struct ApiObjectIndex {
    pod_nodes: HashMap<(String, String), Option<String>>,
    same_node: bool,
}

impl ApiObjectIndex {
    /// Index the `api_objects` array of a run document
    pub fn from_document(document: &Value) -> Result<Self> {
        let raw = document
            .get("api_objects")
            .ok_or_else(|| Error::missing("api_objects", "run document"))?;
        let objects: Vec<ApiObject> = serde_json::from_value(raw.clone())
            .map_err(|e| Error::invalid("api_objects", "a list of API objects", e.to_string()))?;
        Self::new(&objects)
    }

    pub fn new(objects: &[ApiObject]) -> Result<Self> {
        let mut pod_nodes = HashMap::new();
        for object in objects.iter().filter(|o| o.is_pod()) {
            if let (Some(namespace), Some(name)) = (&object.namespace, &object.name) {
                // First match wins, as a linear scan would find it.
                pod_nodes
                    .entry((namespace.clone(), name.clone()))
                    .or_insert_with(|| object.node_name.clone());
            }
        }

        let mut client_node: Option<&str> = None;
        let mut same_node = true;
        for object in objects.iter().filter(|o| o.is_client_pod()) {
            let node = object.node_name.as_deref().ok_or_else(|| {
                Error::missing(
                    "nodeName",
                    format!(
                        "client pod {}/{}",
                        object.namespace.as_deref().unwrap_or(""),
                        object.name.as_deref().unwrap_or("")
                    ),
                )
            })?;
            match client_node {
                None => client_node = Some(node),
                Some(first) if first != node => {
                    same_node = false;
                    break;
                }
                Some(_) => {}
            }
        }

        debug!(pods = pod_nodes.len(), same_node, "Indexed API objects");
        Ok(Self { pod_nodes, same_node })
    }
}

impl NodeResolver for ApiObjectIndex {
    fn node_for_pod(&self, namespace: &str, pod: &str) -> Option<String> {
        self.pod_nodes
            .get(&(namespace.to_string(), pod.to_string()))
            .cloned()
            .flatten()
    }

    fn clients_share_node(&self) -> bool {
        self.same_node
    }
}
