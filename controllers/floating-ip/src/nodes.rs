//! Candidate node listing.
//!
//! A binding's `nodeSelector` is validated and converted into a
//! [`Selector`], which is sent as the `labelSelector` of the node list call.
//! The listed nodes are reduced to the fields selection needs.

use crate::error::ControllerError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::Api;
use kube::api::ListParams;
use kube::core::Selector;
use tracing::debug;

/// A node that may receive the floating IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateNode {
    pub name: String,
    /// `None` sorts before every known timestamp
    pub creation_time: Option<DateTime<Utc>>,
    /// `spec.providerID`, e.g. `digitalocean://123456`
    pub provider_id: Option<String>,
}

impl CandidateNode {
    pub fn from_node(node: &Node) -> Self {
        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            creation_time: node.metadata.creation_timestamp.as_ref().map(|t| t.0),
            provider_id: node.spec.as_ref().and_then(|s| s.provider_id.clone()),
        }
    }
}

/// Convert a binding's selector into a label query. `None` selects everything.
///
/// `In` and `NotIn` need at least one value, `Exists` and `DoesNotExist` take
/// none, and every expression needs a key.
pub fn node_selector(selector: Option<&LabelSelector>) -> Result<Selector, ControllerError> {
    let Some(selector) = selector else {
        return Ok(Selector::default());
    };

    for expr in selector.match_expressions.iter().flatten() {
        if expr.key.is_empty() {
            return Err(ControllerError::InvalidSelector(
                "matchExpressions entry has an empty key".to_string(),
            ));
        }
        let has_values = expr.values.as_ref().is_some_and(|v| !v.is_empty());
        match expr.operator.as_str() {
            "In" | "NotIn" if !has_values => {
                return Err(ControllerError::InvalidSelector(format!(
                    "operator {} on key {} requires at least one value",
                    expr.operator, expr.key
                )));
            }
            "Exists" | "DoesNotExist" if has_values => {
                return Err(ControllerError::InvalidSelector(format!(
                    "operator {} on key {} does not take values",
                    expr.operator, expr.key
                )));
            }
            _ => {}
        }
    }

    Selector::try_from(selector.clone())
        .map_err(|e| ControllerError::InvalidSelector(e.to_string()))
}

/// Source of candidate nodes.
#[async_trait]
pub trait NodeLister: Send + Sync {
    /// List the nodes matching `selector`. No matches is an empty list, not an error.
    async fn list_nodes(&self, selector: &Selector) -> Result<Vec<CandidateNode>, ControllerError>;
}

/// Lists nodes from the Kubernetes API.
pub struct KubeNodeLister {
    api: Api<Node>,
}

impl KubeNodeLister {
    pub fn new(api: Api<Node>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl NodeLister for KubeNodeLister {
    async fn list_nodes(&self, selector: &Selector) -> Result<Vec<CandidateNode>, ControllerError> {
        let mut params = ListParams::default();
        if !selector.selects_all() {
            params = params.labels_from(selector);
        }

        let nodes = self.api.list(&params).await?;
        debug!("Listed {} nodes for selector {:?}", nodes.items.len(), selector.to_string());

        Ok(nodes.items.iter().map(CandidateNode::from_node).collect())
    }
}
