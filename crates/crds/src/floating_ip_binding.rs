//! FloatingIPBinding CRD
//!
//! Binds a DigitalOcean floating IP to one node chosen from a labeled pool.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "digitalocean.smirlwebs.com",
    version = "v1beta1",
    kind = "FloatingIPBinding",
    namespaced,
    status = "FloatingIPBindingStatus",
    shortname = "fipb",
    printcolumn = r#"{"name":"FLOATING_IP","type":"string","jsonPath":".spec.floatingIP"}"#,
    printcolumn = r#"{"name":"ASSIGNED_DROPLET_ID","type":"string","jsonPath":".status.assignedDropletID"}"#,
    printcolumn = r#"{"name":"ASSIGNED_DROPLET_NAME","type":"string","jsonPath":".status.assignedDropletName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct FloatingIPBindingSpec {
    /// The floating IP address to bind nodes to, e.g. "1.2.3.4"
    #[serde(rename = "floatingIP")]
    pub floating_ip: String,

    /// Optional label query over nodes. Absent matches every node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<LabelSelector>,

    /// Policy used to pick one node from those matching `nodeSelector`.
    /// One of "Newest", "Oldest" or "Random". Defaults to "Newest".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector_policy: Option<String>,
}

impl FloatingIPBindingSpec {
    /// Parses the stored policy string into a [`NodeSelectorPolicy`].
    ///
    /// An absent or empty value is the default policy. Anything else that is
    /// not a known policy is rejected rather than silently defaulted.
    pub fn policy(&self) -> Result<NodeSelectorPolicy, ParsePolicyError> {
        match self.node_selector_policy.as_deref() {
            None | Some("") => Ok(NodeSelectorPolicy::default()),
            Some(value) => value.parse(),
        }
    }
}

/// Observed state of a FloatingIPBinding
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FloatingIPBindingStatus {
    /// Droplet the floating IP was last assigned to
    #[serde(rename = "assignedDropletID", default, skip_serializing_if = "Option::is_none")]
    pub assigned_droplet_id: Option<u64>,

    /// Name of the node backing that droplet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_droplet_name: Option<String>,
}

/// How a node is chosen among the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelectorPolicy {
    /// Most recently created node
    #[default]
    Newest,
    /// Least recently created node
    Oldest,
    /// Any node, kept for as long as it stays a candidate
    Random,
}

impl NodeSelectorPolicy {
    /// The value as written in the CRD.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeSelectorPolicy::Newest => "Newest",
            NodeSelectorPolicy::Oldest => "Oldest",
            NodeSelectorPolicy::Random => "Random",
        }
    }
}

impl fmt::Display for NodeSelectorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown `nodeSelectorPolicy` value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid NodeSelectorPolicy: {0:?} (expected one of Newest, Oldest, Random)")]
pub struct ParsePolicyError(pub String);

impl FromStr for NodeSelectorPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Newest" => Ok(NodeSelectorPolicy::Newest),
            "Oldest" => Ok(NodeSelectorPolicy::Oldest),
            "Random" => Ok(NodeSelectorPolicy::Random),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}
