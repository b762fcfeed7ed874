//! DigitalOcean API models
//!
//! These models cover the subset of the v2 API used by the controller.
//! Unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Floating IP object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloatingIp {
    pub ip: String,
    /// Droplet currently holding the address, if any
    #[serde(default)]
    pub droplet: Option<Droplet>,
    #[serde(default)]
    pub region: Option<Region>,
    /// True while an action on the floating IP is in progress
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl FloatingIp {
    /// ID of the droplet the address is assigned to.
    pub fn droplet_id(&self) -> Option<u64> {
        self.droplet.as_ref().map(|d| d.id)
    }
}

/// Droplet, as embedded in a floating IP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Droplet {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub available: bool,
}

/// Action started by a floating IP action request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub id: u64,
    /// "in-progress", "completed" or "errored"
    pub status: String,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource_id: Option<u64>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub region_slug: Option<String>,
}

/// Account the token belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub droplet_limit: u32,
    #[serde(default)]
    pub floating_ip_limit: u32,
}

/// Body of `POST /v2/floating_ips/{ip}/actions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FloatingIpActionRequest {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub droplet_id: Option<u64>,
}

impl FloatingIpActionRequest {
    /// Request to assign the floating IP to a droplet
    pub fn assign(droplet_id: u64) -> Self {
        Self {
            action_type: "assign".to_string(),
            droplet_id: Some(droplet_id),
        }
    }
}

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

// Response envelopes

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FloatingIpRoot {
    pub floating_ip: FloatingIp,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ActionRoot {
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountRoot {
    pub account: Account,
}
