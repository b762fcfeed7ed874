//! Mock DigitalOceanClient for unit testing
//!
//! Stores floating IPs in memory. Assign calls move the address to the
//! requested droplet unless the address has been marked as pending or a
//! failure has been queued. Every call is counted so tests can assert on
//! how many requests would have reached the API.

use crate::client;
use crate::digitalocean_trait::DigitalOceanClientTrait;
use crate::error::DigitalOceanError;
use crate::models::*;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock DigitalOceanClient for testing
#[derive(Clone, Debug, Default)]
pub struct MockDigitalOceanClient {
    base_url: String,
    floating_ips: Arc<Mutex<HashMap<String, FloatingIp>>>,
    pending: Arc<Mutex<HashSet<String>>>,
    fail_get: Arc<Mutex<Option<u16>>>,
    fail_assign: Arc<Mutex<Option<u16>>>,
    get_calls: Arc<Mutex<u32>>,
    assign_calls: Arc<Mutex<Vec<(String, u64)>>>,
    next_action_id: Arc<Mutex<u64>>,
}

impl MockDigitalOceanClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            next_action_id: Arc::new(Mutex::new(1)),
            ..Default::default()
        }
    }

    /// Add a floating IP that is not assigned to any droplet (for test setup)
    pub fn add_floating_ip(&self, ip: &str) {
        self.floating_ips.lock().unwrap().insert(
            ip.to_string(),
            FloatingIp {
                ip: ip.to_string(),
                droplet: None,
                region: Some(Region {
                    slug: "nyc3".to_string(),
                    name: "New York 3".to_string(),
                    available: true,
                }),
                locked: false,
                project_id: None,
            },
        );
    }

    /// Add a floating IP already assigned to a droplet (for test setup)
    pub fn add_assigned_floating_ip(&self, ip: &str, droplet_id: u64, droplet_name: &str) {
        self.add_floating_ip(ip);
        self.set_droplet(ip, droplet_id, droplet_name);
    }

    /// Point a floating IP at a droplet, as another actor would
    pub fn set_droplet(&self, ip: &str, droplet_id: u64, droplet_name: &str) {
        if let Some(record) = self.floating_ips.lock().unwrap().get_mut(ip) {
            record.droplet = Some(Droplet {
                id: droplet_id,
                name: droplet_name.to_string(),
                status: "active".to_string(),
            });
        }
    }

    /// Make assign calls for `ip` answer 422 until cleared
    pub fn set_pending(&self, ip: &str, pending: bool) {
        let mut set = self.pending.lock().unwrap();
        if pending {
            set.insert(ip.to_string());
        } else {
            set.remove(ip);
        }
    }

    /// Make every get call fail with the given HTTP status until cleared
    pub fn fail_get_with(&self, status: Option<u16>) {
        *self.fail_get.lock().unwrap() = status;
    }

    /// Make every assign call fail with the given HTTP status until cleared
    pub fn fail_assign_with(&self, status: Option<u16>) {
        *self.fail_assign.lock().unwrap() = status;
    }

    /// Droplet currently holding `ip`
    pub fn assigned_droplet(&self, ip: &str) -> Option<u64> {
        self.floating_ips.lock().unwrap().get(ip).and_then(FloatingIp::droplet_id)
    }

    /// Number of get calls made so far
    pub fn get_calls(&self) -> u32 {
        *self.get_calls.lock().unwrap()
    }

    /// Number of assign calls made so far, including rejected ones
    pub fn assign_calls(&self) -> usize {
        self.assign_calls.lock().unwrap().len()
    }

    /// Every assign call made so far as `(ip, droplet_id)`
    pub fn assign_requests(&self) -> Vec<(String, u64)> {
        self.assign_calls.lock().unwrap().clone()
    }

    fn next_action_id(&self) -> u64 {
        let mut id = self.next_action_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }
}

/// Same error the real client returns for a response with this status.
fn status_error(status: u16, what: String) -> DigitalOceanError {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    client::status_error(status, what)
}

#[async_trait::async_trait]
impl DigitalOceanClientTrait for MockDigitalOceanClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), DigitalOceanError> {
        Ok(())
    }

    async fn get_floating_ip(&self, ip: &str) -> Result<FloatingIp, DigitalOceanError> {
        *self.get_calls.lock().unwrap() += 1;

        if let Some(status) = *self.fail_get.lock().unwrap() {
            return Err(status_error(status, format!("floating IP {}", ip)));
        }

        self.floating_ips
            .lock()
            .unwrap()
            .get(ip)
            .cloned()
            .ok_or_else(|| DigitalOceanError::NotFound(format!("floating IP {}", ip)))
    }

    async fn assign_floating_ip(
        &self,
        ip: &str,
        droplet_id: u64,
    ) -> Result<Action, DigitalOceanError> {
        self.assign_calls.lock().unwrap().push((ip.to_string(), droplet_id));

        if let Some(status) = *self.fail_assign.lock().unwrap() {
            return Err(status_error(status, format!("floating IP {} assign", ip)));
        }
        if self.pending.lock().unwrap().contains(ip) {
            return Err(client::status_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("floating IP {} has a pending event", ip),
            ));
        }

        let mut ips = self.floating_ips.lock().unwrap();
        let record = ips
            .get_mut(ip)
            .ok_or_else(|| DigitalOceanError::NotFound(format!("floating IP {}", ip)))?;
        record.droplet = Some(Droplet {
            id: droplet_id,
            name: format!("droplet-{}", droplet_id),
            status: "active".to_string(),
        });
        drop(ips);

        Ok(Action {
            id: self.next_action_id(),
            status: "in-progress".to_string(),
            action_type: "assign_ip".to_string(),
            started_at: Some(chrono::Utc::now()),
            completed_at: None,
            resource_id: Some(droplet_id),
            resource_type: Some("floating_ip".to_string()),
            region_slug: Some("nyc3".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_assign_moves_address() {
        let mock = MockDigitalOceanClient::new("http://test-do");
        mock.add_floating_ip("1.2.3.4");

        mock.assign_floating_ip("1.2.3.4", 42).await.unwrap();

        assert_eq!(mock.assigned_droplet("1.2.3.4"), Some(42));
        assert_eq!(mock.assign_requests(), vec![("1.2.3.4".to_string(), 42)]);
    }

    #[tokio::test]
    async fn test_pending_leaves_address_alone() {
        let mock = MockDigitalOceanClient::new("http://test-do");
        mock.add_assigned_floating_ip("1.2.3.4", 1, "old");
        mock.set_pending("1.2.3.4", true);

        let err = mock.assign_floating_ip("1.2.3.4", 2).await.unwrap_err();

        assert!(err.is_pending());
        assert_eq!(mock.assigned_droplet("1.2.3.4"), Some(1));
        assert_eq!(mock.assign_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_address_is_not_found() {
        let mock = MockDigitalOceanClient::new("http://test-do");
        let err = mock.get_floating_ip("9.9.9.9").await.unwrap_err();
        assert!(matches!(err, DigitalOceanError::NotFound(_)));
        assert_eq!(mock.get_calls(), 1);
    }
}
