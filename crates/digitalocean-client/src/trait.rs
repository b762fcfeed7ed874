//! DigitalOceanClient trait for mocking
//!
//! This trait abstracts the DigitalOceanClient to enable mocking in unit tests.
//! The concrete DigitalOceanClient implements this trait, and tests can use mock implementations.

use crate::error::DigitalOceanError;
use crate::models::{Action, FloatingIp};

/// Trait for DigitalOcean API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait DigitalOceanClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), DigitalOceanError>;

    /// Fetch a floating IP by address.
    ///
    /// An unknown address is [`DigitalOceanError::NotFound`].
    async fn get_floating_ip(&self, ip: &str) -> Result<FloatingIp, DigitalOceanError>;

    /// Ask the API to assign a floating IP to a droplet.
    ///
    /// Returns the started action. A 422 answer (another action on the address
    /// is still running) is [`DigitalOceanError::Pending`].
    async fn assign_floating_ip(
        &self,
        ip: &str,
        droplet_id: u64,
    ) -> Result<Action, DigitalOceanError>;
}
