//! DigitalOcean API client
//!
//! Implements the floating IP endpoints of the DigitalOcean v2 REST API:
//! `GET /v2/floating_ips/{ip}` and `POST /v2/floating_ips/{ip}/actions`.

use crate::digitalocean_trait::DigitalOceanClientTrait;
use crate::error::DigitalOceanError;
use crate::models::*;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// DigitalOcean API client
pub struct DigitalOceanClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for DigitalOceanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitalOceanClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DigitalOceanClient {
    /// Create a new DigitalOcean client
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g., "https://api.digitalocean.com")
    /// * `token` - Personal access token
    pub fn new(base_url: String, token: String) -> Result<Self, DigitalOceanError> {
        if token.trim().is_empty() {
            return Err(DigitalOceanError::InvalidRequest("API token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DigitalOceanError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn floating_ip_url(&self, ip: &str) -> String {
        format!("{}/v2/floating_ips/{}", self.base_url, urlencoding::encode(ip))
    }

    /// Validate the API token by reading the account it belongs to.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and the API is reachable
    /// * `Err(DigitalOceanError)` - Token is invalid or the API is unreachable
    pub async fn validate_token(&self) -> Result<(), DigitalOceanError> {
        let url = format!("{}/v2/account", self.base_url);
        debug!("Validating DigitalOcean token and connectivity");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = check_status(response, "account").await?;
        let root: AccountRoot = response.json().await?;
        debug!(
            "Token validated for account {} ({})",
            root.account.uuid, root.account.status
        );
        Ok(())
    }

    /// Get a floating IP by address
    ///
    /// # Returns
    /// * `Ok(FloatingIp)` - The floating IP, with the droplet it is assigned to if any
    /// * `Err(DigitalOceanError::NotFound)` - The address does not exist in the account
    pub async fn get_floating_ip(&self, ip: &str) -> Result<FloatingIp, DigitalOceanError> {
        let url = self.floating_ip_url(ip);
        debug!("Fetching floating IP {} from DigitalOcean", ip);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = check_status(response, &format!("floating IP {}", ip)).await?;
        let body = response.text().await?;
        let root: FloatingIpRoot = serde_json::from_str(&body)?;
        Ok(root.floating_ip)
    }

    /// Assign a floating IP to a droplet
    ///
    /// # Returns
    /// * `Ok(Action)` - The assign action was accepted
    /// * `Err(DigitalOceanError::Pending)` - Another action on the floating IP is still running
    pub async fn assign_floating_ip(
        &self,
        ip: &str,
        droplet_id: u64,
    ) -> Result<Action, DigitalOceanError> {
        let url = format!("{}/actions", self.floating_ip_url(ip));
        debug!("Assigning floating IP {} to droplet {}", ip, droplet_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .json(&FloatingIpActionRequest::assign(droplet_id))
            .send()
            .await?;

        let response = check_status(response, &format!("floating IP {} assign", ip)).await?;
        let root: ActionRoot = response.json().await?;
        debug!(
            "Assign action {} for floating IP {} is {}",
            root.action.id, ip, root.action.status
        );
        Ok(root.action)
    }
}

/// Map non-2xx responses onto [`DigitalOceanError`].
async fn check_status(response: Response, what: &str) -> Result<Response, DigitalOceanError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, format!("{}: {}", what, error_message(&body))))
}

/// Error for a failed response with the given status.
///
/// 422 is how the API rejects an action on a floating IP that still has one
/// in progress, so it maps to [`DigitalOceanError::Pending`].
pub(crate) fn status_error(status: StatusCode, message: String) -> DigitalOceanError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DigitalOceanError::Authentication(format!("{} ({})", message, status))
        }
        StatusCode::NOT_FOUND => DigitalOceanError::NotFound(message),
        StatusCode::UNPROCESSABLE_ENTITY => DigitalOceanError::Pending(message),
        _ => DigitalOceanError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull the `message` out of an API error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message,
        _ => body.chars().take(500).collect(),
    }
}

#[async_trait::async_trait]
impl DigitalOceanClientTrait for DigitalOceanClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn validate_token(&self) -> Result<(), DigitalOceanError> {
        self.validate_token().await
    }

    async fn get_floating_ip(&self, ip: &str) -> Result<FloatingIp, DigitalOceanError> {
        self.get_floating_ip(ip).await
    }

    async fn assign_floating_ip(
        &self,
        ip: &str,
        droplet_id: u64,
    ) -> Result<Action, DigitalOceanError> {
        self.assign_floating_ip(ip, droplet_id).await
    }
}
