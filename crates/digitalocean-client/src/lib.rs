//! DigitalOcean REST API Client
//!
//! A small client for the parts of the DigitalOcean v2 API the floating IP
//! controller needs: reading a floating IP and assigning it to a droplet.
//!
//! # Example
//!
//! ```no_run
//! use digitalocean_client::{DigitalOceanClient, DigitalOceanClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DigitalOceanClient::new(
//!     "https://api.digitalocean.com".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! let ip = client.get_floating_ip("1.2.3.4").await?;
//! if ip.droplet_id() != Some(12345678) {
//!     client.assign_floating_ip("1.2.3.4", 12345678).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! An assign request made while another action on the same floating IP is
//! still running is answered with HTTP 422. That case is reported as
//! [`DigitalOceanError::Pending`] so callers can tell it apart from a real
//! failure.

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod digitalocean_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::DigitalOceanClient;
pub use digitalocean_trait::DigitalOceanClientTrait;
pub use error::DigitalOceanError;
pub use models::*;
#[cfg(feature = "test-util")]
pub use mock::MockDigitalOceanClient;
