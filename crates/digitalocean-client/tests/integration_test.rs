//! Integration tests for the DigitalOcean client
//!
//! These tests require a DigitalOcean account.
//! Set DIGITALOCEAN_TOKEN (and optionally DIGITALOCEAN_API_URL) to run.
//! Set DIGITALOCEAN_FLOATING_IP to an address owned by the account for the
//! floating IP tests.

use digitalocean_client::{DigitalOceanClient, DigitalOceanError};

fn client() -> DigitalOceanClient {
    let url = std::env::var("DIGITALOCEAN_API_URL")
        .unwrap_or_else(|_| "https://api.digitalocean.com".to_string());
    let token = std::env::var("DIGITALOCEAN_TOKEN")
        .expect("DIGITALOCEAN_TOKEN environment variable must be set");

    DigitalOceanClient::new(url, token).expect("Failed to create client")
}

#[tokio::test]
#[ignore] // Requires a DigitalOcean account
async fn test_validate_token() {
    client().validate_token().await.expect("Token should be valid");
}

#[tokio::test]
#[ignore]
async fn test_invalid_token_is_authentication_error() {
    let url = std::env::var("DIGITALOCEAN_API_URL")
        .unwrap_or_else(|_| "https://api.digitalocean.com".to_string());
    let client = DigitalOceanClient::new(url, "not-a-real-token".to_string()).unwrap();

    let err = client.validate_token().await.unwrap_err();
    assert!(matches!(err, DigitalOceanError::Authentication(_)), "unexpected error: {}", err);
}

#[tokio::test]
#[ignore]
async fn test_get_floating_ip() {
    let ip = std::env::var("DIGITALOCEAN_FLOATING_IP")
        .expect("DIGITALOCEAN_FLOATING_IP environment variable must be set");

    let floating_ip = client().get_floating_ip(&ip).await
        .expect("Failed to get floating IP");

    assert_eq!(floating_ip.ip, ip);
    println!("Floating IP {} assigned to {:?}", ip, floating_ip.droplet_id());
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_floating_ip_is_not_found() {
    // TEST-NET-3, never allocated to an account
    let err = client().get_floating_ip("203.0.113.254").await.unwrap_err();
    assert!(matches!(err, DigitalOceanError::NotFound(_)), "unexpected error: {}", err);
}
