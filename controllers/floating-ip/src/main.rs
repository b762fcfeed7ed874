//! Floating IP Controller
//!
//! Keeps each DigitalOcean floating IP declared by a `FloatingIPBinding`
//! assigned to one node picked from a labeled pool:
//! - Newest: the most recently created matching node
//! - Oldest: the least recently created matching node
//! - Random: any matching node, kept while it stays eligible
//!
//! Node churn re-evaluates every binding, so the address follows the pool.

mod assignment;
mod backoff;
mod bindings;
mod config;
mod controller;
mod error;
mod identity;
mod nodes;
mod reconciler;
mod selector;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Floating IP Controller");

    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  DigitalOcean API URL: {}", config.api_url);
    info!(
        "  Namespace: {}",
        config.namespace.as_deref().unwrap_or("all namespaces")
    );
    info!("  Requeue after: {:?}", config.requeue_after);
    info!("  Reconcile timeout: {:?}", config.reconcile_timeout);
    info!("  Concurrency: {}", config.concurrency);

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
