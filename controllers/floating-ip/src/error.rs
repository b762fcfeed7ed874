//! Controller-specific error types.
//!
//! This module defines error types specific to the floating IP controller
//! that are not covered by upstream library errors.

use crds::ParsePolicyError;
use digitalocean_client::DigitalOceanError;
use kube::Error as KubeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the floating IP controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// DigitalOcean API error
    #[error("DigitalOcean error: {0}")]
    DigitalOcean(#[from] DigitalOceanError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unknown node selector policy on a binding
    #[error("Invalid configuration: {0}")]
    InvalidPolicy(#[from] ParsePolicyError),

    /// Node selector that cannot be turned into a label query
    #[error("Invalid node selector: {0}")]
    InvalidSelector(String),

    /// Node provider ID that does not carry a droplet ID
    #[error("Invalid provider ID: {0}")]
    InvalidProviderId(String),

    /// Reconciliation attempt ran past its deadline
    #[error("Reconciliation timed out after {0:?}")]
    Timeout(Duration),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// True for defects in a binding's own spec. Retrying does not help until
    /// an operator edits the resource.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ControllerError::InvalidConfig(_)
                | ControllerError::InvalidPolicy(_)
                | ControllerError::InvalidSelector(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(
            ControllerError::InvalidPolicy(ParsePolicyError("Latest".to_string()))
                .is_configuration()
        );
        assert!(ControllerError::InvalidSelector("bad".to_string()).is_configuration());
        assert!(!ControllerError::InvalidProviderId("node1".to_string()).is_configuration());
        assert!(
            !ControllerError::DigitalOcean(DigitalOceanError::NotFound("1.2.3.4".to_string()))
                .is_configuration()
        );
    }
}
