//! Droplet identity from a node's provider ID.

use crate::error::ControllerError;

/// Extract the droplet ID from a provider ID such as `digitalocean://123456`.
///
/// The ID is whatever follows the last `//`, and must be a non-empty unsigned
/// integer.
pub fn resolve_droplet_id(provider_id: &str) -> Result<u64, ControllerError> {
    let (_, id) = provider_id.rsplit_once("//").ok_or_else(|| {
        ControllerError::InvalidProviderId(format!("{:?} has no \"//\" separator", provider_id))
    })?;

    if id.is_empty() {
        return Err(ControllerError::InvalidProviderId(format!(
            "{:?} has no droplet ID after \"//\"",
            provider_id
        )));
    }

    id.parse::<u64>().map_err(|e| {
        ControllerError::InvalidProviderId(format!(
            "{:?}: droplet ID {:?} is not numeric: {}",
            provider_id, id, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_droplet_id() {
        assert_eq!(resolve_droplet_id("foo://987").unwrap(), 987);
        assert_eq!(resolve_droplet_id("digitalocean://123456").unwrap(), 123456);
        assert_eq!(resolve_droplet_id("a//b//42").unwrap(), 42);
    }

    #[test]
    fn test_resolve_rejects_malformed() {
        for provider_id in [
            "malformed",
            "digitalocean://",
            "digitalocean://abc",
            "digitalocean://-5",
            "",
        ] {
            let err = resolve_droplet_id(provider_id).unwrap_err();
            assert!(
                matches!(err, ControllerError::InvalidProviderId(_)),
                "{:?} should be rejected",
                provider_id
            );
        }
    }
}
