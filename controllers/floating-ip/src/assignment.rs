//! Floating IP assignment.
//!
//! Reads where the address currently points and only asks DigitalOcean to
//! move it when that differs from the target. The read and the write are not
//! atomic: another actor may move the address in between, in which case the
//! API answers 422 and the outcome is [`AssignmentOutcome::PendingElsewhere`].

use digitalocean_client::{DigitalOceanClientTrait, DigitalOceanError};
use tracing::{debug, info};

/// Result of [`ensure_assigned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// Address already pointed at the droplet. Nothing was changed.
    AlreadyAssigned,
    /// Assign action accepted.
    Assigned,
    /// Another action on the address is in progress. Try again later.
    PendingElsewhere,
}

/// Make `ip` point at `droplet_id`, issuing at most one assign request.
pub async fn ensure_assigned(
    client: &dyn DigitalOceanClientTrait,
    ip: &str,
    droplet_id: u64,
) -> Result<AssignmentOutcome, DigitalOceanError> {
    let current = client.get_floating_ip(ip).await?;

    if current.droplet_id() == Some(droplet_id) {
        debug!("Floating IP {} already assigned to droplet {}", ip, droplet_id);
        return Ok(AssignmentOutcome::AlreadyAssigned);
    }

    match client.assign_floating_ip(ip, droplet_id).await {
        Ok(action) => {
            info!(
                "Assigned floating IP {} to droplet {} (was {:?}, action {} {})",
                ip,
                droplet_id,
                current.droplet_id(),
                action.id,
                action.status
            );
            Ok(AssignmentOutcome::Assigned)
        }
        Err(e) if e.is_pending() => {
            info!("Floating IP {} has an action in progress: {}", ip, e);
            Ok(AssignmentOutcome::PendingElsewhere)
        }
        Err(e) => Err(e),
    }
}
