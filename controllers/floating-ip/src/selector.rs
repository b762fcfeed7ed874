//! Node selection.
//!
//! Picks the node a floating IP should point at from the candidate set of a
//! binding. Candidates are ordered by creation time (oldest first, ties keep
//! listing order) and the binding's policy picks one of them.

use crate::nodes::CandidateNode;
use crds::NodeSelectorPolicy;
use rand::Rng;

/// Choose one node from `candidates`.
///
/// `previous` is the name of the node the address was last assigned to. It
/// only matters for [`NodeSelectorPolicy::Random`], which keeps that node for
/// as long as it is still a candidate so the address does not move on every
/// reconciliation.
///
/// Returns `None` when there are no candidates.
pub fn select_node<R: Rng + ?Sized>(
    mut candidates: Vec<CandidateNode>,
    policy: NodeSelectorPolicy,
    previous: Option<&str>,
    rng: &mut R,
) -> Option<CandidateNode> {
    if candidates.is_empty() {
        return None;
    }

    // Stable sort
    candidates.sort_by(|a, b| a.creation_time.cmp(&b.creation_time));

    match policy {
        NodeSelectorPolicy::Newest => candidates.pop(),
        NodeSelectorPolicy::Oldest => Some(candidates.swap_remove(0)),
        NodeSelectorPolicy::Random => {
            if let Some(index) =
                previous.and_then(|name| candidates.iter().position(|c| c.name == name))
            {
                return Some(candidates.swap_remove(index));
            }
            let index = rng.gen_range(0..candidates.len());
            Some(candidates.swap_remove(index))
        }
    }
}
