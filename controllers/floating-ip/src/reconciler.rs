//! Reconciliation logic for FloatingIPBinding resources.
//!
//! One attempt loads the binding, lists the nodes matching its selector,
//! picks one according to its policy, resolves the droplet behind that node
//! and makes sure the floating IP points at it. Status is written only once
//! the address is known to point at the chosen droplet.

use crate::assignment::{AssignmentOutcome, ensure_assigned};
use crate::backoff::FibonacciBackoff;
use crate::bindings::BindingStore;
use crate::error::ControllerError;
use crate::identity::resolve_droplet_id;
use crate::nodes::{NodeLister, node_selector};
use crate::selector::select_node;
use crds::{FloatingIPBinding, FloatingIPBindingStatus};
use digitalocean_client::DigitalOceanClientTrait;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, warn};

const MIN_ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// Backoff state for a binding
#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

impl BackoffState {
    fn new(max: Duration) -> Self {
        Self {
            backoff: FibonacciBackoff::new(MIN_ERROR_BACKOFF, max),
            error_count: 0,
        }
    }

    fn increment_error(&mut self) {
        self.error_count += 1;
    }
}

/// How a successful attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The binding no longer exists. The floating IP is left where it is.
    Deleted,
    /// No node matches the binding's selector.
    NoCandidates,
    /// DigitalOcean reported another action in progress on the address.
    Pending { droplet_id: u64, node: String },
    /// The address points at the chosen node and status records it.
    Bound {
        droplet_id: u64,
        node: String,
        /// False when the address was already there
        changed: bool,
    },
}

impl ReconcileOutcome {
    /// What the controller should do next for this binding.
    pub fn action(&self, requeue_after: Duration) -> Action {
        match self {
            ReconcileOutcome::Deleted | ReconcileOutcome::Bound { .. } => Action::await_change(),
            ReconcileOutcome::NoCandidates | ReconcileOutcome::Pending { .. } => {
                Action::requeue(requeue_after)
            }
        }
    }
}

/// Reconciles FloatingIPBinding resources.
pub struct Reconciler {
    pub(crate) digitalocean_client: Box<dyn DigitalOceanClientTrait>,
    pub(crate) node_lister: Box<dyn NodeLister>,
    pub(crate) bindings: Box<dyn BindingStore>,
    /// Delay before re-checking a binding that is not ready, and the error backoff cap
    requeue_after: Duration,
    /// Deadline for one attempt
    reconcile_timeout: Duration,
    /// Error count tracking per binding (namespace/name -> BackoffState)
    backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl Reconciler {
    pub fn new(
        digitalocean_client: Box<dyn DigitalOceanClientTrait>,
        node_lister: Box<dyn NodeLister>,
        bindings: Box<dyn BindingStore>,
        requeue_after: Duration,
        reconcile_timeout: Duration,
    ) -> Self {
        Self {
            digitalocean_client,
            node_lister,
            bindings,
            requeue_after,
            reconcile_timeout,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reconcile a binding as delivered by the watcher.
    ///
    /// Bounds the attempt by the reconcile timeout and keeps the binding's
    /// error backoff up to date.
    pub async fn reconcile(&self, binding: &FloatingIPBinding) -> Result<Action, ControllerError> {
        let name = binding.name_any();
        let namespace = binding.namespace().unwrap_or_default();
        let resource_key = format!("{}/{}", namespace, name);

        let span = info_span!(
            "reconcile",
            binding = %resource_key,
            floating_ip = %binding.spec.floating_ip
        );
        let attempt = tokio::time::timeout(
            self.reconcile_timeout,
            self.reconcile_binding(&namespace, &name),
        )
        .instrument(span)
        .await;

        let result = match attempt {
            Ok(result) => result,
            Err(_) => Err(ControllerError::Timeout(self.reconcile_timeout)),
        };

        match result {
            Ok(outcome) => {
                self.reset_error(&resource_key);
                match &outcome {
                    ReconcileOutcome::Bound { droplet_id, node, changed: true } => info!(
                        "FloatingIPBinding {} moved {} to node {} (droplet {})",
                        resource_key, binding.spec.floating_ip, node, droplet_id
                    ),
                    ReconcileOutcome::Bound { droplet_id, node, changed: false } => debug!(
                        "FloatingIPBinding {} already on node {} (droplet {})",
                        resource_key, node, droplet_id
                    ),
                    ReconcileOutcome::Pending { droplet_id, node } => debug!(
                        "FloatingIPBinding {} waiting to move to node {} (droplet {})",
                        resource_key, node, droplet_id
                    ),
                    ReconcileOutcome::Deleted | ReconcileOutcome::NoCandidates => {}
                }
                Ok(outcome.action(self.requeue_after))
            }
            Err(e) => {
                self.increment_error(&resource_key);
                Err(e)
            }
        }
    }

    /// Run one reconciliation attempt for `namespace/name`.
    pub async fn reconcile_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReconcileOutcome, ControllerError> {
        let Some(binding) = self.bindings.get(namespace, name).await? else {
            info!("FloatingIPBinding {}/{} not found, nothing to do", namespace, name);
            return Ok(ReconcileOutcome::Deleted);
        };

        let ip = binding.spec.floating_ip.trim();
        if ip.is_empty() {
            return Err(ControllerError::InvalidConfig(format!(
                "FloatingIPBinding {}/{} has an empty floatingIP",
                namespace, name
            )));
        }
        let policy = binding.spec.policy()?;
        let selector = node_selector(binding.spec.node_selector.as_ref())?;

        let candidates = self.node_lister.list_nodes(&selector).await?;
        debug!(
            "Found {} candidate nodes for FloatingIPBinding {}/{}",
            candidates.len(),
            namespace,
            name
        );

        let previous = binding
            .status
            .as_ref()
            .and_then(|s| s.assigned_droplet_name.as_deref());
        let chosen = {
            let mut rng = rand::thread_rng();
            select_node(candidates, policy, previous, &mut rng)
        };

        let Some(node) = chosen else {
            info!(
                "No nodes match FloatingIPBinding {}/{}, retrying in {:?}",
                namespace, name, self.requeue_after
            );
            return Ok(ReconcileOutcome::NoCandidates);
        };

        let provider_id = node.provider_id.as_deref().ok_or_else(|| {
            ControllerError::InvalidProviderId(format!("node {} has no providerID", node.name))
        })?;
        let droplet_id = resolve_droplet_id(provider_id)?;
        debug!(policy = %policy, node = %node.name, droplet_id, "Selected node");

        let outcome = ensure_assigned(&*self.digitalocean_client, ip, droplet_id).await?;
        if outcome == AssignmentOutcome::PendingElsewhere {
            info!(
                node = %node.name,
                droplet_id,
                "Floating IP {} is busy, retrying in {:?}",
                ip,
                self.requeue_after
            );
            return Ok(ReconcileOutcome::Pending {
                droplet_id,
                node: node.name,
            });
        }

        let status = FloatingIPBindingStatus {
            assigned_droplet_id: Some(droplet_id),
            assigned_droplet_name: Some(node.name.clone()),
        };
        self.bindings.patch_status(namespace, name, &status).await?;

        Ok(ReconcileOutcome::Bound {
            droplet_id,
            node: node.name,
            changed: outcome == AssignmentOutcome::Assigned,
        })
    }

    /// Get the Fibonacci backoff for a binding and advance it
    ///
    /// Returns (backoff, error_count)
    pub fn get_backoff_for_resource(&self, resource_key: &str) -> (Duration, u32) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                let state = states
                    .entry(resource_key.to_string())
                    .or_insert_with(|| BackoffState::new(self.requeue_after));
                (state.backoff.next_backoff(), state.error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using default backoff", e);
                (MIN_ERROR_BACKOFF.min(self.requeue_after), 0)
            }
        }
    }

    /// Increment error count for a binding
    pub fn increment_error(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states
                .entry(resource_key.to_string())
                .or_insert_with(|| BackoffState::new(self.requeue_after))
                .increment_error();
        }
    }

    /// Drop a binding's error state (on successful reconciliation)
    ///
    /// Only bindings that are currently failing keep an entry, so nothing
    /// lingers once a binding recovers or is deleted.
    pub fn reset_error(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(resource_key);
        }
    }

    /// Number of bindings with error state
    #[cfg(test)]
    pub(crate) fn tracked_bindings(&self) -> usize {
        self.backoff_states.lock().map(|s| s.len()).unwrap_or_default()
    }
}
