//! Kubernetes resource watchers.
//!
//! FloatingIPBinding changes trigger reconciliation of that binding. Any
//! Node change can alter the candidate set of every binding, so it triggers
//! reconciliation of all bindings known to the controller's cache.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::FloatingIPBinding;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Node;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{Controller, watcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// One reconcile request per binding.
pub fn bindings_to_requests(
    bindings: &[Arc<FloatingIPBinding>],
) -> Vec<ObjectRef<FloatingIPBinding>> {
    bindings.iter().map(|b| ObjectRef::from_obj(b.as_ref())).collect()
}

/// Requeue policy for failed attempts: the binding's Fibonacci backoff.
fn error_policy(
    binding: Arc<FloatingIPBinding>,
    error: &ControllerError,
    reconciler: Arc<Reconciler>,
) -> Action {
    let resource_key = format!(
        "{}/{}",
        binding.namespace().unwrap_or_default(),
        binding.name_any()
    );
    let (backoff, error_count) = reconciler.get_backoff_for_resource(&resource_key);

    if error.is_configuration() {
        warn!(
            "FloatingIPBinding {} is misconfigured (error #{}), retrying in {:?}: {}",
            resource_key, error_count, backoff, error
        );
    } else {
        error!(
            "Reconciliation error for FloatingIPBinding {} (error #{}), retrying in {:?}: {}",
            resource_key, error_count, backoff, error
        );
    }

    Action::requeue(backoff)
}

/// Watches Kubernetes resources for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    binding_api: Api<FloatingIPBinding>,
    node_api: Api<Node>,
    concurrency: u16,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        reconciler: Arc<Reconciler>,
        binding_api: Api<FloatingIPBinding>,
        node_api: Api<Node>,
        concurrency: u16,
    ) -> Self {
        Self {
            reconciler,
            binding_api,
            node_api,
            concurrency,
        }
    }

    /// Runs the FloatingIPBinding controller until a shutdown signal is received.
    pub async fn watch_bindings(self) -> Result<(), ControllerError> {
        info!("Starting FloatingIPBinding watcher");

        let reconcile = |binding: Arc<FloatingIPBinding>, reconciler: Arc<Reconciler>| async move {
            debug!(
                "Reconciling FloatingIPBinding {}/{}",
                binding.namespace().unwrap_or_default(),
                binding.name_any()
            );
            reconciler.reconcile(&binding).await
        };

        // Debounce batches bursts of node events into one pass over the bindings
        let controller_config = ControllerConfig::default()
            .debounce(Duration::from_secs(5))
            .concurrency(self.concurrency);

        let controller = Controller::new(self.binding_api, watcher::Config::default());
        let bindings = controller.store();

        controller
            .watches(self.node_api, watcher::Config::default(), move |node: Node| {
                let requests = bindings_to_requests(&bindings.state());
                debug!(
                    "Node {} changed, reconciling {} bindings",
                    node.name_any(),
                    requests.len()
                );
                requests
            })
            .with_config(controller_config)
            .shutdown_on_signal()
            .run(reconcile, error_policy, self.reconciler)
            .for_each(|res| async move {
                match res {
                    Ok((obj, _)) => debug!("Reconciled FloatingIPBinding {}", obj),
                    Err(e) => error!("Controller error for FloatingIPBinding: {}", e),
                }
            })
            .await;

        info!("FloatingIPBinding watcher stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_binding;

    #[test]
    fn test_every_binding_is_requested() {
        let bindings = vec![
            Arc::new(create_test_binding("ingress", "default", "1.2.3.4", None, None)),
            Arc::new(create_test_binding("ingress", "staging", "5.6.7.8", None, None)),
            Arc::new(create_test_binding("api", "default", "9.9.9.9", Some("Random"), None)),
        ];

        let requests = bindings_to_requests(&bindings);

        assert_eq!(
            requests,
            vec![
                ObjectRef::new("ingress").within("default"),
                ObjectRef::new("ingress").within("staging"),
                ObjectRef::new("api").within("default"),
            ]
        );
    }

    #[test]
    fn test_no_bindings_no_requests() {
        assert!(bindings_to_requests(&[]).is_empty());
    }
}
