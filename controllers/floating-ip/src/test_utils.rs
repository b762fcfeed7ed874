//! Test utilities for unit testing the reconciler
//!
//! This module provides builders for bindings and nodes, plus in-memory
//! stand-ins for the node lister and the binding store. Every fake is cheap to
//! clone and shares its state with its clones, so a test can hand one clone to
//! the reconciler and inspect another.

use crate::bindings::BindingStore;
use crate::error::ControllerError;
use crate::nodes::{CandidateNode, NodeLister};
use crate::reconciler::Reconciler;
use async_trait::async_trait;
use crds::*;
use digitalocean_client::MockDigitalOceanClient;
use k8s_openapi::api::core::v1::{Node, NodeSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::core::{Selector, SelectorExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_REQUEUE_AFTER: Duration = Duration::from_secs(300);

/// Helper to create a test FloatingIPBinding CRD
pub fn create_test_binding(
    name: &str,
    namespace: &str,
    floating_ip: &str,
    policy: Option<&str>,
    node_selector: Option<LabelSelector>,
) -> FloatingIPBinding {
    FloatingIPBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: FloatingIPBindingSpec {
            floating_ip: floating_ip.to_string(),
            node_selector,
            node_selector_policy: policy.map(|p| p.to_string()),
        },
        status: None,
    }
}

/// Helper to create a test Node
///
/// `created` is an RFC 3339 timestamp.
pub fn create_test_node(
    name: &str,
    created: Option<&str>,
    provider_id: Option<&str>,
    labels: &[(&str, &str)],
) -> Node {
    let mut node: Node = serde_json::from_value(serde_json::json!({
        "metadata": {
            "name": name,
            "creationTimestamp": created,
        }
    }))
    .unwrap();

    node.metadata.labels = Some(
        labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    node.spec = Some(NodeSpec {
        provider_id: provider_id.map(|p| p.to_string()),
        ..Default::default()
    });
    node
}

/// In-memory node lister
#[derive(Clone, Default)]
pub struct FakeNodeLister {
    nodes: Arc<Mutex<Vec<Node>>>,
    fail: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeNodeLister {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes: Arc::new(Mutex::new(nodes)),
            ..Default::default()
        }
    }

    pub fn set_nodes(&self, nodes: Vec<Node>) {
        *self.nodes.lock().unwrap() = nodes;
    }

    /// Make every list call fail until cleared
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Make every list call take at least `delay`
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Label queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeLister for FakeNodeLister {
    async fn list_nodes(&self, selector: &Selector) -> Result<Vec<CandidateNode>, ControllerError> {
        self.calls.lock().unwrap().push(selector.to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail.lock().unwrap() {
            return Err(ControllerError::Watch("node list failed".to_string()));
        }

        let empty = BTreeMap::new();
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| selector.matches(n.metadata.labels.as_ref().unwrap_or(&empty)))
            .map(CandidateNode::from_node)
            .collect())
    }
}

/// In-memory binding store
#[derive(Clone, Default)]
pub struct FakeBindingStore {
    bindings: Arc<Mutex<HashMap<String, FloatingIPBinding>>>,
    status_patches: Arc<Mutex<Vec<(String, FloatingIPBindingStatus)>>>,
    fail_status: Arc<Mutex<bool>>,
}

impl FakeBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding(&self, binding: FloatingIPBinding) {
        let key = format!(
            "{}/{}",
            binding.metadata.namespace.as_deref().unwrap_or_default(),
            binding.metadata.name.as_deref().unwrap_or_default()
        );
        self.bindings.lock().unwrap().insert(key, binding);
    }

    /// Make every status patch fail until cleared
    pub fn set_fail_status(&self, fail: bool) {
        *self.fail_status.lock().unwrap() = fail;
    }

    /// Current status of a stored binding
    pub fn status(&self, namespace: &str, name: &str) -> Option<FloatingIPBindingStatus> {
        self.bindings
            .lock()
            .unwrap()
            .get(&format!("{}/{}", namespace, name))
            .and_then(|b| b.status.clone())
    }

    /// Successful status patches so far as `(namespace/name, status)`
    pub fn status_patches(&self) -> Vec<(String, FloatingIPBindingStatus)> {
        self.status_patches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BindingStore for FakeBindingStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<FloatingIPBinding>, ControllerError> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .get(&format!("{}/{}", namespace, name))
            .cloned())
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &FloatingIPBindingStatus,
    ) -> Result<(), ControllerError> {
        if *self.fail_status.lock().unwrap() {
            return Err(api_error(
                503,
                "ServiceUnavailable",
                "the server is currently unable to handle the request",
            ));
        }

        let key = format!("{}/{}", namespace, name);
        let mut bindings = self.bindings.lock().unwrap();
        let binding = bindings.get_mut(&key).ok_or_else(|| {
            api_error(
                404,
                "NotFound",
                &format!("floatingipbindings \"{}\" not found", name),
            )
        })?;
        binding.status = Some(status.clone());
        self.status_patches.lock().unwrap().push((key, status.clone()));
        Ok(())
    }
}

/// Kubernetes API error as the apiserver would return it
pub fn api_error(code: u16, reason: &str, message: &str) -> ControllerError {
    let status = serde_json::json!({
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    });
    ControllerError::Kube(kube::Error::Api(serde_json::from_value(status).unwrap()))
}

/// Helper to create a Reconciler over the mock DigitalOcean client and in-memory fakes
pub fn create_test_reconciler(
    mock_client: &MockDigitalOceanClient,
    nodes: &FakeNodeLister,
    bindings: &FakeBindingStore,
) -> Reconciler {
    create_test_reconciler_with_timeout(mock_client, nodes, bindings, Duration::from_secs(5))
}

/// Same as [`create_test_reconciler`] with a custom attempt deadline
pub fn create_test_reconciler_with_timeout(
    mock_client: &MockDigitalOceanClient,
    nodes: &FakeNodeLister,
    bindings: &FakeBindingStore,
    reconcile_timeout: Duration,
) -> Reconciler {
    Reconciler::new(
        Box::new(mock_client.clone()),
        Box::new(nodes.clone()),
        Box::new(bindings.clone()),
        TEST_REQUEUE_AFTER,
        reconcile_timeout,
    )
}
