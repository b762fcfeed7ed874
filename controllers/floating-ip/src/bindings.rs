//! FloatingIPBinding storage.

use crate::error::ControllerError;
use async_trait::async_trait;
use crds::{FloatingIPBinding, FloatingIPBindingStatus};
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};

/// Read access to bindings and write access to their status.
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Fetch a binding. `Ok(None)` when it no longer exists.
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<FloatingIPBinding>, ControllerError>;

    /// Replace the observed fields of a binding's status.
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &FloatingIPBindingStatus,
    ) -> Result<(), ControllerError>;
}

/// Bindings stored in the Kubernetes API.
pub struct KubeBindingStore {
    client: Client,
}

impl KubeBindingStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<FloatingIPBinding> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl BindingStore for KubeBindingStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<FloatingIPBinding>, ControllerError> {
        Ok(self.api(namespace).get_opt(name).await?)
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &FloatingIPBindingStatus,
    ) -> Result<(), ControllerError> {
        // Merge patch: absent fields would be left untouched, so both are always written.
        let patch = serde_json::json!({
            "status": {
                "assignedDropletID": status.assigned_droplet_id,
                "assignedDropletName": status.assigned_droplet_name,
            }
        });

        self.api(namespace)
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}
