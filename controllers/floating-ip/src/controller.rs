//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! and DigitalOcean clients into the reconciler and runs the watcher.

use crate::bindings::KubeBindingStore;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::nodes::KubeNodeLister;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use crds::FloatingIPBinding;
use digitalocean_client::DigitalOceanClient;
use k8s_openapi::api::core::v1::Node;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for FloatingIPBinding management.
pub struct Controller {
    binding_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts watching.
    ///
    /// Fails before anything is watched when the DigitalOcean token is rejected.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing FloatingIPBinding Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Create DigitalOcean client and check the token before watching anything
        let digitalocean_client =
            DigitalOceanClient::new(config.api_url.clone(), config.token.clone())?;
        digitalocean_client.validate_token().await?;
        info!("DigitalOcean token validated against {}", digitalocean_client.base_url());

        // Create API clients
        let binding_api: Api<FloatingIPBinding> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };
        let node_api: Api<Node> = Api::all(kube_client.clone());

        // Create reconciler
        let reconciler = Reconciler::new(
            Box::new(digitalocean_client),
            Box::new(KubeNodeLister::new(node_api.clone())),
            Box::new(KubeBindingStore::new(kube_client)),
            config.requeue_after,
            config.reconcile_timeout,
        );

        let watcher = Watcher::new(
            Arc::new(reconciler),
            binding_api,
            node_api,
            config.concurrency,
        );

        // Start watcher in background task
        let binding_watcher = tokio::spawn(async move { watcher.watch_bindings().await });

        Ok(Self { binding_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("FloatingIPBinding Controller running");

        self.binding_watcher.await.map_err(|e| {
            ControllerError::Watch(format!("FloatingIPBinding watcher panicked: {}", e))
        })??;

        info!("FloatingIPBinding Controller stopped");
        Ok(())
    }
}
