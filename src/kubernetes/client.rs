// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from the merged kubeconfig

use crate::error::{ChartBuilderError, Result};
use kube::{config::KubeConfigOptions, Client, Config as KConfig};
use std::path::Path;
use tracing::{info, instrument};

/// Create a Kubernetes client for `context` of the kubeconfig at `path`
#[instrument]
pub async fn create_client_for_context(path: &Path, context: &str) -> Result<Client> {
    let kubeconfig = kube::config::Kubeconfig::read_from(path).map_err(|e| {
        ChartBuilderError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let client_config = KConfig::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(|e| {
            ChartBuilderError::KubeconfigError(format!(
                "Failed to load context {}: {}",
                context, e
            ))
        })?;

    info!("Connecting to {} using context {}", client_config.cluster_url, context);

    Client::try_from(client_config)
        .map_err(|e| ChartBuilderError::KubeconfigError(format!("Failed to create client: {}", e)))
}
