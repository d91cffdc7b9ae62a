// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster prerequisites behind a provider-neutral interface

use super::{ensure_namespace_exists, ensure_registry_secret, Provisioned, RegistryCredentials};
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use kube::Client;

/// Prepares a cluster for a chart release
#[async_trait]
pub trait ClusterServices: Send + Sync {
    async fn build_namespace(&self, namespace: &str) -> Result<Provisioned>;

    async fn build_registry_credentials(
        &self,
        credentials: &RegistryCredentials,
    ) -> Result<Provisioned>;
}

/// Cluster services backed by the Kubernetes API
pub struct KubeClusterServices {
    client: Client,
}

impl KubeClusterServices {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterServices for KubeClusterServices {
    async fn build_namespace(&self, namespace: &str) -> Result<Provisioned> {
        ensure_namespace_exists(&self.client, namespace).await
    }

    async fn build_registry_credentials(
        &self,
        credentials: &RegistryCredentials,
    ) -> Result<Provisioned> {
        ensure_registry_secret(&self.client, credentials).await
    }
}

/// Select the cluster services for a provider
pub fn cluster_services(provider: &str, client: Client) -> Result<Box<dyn ClusterServices>> {
    match provider.to_ascii_lowercase().as_str() {
        "azure" => Ok(Box::new(KubeClusterServices::new(client))),
        _ => Err(ChartBuilderError::UnsupportedProvider {
            kind: "cluster services provider",
            name: provider.to_string(),
        }),
    }
}
