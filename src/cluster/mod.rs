// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Acquiring admin credentials for a managed cluster.

pub mod azure;

use crate::constants::azure::DEFAULT_RESOURCE_GROUP_PREFIX;
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use std::fmt;

pub use azure::{AzureClusterOperations, AzureEndpoints};

/// Service principal and cluster identity used to request credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub cluster: String,
    pub resource_group: Option<String>,
}

impl ClusterCredentials {
    /// The configured resource group, or `rg-do-<cluster>`
    pub fn resource_group(&self) -> String {
        self.resource_group
            .clone()
            .unwrap_or_else(|| format!("{}{}", DEFAULT_RESOURCE_GROUP_PREFIX, self.cluster))
    }
}

impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("cluster", &self.cluster)
            .field("resource_group", &self.resource_group)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ClusterOperations: Send + Sync {
    /// Fetch an admin kubeconfig for the cluster as raw YAML
    async fn fetch_admin_kubeconfig(&self, credentials: &ClusterCredentials) -> Result<String>;
}

/// Select the cluster operations for a provider
pub fn cluster_operations(provider: &str) -> Result<Box<dyn ClusterOperations>> {
    match provider.to_ascii_lowercase().as_str() {
        "azure" => Ok(Box::new(AzureClusterOperations::new()?)),
        _ => Err(ChartBuilderError::UnsupportedProvider {
            kind: "cluster provider",
            name: provider.to_string(),
        }),
    }
}
