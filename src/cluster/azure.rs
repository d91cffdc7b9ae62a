// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Admin credentials for Azure Kubernetes Service clusters via the Azure
//! Resource Manager REST API.

use super::{ClusterCredentials, ClusterOperations};
use crate::constants::azure::{
    LOGIN_URL, MANAGED_CLUSTERS_API_VERSION, MANAGEMENT_SCOPE, MANAGEMENT_URL,
    RESOURCE_GROUPS_API_VERSION, SUBSCRIPTIONS_API_VERSION,
};
use crate::endpoint::{join_segments, parse_base};
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

/// Base URLs of the identity and management endpoints
#[derive(Debug, Clone)]
pub struct AzureEndpoints {
    pub login: Url,
    pub management: Url,
}

impl AzureEndpoints {
    /// The public Azure cloud
    pub fn public() -> Result<Self> {
        let parse = |url: &str| {
            parse_base(url).ok_or_else(|| {
                ChartBuilderError::CredentialError(format!("invalid endpoint {}", url))
            })
        };
        Ok(Self {
            login: parse(LOGIN_URL)?,
            management: parse(MANAGEMENT_URL)?,
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    subscription_id: String,
}

#[derive(Deserialize)]
struct SubscriptionList {
    #[serde(default)]
    value: Vec<Subscription>,
}

#[derive(Deserialize)]
struct CredentialResult {
    value: String,
}

#[derive(Deserialize)]
struct CredentialResults {
    #[serde(default)]
    kubeconfigs: Vec<CredentialResult>,
}

pub struct AzureClusterOperations {
    http: reqwest::Client,
    endpoints: AzureEndpoints,
}

impl AzureClusterOperations {
    pub fn new() -> Result<Self> {
        Ok(Self::with_endpoints(AzureEndpoints::public()?))
    }

    pub fn with_endpoints(endpoints: AzureEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
        }
    }

    fn url(base: &Url, segments: &[&str]) -> Result<Url> {
        join_segments(base, segments).ok_or_else(|| {
            ChartBuilderError::CredentialError(format!("{} cannot be used as a base URL", base))
        })
    }

    async fn access_token(&self, credentials: &ClusterCredentials) -> Result<String> {
        let url = Self::url(
            &self.endpoints.login,
            &[credentials.tenant_id.as_str(), "oauth2", "v2.0", "token"],
        )?;

        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("scope", MANAGEMENT_SCOPE),
            ])
            .send()
            .await?;

        let token: TokenResponse = check(response, "acquire an access token").await?.json().await?;
        Ok(token.access_token)
    }

    async fn subscriptions(&self, token: &str) -> Result<Vec<String>> {
        let url = Self::url(&self.endpoints.management, &["subscriptions"])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("api-version", SUBSCRIPTIONS_API_VERSION)])
            .send()
            .await?;

        let list: SubscriptionList = check(response, "list subscriptions").await?.json().await?;
        Ok(list.value.into_iter().map(|s| s.subscription_id).collect())
    }

    async fn resource_group_exists(
        &self,
        token: &str,
        subscription: &str,
        resource_group: &str,
    ) -> Result<bool> {
        let url = Self::url(
            &self.endpoints.management,
            &["subscriptions", subscription, "resourcegroups", resource_group],
        )?;

        let response = self
            .http
            .head(url)
            .bearer_auth(token)
            .query(&[("api-version", RESOURCE_GROUPS_API_VERSION)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(ChartBuilderError::CredentialError(format!(
                "checking resource group {} in subscription {} returned {}",
                resource_group, subscription, status
            ))),
        }
    }

    /// Find the first subscription holding the resource group. Subscriptions
    /// that cannot be queried are skipped.
    async fn find_subscription(&self, token: &str, resource_group: &str) -> Result<String> {
        for subscription in self.subscriptions(token).await? {
            match self
                .resource_group_exists(token, &subscription, resource_group)
                .await
            {
                Ok(true) => return Ok(subscription),
                Ok(false) => debug!(
                    "Resource group {} not in subscription {}",
                    resource_group, subscription
                ),
                Err(e) => debug!("Skipping subscription {}: {}", subscription, e),
            }
        }

        Err(ChartBuilderError::CredentialError(format!(
            "resource group {} was not found in any accessible subscription",
            resource_group
        )))
    }

    async fn admin_kubeconfig(
        &self,
        token: &str,
        subscription: &str,
        resource_group: &str,
        cluster: &str,
    ) -> Result<String> {
        let url = Self::url(
            &self.endpoints.management,
            &[
                "subscriptions",
                subscription,
                "resourceGroups",
                resource_group,
                "providers",
                "Microsoft.ContainerService",
                "managedClusters",
                cluster,
                "listClusterAdminCredential",
            ],
        )?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[("api-version", MANAGED_CLUSTERS_API_VERSION)])
            .send()
            .await?;

        let results: CredentialResults = check(response, "list cluster admin credentials")
            .await?
            .json()
            .await?;
        let encoded = results.kubeconfigs.into_iter().next().ok_or_else(|| {
            ChartBuilderError::CredentialError(format!(
                "no admin kubeconfig returned for cluster {}",
                cluster
            ))
        })?;

        let bytes = STANDARD.decode(encoded.value.trim()).map_err(|e| {
            ChartBuilderError::CredentialError(format!("admin kubeconfig is not base64: {}", e))
        })?;
        String::from_utf8(bytes).map_err(|e| {
            ChartBuilderError::CredentialError(format!("admin kubeconfig is not UTF-8: {}", e))
        })
    }
}

#[async_trait]
impl ClusterOperations for AzureClusterOperations {
    #[instrument(skip(self))]
    async fn fetch_admin_kubeconfig(&self, credentials: &ClusterCredentials) -> Result<String> {
        let resource_group = credentials.resource_group();

        info!(
            "Getting admin credentials for cluster {} in resource group {}",
            credentials.cluster, resource_group
        );

        let token = self.access_token(credentials).await?;
        let subscription = self.find_subscription(&token, &resource_group).await?;
        debug!("Using subscription {}", subscription);

        self.admin_kubeconfig(&token, &subscription, &resource_group, &credentials.cluster)
            .await
    }
}

/// Turn a non-success response into a credential error carrying the body
async fn check(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ChartBuilderError::CredentialError(format!(
        "failed to {}: {} {}",
        action,
        status,
        body.trim()
    )))
}
