// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace provisioning

use super::Provisioned;
use crate::error::{ChartBuilderError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument};

/// Create the release namespace unless it already exists
#[instrument(skip(client))]
pub async fn ensure_namespace_exists(client: &Client, namespace: &str) -> Result<Provisioned> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get_opt(namespace).await {
        Ok(Some(_)) => {
            debug!("Namespace {} already exists", namespace);
            Ok(Provisioned::AlreadyExists)
        }
        Ok(None) => {
            info!("Creating namespace {}", namespace);
            let ns = Namespace {
                metadata: ObjectMeta {
                    name: Some(namespace.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            };
            namespaces
                .create(&PostParams::default(), &ns)
                .await
                .map_err(|e| {
                    ChartBuilderError::NamespaceError(format!(
                        "Failed to create namespace {}: {}",
                        namespace, e
                    ))
                })?;
            Ok(Provisioned::Created)
        }
        Err(e) => Err(ChartBuilderError::NamespaceError(format!(
            "Failed to check namespace {}: {}",
            namespace, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{namespace_json, status_json, MockService};

    #[tokio::test]
    async fn test_existing_namespace_is_left_alone() {
        let mock = MockService::new().on_get("/api/v1/namespaces/apps", 200, &namespace_json("apps"));

        let result = ensure_namespace_exists(&mock.client(), "apps").await.unwrap();

        assert_eq!(result, Provisioned::AlreadyExists);
        assert!(mock.requests().iter().all(|(method, _)| method == "GET"));
    }

    #[tokio::test]
    async fn test_missing_namespace_is_created() {
        let mock = MockService::new().on_post("/api/v1/namespaces", 201, &namespace_json("apps"));

        let result = ensure_namespace_exists(&mock.client(), "apps").await.unwrap();

        assert_eq!(result, Provisioned::Created);
        assert!(mock
            .requests()
            .contains(&("POST".to_string(), "/api/v1/namespaces".to_string())));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_namespace_error() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/apps",
            403,
            &status_json(403, "Forbidden", "namespaces \"apps\" is forbidden"),
        );

        let err = ensure_namespace_exists(&mock.client(), "apps").await.unwrap_err();

        assert!(matches!(err, ChartBuilderError::NamespaceError(_)));
    }
}
