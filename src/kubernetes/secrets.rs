// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry pull secret provisioning

use super::Provisioned;
use crate::constants::registry::{SECRET_KEY, SECRET_TYPE};
use crate::error::{ChartBuilderError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, instrument};

/// Credentials for a `kubernetes.io/dockerconfigjson` pull secret
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub name: String,
    pub namespace: String,
    pub registry: String,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("registry", &self.registry)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegistryCredentials {
    /// The `.dockerconfigjson` payload
    pub fn docker_config(&self) -> serde_json::Value {
        let auth = STANDARD.encode(format!("{}:{}", self.username, self.password));
        let mut entry = serde_json::json!({
            "username": self.username,
            "password": self.password,
            "auth": auth,
        });
        if let Some(email) = &self.email {
            entry["email"] = serde_json::Value::from(email.as_str());
        }

        let mut auths = serde_json::Map::new();
        auths.insert(self.registry.clone(), entry);
        serde_json::json!({ "auths": auths })
    }

    pub fn to_secret(&self) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            type_: Some(SECRET_TYPE.to_string()),
            data: Some(BTreeMap::from([(
                SECRET_KEY.to_string(),
                ByteString(self.docker_config().to_string().into_bytes()),
            )])),
            ..Default::default()
        }
    }
}

/// Create the registry pull secret unless one with the same name exists
#[instrument(skip(client, credentials), fields(secret = %format!("{}/{}", credentials.namespace, credentials.name)))]
pub async fn ensure_registry_secret(
    client: &Client,
    credentials: &RegistryCredentials,
) -> Result<Provisioned> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &credentials.namespace);

    let existing = secrets.get_opt(&credentials.name).await.map_err(|e| {
        ChartBuilderError::RegistryCredentialsError(format!(
            "Failed to check secret {}: {}",
            credentials.name, e
        ))
    })?;
    if existing.is_some() {
        debug!("Registry credentials {} already exist", credentials.name);
        return Ok(Provisioned::AlreadyExists);
    }

    info!(
        "Creating registry credentials {} for {}",
        credentials.name, credentials.registry
    );
    secrets
        .create(&PostParams::default(), &credentials.to_secret())
        .await
        .map_err(|e| {
            ChartBuilderError::RegistryCredentialsError(format!(
                "Failed to create secret {}: {}",
                credentials.name, e
            ))
        })?;

    Ok(Provisioned::Created)
}
