// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and cluster prerequisites (namespace, registry
//! pull secret).

pub mod client;
pub mod namespaces;
pub mod secrets;
pub mod services;

pub use client::create_client_for_context;
pub use namespaces::ensure_namespace_exists;
pub use secrets::{ensure_registry_secret, RegistryCredentials};
pub use services::{cluster_services, ClusterServices, KubeClusterServices};

/// Outcome of an idempotent create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExists,
}
