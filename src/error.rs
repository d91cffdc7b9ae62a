// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use thiserror::Error;

use crate::kubeconfig::Section;

#[derive(Error, Debug)]
pub enum ChartBuilderError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Error parsing {} ({message})", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A different object named {name} already exists in {section} in your kubeconfig file")]
    MergeConflict { name: String, section: Section },

    #[error("Failed to load additional configuration from {}", .0.display())]
    EmptyFragment(PathBuf),

    #[error("Failed to create Kubernetes client: {0}")]
    KubeconfigError(String),

    #[error("Cluster credentials unavailable: {0}")]
    CredentialError(String),

    #[error("Namespace creation failed: {0}")]
    NamespaceError(String),

    #[error("Registry credentials failed: {0}")]
    RegistryCredentialsError(String),

    #[error("Package manager command failed: {0}")]
    CommandFailed(String),

    #[error("Reporting deployment status failed: {0}")]
    ReportFailed(String),

    #[error("Unsupported {kind} \"{name}\"")]
    UnsupportedProvider { kind: &'static str, name: String },
}

impl ChartBuilderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChartBuilderError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartBuilderError>;
