// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One deployment, end to end: credentials, kubeconfig merge, cluster
//! prerequisites and the chart release.

use crate::cluster::{cluster_operations, ClusterCredentials, ClusterOperations};
use crate::console::Console;
use crate::error::{ChartBuilderError, Result};
use crate::kubeconfig::{merge_credentials, MergeOptions, MergeOutcome};
use crate::kubernetes::{
    cluster_services, create_client_for_context, ClusterServices, Provisioned, RegistryCredentials,
};
use crate::package::{package_manager, ChartRelease, PackageManager};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Resolved inputs of a deployment
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub cluster_provider: String,
    pub package_manager: String,
    pub credentials: ClusterCredentials,
    pub kubeconfig: PathBuf,
    pub merge: MergeOptions,
    pub namespace: String,
    pub registry: Option<RegistryCredentials>,
    pub release: ChartRelease,
}

/// Run every step of the deployment, stopping at the first failure
pub async fn run<W: Write>(plan: &DeploymentPlan, console: &mut Console<W>) -> Result<()> {
    console.line("Running chart-builder...");

    // resolve every provider before touching the network
    let operations = cluster_operations(&plan.cluster_provider)?;
    let packages = package_manager(&plan.package_manager)?;

    let outcome = install_credentials(operations.as_ref(), plan, console).await?;
    let context = merged_context(&outcome, &plan.credentials.cluster)?;

    let client = create_client_for_context(&plan.kubeconfig, context).await?;
    let services = cluster_services(&plan.cluster_provider, client)?;
    provision(services.as_ref(), plan, console).await?;

    release(packages.as_ref(), plan, console).await
}

/// Fetch admin credentials and merge them into the kubeconfig
#[instrument(skip_all, fields(cluster = %plan.credentials.cluster))]
pub async fn install_credentials<W: Write>(
    operations: &dyn ClusterOperations,
    plan: &DeploymentPlan,
    console: &mut Console<W>,
) -> Result<MergeOutcome> {
    let fragment = operations.fetch_admin_kubeconfig(&plan.credentials).await?;
    let outcome = merge_credentials(&fragment, &plan.kubeconfig, &plan.merge)?;

    if let Some(warning) = &outcome.permission_warning {
        console.line(&format!("WARNING: {}", warning));
    }
    console.success(&format!(
        "Merged \"{}\" as current context in {}",
        outcome.context_label(),
        plan.kubeconfig.display()
    ));
    Ok(outcome)
}

/// Create the release namespace and, when configured, the registry pull secret
pub async fn provision<W: Write>(
    services: &dyn ClusterServices,
    plan: &DeploymentPlan,
    console: &mut Console<W>,
) -> Result<()> {
    let state = services.build_namespace(&plan.namespace).await?;
    console.success(&format!(
        "Namespace \"{}\" {}",
        plan.namespace,
        describe(state)
    ));

    match &plan.registry {
        Some(registry) => {
            let state = services.build_registry_credentials(registry).await?;
            console.success(&format!(
                "Registry credentials \"{}\" {}",
                registry.name,
                describe(state)
            ));
        }
        None => debug!("No pull secret configured"),
    }
    Ok(())
}

/// Install or upgrade the chart
pub async fn release<W: Write>(
    packages: &dyn PackageManager,
    plan: &DeploymentPlan,
    console: &mut Console<W>,
) -> Result<()> {
    let command = packages.build(&plan.release, &plan.kubeconfig);
    console.panel("Package", &command.display_lines());

    let output = packages.deploy(&command).await?;
    for line in output.lines() {
        console.line(line);
    }

    info!("Release {} deployed", plan.release.release);
    console.success(&format!("Release \"{}\" deployed", plan.release.release));
    Ok(())
}

/// The context to connect with; a fragment without one cannot be used
fn merged_context<'a>(outcome: &'a MergeOutcome, cluster: &str) -> Result<&'a str> {
    outcome.current_context.as_deref().ok_or_else(|| {
        ChartBuilderError::KubeconfigError(format!(
            "the credentials for cluster {} do not name a current-context",
            cluster
        ))
    })
}

fn describe(state: Provisioned) -> &'static str {
    match state {
        Provisioned::Created => "created",
        Provisioned::AlreadyExists => "already exists",
    }
}
