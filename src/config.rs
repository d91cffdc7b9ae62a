// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command line and environment configuration

use crate::cluster::ClusterCredentials;
use crate::constants::DEFAULT_SUPPORTED_ENVIRONMENTS;
use crate::error::{ChartBuilderError, Result};
use crate::kubeconfig::MergeOptions;
use crate::kubernetes::RegistryCredentials;
use crate::package::ChartRelease;
use crate::pipeline::DeploymentPlan;
use crate::reporting::ReportingSettings;
use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "chart-builder")]
#[command(
    about = "Logs into the platform hosting Kubernetes, generates a kubeconfig and installs a Helm chart",
    long_about = None
)]
pub struct Config {
    #[arg(long, env = "DEPARTMENT_NAME", help_heading = "Default arguments")]
    pub department_name: Option<String>,

    #[arg(long, env = "DEPARTMENT_TEAM", help_heading = "Default arguments")]
    pub department_team: Option<String>,

    #[arg(long, env = "APP_NAME", help_heading = "Default arguments")]
    pub app_name: Option<String>,

    #[arg(long, env = "APP_TEAM", help_heading = "Default arguments")]
    pub team: Option<String>,

    #[arg(long, env = "APP_VERSION", help_heading = "Default arguments")]
    pub app_version: Option<String>,

    /// Target environment, one of CHART_BUILDER_SUPPORTED_ENVIRONMENTS
    #[arg(long, env = "ENVIRONMENT", help_heading = "Default arguments")]
    pub environment: String,

    #[arg(
        long,
        env = "CHART_BUILDER_SUPPORTED_ENVIRONMENTS",
        default_value = DEFAULT_SUPPORTED_ENVIRONMENTS,
        hide = true
    )]
    pub supported_environments: String,

    /// Where deployment events are posted (datadog, newrelic, local)
    #[arg(long, env = "REPORTING_PLATFORM", help_heading = "Default arguments")]
    pub reporting_platform: Option<String>,

    /// Log at debug level
    #[arg(short, long, help_heading = "Default arguments")]
    pub verbose: bool,

    #[arg(long, env = "CLUSTER_PROVIDER", default_value = "azure", help_heading = "Provider arguments")]
    pub cluster_provider: String,

    #[arg(long, env = "PACKAGE_MANAGER", default_value = "helm", help_heading = "Provider arguments")]
    pub package_manager: String,

    /// Kubeconfig to merge credentials into [default: ~/.kube/config]
    #[arg(long, help_heading = "Kubeconfig arguments")]
    pub kubeconfig: Option<PathBuf>,

    /// Replace entries that already exist with different content
    #[arg(long, env = "OVERWRITE_EXISTING", help_heading = "Kubeconfig arguments")]
    pub overwrite_existing: bool,

    /// Rename the fetched context and cluster
    #[arg(long, env = "CONTEXT_NAME", help_heading = "Kubeconfig arguments")]
    pub context_name: Option<String>,

    #[arg(long, visible_alias = "aksclustername", env = "AKS_CLUSTER_NAME", help_heading = "Azure arguments")]
    pub clustername: String,

    /// Resource group of the cluster [default: rg-do-<clustername>]
    #[arg(
        long,
        visible_alias = "aksclusterresourcegroup",
        env = "AKS_CLUSTER_RESOURCE_GROUP",
        help_heading = "Azure arguments"
    )]
    pub resource_group: Option<String>,

    #[arg(long, env = "AKS_SERVICE_PRINCIPAL_ID", help_heading = "Azure arguments")]
    pub client_id: String,

    #[arg(
        long,
        env = "AKS_SERVICE_PRINCIPAL_PASSWORD",
        hide_env_values = true,
        help_heading = "Azure arguments"
    )]
    pub client_secret: String,

    #[arg(long, visible_alias = "tenant", env = "AZURE_TENANT_ID", help_heading = "Azure arguments")]
    pub tenant_id: String,

    #[arg(
        long,
        visible_alias = "container-registry",
        env = "DOCKER_REGISTRY",
        help_heading = "Docker arguments"
    )]
    pub docker_registry: Option<String>,

    #[arg(long, env = "DOCKER_USERNAME", help_heading = "Docker arguments")]
    pub docker_username: Option<String>,

    #[arg(long, env = "DOCKER_PASSWORD", hide_env_values = true, help_heading = "Docker arguments")]
    pub docker_password: Option<String>,

    #[arg(long, env = "DOCKER_EMAIL", help_heading = "Docker arguments")]
    pub docker_email: Option<String>,

    /// Name of the registry pull secret; no secret is created when unset
    #[arg(long, env = "PULL_SECRET_NAME", help_heading = "Docker arguments")]
    pub pull_secret_name: Option<String>,

    #[arg(long, visible_alias = "helm-repository", env = "HELM_REPOSITORY", help_heading = "Helm arguments")]
    pub repository: Option<String>,

    #[arg(long, visible_alias = "helm-chart", env = "HELM_CHART", help_heading = "Helm arguments")]
    pub chart: String,

    #[arg(long, visible_alias = "helm-release", env = "RELEASE", help_heading = "Helm arguments")]
    pub release: String,

    #[arg(long, visible_alias = "helm-namespace", env = "NAMESPACE", help_heading = "Helm arguments")]
    pub namespace: String,

    /// Values file or URL, may be repeated
    #[arg(long = "helm-values", help_heading = "Helm arguments")]
    pub helm_values: Vec<String>,

    /// key=value override, may be repeated
    #[arg(long = "helm-set", help_heading = "Helm arguments")]
    pub helm_sets: Vec<String>,

    /// Roll back changes when the upgrade fails
    #[arg(
        long,
        env = "HELM_ATOMIC",
        default_value_t = true,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
        help_heading = "Helm arguments"
    )]
    pub helm_atomic: bool,

    #[arg(long, env = "HELM_TIMEOUT", help_heading = "Helm arguments")]
    pub helm_timeout: Option<String>,

    #[arg(
        long,
        env = "HELM_WAIT",
        default_value_t = false,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
        help_heading = "Helm arguments"
    )]
    pub helm_wait: bool,

    /// Chart version constraint; latest when unset
    #[arg(long, env = "HELM_VERSION", help_heading = "Helm arguments")]
    pub helm_version: Option<String>,

    #[arg(long, env = "DD_SITE", help_heading = "Datadog arguments")]
    pub datadog_site: Option<String>,

    #[arg(long, env = "DD_API_KEY", hide_env_values = true, help_heading = "Datadog arguments")]
    pub datadog_api_key: Option<String>,

    #[arg(long, env = "DD_APP_KEY", hide_env_values = true, help_heading = "Datadog arguments")]
    pub datadog_app_key: Option<String>,

    #[arg(long, env = "NEW_RELIC_ACCOUNT_ID", help_heading = "New Relic arguments")]
    pub new_relic_account_id: Option<String>,

    #[arg(
        long,
        env = "NEW_RELIC_INSERT_KEY",
        hide_env_values = true,
        help_heading = "New Relic arguments"
    )]
    pub new_relic_insert_key: Option<String>,
}

/// Lower-case `value` and check it against a comma separated list
pub fn supported_environment(value: &str, supported: &str) -> std::result::Result<String, String> {
    let value = value.to_lowercase();
    let supported: Vec<&str> = supported
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if supported.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(format!(
            "must be one of the following values: {}",
            supported.join(", ")
        ))
    }
}

impl Config {
    /// Parse the process arguments, exiting with usage on invalid input
    pub fn load() -> Self {
        Self::try_load_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_load_from<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut config = Self::try_parse_from(args)?;
        config.environment = supported_environment(&config.environment, &config.supported_environments)
            .map_err(|message| {
                Self::command().error(
                    ErrorKind::InvalidValue,
                    format!("invalid value for --environment: {}", message),
                )
            })?;
        Ok(config)
    }

    /// The explicit kubeconfig path, or `~/.kube/config`
    pub fn kubeconfig_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.kubeconfig {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".kube").join("config"))
            .ok_or_else(|| {
                ChartBuilderError::KubeconfigError(
                    "cannot determine the home directory, pass --kubeconfig".to_string(),
                )
            })
    }

    fn registry_credentials(&self) -> Result<Option<RegistryCredentials>> {
        let Some(name) = &self.pull_secret_name else {
            return Ok(None);
        };

        let require = |value: &Option<String>, flag: &str| {
            value.clone().filter(|v| !v.is_empty()).ok_or_else(|| {
                ChartBuilderError::RegistryCredentialsError(format!(
                    "{} is required when --pull-secret-name is set",
                    flag
                ))
            })
        };

        Ok(Some(RegistryCredentials {
            name: name.clone(),
            namespace: self.namespace.clone(),
            registry: require(&self.docker_registry, "--docker-registry")?,
            username: require(&self.docker_username, "--docker-username")?,
            password: require(&self.docker_password, "--docker-password")?,
            email: self.docker_email.clone(),
        }))
    }

    /// Everything the deployment needs, resolved from the flags
    pub fn plan(&self) -> Result<DeploymentPlan> {
        Ok(DeploymentPlan {
            cluster_provider: self.cluster_provider.clone(),
            package_manager: self.package_manager.clone(),
            credentials: ClusterCredentials {
                tenant_id: self.tenant_id.clone(),
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                cluster: self.clustername.clone(),
                resource_group: self.resource_group.clone(),
            },
            kubeconfig: self.kubeconfig_path()?,
            merge: MergeOptions {
                overwrite_existing: self.overwrite_existing,
                context_name: self.context_name.clone(),
            },
            namespace: self.namespace.clone(),
            registry: self.registry_credentials()?,
            release: ChartRelease {
                release: self.release.clone(),
                chart: self.chart.clone(),
                namespace: Some(self.namespace.clone()),
                version: self.helm_version.clone(),
                repository: self.repository.clone(),
                values: self.helm_values.clone(),
                sets: self.helm_sets.clone(),
                atomic: self.helm_atomic,
                timeout: self.helm_timeout.clone(),
                wait: self.helm_wait,
            },
        })
    }

    pub fn reporting_settings(&self) -> ReportingSettings {
        ReportingSettings {
            datadog_site: self.datadog_site.clone(),
            datadog_api_key: self.datadog_api_key.clone(),
            datadog_app_key: self.datadog_app_key.clone(),
            new_relic_account_id: self.new_relic_account_id.clone(),
            new_relic_insert_key: self.new_relic_insert_key.clone(),
        }
    }

    /// Tags attached to every deployment event, skipping unset values
    pub fn event_tags(&self) -> Vec<(String, String)> {
        [
            ("service", self.app_name.as_deref()),
            ("env", Some(self.environment.as_str())),
            ("version", self.app_version.as_deref()),
            ("team", self.team.as_deref()),
            ("department", self.department_name.as_deref()),
            ("department-team", self.department_team.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.to_string())))
        .collect()
    }
}
