// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubeconfig merge policy
pub mod kubeconfig {
    /// Users issued by the cloud for admin credentials start with this prefix
    pub const ADMIN_USER_PREFIX: &str = "clusterAdmin";
    /// Appended to admin context names so they do not replace user contexts
    pub const ADMIN_CONTEXT_SUFFIX: &str = "-admin";
    /// Reported when the merged fragment has no current-context
    pub const UNKNOWN_CONTEXT: &str = "UNKNOWN";
    /// Owner read/write only
    pub const FILE_MODE: u32 = 0o600;
}

/// Registry pull secrets
pub mod registry {
    pub const SECRET_TYPE: &str = "kubernetes.io/dockerconfigjson";
    pub const SECRET_KEY: &str = ".dockerconfigjson";
}

/// Azure REST endpoints and API versions
pub mod azure {
    pub const LOGIN_URL: &str = "https://login.microsoftonline.com";
    pub const MANAGEMENT_URL: &str = "https://management.azure.com";
    pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
    pub const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";
    pub const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";
    pub const MANAGED_CLUSTERS_API_VERSION: &str = "2023-08-01";
    /// Prefix of the resource group used when none is given
    pub const DEFAULT_RESOURCE_GROUP_PREFIX: &str = "rg-do-";
}

/// Reporting backends
pub mod reporting {
    pub const DEVOPS_PLATFORM: &str = "Gitlab";
    pub const DEFAULT_DATADOG_SITE: &str = "datadoghq.com";
    pub const NEW_RELIC_URL: &str = "https://insights-collector.newrelic.com";
    pub const NEW_RELIC_EVENT_TYPE: &str = "Deployments";
    pub const SUCCESS_MESSAGE: &str = "Successfully deployed.";
    /// GitLab predefined variables attached to every event
    pub const PIPELINE_VARIABLES: [(&str, &str); 4] = [
        ("ci-pipeline-id", "CI_PIPELINE_ID"),
        ("ci-pipeline-url", "CI_PIPELINE_URL"),
        ("ci-pipeline-created-at", "CI_PIPELINE_CREATED_AT"),
        ("ci-pipeline-source", "CI_PIPELINE_SOURCE"),
    ];
}

/// Environments accepted when CHART_BUILDER_SUPPORTED_ENVIRONMENTS is unset
pub const DEFAULT_SUPPORTED_ENVIRONMENTS: &str = "eph,dev,test,stage,prod";
