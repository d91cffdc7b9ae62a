// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deployment events posted to an observability platform.

pub mod datadog;
pub mod local;
pub mod newrelic;

use crate::constants::reporting::{PIPELINE_VARIABLES, SUCCESS_MESSAGE};
use crate::endpoint::parse_base;
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use reqwest::Response;
use std::fmt;

pub use datadog::DatadogReporter;
pub use local::LocalReporter;
pub use newrelic::NewRelicReporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Success,
    Error,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Success => "success",
            EventStatus::Error => "error",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentEvent {
    pub message: String,
    pub status: EventStatus,
    /// `service`, `env`, `version` and `team`, in that order
    pub tags: Vec<(String, String)>,
    /// CI pipeline variables, only those that are set
    pub pipeline: Vec<(String, String)>,
}

impl DeploymentEvent {
    pub fn success(tags: Vec<(String, String)>) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            status: EventStatus::Success,
            tags,
            pipeline: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, tags: Vec<(String, String)>) -> Self {
        Self {
            message: message.into(),
            status: EventStatus::Error,
            tags,
            pipeline: Vec::new(),
        }
    }

    /// Attach the pipeline variables resolved through `lookup`
    pub fn with_pipeline<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.pipeline = PIPELINE_VARIABLES
            .iter()
            .filter_map(|(tag, var)| lookup(var).map(|value| (tag.to_string(), value)))
            .collect();
        self
    }

    /// Attach the pipeline variables from the process environment
    pub fn with_pipeline_from_env(self) -> Self {
        self.with_pipeline(|var| std::env::var(var).ok())
    }
}

#[async_trait]
pub trait Reporter: Send + Sync {
    /// Platform name shown to the user
    fn name(&self) -> &'static str;

    async fn post_event(&self, event: &DeploymentEvent) -> Result<()>;
}

/// Credentials and endpoints for the reporting platforms
#[derive(Clone, Default)]
pub struct ReportingSettings {
    pub datadog_site: Option<String>,
    pub datadog_api_key: Option<String>,
    pub datadog_app_key: Option<String>,
    pub new_relic_account_id: Option<String>,
    pub new_relic_insert_key: Option<String>,
}

impl fmt::Debug for ReportingSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportingSettings")
            .field("datadog_site", &self.datadog_site)
            .field("new_relic_account_id", &self.new_relic_account_id)
            .finish_non_exhaustive()
    }
}

/// Select a reporter by platform name; no platform means local reporting
pub fn reporter(platform: Option<&str>, settings: &ReportingSettings) -> Result<Box<dyn Reporter>> {
    let Some(platform) = platform else {
        return Ok(Box::new(LocalReporter));
    };

    match platform.to_ascii_lowercase().as_str() {
        "datadog" => Ok(Box::new(DatadogReporter::from_settings(settings)?)),
        "newrelic" => Ok(Box::new(NewRelicReporter::from_settings(settings)?)),
        "local" => Ok(Box::new(LocalReporter)),
        _ => Err(ChartBuilderError::UnsupportedProvider {
            kind: "reporting platform",
            name: platform.to_string(),
        }),
    }
}

fn required(value: &Option<String>, flag: &str) -> Result<String> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ChartBuilderError::ReportFailed(format!("{} is required", flag))),
    }
}

fn base_url(url: &str) -> Result<url::Url> {
    parse_base(url)
        .ok_or_else(|| ChartBuilderError::ReportFailed(format!("invalid endpoint {}", url)))
}

/// Turn a non-success response into a report error carrying the body
async fn check(response: Response, platform: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(ChartBuilderError::ReportFailed(format!(
        "{} rejected the event: {} {}",
        platform,
        status,
        body.trim()
    )))
}
