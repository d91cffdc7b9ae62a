// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Datadog Events API (v1)

use super::{base_url, check, required, DeploymentEvent, Reporter, ReportingSettings};
use crate::constants::reporting::{DEFAULT_DATADOG_SITE, DEVOPS_PLATFORM};
use crate::endpoint::join_segments;
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, Serialize, PartialEq)]
struct EventRequest<'a> {
    title: String,
    text: &'a str,
    tags: Vec<String>,
    source_type_name: &'a str,
    alert_type: &'a str,
}

impl<'a> EventRequest<'a> {
    fn new(event: &'a DeploymentEvent) -> Self {
        let tags = event
            .tags
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .chain(std::iter::once(format!("source:{}", DEVOPS_PLATFORM)))
            .chain(
                event
                    .pipeline
                    .iter()
                    .map(|(key, value)| format!("{}:{}", key, value)),
            )
            .collect();

        Self {
            title: format!("Event on pipelines from {}", DEVOPS_PLATFORM),
            text: &event.message,
            tags,
            source_type_name: DEVOPS_PLATFORM,
            alert_type: event.status.as_str(),
        }
    }
}

pub struct DatadogReporter {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    app_key: String,
}

impl DatadogReporter {
    pub fn new(base: Url, api_key: String, app_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            api_key,
            app_key,
        }
    }

    /// Build from settings, targeting `https://api.<site>`
    pub fn from_settings(settings: &ReportingSettings) -> Result<Self> {
        let site = settings
            .datadog_site
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DATADOG_SITE);

        Ok(Self::new(
            base_url(&format!("https://api.{}", site))?,
            required(&settings.datadog_api_key, "--datadog-api-key")?,
            required(&settings.datadog_app_key, "--datadog-app-key")?,
        ))
    }
}

#[async_trait]
impl Reporter for DatadogReporter {
    fn name(&self) -> &'static str {
        "Datadog"
    }

    #[instrument(skip(self, event), fields(status = %event.status))]
    async fn post_event(&self, event: &DeploymentEvent) -> Result<()> {
        let url = join_segments(&self.base, &["api", "v1", "events"]).ok_or_else(|| {
            ChartBuilderError::ReportFailed(format!("{} cannot be used as a base URL", self.base))
        })?;
        debug!("Posting event to {}", url);

        let response = self
            .http
            .post(url)
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.app_key)
            .json(&EventRequest::new(event))
            .send()
            .await?;

        check(response, self.name()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_event() -> DeploymentEvent {
        DeploymentEvent::success(vec![
            ("service".to_string(), "web".to_string()),
            ("env".to_string(), "dev".to_string()),
        ])
        .with_pipeline(|var| (var == "CI_PIPELINE_ID").then(|| "42".to_string()))
    }

    fn reporter(server: &MockServer) -> DatadogReporter {
        DatadogReporter::new(
            Url::parse(&server.uri()).unwrap(),
            "api".to_string(),
            "app".to_string(),
        )
    }

    #[test]
    fn test_from_settings_uses_site() {
        let settings = ReportingSettings {
            datadog_site: Some("datadoghq.eu".to_string()),
            datadog_api_key: Some("api".to_string()),
            datadog_app_key: Some("app".to_string()),
            ..Default::default()
        };

        let reporter = DatadogReporter::from_settings(&settings).unwrap();

        assert_eq!(reporter.base.as_str(), "https://api.datadoghq.eu/");
    }

    #[test]
    fn test_from_settings_defaults_site() {
        let settings = ReportingSettings {
            datadog_api_key: Some("api".to_string()),
            datadog_app_key: Some("app".to_string()),
            ..Default::default()
        };

        let reporter = DatadogReporter::from_settings(&settings).unwrap();

        assert_eq!(reporter.base.as_str(), "https://api.datadoghq.com/");
    }

    #[tokio::test]
    async fn test_post_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/events"))
            .and(header("DD-API-KEY", "api"))
            .and(header("DD-APPLICATION-KEY", "app"))
            .and(body_json(json!({
                "title": "Event on pipelines from Gitlab",
                "text": "Successfully deployed.",
                "tags": ["service:web", "env:dev", "source:Gitlab", "ci-pipeline-id:42"],
                "source_type_name": "Gitlab",
                "alert_type": "success"
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        reporter(&server).post_event(&make_event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_post_event_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/events"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let err = reporter(&server).post_event(&make_event()).await.unwrap_err();

        assert!(
            matches!(err, ChartBuilderError::ReportFailed(msg) if msg.contains("403") && msg.contains("Forbidden"))
        );
    }
}
