// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! New Relic Event API

use super::{base_url, check, required, DeploymentEvent, EventStatus, Reporter, ReportingSettings};
use crate::constants::reporting::{DEVOPS_PLATFORM, NEW_RELIC_EVENT_TYPE, NEW_RELIC_URL};
use crate::endpoint::join_segments;
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

/// Flat custom event; the `service` tag is reported as `app_name`
fn event_body(event: &DeploymentEvent) -> Value {
    let mut body = Map::new();
    body.insert("eventType".to_string(), NEW_RELIC_EVENT_TYPE.into());
    body.insert("source".to_string(), DEVOPS_PLATFORM.to_ascii_lowercase().into());
    body.insert("status".to_string(), event.status.as_str().into());
    let success = if event.status == EventStatus::Success { "1" } else { "0" };
    body.insert("success".to_string(), success.into());
    body.insert("message".to_string(), event.message.clone().into());

    for (key, value) in event.tags.iter().chain(event.pipeline.iter()) {
        let key = if key == "service" { "app_name" } else { key.as_str() };
        body.insert(key.to_string(), value.clone().into());
    }

    Value::Object(body)
}

pub struct NewRelicReporter {
    http: reqwest::Client,
    base: Url,
    account_id: String,
    insert_key: String,
}

impl NewRelicReporter {
    pub fn new(base: Url, account_id: String, insert_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            account_id,
            insert_key,
        }
    }

    pub fn from_settings(settings: &ReportingSettings) -> Result<Self> {
        Ok(Self::new(
            base_url(NEW_RELIC_URL)?,
            required(&settings.new_relic_account_id, "--new-relic-account-id")?,
            required(&settings.new_relic_insert_key, "--new-relic-insert-key")?,
        ))
    }
}

#[async_trait]
impl Reporter for NewRelicReporter {
    fn name(&self) -> &'static str {
        "New Relic"
    }

    #[instrument(skip(self, event), fields(status = %event.status))]
    async fn post_event(&self, event: &DeploymentEvent) -> Result<()> {
        let url = join_segments(&self.base, &["v1", "accounts", self.account_id.as_str(), "events"])
            .ok_or_else(|| {
                ChartBuilderError::ReportFailed(format!(
                    "{} cannot be used as a base URL",
                    self.base
                ))
            })?;
        debug!("Posting event to {}", url);

        let response = self
            .http
            .post(url)
            .header("X-Insert-Key", &self.insert_key)
            .json(&event_body(event))
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

    fn make_event(status: EventStatus) -> DeploymentEvent {
        let tags = vec![
            ("service".to_string(), "web".to_string()),
            ("env".to_string(), "prod".to_string()),
            ("version".to_string(), "1.0.0".to_string()),
            ("team".to_string(), "platform".to_string()),
        ];
        match status {
            EventStatus::Success => DeploymentEvent::success(tags),
            EventStatus::Error => DeploymentEvent::error("An operation failed", tags),
        }
    }

    #[test]
    fn test_event_body_renames_service() {
        let body = event_body(&make_event(EventStatus::Error));

        assert_eq!(
            body,
            json!({
                "eventType": "Deployments",
                "source": "gitlab",
                "status": "error",
                "success": "0",
                "message": "An operation failed",
                "app_name": "web",
                "env": "prod",
                "version": "1.0.0",
                "team": "platform"
            })
        );
    }

    #[test]
    fn test_from_settings_requires_insert_key() {
        let settings = ReportingSettings {
            new_relic_account_id: Some("123".to_string()),
            ..Default::default()
        };

        let err = NewRelicReporter::from_settings(&settings).err().unwrap();

        assert!(matches!(err, ChartBuilderError::ReportFailed(msg) if msg.contains("--new-relic-insert-key")));
    }

    #[tokio::test]
    async fn test_post_event() {
        let server = MockServer::start().await;
        let event = make_event(EventStatus::Success);
        Mock::given(method("POST"))
            .and(path("/v1/accounts/123/events"))
            .and(header("X-Insert-Key", "insert"))
            .and(body_json(event_body(&event)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let reporter = NewRelicReporter::new(
            Url::parse(&server.uri()).unwrap(),
            "123".to_string(),
            "insert".to_string(),
        );

        reporter.post_event(&event).await.unwrap();
    }

    #[tokio::test]
    async fn test_post_event_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad event"))
            .mount(&server)
            .await;

        let reporter = NewRelicReporter::new(
            Url::parse(&server.uri()).unwrap(),
            "123".to_string(),
            "insert".to_string(),
        );

        let err = reporter
            .post_event(&make_event(EventStatus::Success))
            .await
            .unwrap_err();

        assert!(matches!(err, ChartBuilderError::ReportFailed(msg) if msg.contains("bad event")));
    }
}
