// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use super::{DeploymentEvent, EventStatus, Reporter};
use crate::error::Result;
use async_trait::async_trait;
use tracing::{error, info};

/// Writes events to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalReporter;

#[async_trait]
impl Reporter for LocalReporter {
    fn name(&self) -> &'static str {
        "Local"
    }

    async fn post_event(&self, event: &DeploymentEvent) -> Result<()> {
        let tags: Vec<String> = event
            .tags
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect();

        match event.status {
            EventStatus::Success => info!(tags = ?tags, "{}", event.message),
            EventStatus::Error => error!(tags = ?tags, "{}", event.message),
        }
        Ok(())
    }
}
