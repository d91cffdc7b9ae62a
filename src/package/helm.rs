// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use super::{ChartRelease, PackageCommand, PackageManager};
use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Installs charts with `helm upgrade --install`
#[derive(Debug, Clone, Copy, Default)]
pub struct HelmPackageManager;

#[async_trait]
impl PackageManager for HelmPackageManager {
    fn build(&self, release: &ChartRelease, kubeconfig: &Path) -> PackageCommand {
        let mut command = PackageCommand::new(
            "helm",
            &["upgrade", "--install", release.release.as_str(), release.chart.as_str()],
        );

        if let Some(version) = &release.version {
            command.option("--version", version.as_str());
        }
        if let Some(namespace) = &release.namespace {
            command.option("--namespace", namespace.as_str());
        }
        if let Some(repository) = &release.repository {
            command.option("--repo", repository.as_str());
        }
        for values in &release.values {
            command.option("--values", values.as_str());
        }
        for set in &release.sets {
            command.option("--set", set.as_str());
        }

        command
            .option("--kubeconfig", kubeconfig.display().to_string())
            .flag("--reset-values");

        if let Some(timeout) = &release.timeout {
            command.option("--timeout", timeout.as_str());
        }
        if release.atomic {
            command.flag("--atomic");
        }
        if release.wait {
            command.flag("--wait");
        }

        command
    }

    #[instrument(skip(self, command), fields(program = %command.program))]
    async fn deploy(&self, command: &PackageCommand) -> Result<String> {
        debug!("Running {:?}", command.args());

        let output = Command::new(&command.program)
            .args(command.args())
            .output()
            .await
            .map_err(|e| {
                ChartBuilderError::CommandFailed(format!("failed to run {}: {}", command.program, e))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !output.status.success() {
            return Err(ChartBuilderError::CommandFailed(if stderr.is_empty() {
                format!("{} exited with {}", command.program, output.status)
            } else {
                stderr.to_string()
            }));
        }
        if !stderr.is_empty() {
            warn!("{}", stderr);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_release() -> ChartRelease {
        ChartRelease {
            release: "web".to_string(),
            chart: "charts/web".to_string(),
            atomic: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_minimal_release() {
        let command = HelmPackageManager.build(&make_release(), Path::new("/home/ci/.kube/config"));

        assert_eq!(command.program, "helm");
        assert_eq!(
            command.args(),
            vec![
                "upgrade",
                "--install",
                "web",
                "charts/web",
                "--kubeconfig",
                "/home/ci/.kube/config",
                "--reset-values",
                "--atomic"
            ]
        );
    }

    #[test]
    fn test_build_full_release_keeps_option_order() {
        let release = ChartRelease {
            namespace: Some("apps".to_string()),
            version: Some("1.2.3".to_string()),
            repository: Some("https://charts.example.com".to_string()),
            values: vec!["values.yaml".to_string(), "prod.yaml".to_string()],
            sets: vec!["image.tag=abc".to_string(), "replicas=3".to_string()],
            timeout: Some("10m".to_string()),
            wait: true,
            ..make_release()
        };

        let command = HelmPackageManager.build(&release, Path::new("/kube/config"));

        assert_eq!(
            command.args(),
            vec![
                "upgrade",
                "--install",
                "web",
                "charts/web",
                "--version",
                "1.2.3",
                "--namespace",
                "apps",
                "--repo",
                "https://charts.example.com",
                "--values",
                "values.yaml",
                "--values",
                "prod.yaml",
                "--set",
                "image.tag=abc",
                "--set",
                "replicas=3",
                "--kubeconfig",
                "/kube/config",
                "--reset-values",
                "--timeout",
                "10m",
                "--atomic",
                "--wait"
            ]
        );
    }

    #[test]
    fn test_build_without_atomic() {
        let release = ChartRelease {
            atomic: false,
            ..make_release()
        };

        let command = HelmPackageManager.build(&release, Path::new("/kube/config"));

        assert!(!command.args().contains(&"--atomic".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deploy_returns_stdout() {
        let command = PackageCommand::new("sh", &["-c", "echo deployed; echo notice >&2"]);

        let output = HelmPackageManager.deploy(&command).await.unwrap();

        assert_eq!(output, "deployed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deploy_failure_carries_stderr() {
        let command = PackageCommand::new("sh", &["-c", "echo 'release failed' >&2; exit 1"]);

        let err = HelmPackageManager.deploy(&command).await.unwrap_err();

        assert!(matches!(err, ChartBuilderError::CommandFailed(msg) if msg == "release failed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deploy_failure_without_stderr() {
        let command = PackageCommand::new("sh", &["-c", "exit 3"]);

        let err = HelmPackageManager.deploy(&command).await.unwrap_err();

        assert!(matches!(err, ChartBuilderError::CommandFailed(msg) if msg.starts_with("sh exited")));
    }

    #[tokio::test]
    async fn test_deploy_missing_program() {
        let command = PackageCommand::new("chart-builder-no-such-binary", &[]);

        let err = HelmPackageManager.deploy(&command).await.unwrap_err();

        assert!(matches!(err, ChartBuilderError::CommandFailed(_)));
    }
}
