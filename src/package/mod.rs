// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Installing charts through a package manager CLI.

pub mod helm;

use crate::error::{ChartBuilderError, Result};
use async_trait::async_trait;
use std::path::Path;

pub use helm::HelmPackageManager;

/// A chart release to install or upgrade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartRelease {
    pub release: String,
    pub chart: String,
    pub namespace: Option<String>,
    pub version: Option<String>,
    pub repository: Option<String>,
    pub values: Vec<String>,
    pub sets: Vec<String>,
    pub atomic: bool,
    pub timeout: Option<String>,
    pub wait: bool,
}

/// A package manager invocation: the program, its leading positional
/// arguments and its options in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCommand {
    pub program: String,
    pub head: Vec<String>,
    pub options: Vec<(String, Option<String>)>,
}

impl PackageCommand {
    pub fn new(program: &str, head: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            head: head.iter().map(|s| s.to_string()).collect(),
            options: Vec::new(),
        }
    }

    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.options.push((flag.to_string(), None));
        self
    }

    pub fn option(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.options.push((flag.to_string(), Some(value.into())));
        self
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = self.head.clone();
        for (flag, value) in &self.options {
            args.push(flag.clone());
            args.extend(value.iter().cloned());
        }
        args
    }

    /// One line for the program and its positional arguments, then one line
    /// per option
    pub fn display_lines(&self) -> Vec<String> {
        let mut first = vec![self.program.clone()];
        first.extend(self.head.iter().cloned());

        let mut lines = vec![first.join(" ")];
        lines.extend(self.options.iter().map(|(flag, value)| match value {
            Some(value) => format!("{} {}", flag, value),
            None => flag.clone(),
        }));
        lines
    }
}

#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Build the command that installs `release` using the given kubeconfig
    fn build(&self, release: &ChartRelease, kubeconfig: &Path) -> PackageCommand;

    /// Run the command, returning its standard output
    async fn deploy(&self, command: &PackageCommand) -> Result<String>;
}

/// Select a package manager by name
pub fn package_manager(name: &str) -> Result<Box<dyn PackageManager>> {
    match name.to_ascii_lowercase().as_str() {
        "helm" => Ok(Box::new(HelmPackageManager)),
        _ => Err(ChartBuilderError::UnsupportedProvider {
            kind: "package manager",
            name: name.to_string(),
        }),
    }
}
