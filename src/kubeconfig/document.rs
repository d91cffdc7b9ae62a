// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig document model and loading

use crate::error::{ChartBuilderError, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// One of the three name-keyed collections of a kubeconfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Clusters,
    Users,
    Contexts,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Clusters, Section::Users, Section::Contexts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Clusters => "clusters",
            Section::Users => "users",
            Section::Contexts => "contexts",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry of `clusters`, `users` or `contexts`.
///
/// Only `name` is interpreted; every other field is carried as opaque YAML so
/// that entries compare field-for-field and round-trip unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NamedEntry {
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl NamedEntry {
    /// Read a string nested one level down, e.g. `context.user`
    pub fn nested_str(&self, field: &str, key: &str) -> Option<&str> {
        self.fields.get(field)?.get(key)?.as_str()
    }

    /// Set a string nested one level down, creating the mapping if needed
    pub fn set_nested_str(&mut self, field: &str, key: &str, value: &str) {
        let slot = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(map) = slot {
            map.insert(Value::from(key), Value::from(value));
        }
    }
}

/// A kubeconfig document. Top-level keys other than the three collections and
/// `current-context` (`apiVersion`, `kind`, `preferences`, ...) are kept in
/// `extra` and written back untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Kubeconfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<NamedEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<NamedEntry>>,
    #[serde(
        rename = "current-context",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<NamedEntry>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Kubeconfig {
    pub fn section(&self, section: Section) -> Option<&[NamedEntry]> {
        match section {
            Section::Clusters => self.clusters.as_deref(),
            Section::Users => self.users.as_deref(),
            Section::Contexts => self.contexts.as_deref(),
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Option<Vec<NamedEntry>> {
        match section {
            Section::Clusters => &mut self.clusters,
            Section::Users => &mut self.users,
            Section::Contexts => &mut self.contexts,
        }
    }

    /// Parse a kubeconfig blob. Blank content and a `null` document are
    /// reported as `None`; anything else that is not a kubeconfig mapping is a
    /// parse error attributed to `origin`.
    pub fn from_yaml(text: &str, origin: &Path) -> Result<Option<Self>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_yaml::from_str(text).map_err(|e| parse_error(origin, e))?;
        if value.is_null() {
            return Ok(None);
        }

        // straight from the text, so plain scalars like `2024` stay strings
        serde_yaml::from_str(text)
            .map(Some)
            .map_err(|e| parse_error(origin, e))
    }

    /// Load a kubeconfig file, treating a missing file like an empty one
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChartBuilderError::io(path, e)),
        }
    }

    /// Load a kubeconfig file that must exist
    pub fn load_required(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes, path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ChartBuilderError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(ChartBuilderError::io(path, e)),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ChartBuilderError::ParseError {
            path: Path::new("<memory>").to_path_buf(),
            message: e.to_string(),
        })
    }

    fn from_bytes(bytes: &[u8], path: &Path) -> Result<Option<Self>> {
        let text = std::str::from_utf8(bytes).map_err(|e| parse_error(path, e))?;
        Self::from_yaml(text, path)
    }
}

/// Accept any YAML scalar where a name is expected; kubectl reads an unquoted
/// `name: 2024` as the string "2024"
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(ScalarString)
}

struct ScalarString;

impl<'de> Visitor<'de> for ScalarString {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or another scalar")
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ScalarString)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }
}

fn parse_error(path: &Path, err: impl fmt::Display) -> ChartBuilderError {
    ChartBuilderError::ParseError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
