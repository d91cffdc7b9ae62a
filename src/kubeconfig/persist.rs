// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Merging credentials into a kubeconfig file on disk

use super::document::Kubeconfig;
use super::merge::merge_documents;
use super::rename::prepare_fragment;
use crate::constants::kubeconfig::{FILE_MODE, UNKNOWN_CONTEXT};
use crate::error::{ChartBuilderError, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Merge policy supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Replace same-named entries that differ instead of failing
    pub overwrite_existing: bool,
    /// Install the fragment's context and cluster under this name
    pub context_name: Option<String>,
}

/// The target kubeconfig is readable or writable by more than its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionWarning {
    pub path: PathBuf,
    pub mode: u32,
}

impl fmt::Display for PermissionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has permissions \"{:o}\". It should be readable and writable only by its owner.",
            self.path.display(),
            self.mode
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The fragment's current-context after renaming, if it carried one
    pub current_context: Option<String>,
    pub permission_warning: Option<PermissionWarning>,
}

impl MergeOutcome {
    /// The current context for display, `UNKNOWN` when the fragment had none
    pub fn context_label(&self) -> &str {
        self.current_context.as_deref().unwrap_or(UNKNOWN_CONTEXT)
    }
}

/// Create the kubeconfig and its parent directory if missing. A new file is
/// created empty with mode 600. Returns whether the file already existed.
pub fn ensure_kubeconfig_exists(path: &Path) -> Result<bool> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| ChartBuilderError::io(dir, e))?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }

    match options.open(path) {
        Ok(_) => {
            debug!("Created empty kubeconfig {}", path.display());
            Ok(false)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(true),
        Err(e) => Err(ChartBuilderError::io(path, e)),
    }
}

/// Check that the kubeconfig is only readable and writable by its owner
#[cfg(unix)]
pub fn check_permissions(path: &Path) -> Result<Option<PermissionWarning>> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ChartBuilderError::io(path, e)),
    };

    let mode = metadata.permissions().mode() & 0o7777;
    if mode & 0o777 == FILE_MODE {
        return Ok(None);
    }

    Ok(Some(PermissionWarning {
        path: path.to_path_buf(),
        mode,
    }))
}

/// Permission bits mean something else on this platform
#[cfg(not(unix))]
pub fn check_permissions(_path: &Path) -> Result<Option<PermissionWarning>> {
    Ok(None)
}

/// Replace the kubeconfig at `path` with `kubeconfig`.
///
/// The document is written to a sibling temporary file that takes over the
/// target's permissions and is then renamed over it, so readers never observe
/// a partially written file.
pub fn write_kubeconfig(kubeconfig: &Kubeconfig, path: &Path) -> Result<()> {
    let yaml = kubeconfig.to_yaml()?;
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut staged = NamedTempFile::new_in(&dir).map_err(|e| ChartBuilderError::io(&dir, e))?;
    if let Ok(metadata) = fs::metadata(&target) {
        staged
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| ChartBuilderError::io(staged.path(), e))?;
    }
    staged
        .write_all(yaml.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| ChartBuilderError::io(staged.path(), e))?;

    staged
        .persist(&target)
        .map_err(|e| ChartBuilderError::io(&target, e.error))?;
    Ok(())
}

/// Merge the kubeconfig at `addition_path` into the one at `existing_path`
#[instrument(skip(options))]
pub fn merge_kubeconfig_files(
    existing_path: &Path,
    addition_path: &Path,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    let fragment = load_fragment(addition_path)?;
    merge_fragment(existing_path, fragment, options, true)
}

/// Merge a kubeconfig blob into the kubeconfig file at `path`, creating the
/// file if needed.
///
/// The blob is staged in a private temporary file for the duration of the
/// merge and removed on every exit path. Nothing is written to `path` unless
/// the whole merge succeeds.
#[instrument(skip(kubeconfig, options))]
pub fn merge_credentials(
    kubeconfig: &str,
    path: &Path,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    let existed = ensure_kubeconfig_exists(path)?;

    let mut staged =
        NamedTempFile::new().map_err(|e| ChartBuilderError::io(std::env::temp_dir(), e))?;
    staged
        .write_all(kubeconfig.as_bytes())
        .and_then(|_| staged.flush())
        .map_err(|e| ChartBuilderError::io(staged.path(), e))?;

    let fragment = load_fragment(staged.path())?;
    merge_fragment(path, fragment, options, existed)
}

fn load_fragment(path: &Path) -> Result<Kubeconfig> {
    Kubeconfig::load_required(path)?
        .ok_or_else(|| ChartBuilderError::EmptyFragment(path.to_path_buf()))
}

fn merge_fragment(
    path: &Path,
    mut fragment: Kubeconfig,
    options: &MergeOptions,
    check_existing: bool,
) -> Result<MergeOutcome> {
    let existing = Kubeconfig::load(path)?;

    prepare_fragment(&mut fragment, options.context_name.as_deref());
    let current_context = fragment.current_context.clone();

    let merged = merge_documents(existing, fragment, options.overwrite_existing)?;

    let permission_warning = if check_existing {
        check_permissions(path)?
    } else {
        None
    };
    if let Some(warning) = &permission_warning {
        warn!("{}", warning);
    }

    write_kubeconfig(&merged, path)?;

    let outcome = MergeOutcome {
        current_context,
        permission_warning,
    };
    info!(
        "Merged \"{}\" as current context in {}",
        outcome.context_label(),
        path.display()
    );
    Ok(outcome)
}
