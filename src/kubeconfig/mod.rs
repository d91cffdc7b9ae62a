// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig loading, admin-context renaming and credential merging.

pub mod document;
pub mod merge;
pub mod persist;
pub mod rename;

pub use document::{Kubeconfig, NamedEntry, Section};
pub use merge::{merge_documents, merge_section};
pub use persist::{
    check_permissions, ensure_kubeconfig_exists, merge_credentials, merge_kubeconfig_files,
    write_kubeconfig, MergeOptions, MergeOutcome, PermissionWarning,
};
pub use rename::{apply_context_name, prepare_fragment, rename_admin_context};
