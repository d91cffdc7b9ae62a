// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Name-keyed merge of kubeconfig sections with conflict detection

use super::document::{Kubeconfig, NamedEntry, Section};
use crate::error::{ChartBuilderError, Result};
use tracing::debug;

/// Merge `incoming` entries into one section of the existing document.
///
/// Entries are matched by `name`. A match is replaced when `replace` is set or
/// the two entries are identical; a differing match is a conflict. Entries
/// without a name never match anything.
pub fn merge_section(
    existing: &mut Option<Vec<NamedEntry>>,
    incoming: Option<&[NamedEntry]>,
    section: Section,
    replace: bool,
) -> Result<()> {
    let incoming = match incoming {
        Some(entries) if !entries.is_empty() => entries,
        _ => return Ok(()),
    };

    let entries = existing.get_or_insert_with(Vec::new);
    if entries.is_empty() {
        entries.extend_from_slice(incoming);
        return Ok(());
    }

    for entry in incoming {
        let Some(name) = entry.name.as_deref() else {
            // unnamed entries are append-only; skip exact duplicates so repeated
            // merges do not pile them up
            if !entries.contains(entry) {
                entries.push(entry.clone());
            }
            continue;
        };

        let conflicting = entries
            .iter()
            .any(|e| e.name.as_deref() == Some(name) && e != entry);
        if conflicting && !replace {
            return Err(ChartBuilderError::MergeConflict {
                name: name.to_string(),
                section,
            });
        }

        let before = entries.len();
        entries.retain(|e| e.name.as_deref() != Some(name));
        if entries.len() != before {
            debug!("Replacing {} entry {}", section, name);
        }
        entries.push(entry.clone());
    }

    Ok(())
}

/// Merge a fragment into an existing document.
///
/// With no existing document the fragment is used verbatim. Otherwise the
/// three sections are merged and the fragment's `current-context` wins.
pub fn merge_documents(
    existing: Option<Kubeconfig>,
    incoming: Kubeconfig,
    replace: bool,
) -> Result<Kubeconfig> {
    let Some(mut merged) = existing else {
        return Ok(incoming);
    };

    for section in Section::ALL {
        merge_section(
            merged.section_mut(section),
            incoming.section(section),
            section,
            replace,
        )?;
    }
    merged.current_context = incoming.current_context;

    Ok(merged)
}
