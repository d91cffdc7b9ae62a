// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Context renaming applied to an incoming kubeconfig before it is merged.
//!
//! Cloud-issued admin kubeconfigs reuse the cluster-derived context name, so an
//! admin fragment would replace the user's own context of the same name. Admin
//! contexts are therefore installed under `<name>-admin`.

use super::document::Kubeconfig;
use crate::constants::kubeconfig::{ADMIN_CONTEXT_SUFFIX, ADMIN_USER_PREFIX};
use tracing::debug;

/// Rename the fragment's context and cluster to `name` and make it current.
/// The context's user reference is left alone.
pub fn apply_context_name(fragment: &mut Kubeconfig, name: &str) {
    if let Some(context) = fragment.contexts.as_mut().and_then(|c| c.first_mut()) {
        context.name = Some(name.to_string());
        context.set_nested_str("context", "cluster", name);
    }

    if let Some(cluster) = fragment.clusters.as_mut().and_then(|c| c.first_mut()) {
        cluster.name = Some(name.to_string());
    }

    fragment.current_context = Some(name.to_string());
}

/// Suffix the first admin context with `-admin` and make it current.
/// Returns the new context name if a context was renamed.
pub fn rename_admin_context(fragment: &mut Kubeconfig) -> Option<String> {
    let contexts = fragment.contexts.as_mut()?;

    let context = contexts.iter_mut().find(|ctx| {
        ctx.name.is_some()
            && ctx
                .nested_str("context", "user")
                .is_some_and(|user| user.starts_with(ADMIN_USER_PREFIX))
    })?;

    let admin_name = format!("{}{}", context.name.as_deref()?, ADMIN_CONTEXT_SUFFIX);
    debug!("Renaming admin context to {}", admin_name);

    context.name = Some(admin_name.clone());
    fragment.current_context = Some(admin_name.clone());
    Some(admin_name)
}

/// Apply the explicit context name, if any, then the admin renaming policy
pub fn prepare_fragment(fragment: &mut Kubeconfig, context_name: Option<&str>) {
    if let Some(name) = context_name {
        apply_context_name(fragment, name);
    }
    rename_admin_context(fragment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubeconfig::NamedEntry;
    use serde_yaml::Value;
    use std::collections::BTreeMap;

    fn make_context(name: Option<&str>, cluster: &str, user: &str) -> NamedEntry {
        let mut entry = NamedEntry {
            name: name.map(str::to_string),
            fields: BTreeMap::new(),
        };
        entry.set_nested_str("context", "cluster", cluster);
        entry.set_nested_str("context", "user", user);
        entry
    }

    fn make_cluster(name: &str, server: &str) -> NamedEntry {
        let mut entry = NamedEntry {
            name: Some(name.to_string()),
            fields: BTreeMap::new(),
        };
        entry.set_nested_str("cluster", "server", server);
        entry
    }

    fn make_fragment(context: NamedEntry) -> Kubeconfig {
        Kubeconfig {
            clusters: Some(vec![make_cluster("aks-mycluster", "https://aks")]),
            current_context: context.name.clone(),
            contexts: Some(vec![context]),
            ..Default::default()
        }
    }

    #[test]
    fn test_rename_admin_context() {
        let mut fragment = make_fragment(make_context(
            Some("aks-mycluster"),
            "aks-mycluster",
            "clusterAdmin_rg_mycluster",
        ));

        let renamed = rename_admin_context(&mut fragment);

        assert_eq!(renamed.as_deref(), Some("aks-mycluster-admin"));
        assert_eq!(
            fragment.contexts.as_ref().unwrap()[0].name.as_deref(),
            Some("aks-mycluster-admin")
        );
        assert_eq!(
            fragment.current_context.as_deref(),
            Some("aks-mycluster-admin")
        );
        // the cluster reference is untouched
        assert_eq!(
            fragment.contexts.as_ref().unwrap()[0].nested_str("context", "cluster"),
            Some("aks-mycluster")
        );
    }

    #[test]
    fn test_rename_admin_context_ignores_regular_user() {
        let mut fragment = make_fragment(make_context(
            Some("aks-mycluster"),
            "aks-mycluster",
            "clusterUser_rg_mycluster",
        ));

        assert!(rename_admin_context(&mut fragment).is_none());
        assert_eq!(fragment.current_context.as_deref(), Some("aks-mycluster"));
    }

    #[test]
    fn test_rename_admin_context_only_first_match() {
        let mut fragment = Kubeconfig {
            contexts: Some(vec![
                make_context(Some("one"), "c1", "clusterAdmin_a"),
                make_context(Some("two"), "c2", "clusterAdmin_b"),
            ]),
            ..Default::default()
        };

        rename_admin_context(&mut fragment);

        let contexts = fragment.contexts.unwrap();
        assert_eq!(contexts[0].name.as_deref(), Some("one-admin"));
        assert_eq!(contexts[1].name.as_deref(), Some("two"));
        assert_eq!(fragment.current_context.as_deref(), Some("one-admin"));
    }

    #[test]
    fn test_rename_admin_context_skips_malformed_contexts() {
        let mut unnamed = make_context(None, "c0", "clusterAdmin_x");
        unnamed.fields.insert("extra".to_string(), Value::Null);
        let no_user = NamedEntry {
            name: Some("bare".to_string()),
            fields: BTreeMap::from([("context".to_string(), Value::Null)]),
        };
        let mut fragment = Kubeconfig {
            contexts: Some(vec![
                unnamed,
                no_user,
                make_context(Some("real"), "c1", "clusterAdmin_y"),
            ]),
            ..Default::default()
        };

        let renamed = rename_admin_context(&mut fragment);

        assert_eq!(renamed.as_deref(), Some("real-admin"));
    }

    #[test]
    fn test_rename_admin_context_without_contexts() {
        let mut fragment = Kubeconfig::default();
        assert!(rename_admin_context(&mut fragment).is_none());
        assert!(fragment.current_context.is_none());
    }

    #[test]
    fn test_apply_context_name_keeps_identifiers_consistent() {
        let mut fragment = make_fragment(make_context(
            Some("aks-mycluster"),
            "aks-mycluster",
            "clusterUser_rg_mycluster",
        ));

        apply_context_name(&mut fragment, "staging");

        let context = &fragment.contexts.as_ref().unwrap()[0];
        assert_eq!(context.name.as_deref(), Some("staging"));
        assert_eq!(context.nested_str("context", "cluster"), Some("staging"));
        assert_eq!(
            context.nested_str("context", "user"),
            Some("clusterUser_rg_mycluster")
        );
        assert_eq!(
            fragment.clusters.as_ref().unwrap()[0].name.as_deref(),
            Some("staging")
        );
        assert_eq!(fragment.current_context.as_deref(), Some("staging"));
    }

    #[test]
    fn test_prepare_fragment_explicit_name_then_admin_suffix() {
        let mut fragment = make_fragment(make_context(
            Some("aks-mycluster"),
            "aks-mycluster",
            "clusterAdmin_rg_mycluster",
        ));

        prepare_fragment(&mut fragment, Some("staging"));

        let context = &fragment.contexts.as_ref().unwrap()[0];
        assert_eq!(context.name.as_deref(), Some("staging-admin"));
        assert_eq!(context.nested_str("context", "cluster"), Some("staging"));
        assert_eq!(fragment.current_context.as_deref(), Some("staging-admin"));
    }
}
