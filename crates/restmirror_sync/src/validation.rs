//! Post-update validation hooks.

use futures::future::join_all;
use restmirror_core::record::value_at_path;
use restmirror_core::{FieldRule, HookContext, Record, TypeSchema};

/// Returns the rules whose path resolves differently in `before` and
/// `after` and that carry a hook.
pub fn triggered<'a>(type_schema: &'a TypeSchema, before: &Record, after: &Record) -> Vec<&'a FieldRule> {
    type_schema
        .validation
        .iter()
        .filter(|rule| rule.after_update.is_some())
        .filter(|rule| value_at_path(before, &rule.path) != value_at_path(after, &rule.path))
        .collect()
}

/// Runs every triggered hook concurrently and waits for all of them.
///
/// Failures are logged and otherwise ignored. Returns the number of hooks
/// that ran.
pub async fn run_after_update(
    type_name: &str,
    identity_field: &str,
    type_schema: &TypeSchema,
    before: &Record,
    after: &Record,
) -> usize {
    let hooks: Vec<_> = triggered(type_schema, before, after)
        .into_iter()
        .filter_map(|rule| {
            let hook = rule.after_update.clone()?;
            Some((rule.path.clone(), hook))
        })
        .collect();
    if hooks.is_empty() {
        return 0;
    }

    let count = hooks.len();
    let futures = hooks.into_iter().map(|(path, hook)| {
        let ctx = HookContext {
            type_name: type_name.to_string(),
            identity_field: identity_field.to_string(),
            record: after.clone(),
        };
        async move { (path, hook(ctx).await) }
    });

    for (path, outcome) in join_all(futures).await {
        if let Err(message) = outcome {
            tracing::warn!(type_name, path = path.as_str(), %message, "after_update hook failed");
        }
    }
    count
}
