//! hook::operation
//!
//! Assembly of the structured [`Operation`] handed to the policy engine.
//!
//! The builder folds everything the pipeline resolved for one ref update:
//! the label, the acting username, the commits the update introduces, and
//! the per-path item map in backend diff order.

use crate::core::types::{CommitSummary, Label, ObjectType, Oid, Operation, RefType};
use crate::git::{status_items, ObjectDb};

use super::classify::{classify_action, commit_action, operation_kind};
use super::range::RangeResolver;
use super::HookError;

/// Build the operation for one ref update.
///
/// The acting username resolves in this order: the pusher override from
/// the invoking layer, then the author/tagger of the new object, then
/// empty. An empty username is the degraded `NoAuthor` outcome; it is the
/// policy engine's decision, not a crash.
///
/// # Errors
///
/// Everything fatal from the pipeline: unknown objects, blob/tree
/// updates, tag objects outside `refs/tags/`, backend failures.
pub fn build_operation(
    db: &mut ObjectDb<'_>,
    resolver: &mut RangeResolver,
    repo_id: i64,
    refname: &str,
    ref_type: RefType,
    old: &Oid,
    new: &Oid,
    pusher: Option<&str>,
) -> Result<Operation, HookError> {
    let new_type = db.object_type(new)?;
    let kind = operation_kind(new, new_type, ref_type, refname)?;

    let record = if matches!(new_type, ObjectType::Commit | ObjectType::Tag) {
        Some(db.show(new)?)
    } else {
        None
    };

    let username = pusher
        .map(str::to_string)
        .or_else(|| record.as_ref().and_then(|r| r.author.clone()))
        .unwrap_or_default();

    let mut op = Operation::new(repo_id, kind, username);
    op.labels.push(Label {
        ref_name: refname.to_string(),
        ref_type,
        action: classify_action(db, old, new, true)?,
    });

    let range = resolver.commits_between(db.store(), old, new, refname)?;
    for id in &range {
        let commit = db.show(id)?;
        op.commits.push(CommitSummary {
            id: id.clone(),
            action: commit_action(db, id)?,
            author: commit.author.clone(),
            date: commit.date,
        });
        for item in status_items(&commit.statuses) {
            op.insert_item(item);
        }
    }

    // The new object's own view of its paths always lands last, so it wins
    // the item map even when the range missed it (e.g. a tag on a commit
    // that is already reachable elsewhere).
    if let Some(record) = record {
        for item in status_items(&record.statuses) {
            op.insert_item(item);
        }
    }

    Ok(op)
}
