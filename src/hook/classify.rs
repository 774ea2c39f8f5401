//! hook::classify
//!
//! Action and operation-kind classification for one ref update.
//!
//! Classification is a pure decision over {old, new, ref type, new object
//! type}; the only backend traffic is the merge check, and only when the
//! caller asks for commit-level granularity.

use crate::core::types::{ActionKind, ObjectType, Oid, RefType};
use crate::git::{ObjectDb, StoreError};

use super::HookError;

/// Classify what a ref update did.
///
/// Precedence, in order:
///
/// 1. `old` is the zero oid: the ref was created
/// 2. `new` is the zero oid: the ref was deleted
/// 3. `new` is a merge commit and commit-level granularity was requested:
///    merged
/// 4. otherwise: modified
///
/// `branch_or_tag` collapses the merge/modify distinction: a ref-level
/// label is never "merged", only individual commits within a pushed range
/// are. When it is set the merge check is skipped entirely, so no backend
/// call happens for cases 1, 2, and 4.
pub fn classify_action(
    db: &mut ObjectDb<'_>,
    old: &Oid,
    new: &Oid,
    branch_or_tag: bool,
) -> Result<ActionKind, StoreError> {
    if old.is_zero() {
        return Ok(ActionKind::Created);
    }
    if new.is_zero() {
        return Ok(ActionKind::Deleted);
    }
    if !branch_or_tag && db.merge_parents(new)?.is_some() {
        return Ok(ActionKind::Merged);
    }
    Ok(ActionKind::Modified)
}

/// Classify one commit inside a pushed range.
///
/// A commit that is already part of history can only be a merge or a
/// plain change; created/deleted apply to refs, not commits.
pub fn commit_action(db: &mut ObjectDb<'_>, id: &Oid) -> Result<ActionKind, StoreError> {
    if db.merge_parents(id)?.is_some() {
        Ok(ActionKind::Merged)
    } else {
        Ok(ActionKind::Modified)
    }
}

/// Dispatch (new object type, ref type) to the semantic category of the
/// push event.
///
/// The five accepted outcomes:
///
/// - commit to heads/remotes: a branch commit push
/// - commit to tags: a lightweight tag
/// - tag object to tags: an annotated tag
/// - empty to heads/remotes: a branch deletion
/// - empty to tags: a tag deletion
///
/// A tag object on anything but a tags ref is an invalid ref; blobs and
/// trees are rejected before the operation builder ever sees them.
pub fn operation_kind(
    new: &Oid,
    new_type: ObjectType,
    ref_type: RefType,
    refname: &str,
) -> Result<crate::core::types::OperationKind, HookError> {
    use crate::core::types::OperationKind;

    if ref_type == RefType::Invalid {
        return Err(HookError::InvalidRef {
            refname: refname.to_string(),
        });
    }
    match (new_type, ref_type) {
        (ObjectType::Blob | ObjectType::Tree, _) => Err(HookError::Store(
            StoreError::UnexpectedType {
                oid: new.to_string(),
                expected: "commit or tag".to_string(),
                actual: new_type,
            },
        )),
        (ObjectType::Commit, RefType::Heads | RefType::Remotes) => Ok(OperationKind::Commit),
        (ObjectType::Commit, RefType::Tags) => Ok(OperationKind::Tag),
        (ObjectType::Tag, RefType::Tags) => Ok(OperationKind::Tag),
        (ObjectType::Tag, _) => Err(HookError::InvalidRef {
            refname: refname.to_string(),
        }),
        (ObjectType::Empty, RefType::Heads | RefType::Remotes) => Ok(OperationKind::Branch),
        (ObjectType::Empty, RefType::Tags) => Ok(OperationKind::Tag),
        (_, RefType::Invalid) => unreachable!("invalid ref handled above"),
    }
}
