//! hook::gate
//!
//! Per-ref evaluation: classify, enumerate, build, decide.
//!
//! # Pipeline
//!
//! ```text
//! ref name -> RefType        (pure, no backend)
//! old/new  -> ObjectType     (validates both objects exist)
//! dispatch -> OperationKind  (rejects blobs, trees, misplaced tags)
//! range    -> commits        (creation/deletion aware)
//! fold     -> Operation      (labels, username, commits, items)
//! decide   -> allow-list bypass, or the policy engine
//! ```
//!
//! Every fatal condition aborts this ref before anything reaches the
//! policy engine; a partial operation is never evaluated.

use crate::core::config::HookConfig;
use crate::git::ObjectDb;
use crate::policy::PolicyEngine;

use super::operation::build_operation;
use super::range::RangeResolver;
use super::{HookError, RefDecision, RefUpdate};
use crate::core::types::RefType;

/// Evaluate one ref update end to end.
///
/// # Errors
///
/// `InvalidRef`, `MissingAccount`, any `StoreError` from classification,
/// or a `PolicyError` if the engine could not reach a verdict. A policy
/// denial is NOT an error; it comes back as a decision with
/// `allowed = false`.
pub fn evaluate_ref(
    config: &HookConfig,
    db: &mut ObjectDb<'_>,
    resolver: &mut RangeResolver,
    policy: &dyn PolicyEngine,
    pusher: Option<&str>,
    update: &RefUpdate,
) -> Result<RefDecision, HookError> {
    let ref_type = RefType::classify(&update.refname);
    if !ref_type.is_valid() {
        return Err(HookError::InvalidRef {
            refname: update.refname.clone(),
        });
    }

    // Both sides must resolve before anything else is decided. The zero
    // sentinel short-circuits inside the cache and never hits the backend.
    db.object_type(&update.old)?;

    let operation = build_operation(
        db,
        resolver,
        config.repo_id(),
        &update.refname,
        ref_type,
        &update.old,
        &update.new,
        pusher,
    )?;

    if operation.username.is_empty() && config.require_account() {
        return Err(HookError::MissingAccount {
            refname: update.refname.clone(),
        });
    }

    // Allow-listed users skip policy evaluation entirely. An update whose
    // author could not be resolved never matches the list.
    if !operation.username.is_empty() && config.allowed_users.contains(&operation.username) {
        return Ok(RefDecision {
            allowed: true,
            bypassed: true,
            messages: Vec::new(),
            operation,
        });
    }

    let verdict = policy.evaluate(update, &operation)?;
    Ok(RefDecision {
        allowed: verdict.allowed,
        bypassed: false,
        messages: verdict.messages,
        operation,
    })
}
