//! hook
//!
//! The ref-update classification and gating engine.
//!
//! # Architecture
//!
//! One hook invocation receives one or more ref updates (`<ref> <old>
//! <new>` triples) and decides each one:
//!
//! 1. **Classify**: ref namespace, action kind, operation kind
//! 2. **Enumerate**: the commits this update introduces
//! 3. **Build**: the structured [`Operation`](crate::core::types::Operation)
//! 4. **Decide**: allow-list bypass or the policy engine
//!
//! The object cache and range cache live exactly as long as one
//! invocation and are shared across the refs of a batch; the repository
//! is immutable while the hook runs.
//!
//! # Invariants
//!
//! - A fatal classification failure sends nothing to the policy engine
//! - Refs are processed in supplied order, and an early denial or failure
//!   never short-circuits the refs after it
//! - Failures are typed here; only the CLI maps them to exit codes

pub mod classify;
pub mod gate;
pub mod operation;
pub mod range;

pub use gate::evaluate_ref;
pub use range::RangeResolver;

use serde::Serialize;
use thiserror::Error;

use crate::core::config::HookConfig;
use crate::core::types::{Oid, Operation};
use crate::git::{ObjectDb, ObjectStore, StoreError};
use crate::policy::{PolicyEngine, PolicyError};

/// Errors that abort evaluation of one ref.
#[derive(Debug, Error)]
pub enum HookError {
    /// The ref name matches no recognized namespace, or an annotated tag
    /// was pushed outside `refs/tags/`.
    #[error("invalid reference: {refname}")]
    InvalidRef {
        /// The offending ref name
        refname: String,
    },

    /// No acting user could be resolved and the config requires one.
    #[error("no account could be resolved for the update of {refname}")]
    MissingAccount {
        /// The ref being updated
        refname: String,
    },

    /// A backend or classification failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The policy engine could not reach a verdict.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// One `<ref> <old> <new>` triple as supplied by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefUpdate {
    pub refname: String,
    pub old: Oid,
    pub new: Oid,
}

/// The decision for one ref.
#[derive(Debug, Clone, Serialize)]
pub struct RefDecision {
    /// Whether the update may proceed.
    pub allowed: bool,
    /// True when an allow-listed user skipped policy evaluation.
    pub bypassed: bool,
    /// Policy diagnostics, verbatim.
    pub messages: Vec<String>,
    /// The operation as classified (also useful for `--json` debugging).
    pub operation: Operation,
}

/// One ref's update paired with how its evaluation went.
#[derive(Debug)]
pub struct RefOutcome {
    pub update: RefUpdate,
    pub result: Result<RefDecision, HookError>,
}

/// Evaluate a batch of ref updates in supplied order.
///
/// Object and range caches are shared across the batch. Every ref is
/// evaluated regardless of earlier denials or failures, so the pusher
/// sees all diagnostics at once.
pub fn evaluate_updates(
    config: &HookConfig,
    store: &dyn ObjectStore,
    policy: &dyn PolicyEngine,
    pusher: Option<&str>,
    updates: &[RefUpdate],
) -> Vec<RefOutcome> {
    let mut db = ObjectDb::new(store);
    let mut resolver = RangeResolver::new();

    updates
        .iter()
        .map(|update| RefOutcome {
            update: update.clone(),
            result: gate::evaluate_ref(config, &mut db, &mut resolver, policy, pusher, update),
        })
        .collect()
}
