//! hook::range
//!
//! Commit-range enumeration for one ref update.
//!
//! # Semantics
//!
//! `commits_between(old, new, excluded_ref)` answers "which commits does
//! this update introduce", oldest first:
//!
//! - deletion (`new` is zero): nothing
//! - creation (`old` is zero): every commit reachable from `new` that no
//!   other existing local ref already reaches; the ref being created is
//!   dropped from the exclusion set in case it was speculatively written
//! - otherwise: the two-dot exclusion range, commits reachable from `new`
//!   but not from `old`
//!
//! Nothing here assumes `new` descends from `old`; a non-fast-forward
//! update is just an exclusion range that happens to drop commits.
//!
//! Results are memoized per (old, new, excluded ref) for the invocation's
//! lifetime.

use std::collections::HashMap;

use crate::core::types::Oid;
use crate::git::{ObjectStore, StoreError};

/// Memoizing range resolver, scoped to one invocation.
#[derive(Default)]
pub struct RangeResolver {
    cache: HashMap<(Oid, Oid, String), Vec<Oid>>,
}

impl RangeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits introduced by updating `excluded_ref` from `old` to `new`.
    pub fn commits_between(
        &mut self,
        store: &dyn ObjectStore,
        old: &Oid,
        new: &Oid,
        excluded_ref: &str,
    ) -> Result<Vec<Oid>, StoreError> {
        let key = (old.clone(), new.clone(), excluded_ref.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let commits = if new.is_zero() {
            Vec::new()
        } else if old.is_zero() {
            let exclude: Vec<String> = store
                .local_refs()?
                .into_iter()
                .filter(|r| r != excluded_ref)
                .collect();
            store.rev_list(new, &exclude)?
        } else {
            store.rev_list(new, &[old.to_string()])?
        };

        self.cache.insert(key, commits.clone());
        Ok(commits)
    }
}
