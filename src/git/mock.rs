//! git::mock
//!
//! Mock object store for deterministic testing.
//!
//! # Design
//!
//! [`MockStore`] serves canned objects, refs, and rev-list answers from
//! memory, records every call for verification, and can be told to fail a
//! specific method. Cache idempotence tests count calls per method to
//! prove the memoization layer never asks the same question twice.
//!
//! # Example
//!
//! ```
//! use refgate::core::types::{ObjectType, Oid};
//! use refgate::git::mock::{MockCall, MockStore};
//! use refgate::git::ObjectStore;
//!
//! let store = MockStore::new();
//! let id = Oid::new("a".repeat(40)).unwrap();
//! store.insert_object(&id, ObjectType::Commit, vec!["commit ...".into()]);
//!
//! assert_eq!(store.object_type(&id).unwrap(), ObjectType::Commit);
//! assert_eq!(store.call_count(MockCall::ObjectType), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::types::{ObjectType, Oid};

use super::store::{ObjectStore, StoreError};

/// Which store method a recorded call hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCall {
    ObjectType,
    ObjectExists,
    DiffSummary,
    RevList,
    LocalRefs,
    BranchesContaining,
    BranchesNotContaining,
}

/// One canned object.
#[derive(Debug, Clone)]
struct MockObject {
    otype: ObjectType,
    show: Vec<String>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockStoreInner {
    objects: HashMap<Oid, MockObject>,
    refs: Vec<String>,
    /// Keyed by (include, exclusion list).
    rev_lists: HashMap<(Oid, Vec<String>), Vec<Oid>>,
    branches_containing: HashMap<Oid, Vec<String>>,
    /// Recorded calls with a short detail string.
    calls: Vec<(MockCall, String)>,
    /// Method to fail with `BackendUnavailable` (for error-path tests).
    fail_on: Option<MockCall>,
}

/// Mock object store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping, so tests can keep
/// a handle for assertions while the store is borrowed by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<MockStoreInner>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `otype` and `show` lines for `id`.
    pub fn insert_object(&self, id: &Oid, otype: ObjectType, show: Vec<String>) {
        self.lock()
            .objects
            .insert(id.clone(), MockObject { otype, show });
    }

    /// Set the full local ref listing.
    pub fn set_refs(&self, refs: Vec<String>) {
        self.lock().refs = refs;
    }

    /// Serve `result` for a rev-list of `include` minus `exclude`.
    pub fn set_rev_list(&self, include: &Oid, exclude: &[&str], result: Vec<Oid>) {
        let key = (
            include.clone(),
            exclude.iter().map(|s| s.to_string()).collect(),
        );
        self.lock().rev_lists.insert(key, result);
    }

    /// Serve `branches` for containment queries on `commit`.
    pub fn set_branches_containing(&self, commit: &Oid, branches: Vec<String>) {
        self.lock()
            .branches_containing
            .insert(commit.clone(), branches);
    }

    /// Make `method` fail with `BackendUnavailable` from now on.
    pub fn set_fail_on(&self, method: MockCall) {
        self.lock().fail_on = Some(method);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<(MockCall, String)> {
        self.lock().calls.clone()
    }

    /// How many recorded calls hit `method`.
    pub fn call_count(&self, method: MockCall) -> usize {
        self.lock().calls.iter().filter(|(m, _)| *m == method).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: MockCall, detail: String) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.calls.push((method, detail.clone()));
        if inner.fail_on == Some(method) {
            return Err(StoreError::BackendUnavailable {
                command: format!("mock {:?}", method),
                detail,
            });
        }
        Ok(())
    }
}

impl ObjectStore for MockStore {
    fn object_type(&self, id: &Oid) -> Result<ObjectType, StoreError> {
        self.record(MockCall::ObjectType, id.to_string())?;
        self.lock()
            .objects
            .get(id)
            .map(|o| o.otype)
            .ok_or_else(|| StoreError::InvalidObject {
                oid: id.to_string(),
            })
    }

    fn object_exists(&self, id: &Oid) -> Result<bool, StoreError> {
        self.record(MockCall::ObjectExists, id.to_string())?;
        Ok(self.lock().objects.contains_key(id))
    }

    fn diff_summary(&self, id: &Oid) -> Result<Vec<String>, StoreError> {
        self.record(MockCall::DiffSummary, id.to_string())?;
        self.lock()
            .objects
            .get(id)
            .map(|o| o.show.clone())
            .ok_or_else(|| StoreError::InvalidObject {
                oid: id.to_string(),
            })
    }

    fn rev_list(&self, include: &Oid, exclude: &[String]) -> Result<Vec<Oid>, StoreError> {
        self.record(
            MockCall::RevList,
            format!("{} ^{}", include, exclude.join(" ^")),
        )?;
        let key = (include.clone(), exclude.to_vec());
        Ok(self.lock().rev_lists.get(&key).cloned().unwrap_or_default())
    }

    fn local_refs(&self) -> Result<Vec<String>, StoreError> {
        self.record(MockCall::LocalRefs, String::new())?;
        Ok(self.lock().refs.clone())
    }

    fn branches_containing(
        &self,
        commit: &Oid,
        _include_remote: bool,
    ) -> Result<Vec<String>, StoreError> {
        self.record(MockCall::BranchesContaining, commit.to_string())?;
        Ok(self
            .lock()
            .branches_containing
            .get(commit)
            .cloned()
            .unwrap_or_default())
    }

    fn branches_not_containing(
        &self,
        commit: &Oid,
        _include_remote: bool,
    ) -> Result<Vec<String>, StoreError> {
        self.record(MockCall::BranchesNotContaining, commit.to_string())?;
        // Complement of the containment set over all known branch refs.
        let inner = self.lock();
        let containing = inner
            .branches_containing
            .get(commit)
            .cloned()
            .unwrap_or_default();
        Ok(inner
            .refs
            .iter()
            .filter(|r| r.starts_with("refs/heads/"))
            .map(|r| r.trim_start_matches("refs/heads/").to_string())
            .filter(|b| !containing.contains(b))
            .collect())
    }
}
