//! git::objects
//!
//! Per-invocation memoization of object metadata.
//!
//! # Design
//!
//! [`ObjectDb`] wraps an [`ObjectStore`] and caches every answer for the
//! lifetime of one hook invocation: object type, validity, the raw show
//! lines, and the parsed commit record. The repository is immutable while
//! the hook runs, so entries are never invalidated, and nothing is
//! persisted across invocations.
//!
//! The cache is an owned value passed explicitly through the pipeline, not
//! ambient state, which makes it trivially testable against a fake store.
//!
//! # Invariants
//!
//! - The zero oid resolves to [`ObjectType::Empty`] without a backend call
//! - Repeated queries for the same id hit the backend at most once
//! - `show` refuses object types other than commit and tag

use std::collections::HashMap;

use crate::core::types::{ObjectType, Oid};

use super::show::{parse_commit_record, CommitRecord};
use super::store::{ObjectStore, StoreError};

/// Cached metadata for one object id.
///
/// Fields fill lazily: `otype`/`valid` on the first type or validity
/// check, `record` on the first show request.
#[derive(Debug, Default)]
struct ObjectRecord {
    otype: Option<ObjectType>,
    valid: Option<bool>,
    record: Option<CommitRecord>,
}

/// Memoizing front to the object store, scoped to one invocation.
pub struct ObjectDb<'a> {
    store: &'a dyn ObjectStore,
    records: HashMap<Oid, ObjectRecord>,
}

impl<'a> ObjectDb<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            records: HashMap::new(),
        }
    }

    /// The store this cache fronts.
    pub fn store(&self) -> &'a dyn ObjectStore {
        self.store
    }

    /// Resolve the type of an object.
    ///
    /// The zero oid short-circuits to `Empty` without touching the store.
    ///
    /// # Errors
    ///
    /// `InvalidObject` if the id does not exist in the repository.
    pub fn object_type(&mut self, id: &Oid) -> Result<ObjectType, StoreError> {
        if id.is_zero() {
            return Ok(ObjectType::Empty);
        }
        let entry = self.records.entry(id.clone()).or_default();
        if let Some(otype) = entry.otype {
            return Ok(otype);
        }
        match self.store.object_type(id) {
            Ok(otype) => {
                entry.otype = Some(otype);
                entry.valid = Some(true);
                Ok(otype)
            }
            Err(err) => {
                if matches!(err, StoreError::InvalidObject { .. }) {
                    entry.valid = Some(false);
                }
                Err(err)
            }
        }
    }

    /// Whether the object exists in the repository.
    ///
    /// The zero oid is considered valid: it is a sentinel, not a lookup.
    pub fn is_valid(&mut self, id: &Oid) -> Result<bool, StoreError> {
        if id.is_zero() {
            return Ok(true);
        }
        let entry = self.records.entry(id.clone()).or_default();
        if let Some(valid) = entry.valid {
            return Ok(valid);
        }
        let valid = self.store.object_exists(id)?;
        entry.valid = Some(valid);
        Ok(valid)
    }

    /// The parsed show response for a commit or tag object.
    ///
    /// # Errors
    ///
    /// `UnexpectedType` if the object is a blob or tree;
    /// `InvalidObject` if the id does not resolve at all.
    pub fn show(&mut self, id: &Oid) -> Result<CommitRecord, StoreError> {
        let otype = self.object_type(id)?;
        if !matches!(otype, ObjectType::Commit | ObjectType::Tag) {
            return Err(StoreError::UnexpectedType {
                oid: id.to_string(),
                expected: "commit or tag".to_string(),
                actual: otype,
            });
        }

        let entry = self.records.entry(id.clone()).or_default();
        if let Some(record) = &entry.record {
            return Ok(record.clone());
        }
        let lines = self.store.diff_summary(id)?;
        let record = parse_commit_record(&lines);
        entry.record = Some(record.clone());
        Ok(record)
    }

    /// Parent ids from the object's `Merge:` header, `None` when the
    /// object is not a merge commit.
    pub fn merge_parents(&mut self, id: &Oid) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.show(id)?.merge_parents)
    }
}
