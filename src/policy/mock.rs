//! policy::mock
//!
//! Mock policy engine for deterministic testing.
//!
//! Records every operation it is asked about, so tests can assert both the
//! verdict path and the bypass path (an allow-listed user must produce
//! zero recorded evaluations).

use std::sync::{Arc, Mutex};

use crate::core::types::Operation;
use crate::hook::RefUpdate;

use super::traits::{PolicyEngine, PolicyError, Verdict};

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockPolicyInner {
    verdict: Option<Verdict>,
    fail: Option<String>,
    evaluated: Vec<(String, Operation)>,
}

/// Mock policy for testing.
///
/// Allows everything unless told otherwise.
#[derive(Debug, Clone, Default)]
pub struct MockPolicy {
    inner: Arc<Mutex<MockPolicyInner>>,
}

impl MockPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every evaluation with `verdict`.
    pub fn respond_with(&self, verdict: Verdict) {
        self.lock().verdict = Some(verdict);
    }

    /// Fail every evaluation with an internal error.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.lock().fail = Some(message.into());
    }

    /// The (refname, operation) pairs evaluated so far.
    pub fn evaluated(&self) -> Vec<(String, Operation)> {
        self.lock().evaluated.clone()
    }

    /// How many evaluations ran.
    pub fn evaluation_count(&self) -> usize {
        self.lock().evaluated.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockPolicyInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PolicyEngine for MockPolicy {
    fn evaluate(&self, update: &RefUpdate, operation: &Operation) -> Result<Verdict, PolicyError> {
        let mut inner = self.lock();
        inner
            .evaluated
            .push((update.refname.clone(), operation.clone()));
        if let Some(message) = &inner.fail {
            return Err(PolicyError::Internal(message.clone()));
        }
        Ok(inner.verdict.clone().unwrap_or_else(Verdict::allow))
    }
}
