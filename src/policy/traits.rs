//! policy::traits
//!
//! Policy engine trait definition.
//!
//! # Design
//!
//! The engine receives the fully classified [`Operation`] together with
//! the raw ref transition, and answers with an allow/deny verdict plus
//! zero or more human-readable diagnostics. Diagnostics travel verbatim
//! to the pushing user; the engine is the right place for wording.
//!
//! A deny is the expected "no access" outcome, not a failure: engines
//! return `Err` only when they could not reach a verdict at all.

use thiserror::Error;

use crate::core::types::Operation;
use crate::git::StoreError;
use crate::hook::RefUpdate;

/// Errors from policy evaluation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A backend query made on behalf of a rule failed.
    #[error("backend query failed during policy evaluation: {0}")]
    Store(#[from] StoreError),

    /// The engine itself misbehaved.
    #[error("policy engine failure: {0}")]
    Internal(String),
}

/// Outcome of evaluating one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the update may proceed.
    pub allowed: bool,
    /// Diagnostics for the pushing user, in rule order.
    pub messages: Vec<String>,
}

impl Verdict {
    /// An allow with no commentary.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            messages: Vec::new(),
        }
    }

    /// A deny carrying one message.
    pub fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            messages: vec![message.into()],
        }
    }
}

/// Access policy for ref updates.
pub trait PolicyEngine {
    /// Decide whether `operation` may be applied.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` only when no verdict could be reached; a
    /// denial is a successful evaluation.
    fn evaluate(&self, update: &RefUpdate, operation: &Operation) -> Result<Verdict, PolicyError>;
}
