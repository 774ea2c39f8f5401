//! policy::rules
//!
//! Config-driven built-in policy engine.
//!
//! # Rules
//!
//! Evaluated per label, in this order; every matching rule contributes a
//! diagnostic, so a push that trips several rules sees all of them:
//!
//! 1. tag removal (`allow_tag_removal`)
//! 2. protected-ref deletion (`deny_deletes`)
//! 3. protected-ref non-fast-forward (`deny_non_fast_forwards`)
//! 4. orphaning branch deletion (`deny_orphaning_deletes`)
//!
//! Non-fast-forwardness is derived from reachability alone: if any commit
//! is reachable from the old tip but not from the new one, the update
//! rewrites history. The hook runs before the ref moves, so the old tip is
//! still anchored while we ask.

use crate::core::config::PolicyConfig;
use crate::core::types::{ActionKind, Operation, RefType};
use crate::git::ObjectStore;
use crate::hook::RefUpdate;

use super::traits::{PolicyEngine, PolicyError, Verdict};

/// Built-in rule engine over the repository's policy config.
pub struct RulePolicy<'a> {
    config: PolicyConfig,
    store: &'a dyn ObjectStore,
}

impl<'a> RulePolicy<'a> {
    pub fn new(config: PolicyConfig, store: &'a dyn ObjectStore) -> Self {
        Self { config, store }
    }

    /// Commits reachable from `old` but not from `new` mean the update
    /// drops history: not a fast-forward.
    fn is_fast_forward(&self, update: &RefUpdate) -> Result<bool, PolicyError> {
        let dropped = self
            .store
            .rev_list(&update.old, &[update.new.to_string()])?;
        Ok(dropped.is_empty())
    }

    /// Whether any branch other than the one being deleted still contains
    /// the old tip.
    fn delete_orphans_commits(&self, update: &RefUpdate) -> Result<bool, PolicyError> {
        let own_branch = update
            .refname
            .strip_prefix("refs/heads/")
            .unwrap_or(&update.refname);
        let containing = self.store.branches_containing(&update.old, false)?;
        Ok(!containing.iter().any(|b| b != own_branch))
    }
}

impl PolicyEngine for RulePolicy<'_> {
    fn evaluate(&self, update: &RefUpdate, operation: &Operation) -> Result<Verdict, PolicyError> {
        let mut messages = Vec::new();

        for label in &operation.labels {
            let deleted = label.action == ActionKind::Deleted;

            if label.ref_type == RefType::Tags && deleted && !self.config.allow_tag_removal {
                messages.push(self.config.tag_removal_denied_message.clone());
            }

            if self.config.is_protected(&label.ref_name) {
                if deleted && self.config.deny_deletes {
                    messages.push(format!(
                        "deletion of protected ref '{}' is not allowed",
                        label.ref_name
                    ));
                }
                if !deleted
                    && !update.old.is_zero()
                    && !update.new.is_zero()
                    && self.config.deny_non_fast_forwards
                    && !self.is_fast_forward(update)?
                {
                    messages.push(format!(
                        "non-fast-forward update of protected ref '{}' is not allowed",
                        label.ref_name
                    ));
                }
            }

            if deleted
                && label.ref_type == RefType::Heads
                && self.config.deny_orphaning_deletes
                && self.delete_orphans_commits(update)?
            {
                messages.push(format!(
                    "deleting '{}' would orphan commits no other branch contains",
                    label.ref_name
                ));
            }
        }

        Ok(Verdict {
            allowed: messages.is_empty(),
            messages,
        })
    }
}
