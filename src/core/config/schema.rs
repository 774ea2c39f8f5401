//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so a typo in a protected-ref
//! pattern or a zero timeout is caught at startup, not mid-push.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Hook configuration.
///
/// # Example
///
/// ```toml
/// repo_id = 7
/// repository = "/srv/git/project.git"
/// backend_timeout_secs = 30
/// allowed_users = ["CI Bot <ci@example.com>"]
/// require_account = false
///
/// [policy]
/// allow_tag_removal = false
/// tag_removal_denied_message = "Tags are permanent here."
/// protected_refs = ["refs/heads/main", "refs/heads/release/"]
/// deny_deletes = true
/// deny_non_fast_forwards = true
/// deny_orphaning_deletes = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HookConfig {
    /// Repository id reported to the policy engine.
    pub repo_id: Option<i64>,

    /// Repository location. Overridden by `--repository`.
    pub repository: Option<String>,

    /// Per-subprocess timeout in seconds.
    pub backend_timeout_secs: Option<u64>,

    /// Users exempt from policy evaluation, matched against the resolved
    /// acting username (commit author or `--pusher`).
    pub allowed_users: Vec<String>,

    /// Fail (exit 3) when the acting user cannot be resolved at all.
    pub require_account: Option<bool>,

    /// Built-in policy rules.
    pub policy: Option<PolicyConfig>,
}

impl HookConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "backend_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(policy) = &self.policy {
            policy.validate()?;
        }
        Ok(())
    }

    /// Repository id, defaulting to zero when unset.
    pub fn repo_id(&self) -> i64 {
        self.repo_id.unwrap_or(0)
    }

    /// Whether an unresolvable acting user is fatal.
    pub fn require_account(&self) -> bool {
        self.require_account.unwrap_or(false)
    }

    /// Policy rules, defaulting to all-permissive.
    pub fn policy(&self) -> PolicyConfig {
        self.policy.clone().unwrap_or_default()
    }
}

/// Built-in policy rules.
///
/// Every rule defaults to permissive; an empty config allows everything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Whether tags may be deleted.
    pub allow_tag_removal: bool,

    /// Message shown when a tag deletion is denied.
    pub tag_removal_denied_message: String,

    /// Ref-name prefixes the delete/non-fast-forward rules apply to.
    /// A trailing `/` protects a whole namespace.
    pub protected_refs: Vec<String>,

    /// Deny deletion of protected refs.
    pub deny_deletes: bool,

    /// Deny non-fast-forward updates of protected refs.
    pub deny_non_fast_forwards: bool,

    /// Deny deleting a branch whose tip no other branch contains.
    pub deny_orphaning_deletes: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow_tag_removal: true,
            tag_removal_denied_message: "You are not allowed to delete tags.".to_string(),
            protected_refs: Vec::new(),
            deny_deletes: false,
            deny_non_fast_forwards: false,
            deny_orphaning_deletes: false,
        }
    }
}

impl PolicyConfig {
    /// Validate the policy rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.protected_refs {
            if !pattern.starts_with("refs/") {
                return Err(ConfigError::InvalidValue(format!(
                    "protected ref pattern must start with 'refs/': {}",
                    pattern
                )));
            }
        }
        Ok(())
    }

    /// Whether `refname` matches a protected pattern.
    ///
    /// A pattern ending in `/` matches the namespace under it; otherwise
    /// the match is exact.
    pub fn is_protected(&self, refname: &str) -> bool {
        self.protected_refs.iter().any(|p| {
            if p.ends_with('/') {
                refname.starts_with(p.as_str())
            } else {
                refname == p
            }
        })
    }
}
