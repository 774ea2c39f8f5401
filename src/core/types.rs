//! core::types
//!
//! Strong types for the ref-update domain.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA), with the all-zeros sentinel
//! - [`ObjectType`] - What an object id resolves to (blob, tree, commit, ...)
//! - [`RefType`] - Namespace of a reference (heads, tags, remotes)
//! - [`ActionKind`] - What a ref update did (created, deleted, merged, modified)
//! - [`OperationKind`] - Semantic category of a whole push event
//! - [`FileStatus`] - Per-path change status from the diff summary
//! - [`Item`], [`Label`], [`CommitSummary`], [`Operation`] - the structured
//!   description of one push that is handed to the policy engine
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use refgate::core::types::{Oid, RefType};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert!(!oid.is_zero());
//!
//! assert_eq!(RefType::classify("refs/heads/main"), RefType::Heads);
//! assert_eq!(RefType::classify("refs/notes/commits"), RefType::Invalid);
//!
//! // The zero oid stands for "no object" on either side of an update.
//! assert!(Oid::zero().is_zero());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// A validated Git object id.
///
/// Forty hex characters (the legacy hash scheme). The all-zeros value is a
/// sentinel meaning "no object": the parent of the first commit on a newly
/// created ref, or the target of a ref deletion. The sentinel is never
/// resolved against the object store.
///
/// # Example
///
/// ```
/// use refgate::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890abc123def4567890abc12345").unwrap();
/// // Normalized to lowercase.
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// assert!(Oid::new("not-a-sha").is_err());
/// assert!(Oid::new("abc123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// The zero OID (40 zeros for SHA-1).
    const ZERO_SHA1: &'static str = "0000000000000000000000000000000000000000";

    /// Length of a full hex OID.
    const HEX_LEN: usize = 40;

    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a 40-character
    /// hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Create the zero/null OID (40 zeros).
    pub fn zero() -> Self {
        Self(Self::ZERO_SHA1.to_string())
    }

    /// Check if this is the zero/null OID.
    pub fn is_zero(&self) -> bool {
        self.0.as_str() == Self::ZERO_SHA1
    }

    /// Get the OID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        if oid.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                oid.len()
            )));
        }
        if hex::decode(oid).is_err() {
            return Err(TypeError::InvalidOid(format!("not a hex string: {}", oid)));
        }
        Ok(())
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type of a git object.
///
/// `Empty` is synthetic: it is assigned to the zero OID without consulting
/// the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
    Empty,
}

impl ObjectType {
    /// Parse the output of `git cat-file -t`.
    pub fn from_backend(s: &str) -> Option<Self> {
        match s.trim() {
            "blob" => Some(ObjectType::Blob),
            "tree" => Some(ObjectType::Tree),
            "commit" => Some(ObjectType::Commit),
            "tag" => Some(ObjectType::Tag),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
            ObjectType::Empty => "empty",
        };
        write!(f, "{}", s)
    }
}

/// Namespace of a reference, derived from its name prefix.
///
/// Classification is case-sensitive, exact-prefix, and checked in the order
/// tags, heads, remotes. Anything else is `Invalid`.
///
/// # Example
///
/// ```
/// use refgate::core::types::RefType;
///
/// assert_eq!(RefType::classify("refs/tags/v1.0"), RefType::Tags);
/// assert_eq!(RefType::classify("refs/heads/main"), RefType::Heads);
/// assert_eq!(RefType::classify("refs/remotes/origin/main"), RefType::Remotes);
/// assert_eq!(RefType::classify("refs/Heads/main"), RefType::Invalid);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Heads,
    Tags,
    Remotes,
    Invalid,
}

impl RefType {
    /// Classify a full reference name.
    pub fn classify(refname: &str) -> Self {
        if refname.starts_with("refs/tags/") {
            RefType::Tags
        } else if refname.starts_with("refs/heads/") {
            RefType::Heads
        } else if refname.starts_with("refs/remotes/") {
            RefType::Remotes
        } else {
            RefType::Invalid
        }
    }

    /// Whether the name matched a recognized namespace.
    pub fn is_valid(self) -> bool {
        self != RefType::Invalid
    }
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RefType::Heads => "heads",
            RefType::Tags => "tags",
            RefType::Remotes => "remotes",
            RefType::Invalid => "invalid",
        };
        write!(f, "{}", s)
    }
}

/// What a ref update (or one commit within it) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Created,
    Deleted,
    Merged,
    Modified,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionKind::Created => "created",
            ActionKind::Deleted => "deleted",
            ActionKind::Merged => "merged",
            ActionKind::Modified => "modified",
        };
        write!(f, "{}", s)
    }
}

/// Semantic category of a whole push event.
///
/// Derived from the new object's type and the ref namespace, independent of
/// [`ActionKind`]. See [`crate::hook::classify::operation_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// One or more commits pushed to a branch.
    Commit,
    /// A tag created, moved, or deleted (lightweight or annotated).
    Tag,
    /// A branch created or deleted without new commits to report.
    Branch,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationKind::Commit => "commit",
            OperationKind::Tag => "tag",
            OperationKind::Branch => "branch",
        };
        write!(f, "{}", s)
    }
}

/// Per-path change status, decoded from the first character of a
/// `--name-status` code.
///
/// Copy and rename codes arrive with a trailing similarity percentage
/// (`R087`); only the leading letter is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
    Unmerged,
    Unknown,
    PairingBroken,
}

impl FileStatus {
    /// Decode a single status letter.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(FileStatus::Added),
            'C' => Some(FileStatus::Copied),
            'D' => Some(FileStatus::Deleted),
            'M' => Some(FileStatus::Modified),
            'R' => Some(FileStatus::Renamed),
            'T' => Some(FileStatus::TypeChanged),
            'U' => Some(FileStatus::Unmerged),
            'X' => Some(FileStatus::Unknown),
            'B' => Some(FileStatus::PairingBroken),
            _ => None,
        }
    }

    /// The single-letter code this status decodes from.
    pub fn letter(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Copied => 'C',
            FileStatus::Deleted => 'D',
            FileStatus::Modified => 'M',
            FileStatus::Renamed => 'R',
            FileStatus::TypeChanged => 'T',
            FileStatus::Unmerged => 'U',
            FileStatus::Unknown => 'X',
            FileStatus::PairingBroken => 'B',
        }
    }

    /// Whether this status carries a second path (copy/rename source).
    pub fn is_pairing(self) -> bool {
        matches!(self, FileStatus::Copied | FileStatus::Renamed)
    }
}

/// One changed path within an operation.
///
/// `old_path` is present only for copied and renamed entries and names the
/// source of the copy or rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
}

/// One reference's state transition within a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub ref_name: String,
    pub ref_type: RefType,
    pub action: ActionKind,
}

/// One commit introduced by a ref update.
///
/// Commits inside a pushed range keep the merge/modify distinction that the
/// ref-level label collapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: Oid,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// The structured description of one push event.
///
/// This is the unit handed to the policy engine. Items keep the backend's
/// diff output order; inserting an item for a path that is already present
/// replaces the earlier entry in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub repo_id: i64,
    pub kind: OperationKind,
    pub username: String,
    pub labels: Vec<Label>,
    pub commits: Vec<CommitSummary>,
    items: Vec<Item>,
}

impl Operation {
    /// Create an operation with no labels, commits, or items.
    pub fn new(repo_id: i64, kind: OperationKind, username: impl Into<String>) -> Self {
        Self {
            repo_id,
            kind,
            username: username.into(),
            labels: Vec::new(),
            commits: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Insert an item, keyed by path.
    ///
    /// A later item for an existing path overwrites the earlier entry but
    /// keeps its position, matching the backend's diff-iteration convention.
    pub fn insert_item(&mut self, item: Item) {
        match self.items.iter_mut().find(|i| i.path == item.path) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Look up an item by path.
    pub fn item(&self, path: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.path == path)
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}
