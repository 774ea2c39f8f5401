//! Integration tests for the classification pipeline.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the subprocess backend, the parsers, and the gate agree with what
//! git actually produces.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;

use refgate::core::config::{HookConfig, PolicyConfig};
use refgate::core::types::{ActionKind, FileStatus, ObjectType, Oid, OperationKind};
use refgate::git::{GitBackend, ObjectDb, ObjectStore, StoreError};
use refgate::hook::{self, RefUpdate};
use refgate::policy::mock::MockPolicy;
use refgate::policy::RulePolicy;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit on master.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "--initial-branch=master"]);
        run_git(dir.path(), &["config", "user.email", "jane@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Jane Doe"]);

        std::fs::write(dir.path().join("README.md"), "# Test Repo\n").unwrap();
        run_git(dir.path(), &["add", "README.md"]);
        run_git(dir.path(), &["commit", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn backend(&self) -> GitBackend {
        GitBackend::open(self.path(), TIMEOUT).expect("failed to open test repo")
    }

    /// Create a file and commit it, returning the new commit id.
    fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        std::fs::write(self.dir.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
        self.head()
    }

    fn head(&self) -> Oid {
        Oid::new(self.git_output(&["rev-parse", "HEAD"])).unwrap()
    }

    fn git_output(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("git command failed");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn evaluate_one(
    repo: &TestRepo,
    config: &HookConfig,
    refname: &str,
    old: Oid,
    new: Oid,
) -> hook::RefOutcome {
    let backend = repo.backend();
    let policy = RulePolicy::new(config.policy(), &backend);
    let update = RefUpdate {
        refname: refname.to_string(),
        old,
        new,
    };
    let mut outcomes = hook::evaluate_updates(config, &backend, &policy, None, &[update]);
    outcomes.remove(0)
}

// =============================================================================
// Backend tests
// =============================================================================

#[test]
fn open_missing_directory() {
    let err = GitBackend::open("/nonexistent/repo/path", TIMEOUT).unwrap_err();
    assert!(matches!(err, StoreError::MissingDirectory { .. }));
}

#[test]
fn open_non_repository() {
    let dir = TempDir::new().unwrap();
    let err = GitBackend::open(dir.path(), TIMEOUT).unwrap_err();
    assert!(matches!(err, StoreError::NoRepository { .. }));
}

#[test]
fn object_type_of_real_objects() {
    let repo = TestRepo::new();
    let backend = repo.backend();

    let head = repo.head();
    assert_eq!(backend.object_type(&head).unwrap(), ObjectType::Commit);

    run_git(repo.path(), &["tag", "-a", "v1", "-m", "release"]);
    let tag = Oid::new(repo.git_output(&["rev-parse", "refs/tags/v1"])).unwrap();
    assert_eq!(backend.object_type(&tag).unwrap(), ObjectType::Tag);

    let missing = Oid::new("1234567890123456789012345678901234567890").unwrap();
    assert!(matches!(
        backend.object_type(&missing).unwrap_err(),
        StoreError::InvalidObject { .. }
    ));
    assert!(!backend.object_exists(&missing).unwrap());
}

#[test]
fn diff_summary_parses_author_and_statuses() {
    let repo = TestRepo::new();
    let new = repo.commit_file("src.txt", "content\n", "Add src");

    let backend = repo.backend();
    let mut db = ObjectDb::new(&backend);
    let record = db.show(&new).unwrap();

    assert_eq!(record.author.as_deref(), Some("Jane Doe <jane@example.com>"));
    assert!(!record.is_merge());
    assert_eq!(record.statuses.len(), 1);
    assert_eq!(record.statuses[0].status, FileStatus::Added);
    assert_eq!(record.statuses[0].path, "src.txt");
}

#[test]
fn local_refs_lists_heads_and_tags() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["branch", "feature"]);
    run_git(repo.path(), &["tag", "light"]);

    let refs = repo.backend().local_refs().unwrap();
    assert!(refs.contains(&"refs/heads/master".to_string()));
    assert!(refs.contains(&"refs/heads/feature".to_string()));
    assert!(refs.contains(&"refs/tags/light".to_string()));
}

#[test]
fn branch_containment_queries() {
    let repo = TestRepo::new();
    let base = repo.head();
    run_git(repo.path(), &["checkout", "-b", "feature"]);
    let tip = repo.commit_file("f.txt", "x\n", "feature work");

    let backend = repo.backend();
    let containing = backend.branches_containing(&tip, false).unwrap();
    assert_eq!(containing, vec!["feature".to_string()]);

    let not_containing = backend.branches_not_containing(&tip, false).unwrap();
    assert!(not_containing.contains(&"master".to_string()));

    let everywhere = backend.branches_containing(&base, false).unwrap();
    assert!(everywhere.contains(&"master".to_string()));
    assert!(everywhere.contains(&"feature".to_string()));
}

// =============================================================================
// Scenario tests
// =============================================================================

#[test]
fn fresh_branch_creation_enumerates_only_its_commits() {
    let repo = TestRepo::new();
    let c1 = repo.head();

    // The branch was already written when the hook runs; excluding it from
    // the "other refs" set keeps C1 in the range.
    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/heads/master",
        Oid::zero(),
        c1.clone(),
    );
    let decision = outcome.result.expect("evaluation succeeds");
    assert!(decision.allowed);
    assert_eq!(decision.operation.kind, OperationKind::Commit);
    assert_eq!(decision.operation.labels[0].action, ActionKind::Created);
    assert_eq!(decision.operation.commits.len(), 1);
    assert_eq!(decision.operation.commits[0].id, c1);
}

#[test]
fn new_branch_excludes_commits_reachable_from_master() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "feature"]);
    let c2 = repo.commit_file("feature.txt", "x\n", "feature work");

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/heads/feature",
        Oid::zero(),
        c2.clone(),
    );
    let decision = outcome.result.expect("evaluation succeeds");
    // Only the feature commit is new; the initial commit is reachable
    // from master and excluded.
    assert_eq!(decision.operation.commits.len(), 1);
    assert_eq!(decision.operation.commits[0].id, c2);
}

#[test]
fn ordinary_push_uses_two_dot_range() {
    let repo = TestRepo::new();
    let old = repo.head();
    let mid = repo.commit_file("a.txt", "a\n", "first");
    let new = repo.commit_file("b.txt", "b\n", "second");

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/heads/master",
        old,
        new.clone(),
    );
    let decision = outcome.result.expect("evaluation succeeds");
    assert_eq!(decision.operation.labels[0].action, ActionKind::Modified);
    // Oldest first.
    assert_eq!(
        decision
            .operation
            .commits
            .iter()
            .map(|c| c.id.clone())
            .collect::<Vec<_>>(),
        vec![mid, new]
    );
    assert_eq!(
        decision.operation.item("a.txt").unwrap().status,
        FileStatus::Added
    );
    assert_eq!(
        decision.operation.item("b.txt").unwrap().status,
        FileStatus::Added
    );
}

#[test]
fn branch_deletion_is_empty_and_classified_deleted() {
    let repo = TestRepo::new();
    let tip = repo.head();

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/heads/feature",
        tip,
        Oid::zero(),
    );
    let decision = outcome.result.expect("evaluation succeeds");
    assert!(decision.allowed);
    assert_eq!(decision.operation.kind, OperationKind::Branch);
    assert_eq!(decision.operation.labels[0].action, ActionKind::Deleted);
    assert!(decision.operation.commits.is_empty());
    assert!(decision.operation.items().is_empty());
}

#[test]
fn rename_produces_destination_and_source_items() {
    let repo = TestRepo::new();
    repo.commit_file("old_name.txt", "stable content that git can match\n", "add");
    let old = repo.head();
    run_git(repo.path(), &["mv", "old_name.txt", "new_name.txt"]);
    run_git(repo.path(), &["commit", "-m", "rename"]);
    let new = repo.head();

    let outcome = evaluate_one(&repo, &HookConfig::default(), "refs/heads/master", old, new);
    let decision = outcome.result.expect("evaluation succeeds");

    let dest = decision
        .operation
        .item("new_name.txt")
        .expect("destination item");
    assert_eq!(dest.status, FileStatus::Renamed);
    assert_eq!(dest.old_path.as_deref(), Some("old_name.txt"));

    let source = decision
        .operation
        .item("old_name.txt")
        .expect("source item");
    assert_eq!(source.status, FileStatus::Renamed);
    assert_eq!(source.old_path, None);
}

#[test]
fn merge_commit_reported_merged_inside_range_only() {
    let repo = TestRepo::new();
    let base = repo.head();
    run_git(repo.path(), &["checkout", "-b", "topic"]);
    repo.commit_file("topic.txt", "t\n", "topic work");
    run_git(repo.path(), &["checkout", "master"]);
    repo.commit_file("master.txt", "m\n", "master work");
    run_git(repo.path(), &["merge", "--no-ff", "topic", "-m", "merge topic"]);
    let merged = repo.head();

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/heads/master",
        base,
        merged.clone(),
    );
    let decision = outcome.result.expect("evaluation succeeds");

    // The ref label collapses to modified; the merge commit itself keeps
    // its identity inside the range.
    assert_eq!(decision.operation.labels[0].action, ActionKind::Modified);
    let merge_summary = decision
        .operation
        .commits
        .iter()
        .find(|c| c.id == merged)
        .expect("merge commit in range");
    assert_eq!(merge_summary.action, ActionKind::Merged);
    assert!(decision
        .operation
        .commits
        .iter()
        .filter(|c| c.id != merged)
        .all(|c| c.action == ActionKind::Modified));
}

#[test]
fn annotated_tag_classified_as_tag_with_tagger_author() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["tag", "-a", "v1.0", "-m", "first release"]);
    let tag = Oid::new(repo.git_output(&["rev-parse", "refs/tags/v1.0"])).unwrap();

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/tags/v1.0",
        Oid::zero(),
        tag,
    );
    let decision = outcome.result.expect("evaluation succeeds");
    assert!(decision.allowed);
    assert_eq!(decision.operation.kind, OperationKind::Tag);
    assert_eq!(decision.operation.username, "Jane Doe <jane@example.com>");
}

#[test]
fn annotated_tag_on_branch_ref_is_invalid() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["tag", "-a", "v1.0", "-m", "first release"]);
    let tag = Oid::new(repo.git_output(&["rev-parse", "refs/tags/v1.0"])).unwrap();
    let head = repo.head();

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/heads/v1.0",
        head,
        tag,
    );
    assert!(matches!(
        outcome.result,
        Err(hook::HookError::InvalidRef { .. })
    ));
}

#[test]
fn lightweight_tag_is_a_tag_operation() {
    let repo = TestRepo::new();
    let head = repo.head();

    let outcome = evaluate_one(
        &repo,
        &HookConfig::default(),
        "refs/tags/light",
        Oid::zero(),
        head,
    );
    let decision = outcome.result.expect("evaluation succeeds");
    assert_eq!(decision.operation.kind, OperationKind::Tag);
}

// =============================================================================
// Policy interaction
// =============================================================================

#[test]
fn tag_removal_denied_by_config() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["tag", "v1"]);
    let tag_target = repo.head();

    let config = HookConfig {
        policy: Some(PolicyConfig {
            allow_tag_removal: false,
            tag_removal_denied_message: "Tags are permanent.".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let outcome = evaluate_one(&repo, &config, "refs/tags/v1", tag_target, Oid::zero());
    let decision = outcome.result.expect("evaluation succeeds");
    assert!(!decision.allowed);
    assert_eq!(decision.messages, vec!["Tags are permanent."]);
}

#[test]
fn non_fast_forward_denied_on_protected_ref() {
    let repo = TestRepo::new();
    let old_tip = {
        repo.commit_file("a.txt", "a\n", "will be rewound");
        repo.head()
    };
    // Rewind master and commit something else: a classic force push.
    run_git(repo.path(), &["reset", "--hard", "HEAD~1"]);
    let new_tip = repo.commit_file("b.txt", "b\n", "replacement");

    let config = HookConfig {
        policy: Some(PolicyConfig {
            protected_refs: vec!["refs/heads/master".to_string()],
            deny_non_fast_forwards: true,
            ..Default::default()
        }),
        ..Default::default()
    };
    let outcome = evaluate_one(&repo, &config, "refs/heads/master", old_tip, new_tip);
    let decision = outcome.result.expect("evaluation succeeds");
    assert!(!decision.allowed);
    assert!(decision.messages[0].contains("non-fast-forward"));
}

#[test]
fn fast_forward_allowed_on_protected_ref() {
    let repo = TestRepo::new();
    let old = repo.head();
    let new = repo.commit_file("a.txt", "a\n", "forward");

    let config = HookConfig {
        policy: Some(PolicyConfig {
            protected_refs: vec!["refs/heads/master".to_string()],
            deny_non_fast_forwards: true,
            deny_deletes: true,
            ..Default::default()
        }),
        ..Default::default()
    };
    let outcome = evaluate_one(&repo, &config, "refs/heads/master", old, new);
    assert!(outcome.result.expect("evaluation succeeds").allowed);
}

#[test]
fn orphaning_delete_denied_but_merged_delete_allowed() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "feature"]);
    let unmerged_tip = repo.commit_file("f.txt", "x\n", "unmerged work");
    run_git(repo.path(), &["checkout", "master"]);

    let config = HookConfig {
        policy: Some(PolicyConfig {
            deny_orphaning_deletes: true,
            ..Default::default()
        }),
        ..Default::default()
    };

    let outcome = evaluate_one(
        &repo,
        &config,
        "refs/heads/feature",
        unmerged_tip.clone(),
        Oid::zero(),
    );
    assert!(!outcome.result.expect("evaluation succeeds").allowed);

    // Merge it; deletion is now safe.
    run_git(repo.path(), &["merge", "--no-ff", "feature", "-m", "merge feature"]);
    let outcome = evaluate_one(
        &repo,
        &config,
        "refs/heads/feature",
        unmerged_tip,
        Oid::zero(),
    );
    assert!(outcome.result.expect("evaluation succeeds").allowed);
}

#[test]
fn allow_listed_user_skips_policy_entirely() {
    let repo = TestRepo::new();
    let old = repo.head();
    let new = repo.commit_file("a.txt", "a\n", "change");

    let config = HookConfig {
        allowed_users: vec!["Jane Doe <jane@example.com>".to_string()],
        ..Default::default()
    };
    let backend = repo.backend();
    let policy = MockPolicy::new();
    policy.respond_with(refgate::policy::Verdict::deny("would deny"));
    let update = RefUpdate {
        refname: "refs/heads/master".to_string(),
        old,
        new,
    };
    let outcomes = hook::evaluate_updates(&config, &backend, &policy, None, &[update]);

    let decision = outcomes[0].result.as_ref().expect("evaluation succeeds");
    assert!(decision.allowed);
    assert!(decision.bypassed);
    assert_eq!(policy.evaluation_count(), 0);
}
