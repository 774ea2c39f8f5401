//! git::show
//!
//! Parser for the textual output of the backend's show query
//! (`git show --name-status --pretty=short --date=iso8601`).
//!
//! # Input shape
//!
//! For a commit (or a lightweight tag, which shows its target commit):
//!
//! ```text
//! commit <id>
//! Merge: <parent> <parent>          (merge commits only)
//! Author: <name and email>
//! <blank>
//!     <message>
//! <blank>
//! <status>\t<path>[\t<new path>]
//! ...
//! ```
//!
//! Annotated tags lead with `tag <name>` / `Tagger:` / `Date:` headers and
//! then the referenced object.
//!
//! # Parsing rules
//!
//! The header block ends at the first blank line; author, date, and merge
//! information are only recognized inside it. The file-status section is
//! the run of status-shaped lines after the last blank line. Copy and
//! rename codes carry a similarity percentage (`R087`) which is discarded;
//! only the leading letter is significant.

use chrono::{DateTime, Utc};

use crate::core::types::{FileStatus, Item};

/// One decoded `<status>\t<path>[\t<new path>]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Decoded status (first letter of the code).
    pub status: FileStatus,
    /// The raw code as printed by the backend (`R087`, `M`, ...).
    pub raw_code: String,
    /// First path field.
    pub path: String,
    /// Second path field, present for copies and renames.
    pub new_path: Option<String>,
}

/// Everything the pipeline needs from one show response.
#[derive(Debug, Clone, Default)]
pub struct CommitRecord {
    /// First `Author:` or `Tagger:` header, trimmed. Absent if no such
    /// header precedes the first blank line.
    pub author: Option<String>,
    /// `Date:` header, when the backend printed one (annotated tags).
    pub date: Option<DateTime<Utc>>,
    /// Parent ids from a `Merge:` header. Presence of the header is
    /// authoritative for "this is a merge", independent of parent count.
    /// The backend may abbreviate these ids; `...` truncation markers are
    /// trimmed.
    pub merge_parents: Option<Vec<String>>,
    /// The trailing file-status section, in backend order.
    pub statuses: Vec<StatusLine>,
}

impl CommitRecord {
    /// Whether the record describes a merge commit.
    pub fn is_merge(&self) -> bool {
        self.merge_parents.is_some()
    }
}

/// Parse one show response.
pub fn parse_commit_record(lines: &[String]) -> CommitRecord {
    CommitRecord {
        author: parse_author(lines),
        date: parse_date(lines),
        merge_parents: parse_merge_parents(lines),
        statuses: parse_status_section(lines),
    }
}

/// Expand status lines into operation items.
///
/// A copy or rename line yields two items: one keyed by the destination
/// path, carrying the decoded status and the source as `old_path`, and one
/// keyed by the source path with the bare status and no `old_path`. The
/// backend lists the source this way as an implicit deletion marker, and
/// downstream policies may depend on seeing it.
pub fn status_items(statuses: &[StatusLine]) -> Vec<Item> {
    let mut items = Vec::new();
    for line in statuses {
        match &line.new_path {
            Some(new_path) => {
                items.push(Item {
                    path: new_path.clone(),
                    status: line.status,
                    old_path: Some(line.path.clone()),
                });
                items.push(Item {
                    path: line.path.clone(),
                    status: line.status,
                    old_path: None,
                });
            }
            None => items.push(Item {
                path: line.path.clone(),
                status: line.status,
                old_path: None,
            }),
        }
    }
    items
}

/// Walk the header block for the first `Author:` or `Tagger:` line.
///
/// Headers end at the first blank line; nothing past it can be mistaken
/// for an author.
fn parse_author(lines: &[String]) -> Option<String> {
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line
            .strip_prefix("Author:")
            .or_else(|| line.strip_prefix("Tagger:"))
        {
            return Some(rest.trim().to_string());
        }
    }
    None
}

/// Walk the header block for a `Date:` line and parse it as iso8601.
fn parse_date(lines: &[String]) -> Option<DateTime<Utc>> {
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix("Date:") {
            return DateTime::parse_from_str(rest.trim(), "%Y-%m-%d %H:%M:%S %z")
                .ok()
                .map(|d| d.with_timezone(&Utc));
        }
    }
    None
}

/// Walk the header block for a `Merge:` line.
fn parse_merge_parents(lines: &[String]) -> Option<Vec<String>> {
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix("Merge:") {
            let parents = rest
                .split_whitespace()
                .map(|p| p.trim_matches('.').to_string())
                .filter(|p| !p.is_empty())
                .collect();
            return Some(parents);
        }
    }
    None
}

/// Collect the run of status-shaped lines at the tail of the response.
///
/// Walks backwards until a blank line. If any collected line is not of the
/// form `<code>\t<path>[\t<new path>]`, the tail is the message body of a
/// commit that changed no files, and the section is empty.
fn parse_status_section(lines: &[String]) -> Vec<StatusLine> {
    let mut section = Vec::new();
    for line in lines.iter().rev() {
        if line.is_empty() {
            break;
        }
        match parse_status_line(line) {
            Some(status) => section.push(status),
            None => return Vec::new(),
        }
    }
    section.reverse();
    section
}

/// Decode one `<code>\t<path>[\t<new path>]` line.
///
/// Returns `None` for anything else, including codes whose leading letter
/// is not a known status or whose similarity suffix is not numeric.
fn parse_status_line(line: &str) -> Option<StatusLine> {
    let mut fields = line.split('\t');
    let code = fields.next()?;
    let path = fields.next()?;
    let new_path = fields.next();
    if fields.next().is_some() || path.is_empty() {
        return None;
    }

    let mut chars = code.chars();
    let status = FileStatus::from_code(chars.next()?)?;
    if !chars.as_str().chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(StatusLine {
        status,
        raw_code: code.to_string(),
        path: path.to_string(),
        new_path: new_path.map(|p| p.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    const PLAIN_COMMIT: &str = "\
commit 1234567890123456789012345678901234567890
Author: Jane Doe <jane@example.com>

    Add a file

A\tsrc/new.rs
M\tREADME.md";

    const MERGE_COMMIT: &str = "\
commit 1234567890123456789012345678901234567890
Merge: abc1234... def5678...
Author: Jane Doe <jane@example.com>

    Merge branch 'feature'";

    const ANNOTATED_TAG: &str = "\
tag v1.0
Tagger: Release Bot <bot@example.com>
Date: 2023-06-01 12:30:00 +0200

    Release v1.0

commit 1234567890123456789012345678901234567890
Author: Jane Doe <jane@example.com>

    Add a file

A\tsrc/new.rs";

    #[test]
    fn author_from_header() {
        let record = parse_commit_record(&lines(PLAIN_COMMIT));
        assert_eq!(
            record.author.as_deref(),
            Some("Jane Doe <jane@example.com>")
        );
    }

    #[test]
    fn tagger_counts_as_author() {
        let record = parse_commit_record(&lines(ANNOTATED_TAG));
        assert_eq!(
            record.author.as_deref(),
            Some("Release Bot <bot@example.com>")
        );
    }

    #[test]
    fn author_scan_stops_at_blank_line() {
        // An "Author:" line in the message body must not be picked up.
        let text = "\
commit 1234567890123456789012345678901234567890
Committer: someone

    Author: not me";
        let record = parse_commit_record(&lines(text));
        assert_eq!(record.author, None);
    }

    #[test]
    fn merge_header_detected_and_trimmed() {
        let record = parse_commit_record(&lines(MERGE_COMMIT));
        let parents = record.merge_parents.clone().expect("merge header present");
        assert_eq!(parents, vec!["abc1234", "def5678"]);
        assert!(record.is_merge());
    }

    #[test]
    fn non_merge_has_no_parents() {
        let record = parse_commit_record(&lines(PLAIN_COMMIT));
        assert!(record.merge_parents.is_none());
    }

    #[test]
    fn merge_scan_stops_at_blank_line() {
        let text = "\
commit 1234567890123456789012345678901234567890
Author: someone

    Merge: looks like one but is not";
        let record = parse_commit_record(&lines(text));
        assert!(record.merge_parents.is_none());
    }

    #[test]
    fn date_parsed_from_tag_header() {
        let record = parse_commit_record(&lines(ANNOTATED_TAG));
        let date = record.date.expect("date header present");
        assert_eq!(date.to_rfc3339(), "2023-06-01T10:30:00+00:00");
    }

    #[test]
    fn status_section_in_order() {
        let record = parse_commit_record(&lines(PLAIN_COMMIT));
        assert_eq!(record.statuses.len(), 2);
        assert_eq!(record.statuses[0].status, FileStatus::Added);
        assert_eq!(record.statuses[0].path, "src/new.rs");
        assert_eq!(record.statuses[1].status, FileStatus::Modified);
        assert_eq!(record.statuses[1].path, "README.md");
    }

    #[test]
    fn commit_without_changes_has_empty_section() {
        let record = parse_commit_record(&lines(MERGE_COMMIT));
        assert!(record.statuses.is_empty());
    }

    #[test]
    fn similarity_suffix_is_stripped() {
        let status = parse_status_line("R087\told/path.txt\tnew/path.txt").unwrap();
        assert_eq!(status.status, FileStatus::Renamed);
        assert_eq!(status.raw_code, "R087");
        assert_eq!(status.path, "old/path.txt");
        assert_eq!(status.new_path.as_deref(), Some("new/path.txt"));
    }

    #[test]
    fn malformed_status_lines_rejected() {
        assert!(parse_status_line("    just a message line").is_none());
        assert!(parse_status_line("Z\tfile.txt").is_none());
        assert!(parse_status_line("Rxy\ta\tb").is_none());
        assert!(parse_status_line("M\t").is_none());
    }

    #[test]
    fn rename_emits_destination_and_source_items() {
        let status = parse_status_line("R087\told/path.txt\tnew/path.txt").unwrap();
        let items = status_items(&[status]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path, "new/path.txt");
        assert_eq!(items[0].status, FileStatus::Renamed);
        assert_eq!(items[0].old_path.as_deref(), Some("old/path.txt"));
        assert_eq!(items[1].path, "old/path.txt");
        assert_eq!(items[1].status, FileStatus::Renamed);
        assert_eq!(items[1].old_path, None);
    }

    #[test]
    fn single_path_line_emits_one_item() {
        let status = parse_status_line("D\tgone.txt").unwrap();
        let items = status_items(&[status]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "gone.txt");
        assert_eq!(items[0].status, FileStatus::Deleted);
        assert_eq!(items[0].old_path, None);
    }
}
