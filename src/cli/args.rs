//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Invocation styles
//!
//! As an `update` hook, git passes one triple on the command line:
//!
//! ```text
//! refgate <ref> <old> <new>
//! ```
//!
//! As a `pre-receive` hook, the triples arrive on stdin instead:
//!
//! ```text
//! refgate --stdin        # reads "<old> <new> <ref>" lines
//! ```

use clap::Parser;
use std::path::PathBuf;

/// refgate - gate git ref updates against an access policy
#[derive(Parser, Debug)]
#[command(name = "refgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (overrides discovery)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository to operate against; defaults to the current directory,
    /// which is where git runs server-side hooks
    #[arg(long, value_name = "PATH")]
    pub repository: Option<PathBuf>,

    /// Acting username, when the transport layer knows better than the
    /// commit author (e.g. an authenticated ssh user)
    #[arg(long, value_name = "NAME")]
    pub pusher: Option<String>,

    /// Read "<old> <new> <ref>" lines from stdin (pre-receive style)
    #[arg(long, conflicts_with = "refname")]
    pub stdin: bool,

    /// Emit every decision and its classified operation as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// The ref being updated (update-hook style)
    #[arg(value_name = "REF", requires = "old")]
    pub refname: Option<String>,

    /// The old object id stored in the ref
    #[arg(value_name = "OLD", requires = "new")]
    pub old: Option<String>,

    /// The new object id to be stored in the ref
    #[arg(value_name = "NEW")]
    pub new: Option<String>,
}
