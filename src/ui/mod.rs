//! ui
//!
//! Output utilities for the hook's stderr conversation with the pusher.

pub mod output;

pub use output::{denial_block, Verbosity};
