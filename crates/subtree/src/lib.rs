#![deny(clippy::print_stderr, clippy::print_stdout)]

//! Vendored plugins managed with `git subtree`.
//!
//! `plugins-list.txt` is the source of truth: every listed plugin is added
//! (when missing) or pulled (when present) under `vendor/plugins/<name>`, and
//! with `prune` unlisted directories are removed.

mod error;
mod list;
mod sync;

pub use error::{Result, SubtreeError};
pub use list::{Plugin, format_list, parse_list};
pub use sync::{SyncOptions, SyncSummary, commit_message, sync_plugins};
