//! Errors raised while parsing the plugin list or syncing subtrees.

use std::path::PathBuf;

use thiserror::Error;
use tsvendor_common::CommonError;

/// Errors raised while syncing vendored plugins.
#[derive(Debug, Error)]
pub enum SubtreeError {
	#[error("list file not found: {}", .0.display())]
	ListMissing(PathBuf),

	#[error("failed to read {}: {error}", .path.display())]
	ListRead { path: PathBuf, error: std::io::Error },

	#[error("bad line {line} in {} (need 3 columns): {raw:?}", .path.display())]
	BadLine { path: PathBuf, line: usize, raw: String },

	#[error("duplicate NAME '{name}' in {} (line {line})", .path.display())]
	DuplicateName { path: PathBuf, name: String, line: usize },

	#[error("working tree not clean; commit or stash, or use --allow-dirty")]
	DirtyTree,

	#[error("--push requires --commit")]
	PushWithoutCommit,

	#[error("{} contains a nested .git (submodule?); expected a plain git-subtree directory", .0.display())]
	NestedGit(PathBuf),

	#[error("I/O error at {}: {error}", .path.display())]
	Io { path: PathBuf, error: std::io::Error },

	#[error(transparent)]
	Command(#[from] CommonError),
}

pub type Result<T> = std::result::Result<T, SubtreeError>;
