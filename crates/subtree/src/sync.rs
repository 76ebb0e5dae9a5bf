//! Adding, pulling and pruning subtrees.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use tsvendor_common::{CommandRunner, CommandSpec, Layout, RecordingRunner};

use crate::error::{Result, SubtreeError};
use crate::list::{Plugin, parse_list};

/// Options for [`sync_plugins`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
	/// Restrict every action to these names.
	pub only: Vec<String>,
	/// Add missing plugins, never pull existing ones.
	pub add_only: bool,
	/// Pull existing plugins, never add missing ones.
	pub pull_only: bool,
	pub squash: bool,
	/// Log the commands that would run instead of running them.
	pub dry_run: bool,
	pub commit: bool,
	pub push: bool,
	/// Remove plugin directories that are not listed.
	pub prune: bool,
	pub allow_dirty: bool,
}

impl Default for SyncOptions {
	fn default() -> Self {
		Self {
			only: Vec::new(),
			add_only: false,
			pull_only: false,
			squash: true,
			dry_run: false,
			commit: false,
			push: false,
			prune: false,
			allow_dirty: false,
		}
	}
}

/// Counts of what a sync did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
	pub added: usize,
	pub updated: usize,
	pub removed: usize,
	pub skipped: usize,
}

impl SyncSummary {
	pub fn changed(&self) -> bool {
		self.added + self.updated + self.removed > 0
	}
}

impl fmt::Display for SyncSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"added={}  updated={}  removed={}  skipped={}",
			self.added, self.updated, self.removed, self.skipped
		)
	}
}

/// Commit message for a sync on `date`.
pub fn commit_message(date: NaiveDate) -> String {
	format!("chore: vendor plugins sync {}", date.format("%Y-%m-%d"))
}

struct Syncer<'a> {
	runner: &'a dyn CommandRunner,
	/// Mutating commands go here; a recorder on dry runs.
	exec: &'a dyn CommandRunner,
	root: &'a Path,
	prefix_root: PathBuf,
	opts: &'a SyncOptions,
}

impl Syncer<'_> {
	fn git(&self) -> CommandSpec {
		CommandSpec::new("git").current_dir(self.root)
	}

	fn prefix(&self, name: &str) -> PathBuf {
		self.prefix_root.join(name)
	}

	fn subtree(&self, action: &str, plugin: &Plugin) -> Result<()> {
		let mut cmd = self
			.git()
			.args(["subtree", action, "--prefix"])
			.arg(self.prefix(&plugin.name))
			.args([plugin.url.as_str(), plugin.reference.as_str()]);
		if self.opts.squash {
			cmd = cmd.arg("--squash");
		}
		self.exec.run(&cmd)?;
		Ok(())
	}

	fn add(&self, plugin: &Plugin) -> Result<()> {
		info!("add    {:<28} ({})", plugin.name, plugin.reference);
		self.subtree("add", plugin)
	}

	fn pull(&self, plugin: &Plugin) -> Result<()> {
		info!("update {:<28} ({})", plugin.name, plugin.reference);
		if !self.opts.dry_run {
			// Best effort; `subtree pull` fetches again.
			let fetch = self
				.git()
				.args(["fetch", plugin.url.as_str(), plugin.reference.as_str(), "--no-tags", "--depth=1"])
				.unchecked();
			if let Err(e) = self.runner.status(&fetch) {
				debug!(plugin = %plugin.name, error = %e, "Warm-up fetch failed");
			}
		}
		self.subtree("pull", plugin)
	}

	fn remove(&self, name: &str) -> Result<()> {
		info!("remove {name}");
		self.exec.run(&self.git().args(["rm", "-r"]).arg(self.prefix(name)))?;
		Ok(())
	}

	fn require_clean_tree(&self) -> Result<()> {
		if self.opts.allow_dirty {
			return Ok(());
		}
		let unstaged = self.runner.status(&self.git().args(["diff", "--quiet"]))?;
		let staged = self.runner.status(&self.git().args(["diff", "--cached", "--quiet"]))?;
		if unstaged && staged { Ok(()) } else { Err(SubtreeError::DirtyTree) }
	}
}

fn refuse_nested_git(dir: &Path) -> Result<()> {
	if dir.join(".git").exists() {
		return Err(SubtreeError::NestedGit(dir.to_path_buf()));
	}
	Ok(())
}

fn existing_dirs(plugins_dir: &Path) -> Result<BTreeSet<String>> {
	let entries = match fs::read_dir(plugins_dir) {
		Ok(entries) => entries,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
		Err(error) => {
			return Err(SubtreeError::Io {
				path: plugins_dir.to_path_buf(),
				error,
			});
		}
	};
	Ok(entries
		.filter_map(|e| e.ok())
		.filter(|e| e.path().is_dir())
		.map(|e| e.file_name().to_string_lossy().into_owned())
		.collect())
}

/// Brings the plugins directory in line with the plugin list.
///
/// Fails before touching anything if the tree is dirty (unless allowed), if
/// `push` is set without `commit`, or if a plugin directory holds a nested
/// `.git`.
pub fn sync_plugins(runner: &dyn CommandRunner, layout: &Layout, opts: &SyncOptions) -> Result<SyncSummary> {
	if opts.push && !opts.commit {
		return Err(SubtreeError::PushWithoutCommit);
	}

	let recorder = RecordingRunner::new();
	let plugins_dir = layout.plugins_dir();
	let syncer = Syncer {
		runner,
		exec: if opts.dry_run { &recorder } else { runner },
		root: layout.root(),
		prefix_root: plugins_dir.strip_prefix(layout.root()).unwrap_or(&plugins_dir).to_path_buf(),
		opts,
	};
	syncer.require_clean_tree()?;

	let list_path = layout.plugins_list();
	let plugins = parse_list(&list_path)?;
	if !opts.dry_run {
		fs::create_dir_all(&plugins_dir).map_err(|error| SubtreeError::Io {
			path: plugins_dir.clone(),
			error,
		})?;
	}
	let existing = existing_dirs(&plugins_dir)?;
	let only: BTreeSet<&str> = opts.only.iter().map(String::as_str).collect();
	let mut summary = SyncSummary::default();

	for plugin in &plugins {
		if !only.is_empty() && !only.contains(plugin.name.as_str()) {
			summary.skipped += 1;
			continue;
		}
		let dir = plugins_dir.join(&plugin.name);
		if dir.exists() {
			refuse_nested_git(&dir)?;
			if opts.add_only {
				info!("exists, skip add: {}", plugin.name);
				summary.skipped += 1;
			} else {
				syncer.pull(plugin)?;
				summary.updated += 1;
			}
		} else if opts.pull_only {
			info!("missing, skip pull: {}", plugin.name);
			summary.skipped += 1;
		} else {
			syncer.add(plugin)?;
			summary.added += 1;
		}
	}

	if opts.prune {
		let listed: BTreeSet<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
		let doomed = existing
			.iter()
			.filter(|name| !listed.contains(name.as_str()))
			.filter(|name| only.is_empty() || only.contains(name.as_str()));
		for name in doomed {
			refuse_nested_git(&plugins_dir.join(name))?;
			syncer.remove(name)?;
			summary.removed += 1;
		}
	}

	info!("Summary: {summary}");

	if opts.dry_run {
		info!("Dry run: {} command(s) not executed", recorder.commands().len());
	} else if opts.commit && summary.changed() {
		let message = commit_message(chrono::Local::now().date_naive());
		runner.run(&syncer.git().args(["commit", "-m", message.as_str()]))?;
		info!("Committed: {message}");
		if opts.push {
			runner.run(&syncer.git().arg("push"))?;
			info!("Pushed.");
		}
	} else if opts.commit {
		warn!("Nothing changed, not committing");
	}

	Ok(summary)
}
