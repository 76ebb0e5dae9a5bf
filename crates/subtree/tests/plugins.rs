#![allow(unused_crate_dependencies)]

use std::fs;

use pretty_assertions::assert_eq;
use tsvendor_common::{Layout, RecordingRunner};
use tsvendor_subtree::{SubtreeError, SyncOptions, SyncSummary, sync_plugins};

const LIST: &str = "\
# URL NAME REF
https://github.com/folke/lazy.nvim lazy.nvim stable
https://github.com/nvim-lua/plenary.nvim plenary.nvim master
";

fn repo() -> (tempfile::TempDir, Layout) {
	let dir = tempfile::tempdir().unwrap();
	let layout = Layout::new(dir.path());
	fs::create_dir_all(layout.plugins_list().parent().unwrap()).unwrap();
	fs::write(layout.plugins_list(), LIST).unwrap();
	fs::create_dir_all(layout.plugins_dir().join("plenary.nvim")).unwrap();
	fs::create_dir_all(layout.plugins_dir().join("old.nvim")).unwrap();
	(dir, layout)
}

fn mutating(runner: &RecordingRunner) -> Vec<String> {
	runner.command_lines().into_iter().filter(|l| !l.starts_with("git diff")).collect()
}

#[test]
fn adds_missing_and_pulls_existing() {
	let (_dir, layout) = repo();
	let runner = RecordingRunner::new();

	let summary = sync_plugins(&runner, &layout, &SyncOptions::default()).unwrap();
	assert_eq!(
		summary,
		SyncSummary {
			added: 1,
			updated: 1,
			removed: 0,
			skipped: 0,
		}
	);
	assert_eq!(
		mutating(&runner),
		[
			"git subtree add --prefix vendor/plugins/lazy.nvim https://github.com/folke/lazy.nvim stable --squash",
			"git fetch https://github.com/nvim-lua/plenary.nvim master --no-tags --depth=1",
			"git subtree pull --prefix vendor/plugins/plenary.nvim https://github.com/nvim-lua/plenary.nvim master --squash",
		]
	);
	assert!(runner.commands().iter().all(|c| c.cwd.as_deref() == Some(layout.root())));
}

#[test]
fn prune_and_commit() {
	let (_dir, layout) = repo();
	let runner = RecordingRunner::new();
	let opts = SyncOptions {
		prune: true,
		commit: true,
		push: true,
		squash: false,
		..Default::default()
	};

	let summary = sync_plugins(&runner, &layout, &opts).unwrap();
	assert_eq!(summary.removed, 1);

	let lines = mutating(&runner);
	assert!(lines.contains(&"git rm -r vendor/plugins/old.nvim".to_string()), "{lines:?}");
	assert!(!lines.iter().any(|l| l.ends_with("--squash")));
	let commit = lines.iter().position(|l| l.starts_with("git commit -m 'chore: vendor plugins sync ")).unwrap();
	assert_eq!(lines[commit + 1], "git push");
}

#[test]
fn only_restricts_actions_and_prune() {
	let (_dir, layout) = repo();
	let runner = RecordingRunner::new();
	let opts = SyncOptions {
		only: vec!["lazy.nvim".into()],
		prune: true,
		..Default::default()
	};

	let summary = sync_plugins(&runner, &layout, &opts).unwrap();
	assert_eq!(summary.added, 1);
	assert_eq!(summary.skipped, 1);
	assert_eq!(summary.removed, 0);
}

#[test]
fn add_only_and_pull_only_skip_the_other_action() {
	let (_dir, layout) = repo();

	let runner = RecordingRunner::new();
	let add_only = SyncOptions {
		add_only: true,
		..Default::default()
	};
	let summary = sync_plugins(&runner, &layout, &add_only).unwrap();
	assert_eq!((summary.added, summary.updated, summary.skipped), (1, 0, 1));

	let runner = RecordingRunner::new();
	let pull_only = SyncOptions {
		pull_only: true,
		..Default::default()
	};
	let summary = sync_plugins(&runner, &layout, &pull_only).unwrap();
	assert_eq!((summary.added, summary.updated, summary.skipped), (0, 1, 1));
}

#[test]
fn dry_run_executes_nothing() {
	let (_dir, layout) = repo();
	let runner = RecordingRunner::new();
	let opts = SyncOptions {
		dry_run: true,
		commit: true,
		prune: true,
		..Default::default()
	};

	let summary = sync_plugins(&runner, &layout, &opts).unwrap();
	assert_eq!(summary.added + summary.updated + summary.removed, 3);
	assert!(mutating(&runner).is_empty());
}

#[test]
fn nested_git_is_refused() {
	let (_dir, layout) = repo();
	fs::create_dir_all(layout.plugins_dir().join("plenary.nvim/.git")).unwrap();

	let err = sync_plugins(&RecordingRunner::new(), &layout, &SyncOptions::default()).unwrap_err();
	assert!(matches!(err, SubtreeError::NestedGit(_)), "{err}");
}
