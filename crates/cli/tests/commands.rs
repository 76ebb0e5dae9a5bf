#![allow(unused_crate_dependencies)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn tsvendor(root: &Path, args: &[&str]) -> Output {
	tsvendor_in(root, root, args)
}

fn tsvendor_in(cwd: &Path, root: &Path, args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_tsvendor"))
		.current_dir(cwd)
		.arg("--root")
		.arg(root)
		.args(args)
		.env_remove("RUST_LOG")
		.env_remove("TSVENDOR_RUNTIME")
		.output()
		.unwrap()
}

fn stdout(output: &Output) -> String {
	String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn grammar_check_reports_builtin_cuda() {
	let dir = tempfile::tempdir().unwrap();
	let output = tsvendor(dir.path(), &["grammar", "check", "cuda"]);
	assert!(output.status.success(), "{output:?}");
	assert!(stdout(&output).starts_with("ok cuda (abi "), "{output:?}");
}

#[test]
fn grammar_check_failure_is_reported_not_a_crash() {
	let dir = tempfile::tempdir().unwrap();
	let output = tsvendor(dir.path(), &["grammar", "check", "nosuch", "--parser-dir", "parsers"]);
	assert_eq!(output.status.code(), Some(1));
	assert_eq!(stdout(&output), "Error loading nosuch grammar: not found in any search path\n");
}

#[test]
fn plugins_list_prints_parsed_entries() {
	let dir = tempfile::tempdir().unwrap();
	let list = dir.path().join("plugins.txt");
	fs::write(&list, "https://github.com/folke/lazy.nvim lazy.nvim stable\n").unwrap();

	let output = tsvendor(dir.path(), &["plugins", "--list", "--list-file", list.to_str().unwrap()]);
	assert!(output.status.success(), "{output:?}");
	let text = stdout(&output);
	assert!(text.starts_with("Parsed 1 plugin(s) from "), "{text}");
	assert!(text.contains("lazy.nvim"), "{text}");
}

#[test]
fn relative_list_file_resolves_against_the_root() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path();
	fs::create_dir_all(root.join("scripts")).unwrap();
	fs::write(root.join("scripts/extra.txt"), "https://github.com/folke/lazy.nvim lazy.nvim stable\n").unwrap();
	let nested = root.join("nvim/lua");
	fs::create_dir_all(&nested).unwrap();

	let output = tsvendor_in(&nested, root, &["plugins", "--list", "--list-file", "scripts/extra.txt"]);
	assert!(output.status.success(), "{output:?}");
	let expected = format!("Parsed 1 plugin(s) from {}:", root.join("scripts/extra.txt").display());
	assert!(stdout(&output).starts_with(&expected), "{output:?}");
}

#[test]
fn install_errors_exit_with_status_one() {
	let dir = tempfile::tempdir().unwrap();
	let target = dir.path().join("target-nvim");
	let output = tsvendor(dir.path(), &["install", "--target", target.to_str().unwrap()]);
	assert_eq!(output.status.code(), Some(1));
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("error: installing: repository is missing"), "{stderr}");
}
