#![allow(unused_crate_dependencies)]
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tsvendor_grammar::{GrammarError, GrammarLoader, GrammarSource, library_extension};

const FAKE_GRAMMAR: &str = r#"
static const unsigned int language[16] = {14, 7, 0, 5, 0, 11, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0};
const void *tree_sitter_fake_lang(void) { return language; }
const void *tree_sitter_null(void) { return 0; }
"#;

/// Builds a shared library exporting fake grammar entry points, or `None`
/// when no C compiler is available.
fn build_fake_library(dir: &Path, file_name: &str) -> Option<PathBuf> {
	let cc = std::env::var("CC").ok().or_else(|| which::which("cc").ok().map(|p| p.display().to_string()))?;
	let src = dir.join("fake.c");
	std::fs::write(&src, FAKE_GRAMMAR).unwrap();
	let out = dir.join(file_name);
	let status = Command::new(cc).args(["-shared", "-fPIC", "-o"]).arg(&out).arg(&src).status().ok()?;
	status.success().then_some(out)
}

#[test]
fn loads_installed_library_by_name() {
	let dir = tempfile::tempdir().unwrap();
	let file = format!("fake-lang.{}", library_extension());
	let Some(path) = build_fake_library(dir.path(), &file) else {
		return;
	};

	let loader = GrammarLoader::new([dir.path().to_path_buf()]);
	let language = loader.load("fake-lang").expect("Error loading fake-lang grammar");
	assert_eq!(language.abi_version(), 14);
	assert_eq!(language.info().node_kind_count, 7);
	assert_eq!(language.source(), &GrammarSource::Library(path));

	let again = loader.load("fake-lang").unwrap();
	assert_eq!(language, again);
	drop(loader);
	assert_eq!(language.info().parse_state_count, 11);
}

#[test]
fn null_entry_point_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	let file = format!("null.{}", library_extension());
	if build_fake_library(dir.path(), &file).is_none() {
		return;
	}

	let err = GrammarLoader::new([dir.path().to_path_buf()]).load("null").unwrap_err();
	assert!(matches!(err, GrammarError::NullHandle { .. }), "{err}");
	assert!(err.to_string().starts_with("Error loading null grammar"));
}

#[test]
fn missing_symbol_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	let file = format!("other.{}", library_extension());
	if build_fake_library(dir.path(), &file).is_none() {
		return;
	}

	let err = GrammarLoader::new([dir.path().to_path_buf()]).load("other").unwrap_err();
	match err {
		GrammarError::MissingSymbol { symbol, .. } => assert_eq!(symbol, "tree_sitter_other"),
		other => panic!("unexpected error: {other}"),
	}
}
