//! `plugins-list.txt`: whitespace-separated `URL NAME REF` lines.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, SubtreeError};

/// One vendored plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
	pub url: String,
	/// Directory name under the plugins dir.
	pub name: String,
	/// Branch, tag or commit.
	pub reference: String,
}

/// Parses the plugin list. Blank lines and `#` lines are skipped; columns
/// past the third are ignored.
pub fn parse_list(path: &Path) -> Result<Vec<Plugin>> {
	let text = fs::read_to_string(path).map_err(|error| match error.kind() {
		io::ErrorKind::NotFound => SubtreeError::ListMissing(path.to_path_buf()),
		_ => SubtreeError::ListRead {
			path: path.to_path_buf(),
			error,
		},
	})?;

	let mut plugins = Vec::new();
	let mut seen = HashSet::new();
	for (idx, raw) in text.lines().enumerate() {
		let line = raw.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		let mut cols = line.split_whitespace();
		let (Some(url), Some(name), Some(reference)) = (cols.next(), cols.next(), cols.next()) else {
			return Err(SubtreeError::BadLine {
				path: path.to_path_buf(),
				line: idx + 1,
				raw: raw.to_string(),
			});
		};
		if !seen.insert(name.to_string()) {
			return Err(SubtreeError::DuplicateName {
				path: path.to_path_buf(),
				name: name.to_string(),
				line: idx + 1,
			});
		}
		plugins.push(Plugin {
			url: url.to_string(),
			name: name.to_string(),
			reference: reference.to_string(),
		});
	}
	Ok(plugins)
}

/// Renders the list the way `plugins --list` prints it.
pub fn format_list(path: &Path, plugins: &[Plugin]) -> String {
	let mut out = format!("Parsed {} plugin(s) from {}:\n", plugins.len(), path.display());
	for p in plugins {
		out.push_str(&format!("  - {:<28} {:<16}  {}\n", p.name, p.reference, p.url));
	}
	out
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn list(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("plugins-list.txt");
		fs::write(&path, contents).unwrap();
		(dir, path)
	}

	#[test]
	fn parses_three_columns() {
		let (_dir, path) = list(
			"# URL NAME REF\n\nhttps://github.com/folke/lazy.nvim lazy.nvim stable\n  https://github.com/nvim-lua/plenary.nvim   plenary.nvim master extra\n",
		);
		let plugins = parse_list(&path).unwrap();
		assert_eq!(
			plugins,
			[
				Plugin {
					url: "https://github.com/folke/lazy.nvim".into(),
					name: "lazy.nvim".into(),
					reference: "stable".into(),
				},
				Plugin {
					url: "https://github.com/nvim-lua/plenary.nvim".into(),
					name: "plenary.nvim".into(),
					reference: "master".into(),
				},
			]
		);

		let rendered = format_list(&path, &plugins);
		assert!(rendered.starts_with("Parsed 2 plugin(s) from "));
		assert!(rendered.contains("  - lazy.nvim"));
	}

	#[test]
	fn short_and_duplicate_lines_are_rejected() {
		let (_dir, path) = list("# header\nhttps://x.org/a a\n");
		match parse_list(&path).unwrap_err() {
			SubtreeError::BadLine { line, raw, .. } => {
				assert_eq!(line, 2);
				assert_eq!(raw, "https://x.org/a a");
			}
			other => panic!("unexpected error: {other}"),
		}

		let (_dir, path) = list("https://x.org/a a main\nhttps://y.org/a a v1\n");
		assert!(matches!(parse_list(&path), Err(SubtreeError::DuplicateName { line: 2, .. })));
	}

	#[test]
	fn missing_list_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(parse_list(&dir.path().join("nope.txt")), Err(SubtreeError::ListMissing(_))));
	}
}
