//! Repository layout.
//!
//! Every path tsvendor touches is relative to the repository root. Defaults
//! follow the nvim-treesitter conventions and may be overridden by a
//! `[layout]` table in `tsvendor.toml` at the root.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{CommonError, Result};
use crate::process::{CommandRunner, CommandSpec, SystemRunner};

/// Environment variable overriding repository root discovery.
pub const ROOT_ENV: &str = "TSVENDOR_ROOT";

/// Optional configuration file looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = "tsvendor.toml";

/// Root-relative locations. Absolute values are used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayoutPaths {
	/// Plain-text list of grammar names to vendor and build.
	pub manifest: PathBuf,
	/// `[[grammar]]` table describing where each grammar comes from.
	pub grammars: PathBuf,
	/// nvim-treesitter lockfile pinning grammar revisions.
	pub lockfile: PathBuf,
	/// Vendored grammar sources, runtime headers and `metadata.json`.
	pub vendor_dir: PathBuf,
	/// Installed parser libraries.
	pub parser_dir: PathBuf,
	/// Recorded `<lang>.revision` files.
	pub parser_info_dir: PathBuf,
	/// Three-column `URL NAME REF` plugin list.
	pub plugins_list: PathBuf,
	/// git-subtree managed plugins.
	pub plugins_dir: PathBuf,
	/// Editor configuration installed by `tsvendor install`.
	pub config_dir: PathBuf,
}

impl Default for LayoutPaths {
	fn default() -> Self {
		let nvim_ts = Path::new("vendor").join("plugins").join("nvim-treesitter");
		Self {
			manifest: Path::new("scripts").join("treesitter-parsers.txt"),
			grammars: Path::new("scripts").join("treesitter-grammars.toml"),
			lockfile: nvim_ts.join("lockfile.json"),
			vendor_dir: Path::new("vendor").join("tree-sitter"),
			parser_dir: nvim_ts.join("parser"),
			parser_info_dir: nvim_ts.join("parser-info"),
			plugins_list: Path::new("scripts").join("plugins-list.txt"),
			plugins_dir: Path::new("vendor").join("plugins"),
			config_dir: PathBuf::from("nvim"),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
	#[serde(default)]
	layout: LayoutPaths,
}

/// Resolved repository layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
	root: PathBuf,
	paths: LayoutPaths,
}

impl Layout {
	/// Creates a layout with default paths under `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self::with_paths(root, LayoutPaths::default())
	}

	pub fn with_paths(root: impl Into<PathBuf>, paths: LayoutPaths) -> Self {
		Self { root: root.into(), paths }
	}

	/// Finds the repository root and applies `tsvendor.toml` when present.
	///
	/// Root precedence: `root_override`, then `$TSVENDOR_ROOT`, then
	/// `git rev-parse --show-toplevel`.
	pub fn discover(root_override: Option<&Path>) -> Result<Self> {
		let root = match root_override {
			Some(root) => root.to_path_buf(),
			None => match std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
				Some(root) => PathBuf::from(root),
				None => repo_root(&SystemRunner)?,
			},
		};
		Self::load(root)
	}

	/// Builds the layout for `root`, reading `tsvendor.toml` if it exists.
	pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();
		let config_path = root.join(CONFIG_FILE_NAME);
		if !config_path.is_file() {
			return Ok(Self::new(root));
		}

		let text = std::fs::read_to_string(&config_path).map_err(|error| CommonError::ConfigRead {
			path: config_path.clone(),
			error,
		})?;
		let config: ConfigFile =
			toml::from_str(&text).map_err(|error| CommonError::ConfigParse { path: config_path.clone(), error })?;
		debug!(config = %config_path.display(), "Loaded layout overrides");
		Ok(Self::with_paths(root, config.layout))
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn paths(&self) -> &LayoutPaths {
		&self.paths
	}

	/// Resolves a possibly root-relative path.
	pub fn resolve(&self, path: &Path) -> PathBuf {
		if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
	}

	pub fn manifest(&self) -> PathBuf {
		self.resolve(&self.paths.manifest)
	}

	pub fn grammars(&self) -> PathBuf {
		self.resolve(&self.paths.grammars)
	}

	pub fn lockfile(&self) -> PathBuf {
		self.resolve(&self.paths.lockfile)
	}

	pub fn vendor_dir(&self) -> PathBuf {
		self.resolve(&self.paths.vendor_dir)
	}

	/// `metadata.json` inside the vendor directory.
	pub fn metadata(&self) -> PathBuf {
		self.vendor_dir().join("metadata.json")
	}

	pub fn parser_dir(&self) -> PathBuf {
		self.resolve(&self.paths.parser_dir)
	}

	pub fn parser_info_dir(&self) -> PathBuf {
		self.resolve(&self.paths.parser_info_dir)
	}

	pub fn plugins_list(&self) -> PathBuf {
		self.resolve(&self.paths.plugins_list)
	}

	pub fn plugins_dir(&self) -> PathBuf {
		self.resolve(&self.paths.plugins_dir)
	}

	pub fn config_dir(&self) -> PathBuf {
		self.resolve(&self.paths.config_dir)
	}
}

/// Asks git for the top-level directory of the current repository.
pub fn repo_root(runner: &dyn CommandRunner) -> Result<PathBuf> {
	let out = runner
		.output(&CommandSpec::new("git").args(["rev-parse", "--show-toplevel"]))
		.map_err(|e| CommonError::RepoRoot(e.to_string()))?;
	let root = out.trim();
	if root.is_empty() {
		return Err(CommonError::RepoRoot("git printed an empty path".into()));
	}
	Ok(PathBuf::from(root))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serial_test::serial;

	use super::*;
	use crate::process::RecordingRunner;

	#[test]
	fn defaults_follow_nvim_treesitter_layout() {
		let layout = Layout::new("/repo");
		assert_eq!(layout.manifest(), PathBuf::from("/repo/scripts/treesitter-parsers.txt"));
		assert_eq!(layout.metadata(), PathBuf::from("/repo/vendor/tree-sitter/metadata.json"));
		assert_eq!(layout.parser_dir(), PathBuf::from("/repo/vendor/plugins/nvim-treesitter/parser"));
		assert_eq!(layout.parser_info_dir(), PathBuf::from("/repo/vendor/plugins/nvim-treesitter/parser-info"));
		assert_eq!(layout.lockfile(), PathBuf::from("/repo/vendor/plugins/nvim-treesitter/lockfile.json"));
		assert_eq!(layout.plugins_list(), PathBuf::from("/repo/scripts/plugins-list.txt"));
	}

	#[test]
	fn config_file_overrides_selected_paths() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(
			dir.path().join(CONFIG_FILE_NAME),
			"[layout]\nmanifest = \"grammars.txt\"\nparser-dir = \"/opt/parsers\"\n",
		)
		.unwrap();

		let layout = Layout::load(dir.path()).unwrap();
		assert_eq!(layout.manifest(), dir.path().join("grammars.txt"));
		assert_eq!(layout.parser_dir(), PathBuf::from("/opt/parsers"));
		assert_eq!(layout.vendor_dir(), dir.path().join("vendor").join("tree-sitter"));
	}

	#[test]
	fn config_file_rejects_unknown_keys() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[layout]\nparsers = \"x\"\n").unwrap();
		let err = Layout::load(dir.path()).unwrap_err();
		assert!(matches!(err, CommonError::ConfigParse { .. }), "got {err}");
	}

	#[test]
	#[serial]
	fn discover_prefers_override_then_env() {
		let dir = tempfile::tempdir().unwrap();
		let other = tempfile::tempdir().unwrap();

		// SAFETY: serialized with other environment-mutating tests.
		unsafe { std::env::set_var(ROOT_ENV, other.path()) };
		let from_env = Layout::discover(None).unwrap();
		let from_flag = Layout::discover(Some(dir.path())).unwrap();
		unsafe { std::env::remove_var(ROOT_ENV) };

		assert_eq!(from_env.root(), other.path());
		assert_eq!(from_flag.root(), dir.path());
	}

	#[test]
	fn repo_root_trims_git_output() {
		let runner = RecordingRunner::new().respond(|_| Some(Ok("/work/repo\n".into())));
		assert_eq!(repo_root(&runner).unwrap(), PathBuf::from("/work/repo"));

		let empty = RecordingRunner::new();
		assert!(matches!(repo_root(&empty), Err(CommonError::RepoRoot(_))));
	}
}
