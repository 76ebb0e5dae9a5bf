//! `tsvendor install`: puts the repository's Neovim configuration in place.
//!
//! The configuration is either linked (the default) or copied together with
//! `vendor/`, so Neovim starts without network access. Whatever already sits
//! at the target is moved aside to a timestamped backup unless `force` is set.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use tracing::info;
use tsvendor_common::Layout;
use tsvendor_vendor::snapshot::copy_tree;

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
	/// Copy instead of symlinking.
	pub copy: bool,
	/// Remove existing targets instead of backing them up.
	pub force: bool,
	pub target: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMode {
	/// `target` is a symlink to the repository's config directory.
	Linked { source: PathBuf },
	/// Config copied to `target`, vendored plugins to `vendor`.
	Copied { vendor: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
	pub target: PathBuf,
	pub mode: InstallMode,
	/// Where previously installed files were moved.
	pub backups: Vec<PathBuf>,
}

/// `$XDG_CONFIG_HOME/nvim`, falling back to `~/.config/nvim`.
pub fn default_target() -> Result<PathBuf> {
	if let Some(config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
		return Ok(PathBuf::from(config).join("nvim"));
	}
	let home = dirs::home_dir().context("cannot determine the home directory; pass --target")?;
	Ok(home.join(".config").join("nvim"))
}

fn validate_layout(layout: &Layout) -> Result<()> {
	let config_dir = layout.config_dir();
	if !config_dir.is_dir() {
		bail!("repository is missing {} (expected to contain init.lua)", config_dir.display());
	}
	let plugins_dir = layout.plugins_dir();
	if !plugins_dir.is_dir() {
		bail!("repository is missing the vendored plugins directory {}", plugins_dir.display());
	}
	if !plugins_dir.join("lazy.nvim").is_dir() {
		bail!("lazy.nvim vendor directory is missing; installation cannot continue");
	}
	Ok(())
}

fn path_exists(path: &Path) -> bool {
	path.symlink_metadata().is_ok()
}

fn remove_path(path: &Path) -> io::Result<()> {
	let meta = path.symlink_metadata()?;
	if meta.is_dir() { fs::remove_dir_all(path) } else { fs::remove_file(path) }
}

/// First free `<name>.backup.<stamp>[.<n>]` sibling of `path`.
pub fn backup_name(path: &Path, stamp: NaiveDateTime) -> PathBuf {
	let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
	let base = format!("{name}.backup.{}", stamp.format("%Y%m%d%H%M%S"));
	let mut candidate = path.with_file_name(&base);
	let mut counter = 1;
	while path_exists(&candidate) {
		candidate = path.with_file_name(format!("{base}.{counter}"));
		counter += 1;
	}
	candidate
}

/// Moves `path` out of the way. Returns the backup location, if any.
fn displace(path: &Path, label: &str, force: bool, stamp: NaiveDateTime) -> Result<Option<PathBuf>> {
	if !path_exists(path) {
		return Ok(None);
	}
	if force {
		remove_path(path).with_context(|| format!("removing {}", path.display()))?;
		info!("Removed existing {label} at {}", path.display());
		return Ok(None);
	}
	let backup = backup_name(path, stamp);
	info!("Existing {label} detected. Moving it to {}", backup.display());
	fs::rename(path, &backup).with_context(|| format!("moving {} to {}", path.display(), backup.display()))?;
	Ok(Some(backup))
}

#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
	std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
	std::os::windows::fs::symlink_dir(src, dst)
}

/// Installs the configuration of `layout` according to `opts`.
pub fn install(layout: &Layout, opts: &InstallOptions) -> Result<InstallReport> {
	validate_layout(layout)?;
	let config_dir = std::path::absolute(layout.config_dir()).context("resolving the config directory")?;
	let plugins_dir = layout.plugins_dir();
	// Copied as `<target>/vendor`, with the plugins dir keeping its own name beneath it.
	let vendor_root = plugins_dir.parent().map_or_else(|| plugins_dir.clone(), Path::to_path_buf);

	let target = match &opts.target {
		Some(target) => target.clone(),
		None => default_target()?,
	};
	let target = std::path::absolute(&target).with_context(|| format!("resolving {}", target.display()))?;
	let stamp = chrono::Local::now().naive_local();

	let mut backups = Vec::new();
	backups.extend(displace(&target, "Neovim config", opts.force, stamp)?);
	if let Some(parent) = target.parent() {
		fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
	}

	let mode = if opts.copy {
		let vendor = target.join("vendor");
		backups.extend(displace(&vendor, "vendored plugins", opts.force, stamp)?);
		copy_tree(&config_dir, &target).context("copying the Neovim configuration")?;
		copy_tree(&vendor_root, &vendor).context("copying vendored plugins")?;
		InstallMode::Copied { vendor }
	} else {
		symlink_dir(&config_dir, &target)
			.with_context(|| format!("linking {} -> {}", target.display(), config_dir.display()))?;
		InstallMode::Linked { source: config_dir }
	};

	Ok(InstallReport { target, mode, backups })
}
