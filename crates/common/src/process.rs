//! External command execution.
//!
//! Everything tsvendor does to the outside world (git, make, compilers, Neovim)
//! goes through a [`CommandRunner`] so callers can be exercised without
//! touching the network or the working tree.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::{CommonError, Result};

/// A command line plus the context it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
	/// Program to execute, resolved through `PATH`.
	pub program: OsString,
	/// Arguments passed verbatim.
	pub args: Vec<OsString>,
	/// Working directory, inherited when `None`.
	pub cwd: Option<PathBuf>,
	/// Extra environment variables layered over the inherited environment.
	pub env: Vec<(OsString, OsString)>,
	/// Whether a non-zero exit status is an error.
	pub check: bool,
}

impl CommandSpec {
	pub fn new(program: impl AsRef<OsStr>) -> Self {
		Self {
			program: program.as_ref().to_owned(),
			args: Vec::new(),
			cwd: None,
			env: Vec::new(),
			check: true,
		}
	}

	pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
		self.args.push(arg.as_ref().to_owned());
		self
	}

	pub fn args<I, S>(mut self, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<OsStr>,
	{
		self.args.extend(args.into_iter().map(|a| a.as_ref().to_owned()));
		self
	}

	pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
		self.cwd = Some(dir.as_ref().to_path_buf());
		self
	}

	pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
		self.env.push((key.as_ref().to_owned(), value.as_ref().to_owned()));
		self
	}

	/// Tolerates a non-zero exit status.
	pub fn unchecked(mut self) -> Self {
		self.check = false;
		self
	}

	/// Returns the shell-quoted command line, without the working directory.
	pub fn display(&self) -> String {
		let parts = std::iter::once(&self.program).chain(&self.args);
		format_command(parts.map(|p| p.to_string_lossy()))
	}

	/// Returns the first argument, which is the subcommand for git-style tools.
	pub fn subcommand(&self) -> Option<&str> {
		self.args.first().and_then(|a| a.to_str())
	}

	fn log_line(&self) -> String {
		match &self.cwd {
			Some(cwd) => format!("$ {} (cwd={})", self.display(), cwd.display()),
			None => format!("$ {}", self.display()),
		}
	}

	fn to_command(&self) -> Command {
		let mut cmd = Command::new(&self.program);
		cmd.args(&self.args);
		if let Some(cwd) = &self.cwd {
			cmd.current_dir(cwd);
		}
		cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
		cmd
	}
}

/// Joins arguments into a string a POSIX shell would split back identically.
pub fn format_command<I, S>(args: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	args.into_iter().map(|a| quote(a.as_ref())).collect::<Vec<_>>().join(" ")
}

fn quote(arg: &str) -> String {
	if arg.is_empty() {
		return "''".into();
	}
	let safe = arg
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-'));
	if safe { arg.to_string() } else { format!("'{}'", arg.replace('\'', r#"'"'"'"#)) }
}

/// Executes external commands.
pub trait CommandRunner: Send + Sync {
	/// Runs the command, logging it first.
	fn run(&self, cmd: &CommandSpec) -> Result<()>;

	/// Runs the command and returns its standard output.
	fn output(&self, cmd: &CommandSpec) -> Result<String>;

	/// Runs the command and reports whether it exited successfully.
	///
	/// A non-zero exit is never an error here, only a failure to start is.
	fn status(&self, cmd: &CommandSpec) -> Result<bool>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
	fn exec(cmd: &CommandSpec) -> Result<Output> {
		cmd.to_command().output().map_err(|error| CommonError::Spawn {
			command: cmd.display(),
			error,
		})
	}

	fn checked(cmd: &CommandSpec, output: Output) -> Result<Output> {
		if !cmd.check || output.status.success() {
			return Ok(output);
		}
		Err(CommonError::CommandFailed {
			command: cmd.display(),
			status: output.status.to_string(),
			stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
		})
	}
}

impl CommandRunner for SystemRunner {
	fn run(&self, cmd: &CommandSpec) -> Result<()> {
		info!("{}", cmd.log_line());
		let output = Self::checked(cmd, Self::exec(cmd)?)?;
		let stderr = String::from_utf8_lossy(&output.stderr);
		if !stderr.trim().is_empty() {
			debug!(command = %cmd.display(), stderr = %stderr.trim(), "command stderr");
		}
		Ok(())
	}

	fn output(&self, cmd: &CommandSpec) -> Result<String> {
		debug!("{}", cmd.log_line());
		let output = Self::checked(cmd, Self::exec(cmd)?)?;
		Ok(String::from_utf8_lossy(&output.stdout).into_owned())
	}

	fn status(&self, cmd: &CommandSpec) -> Result<bool> {
		debug!("{}", cmd.log_line());
		Ok(Self::exec(cmd)?.status.success())
	}
}

type Responder = Box<dyn Fn(&CommandSpec) -> Option<Result<String>> + Send + Sync>;

/// Runner that records commands instead of executing them.
///
/// Every command succeeds with empty output unless a responder registered with
/// [`RecordingRunner::respond`] claims it. Also backs `--dry-run`.
#[derive(Default)]
pub struct RecordingRunner {
	commands: Mutex<Vec<CommandSpec>>,
	responders: Vec<Responder>,
}

impl RecordingRunner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a responder consulted, in registration order, for every command.
	pub fn respond(mut self, f: impl Fn(&CommandSpec) -> Option<Result<String>> + Send + Sync + 'static) -> Self {
		self.responders.push(Box::new(f));
		self
	}

	/// Returns every command seen so far.
	pub fn commands(&self) -> Vec<CommandSpec> {
		self.commands.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Returns the shell-quoted form of every command seen so far.
	pub fn command_lines(&self) -> Vec<String> {
		self.commands().iter().map(CommandSpec::display).collect()
	}

	fn record(&self, cmd: &CommandSpec) -> Result<String> {
		info!("{}", cmd.log_line());
		self.commands.lock().unwrap_or_else(PoisonError::into_inner).push(cmd.clone());
		self.responders.iter().find_map(|r| r(cmd)).unwrap_or_else(|| Ok(String::new()))
	}
}

impl std::fmt::Debug for RecordingRunner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RecordingRunner").field("commands", &self.commands()).finish_non_exhaustive()
	}
}

impl CommandRunner for RecordingRunner {
	fn run(&self, cmd: &CommandSpec) -> Result<()> {
		self.record(cmd).map(drop)
	}

	fn output(&self, cmd: &CommandSpec) -> Result<String> {
		self.record(cmd)
	}

	fn status(&self, cmd: &CommandSpec) -> Result<bool> {
		match self.record(cmd) {
			Ok(_) => Ok(true),
			Err(CommonError::CommandFailed { .. }) => Ok(false),
			Err(e) => Err(e),
		}
	}
}
