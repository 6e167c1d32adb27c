//! Terraform subcommand invocation.
//!
//! All commands run non-interactively with colored output disabled.
//! Per-subcommand preset flags live in an explicit registry rather than
//! being resolved dynamically, so the supported surface is visible in one
//! place and extensible through [`CommandPresets::register`].

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Flags appended to every invocation.
const BASELINE_FLAGS: &[&str] = &["-no-color"];

/// Default name of the Terraform binary, overridable via `TERRAFORM_BIN`.
const DEFAULT_BINARY: &str = "terraform";

/// Captured output of one Terraform invocation.
///
/// `exit_code == 0` denotes success. Both streams are trimmed of
/// surrounding whitespace at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    /// Build a result from raw process output, trimming both streams.
    pub fn from_output(output: &std::process::Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Registry of per-subcommand preset flags.
#[derive(Debug, Clone)]
pub struct CommandPresets {
    flags: HashMap<&'static str, Vec<&'static str>>,
}

impl CommandPresets {
    /// The standard preset table.
    ///
    /// | subcommand | presets                       |
    /// |------------|-------------------------------|
    /// | plan       | `-input=false`                |
    /// | apply      | `-input=false -auto-approve`  |
    /// | destroy    | `-input=false -auto-approve`  |
    /// | validate   | `-check-variables=false`      |
    pub fn standard() -> Self {
        let mut presets = Self {
            flags: HashMap::new(),
        };
        presets.register("plan", &["-input=false"]);
        presets.register("apply", &["-input=false", "-auto-approve"]);
        presets.register("destroy", &["-input=false", "-auto-approve"]);
        presets.register("validate", &["-check-variables=false"]);
        presets
    }

    /// Register (or replace) the preset flags for a subcommand.
    pub fn register(&mut self, subcommand: &'static str, flags: &[&'static str]) {
        self.flags.insert(subcommand, flags.to_vec());
    }

    /// The preset flags for a subcommand; empty for unregistered ones.
    pub fn flags_for(&self, subcommand: &str) -> &[&'static str] {
        self.flags.get(subcommand).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for CommandPresets {
    fn default() -> Self {
        Self::standard()
    }
}

/// Terraform binary handle: resolves the executable, applies presets,
/// and captures output with an optional wall-clock timeout.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: PathBuf,
    presets: CommandPresets,
    timeout: Option<Duration>,
}

impl Terraform {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            presets: CommandPresets::standard(),
            timeout: None,
        }
    }

    /// Resolve the binary from the `TERRAFORM_BIN` environment variable,
    /// falling back to `terraform` on the PATH.
    pub fn from_env() -> Self {
        let binary = std::env::var("TERRAFORM_BIN").unwrap_or_else(|_| DEFAULT_BINARY.into());
        Self::new().with_binary(binary)
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Bound each invocation's wall-clock runtime. `None` disables the
    /// bound; the child is killed when it expires.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn presets_mut(&mut self) -> &mut CommandPresets {
        &mut self.presets
    }

    /// Run `terraform <subcommand> <args> -no-color <presets> [-var k=v]*`
    /// in `working_dir` and capture the trimmed output.
    ///
    /// Variables are passed as repeated `-var key=value` arguments.
    pub async fn exec(
        &self,
        working_dir: &Path,
        subcommand: &str,
        args: &[&str],
        vars: &BTreeMap<String, String>,
    ) -> Result<ExecResult, CoreError> {
        let mut command = tokio::process::Command::new(&self.binary);
        command
            .arg(subcommand)
            .args(args)
            .args(BASELINE_FLAGS)
            .args(self.presets.flags_for(subcommand));

        for (key, value) in vars {
            command.arg("-var").arg(format!("{key}={value}"));
        }

        command
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            binary = %self.binary.display(),
            subcommand,
            working_dir = %working_dir.display(),
            "Spawning Terraform",
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| CoreError::Timeout(limit.as_secs()))??,
            None => command.output().await?,
        };

        let result = ExecResult::from_output(&output);
        tracing::debug!(subcommand, exit_code = result.exit_code, "Terraform finished");
        Ok(result)
    }
}

impl Default for Terraform {
    fn default() -> Self {
        Self::new()
    }
}
