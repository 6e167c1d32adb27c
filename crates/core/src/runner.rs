//! Per-job command runner.
//!
//! A runner binds one configuration, one workspace, and one sandbox for
//! the lifetime of a single job. Construction fails rather than returning
//! a partially-initialized runner: the workspace name is validated before
//! any subcommand is issued, and workspace selection must succeed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::config::Configuration;
use crate::error::CoreError;
use crate::sandbox::Sandbox;
use crate::terraform::{ExecResult, Terraform};
use crate::workspace::validate_workspace_name;

pub struct Runner {
    sandbox: Sandbox,
    terraform: Terraform,
    working_dir: PathBuf,
    workspace: String,
}

impl Runner {
    /// Build a runner on a private clone of the configuration.
    pub async fn new(
        config: Configuration,
        workspace: &str,
        terraform: Terraform,
    ) -> Result<Self, CoreError> {
        Self::build(Sandbox::new(config), workspace, terraform).await
    }

    /// Build a runner directly on the original source tree. The caller
    /// accepts the risk of concurrent mutation.
    pub async fn without_isolation(
        config: Configuration,
        workspace: &str,
        terraform: Terraform,
    ) -> Result<Self, CoreError> {
        Self::build(Sandbox::without_isolation(config), workspace, terraform).await
    }

    async fn build(
        mut sandbox: Sandbox,
        workspace: &str,
        terraform: Terraform,
    ) -> Result<Self, CoreError> {
        validate_workspace_name(workspace)?;

        let working_dir = sandbox.working_dir()?;
        select_workspace(&terraform, &working_dir, workspace).await?;

        Ok(Self {
            sandbox,
            terraform,
            working_dir,
            workspace: workspace.to_string(),
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Run an arbitrary subcommand with the preset flag merge and
    /// `-var key=value` pairs.
    pub async fn run(
        &self,
        subcommand: &str,
        args: &[&str],
        vars: &BTreeMap<String, String>,
    ) -> Result<ExecResult, CoreError> {
        self.terraform
            .exec(&self.working_dir, subcommand, args, vars)
            .await
    }

    /// Dispatch a job action.
    pub async fn execute(
        &self,
        action: Action,
        vars: &BTreeMap<String, String>,
    ) -> Result<ExecResult, CoreError> {
        self.run(action.as_str(), &[], vars).await
    }

    pub async fn plan(&self, vars: &BTreeMap<String, String>) -> Result<ExecResult, CoreError> {
        self.execute(Action::Plan, vars).await
    }

    pub async fn apply(&self, vars: &BTreeMap<String, String>) -> Result<ExecResult, CoreError> {
        self.execute(Action::Apply, vars).await
    }

    pub async fn destroy(&self, vars: &BTreeMap<String, String>) -> Result<ExecResult, CoreError> {
        self.execute(Action::Destroy, vars).await
    }

    /// Release the underlying sandbox. Also happens on drop.
    pub fn close(&mut self) {
        self.sandbox.close();
    }
}

/// Ensure the named workspace exists and is selected in `working_dir`.
///
/// `workspace new` first; when that fails because the workspace already
/// exists, fall back to `workspace select`. Any other failure aborts.
async fn select_workspace(
    terraform: &Terraform,
    working_dir: &Path,
    name: &str,
) -> Result<(), CoreError> {
    let created = terraform
        .exec(working_dir, "workspace", &["new", name], &BTreeMap::new())
        .await?;

    if !created.success() {
        if !created.stderr.contains("already exists") {
            return Err(CoreError::WorkspaceSelection {
                name: name.to_string(),
                stderr: created.stderr,
            });
        }

        let selected = terraform
            .exec(working_dir, "workspace", &["select", name], &BTreeMap::new())
            .await?;
        if !selected.success() {
            return Err(CoreError::WorkspaceSelection {
                name: name.to_string(),
                stderr: selected.stderr,
            });
        }
    }

    tracing::debug!(workspace = name, "Switched workspace");
    Ok(())
}
