//! Ephemeral private clones of configuration source trees.
//!
//! Every job gets its own clone so concurrent jobs against the same
//! configuration never share a working directory. The clone lives in a
//! process-unique temporary directory that is removed when the sandbox
//! closes, on every exit path.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Configuration;
use crate::error::CoreError;
use crate::terraform::{ExecResult, Terraform};

/// An exclusively-owned working copy of one configuration.
///
/// Owns at most one clone. The clone is created lazily on first use and
/// its path is stable until [`Sandbox::close`]. Dropping the sandbox
/// closes it.
#[derive(Debug)]
pub struct Sandbox {
    config: Configuration,
    isolate: bool,
    tmp: Option<TempDir>,
    clone_path: Option<PathBuf>,
}

impl Sandbox {
    /// A sandbox that clones the configuration before any command runs.
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            isolate: true,
            tmp: None,
            clone_path: None,
        }
    }

    /// A sandbox operating directly on the original source tree. The
    /// caller accepts the risk of concurrent mutation.
    pub fn without_isolation(config: Configuration) -> Self {
        Self {
            config,
            isolate: false,
            tmp: None,
            clone_path: None,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Copy the configuration into a fresh temporary location, or return
    /// the existing clone path unchanged.
    pub fn clone_dir(&mut self) -> Result<&Path, CoreError> {
        if self.clone_path.is_none() {
            if !self.config.path().is_dir() {
                return Err(CoreError::InvalidConfigPath(
                    self.config.path().to_string_lossy().to_string(),
                ));
            }

            let tmp = tempfile::Builder::new().prefix("groundwork-").tempdir()?;
            let target = tmp.path().join(self.config.name());
            copy_dir_all(self.config.path(), &target)?;

            tracing::debug!(
                config = self.config.name(),
                clone = %target.display(),
                "Cloned configuration",
            );

            self.tmp = Some(tmp);
            self.clone_path = Some(target);
        }

        Ok(self.clone_path.as_deref().unwrap())
    }

    /// The directory commands should run in: the clone when isolation is
    /// on (cloning on demand), the original path otherwise.
    pub fn working_dir(&mut self) -> Result<PathBuf, CoreError> {
        if self.isolate {
            Ok(self.clone_dir()?.to_path_buf())
        } else {
            Ok(self.config.path().to_path_buf())
        }
    }

    /// Remove the clone's temporary directory tree. Safe to call any
    /// number of times; a no-op when nothing was cloned.
    pub fn close(&mut self) {
        self.clone_path = None;
        if let Some(tmp) = self.tmp.take() {
            if let Err(e) = tmp.close() {
                tracing::warn!(error = %e, "Failed to remove sandbox directory");
            }
        }
    }

    /// Run `terraform init` in the sandbox.
    pub async fn init(&mut self, terraform: &Terraform) -> Result<ExecResult, CoreError> {
        let dir = self.working_dir()?;
        terraform.exec(&dir, "init", &[], &Default::default()).await
    }

    /// Run `terraform validate` (variable-presence checks disabled) in
    /// the sandbox.
    pub async fn validate(&mut self, terraform: &Terraform) -> Result<ExecResult, CoreError> {
        let dir = self.working_dir()?;
        terraform
            .exec(&dir, "validate", &[], &Default::default())
            .await
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        self.close();
    }
}

/// Recursively copy a directory tree.
fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_config(dir: &Path) -> Configuration {
        let source = dir.join("net");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("main.tf"), "resource \"null_resource\" \"noop\" {}\n")
            .unwrap();
        std::fs::create_dir(source.join("modules")).unwrap();
        std::fs::write(source.join("modules").join("vars.tf"), "").unwrap();
        Configuration::new(source).unwrap()
    }

    fn listing(path: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(path)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn clone_is_idempotent_and_copies_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(dir.path());
        let source = config.path().to_path_buf();

        let mut sandbox = Sandbox::new(config);
        let first = sandbox.clone_dir().unwrap().to_path_buf();
        let second = sandbox.clone_dir().unwrap().to_path_buf();

        assert_eq!(first, second);
        assert_ne!(first, source);
        assert_eq!(listing(&first), listing(&source));
        assert_eq!(
            listing(&first.join("modules")),
            listing(&source.join("modules"))
        );
    }

    #[test]
    fn close_is_idempotent_and_removes_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut sandbox = Sandbox::new(fixture_config(dir.path()));

        let clone = sandbox.clone_dir().unwrap().to_path_buf();
        let parent = clone.parent().unwrap().to_path_buf();
        assert!(parent.exists());

        sandbox.close();
        assert!(!parent.exists());

        // Second and third close are no-ops.
        sandbox.close();
        sandbox.close();
    }

    #[test]
    fn close_without_clone_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut sandbox = Sandbox::new(fixture_config(dir.path()));
        sandbox.close();
    }

    #[test]
    fn drop_removes_the_clone() {
        let dir = tempfile::tempdir().unwrap();
        let parent;
        {
            let mut sandbox = Sandbox::new(fixture_config(dir.path()));
            let clone = sandbox.clone_dir().unwrap().to_path_buf();
            parent = clone.parent().unwrap().to_path_buf();
            assert!(parent.exists());
        }
        assert!(!parent.exists());
    }

    #[test]
    fn working_dir_without_isolation_is_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(dir.path());
        let source = config.path().to_path_buf();

        let mut sandbox = Sandbox::without_isolation(config);
        assert_eq!(sandbox.working_dir().unwrap(), source);
        assert!(sandbox.clone_path.is_none());
    }

    #[test]
    fn clone_fails_when_source_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(dir.path());
        std::fs::remove_dir_all(config.path()).unwrap();

        let mut sandbox = Sandbox::new(config);
        let err = sandbox.clone_dir().unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfigPath(_)));
    }
}
