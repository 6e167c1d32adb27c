//! Configuration discovery and path validation.
//!
//! A configuration is a directory of Terraform sources under the
//! configured root. Its public name is the directory stem.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// An on-disk Terraform source tree.
///
/// The path is validated at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Configuration {
    name: String,
    path: PathBuf,
}

impl Configuration {
    /// Build a configuration from an absolute directory path.
    ///
    /// Fails with [`CoreError::InvalidConfigPath`] unless the path is
    /// absolute and points at an existing directory.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        if !path.is_absolute() || !path.is_dir() {
            return Err(CoreError::InvalidConfigPath(
                path.to_string_lossy().to_string(),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| CoreError::InvalidConfigPath(path.to_string_lossy().to_string()))?;

        Ok(Self { name, path })
    }

    /// The configuration's public name (directory stem).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The absolute source directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Enumerate every configuration directly under `root`, sorted by name.
pub fn discover(root: &Path) -> Result<Vec<Configuration>, CoreError> {
    if !root.is_dir() {
        return Err(CoreError::MissingConfigRoot(
            root.to_string_lossy().to_string(),
        ));
    }

    let mut configs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            configs.push(Configuration::new(entry.path())?);
        }
    }
    configs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(configs)
}

/// Look up a single configuration by name under `root`.
pub fn find(root: &Path, name: &str) -> Result<Configuration, CoreError> {
    let path = root.join(name);
    if !path.is_dir() {
        return Err(CoreError::ConfigNotFound(name.to_string()));
    }
    Configuration::new(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_path() {
        let err = Configuration::new("configurations/net").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfigPath(_)));
    }

    #[test]
    fn rejects_missing_directory() {
        let err = Configuration::new("/does/not/exist").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfigPath(_)));
    }

    #[test]
    fn name_is_directory_stem() {
        let dir = tempfile::tempdir().unwrap();
        let net = dir.path().join("net");
        std::fs::create_dir(&net).unwrap();

        let config = Configuration::new(net).unwrap();
        assert_eq!(config.name(), "net");
    }

    #[test]
    fn discover_lists_only_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vpc")).unwrap();
        std::fs::create_dir(dir.path().join("dns")).unwrap();
        std::fs::write(dir.path().join("README.md"), "not a config").unwrap();

        let configs = discover(dir.path()).unwrap();
        let names: Vec<&str> = configs.iter().map(Configuration::name).collect();
        assert_eq!(names, ["dns", "vpc"]);
    }

    #[test]
    fn discover_fails_on_missing_root() {
        let err = discover(Path::new("/no/such/root")).unwrap_err();
        assert!(matches!(err, CoreError::MissingConfigRoot(_)));
    }

    #[test]
    fn find_unknown_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let err = find(dir.path(), "ghost").unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound(_)));
    }
}
