//! Startup validation of every known configuration.
//!
//! Each configuration is initialized and validated inside a throwaway
//! sandbox, so the canonical sources are never touched. The outcome is
//! a value; the caller (the worker binary) decides to proceed or exit.

use std::path::Path;

use groundwork_core::config;
use groundwork_core::{CoreError, Sandbox, Terraform};

/// One configuration that failed startup validation.
#[derive(Debug)]
pub struct ConfigFailure {
    pub configuration: String,
    pub detail: String,
}

/// Typed outcome of startup validation.
#[derive(Debug)]
pub enum StartupOutcome {
    /// Every configuration initialized and validated cleanly.
    Ready { validated: usize },
    /// At least one configuration is broken; the process must not
    /// accept jobs.
    Fatal { failures: Vec<ConfigFailure> },
}

/// Initialize and validate every configuration under `root`.
pub async fn validate_configurations(
    root: &Path,
    terraform: &Terraform,
) -> Result<StartupOutcome, CoreError> {
    let configs = config::discover(root)?;
    let total = configs.len();
    let mut failures = Vec::new();

    for configuration in configs {
        let name = configuration.name().to_string();
        tracing::debug!(configuration = %name, "Initializing");

        let mut sandbox = Sandbox::new(configuration);
        if let Some(detail) = check(&mut sandbox, terraform, &name).await {
            failures.push(ConfigFailure {
                configuration: name,
                detail,
            });
        }
        sandbox.close();
    }

    if failures.is_empty() {
        tracing::info!(validated = total, "Initialized. Ready to process jobs");
        Ok(StartupOutcome::Ready { validated: total })
    } else {
        Ok(StartupOutcome::Fatal { failures })
    }
}

/// Run init then validate in the sandbox; returns the failure detail if
/// either step does not exit cleanly.
async fn check(sandbox: &mut Sandbox, terraform: &Terraform, name: &str) -> Option<String> {
    match sandbox.init(terraform).await {
        Ok(result) if !result.success() => {
            tracing::error!(configuration = %name, stderr = %result.stderr, "Initialization failed");
            return Some(format!("init exited with {}: {}", result.exit_code, result.stderr));
        }
        Err(e) => {
            tracing::error!(configuration = %name, error = %e, "Initialization failed");
            return Some(e.to_string());
        }
        Ok(_) => {}
    }

    match sandbox.validate(terraform).await {
        Ok(result) if !result.success() => {
            tracing::error!(configuration = %name, stderr = %result.stderr, "Configuration is invalid");
            Some(format!(
                "validate exited with {}: {}",
                result.exit_code, result.stderr
            ))
        }
        Err(e) => {
            tracing::error!(configuration = %name, error = %e, "Validation failed");
            Some(e.to_string())
        }
        Ok(_) => None,
    }
}
