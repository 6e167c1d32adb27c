use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The set of Terraform actions a job may request.
///
/// `init`, `validate`, and the workspace subcommands are internal to the
/// engine and cannot be submitted as jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Plan,
    Apply,
    Destroy,
}

impl Action {
    /// The Terraform subcommand name.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Plan => "plan",
            Action::Apply => "apply",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Action::Plan),
            "apply" => Ok(Action::Apply),
            "destroy" => Ok(Action::Destroy),
            other => Err(CoreError::UnknownAction(other.to_string())),
        }
    }
}
