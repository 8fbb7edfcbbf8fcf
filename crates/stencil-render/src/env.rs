//! Runtime environment.
//!
//! The environment gates two behaviors:
//!
//! - whether template errors are shown in response bodies
//! - whether directory-backed templates are recompiled on every request
//!
//! It is always passed explicitly. Nothing in this crate consults the process
//! environment on its own; applications that want the conventional variable
//! call [`Env::from_var`] at startup.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Conventional variable holding the environment name.
pub const ENV_VAR: &str = "STENCIL_ENV";

/// The runtime environment an application is running in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Local development: verbose errors, live template reloading.
    #[default]
    #[serde(alias = "dev")]
    Development,
    /// Production: generic error pages, templates compiled once.
    #[serde(alias = "prod")]
    Production,
    /// Automated tests: behaves like production.
    Test,
}

impl Env {
    /// Returns true in [`Env::Development`].
    pub fn is_development(self) -> bool {
        self == Env::Development
    }

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Env::Development => "development",
            Env::Production => "production",
            Env::Test => "test",
        }
    }

    /// Reads the environment from the variable `name`.
    ///
    /// An unset or empty variable yields [`Env::Development`].
    pub fn from_var(name: &str) -> Result<Self, ParseEnvError> {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Env::default()),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown environment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment {0:?}, expected development, production or test")]
pub struct ParseEnvError(String);

impl FromStr for Env {
    type Err = ParseEnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Env::Development),
            "production" | "prod" => Ok(Env::Production),
            "test" => Ok(Env::Test),
            _ => Err(ParseEnvError(s.to_string())),
        }
    }
}
