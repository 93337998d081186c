//! Provider configuration, from JSON or from the environment.

use crate::error::ConnectorError;
use planner::query::dialect::DialectKind;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

pub const DIALECT_VAR: &str = "QUERYC_DIALECT";
pub const CONNECTION_STRING_VAR: &str = "QUERYC_CONNECTION_STRING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub dialect: DialectKind,
    pub connection_string: String,
}

impl ProviderConfig {
    pub fn new(dialect: DialectKind, connection_string: &str) -> Self {
        Self {
            dialect,
            connection_string: connection_string.to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConnectorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConnectorError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reads `QUERYC_DIALECT` and `QUERYC_CONNECTION_STRING` from the
    /// process environment.
    pub fn from_env() -> Result<Self, ConnectorError> {
        EnvVars::new().provider_config()
    }

    /// Like [`ProviderConfig::from_env`], with the `KEY=VALUE` lines of
    /// `path` taking precedence over the process environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self, ConnectorError> {
        let mut env = EnvVars::new();
        env.load_from_file(path)?;
        env.provider_config()
    }
}

/// Environment variables from the system and `.env` files.
#[derive(Debug, Clone, Default)]
struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConnectorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConnectorError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;
        self.parse_env_content(&content)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), ConnectorError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConnectorError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConnectorError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }
            self.vars.insert(key.to_string(), unquote(value));
        }
        Ok(())
    }

    fn required(&self, key: &str) -> Result<&str, ConnectorError> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConnectorError::Config(format!("Missing environment variable {key}")))
    }

    fn provider_config(&self) -> Result<ProviderConfig, ConnectorError> {
        let dialect = self
            .required(DIALECT_VAR)?
            .parse::<DialectKind>()
            .map_err(ConnectorError::Config)?;
        let connection_string = self.required(CONNECTION_STRING_VAR)?;
        Ok(ProviderConfig::new(dialect, connection_string))
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
