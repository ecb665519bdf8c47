//! SDK configuration.
//!
//! Program id overrides for deployments other than mainnet (local validators,
//! forks). Loaded from a JSON file and the `MPLEX_PROGRAM_ID_<PROGRAM>`
//! environment variables; the environment wins.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Prefix of the program id override environment variables.
pub const PROGRAM_ID_ENV_PREFIX: &str = "MPLEX_PROGRAM_ID_";

/// SDK configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Program id overrides keyed by registry program name (base58 addresses).
    #[serde(default)]
    pub program_ids: BTreeMap<String, String>,

    /// Additional IDL files to register.
    #[serde(default)]
    pub idl_paths: Vec<String>,
}

impl SdkConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the program id of `program`.
    #[must_use]
    pub fn with_program_id(mut self, program: impl Into<String>, address: impl Into<String>) -> Self {
        self.program_ids.insert(program.into(), address.into());
        self
    }

    /// Adds an IDL file to register.
    #[must_use]
    pub fn with_idl_path(mut self, path: impl Into<String>) -> Self {
        self.idl_paths.push(path.into());
        self
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid configuration JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Applies overrides from `(name, value)` pairs shaped like environment
    /// variables. Names without the prefix are ignored.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            if let Some(program) = key.as_ref().strip_prefix(PROGRAM_ID_ENV_PREFIX) {
                self.program_ids
                    .insert(program.to_ascii_lowercase(), value.into());
            }
        }
        self
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_vars(std::env::vars())
    }

    /// Loads the file at `path` (if any), applies the environment and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        }
        .with_env();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any program id is not a 32-byte base58 address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parse_program_ids().map(|_| ())
    }

    /// Parses program id overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if any address is invalid.
    pub fn parse_program_ids(&self) -> Result<BTreeMap<String, Pubkey>, ConfigError> {
        self.program_ids
            .iter()
            .map(|(program, address)| {
                let bytes = bs58::decode(address)
                    .into_vec()
                    .map_err(|_| ConfigError::InvalidProgramId(program.clone(), address.clone()))?;

                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| ConfigError::InvalidProgramId(program.clone(), address.clone()))?;
                Ok((program.clone(), Pubkey::new_from_array(arr)))
            })
            .collect()
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),

    /// Configuration document is malformed.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Program id override is not a base58 32-byte address.
    #[error("invalid program id for {0}: {1}")]
    InvalidProgramId(String, String),

    /// Override names a program the registry does not know.
    #[error("unknown program in config: {0}")]
    UnknownProgram(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL_ID: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

    #[test]
    fn test_config_default() {
        let config = SdkConfig::default();
        assert!(config.program_ids.is_empty());
        assert!(config.idl_paths.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SdkConfig::new()
            .with_program_id("candy_guard", LOCAL_ID)
            .with_idl_path("idl/custom.json");
        let ids = config.parse_program_ids().expect("should parse");
        assert_eq!(ids["candy_guard"].to_string(), LOCAL_ID);
        assert_eq!(config.idl_paths, vec!["idl/custom.json".to_string()]);
    }

    #[test]
    fn test_config_from_json() {
        let config = SdkConfig::from_json(&format!(
            r#"{{"program_ids": {{"bubblegum": "{}"}}}}"#,
            LOCAL_ID
        ))
        .expect("should parse");
        assert_eq!(config.program_ids.len(), 1);
        assert!(config.idl_paths.is_empty());
    }

    #[test]
    fn test_config_from_json_malformed() {
        let err = SdkConfig::from_json("{").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_env_overrides_file() {
        let config = SdkConfig::new()
            .with_program_id("auction_house", "11111111111111111111111111111111")
            .with_env_vars([
                ("MPLEX_PROGRAM_ID_AUCTION_HOUSE", LOCAL_ID),
                ("UNRELATED", "x"),
            ]);
        assert_eq!(config.program_ids.len(), 1);
        assert_eq!(config.program_ids["auction_house"], LOCAL_ID);
    }

    #[test]
    fn test_config_validate_invalid_address() {
        let config = SdkConfig::new().with_program_id("bubblegum", "not-base58!");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProgramId(..))
        ));

        let short = SdkConfig::new().with_program_id("bubblegum", "3yZe7d");
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_config_missing_file() {
        let err = SdkConfig::from_file("/nonexistent/mplex.json").expect_err("should fail");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
