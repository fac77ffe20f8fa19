//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RoutesConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::RegistrationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Route registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RoutesConfig, ConfigError> {
    let config: RoutesConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RoutesConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/routes.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("containers = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_everything() {
        let err = parse_config(
            r#"
[[containers]]
id = "a"
extends = "nope"

[[containers.endpoints]]
action = "x"
method = "BREW"
"#,
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("unknown container \"nope\""));
        assert!(message.contains("unknown method \"BREW\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        fs::write(
            &path,
            r#"
[[containers]]
id = "home"

[[containers.endpoints]]
action = "index"
method = "GET"
path = "/"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.containers.len(), 1);
        assert_eq!(config.containers[0].endpoints[0].action, "index");
    }
}
