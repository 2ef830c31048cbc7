//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Command-line values that replace file settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
}

/// Load `path` (or defaults), apply `overrides`, then validate the result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = overrides.bind_address {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = parse_config("[listener\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bind_override_is_validated() {
        let overrides = Overrides {
            bind_address: Some("not-an-address".into()),
        };
        match resolve_config(None, overrides) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors[0].field, "listener.bind_address");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn bind_override_replaces_default() {
        let overrides = Overrides {
            bind_address: Some("127.0.0.1:4000".into()),
        };
        let config = resolve_config(None, overrides).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn override_can_repair_file_value() {
        let path = std::env::temp_dir().join(format!("traced-users-{}.toml", std::process::id()));
        fs::write(&path, "[listener]\nbind_address = \"bogus\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
        let overrides = Overrides {
            bind_address: Some("127.0.0.1:4001".into()),
        };
        let config = resolve_config(Some(&path), overrides).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4001");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = parse_config("[timeouts]\nrequest_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs: must be greater than 0"
        );
    }
}
