//! Error types for lendweb-config

use std::fmt;
use thiserror::Error;

/// Stable code for each kind of configuration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    FileNotFound,
    Unreadable,
    Malformed,
    InvalidValue,
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ConfigErrorCode::Unreadable => "UNREADABLE",
            ConfigErrorCode::Malformed => "MALFORMED",
            ConfigErrorCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorSeverity {
    /// Startup continues with defaults
    Warning,
    Error,
}

/// Startup report for a configuration failure
#[derive(Debug, Clone)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    pub field: Option<String>,
    pub hints: Vec<String>,
}

impl ConfigErrorDetails {
    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if let Some(field) = &self.field {
            write!(f, " (at `{}`)", field)?;
        }
        for hint in &self.hints {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration file at {path}")]
    FileNotFound { path: String },

    #[error("could not read {path}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration is not valid YAML: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
            ConfigError::Malformed(_) => ConfigErrorCode::Malformed,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
        }
    }

    pub fn severity(&self) -> ConfigErrorSeverity {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorSeverity::Warning,
            _ => ConfigErrorSeverity::Error,
        }
    }

    pub fn to_details(&self) -> ConfigErrorDetails {
        let details = ConfigErrorDetails {
            code: self.code(),
            message: self.to_string(),
            field: None,
            hints: Vec::new(),
        };

        match self {
            ConfigError::FileNotFound { .. } => details
                .hint("pass --config with the path of an existing file")
                .hint("`lendweb init-config > config.yaml` writes the defaults"),
            ConfigError::Unreadable { source, .. } => details.hint(source.to_string()),
            ConfigError::Malformed(e) => match e.location() {
                Some(at) => details.hint(format!("line {}, column {}", at.line(), at.column())),
                None => details,
            },
            ConfigError::InvalidValue { field, .. } => ConfigErrorDetails {
                field: Some(field.clone()),
                ..details
            },
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_a_warning() {
        let error = ConfigError::FileNotFound { path: "config.yaml".to_string() };
        assert_eq!(error.code(), ConfigErrorCode::FileNotFound);
        assert_eq!(error.severity(), ConfigErrorSeverity::Warning);
        assert_eq!(error.to_details().hints.len(), 2);
    }

    #[test]
    fn test_malformed_yaml_reports_location() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("a: [1").unwrap_err();
        let error = ConfigError::from(yaml_error);
        assert_eq!(error.severity(), ConfigErrorSeverity::Error);
        assert!(error.to_details().to_string().starts_with("[MALFORMED]"));
    }

    #[test]
    fn test_invalid_value_carries_field() {
        let error = ConfigError::InvalidValue {
            field: "server.port".to_string(),
            reason: "must be greater than 0".to_string(),
        };
        let details = error.to_details();
        assert_eq!(details.field.as_deref(), Some("server.port"));
        assert_eq!(
            details.to_string(),
            "[INVALID_VALUE] server.port: must be greater than 0 (at `server.port`)"
        );
    }
}
