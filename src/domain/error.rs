use std::fmt;

use thiserror::Error;

/// Which configuration file an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Test,
    Demo,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::Test => write!(f, "test"),
            ConfigKind::Demo => write!(f, "demo"),
        }
    }
}

/// Coarse failure class, for callers that branch on the kind of error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigNotFound,
    Service,
    Validation,
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("File '{path}' not found. Please provide a valid {kind} file path.")]
    ConfigNotFound { kind: ConfigKind, path: String },

    #[error("Service error: {provider} - {message}")]
    Service { provider: String, message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn config_not_found(kind: ConfigKind, path: impl Into<String>) -> Self {
        Self::ConfigNotFound {
            kind,
            path: path.into(),
        }
    }

    pub fn service(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. } => ErrorKind::ConfigNotFound,
            Self::Service { .. } => ErrorKind::Service,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_message() {
        let error = DomainError::config_not_found(ConfigKind::Test, "nonexistent.yaml");
        assert_eq!(
            error.to_string(),
            "File 'nonexistent.yaml' not found. Please provide a valid test file path."
        );
        assert_eq!(error.kind(), ErrorKind::ConfigNotFound);
    }

    #[test]
    fn test_demo_config_not_found_message() {
        let error = DomainError::config_not_found(ConfigKind::Demo, "demo.yaml");
        assert!(error.to_string().contains("valid demo file path"));
    }

    #[test]
    fn test_service_error() {
        let error = DomainError::service("openai", "HTTP 401: unauthorized");
        assert_eq!(
            error.to_string(),
            "Service error: openai - HTTP 401: unauthorized"
        );
        assert_eq!(error.kind(), ErrorKind::Service);
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
        assert_eq!(error.kind(), ErrorKind::Validation);
    }
}
