use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeroError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid matching pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Generation failed: {message}")]
    GenerationError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Catalog,
    Network,
    Data,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HeroError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HeroError::ConfigError { .. }
            | HeroError::ConfigValidationError { .. }
            | HeroError::InvalidConfigValueError { .. }
            | HeroError::MissingConfigError { .. }
            | HeroError::PatternError(_) => ErrorCategory::Configuration,
            HeroError::CatalogError { .. } | HeroError::IoError(_) => ErrorCategory::Catalog,
            HeroError::HttpError(_) | HeroError::GenerationError { .. } => ErrorCategory::Network,
            HeroError::SerializationError(_) => ErrorCategory::Data,
            HeroError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Catalog => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML config file and any ${VAR} environment substitutions"
            }
            ErrorCategory::Catalog => {
                "Make sure the catalog file exists and is a non-empty JSON array of listings"
            }
            ErrorCategory::Network => {
                "Check the generator endpoint, API key and network; replies fall back to the deterministic composer"
            }
            ErrorCategory::Data => "Inspect the input file for malformed JSON",
            ErrorCategory::Input => "Send a non-empty customer message",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HeroError::ValidationError { message } => format!("Invalid input: {}", message),
            HeroError::CatalogError { message } => {
                format!("The listing catalog could not be loaded: {}", message)
            }
            HeroError::MissingConfigError { field } => {
                format!("Missing configuration value '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HeroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let input = HeroError::ValidationError {
            message: "empty message".to_string(),
        };
        assert_eq!(input.category(), ErrorCategory::Input);
        assert_eq!(input.severity(), ErrorSeverity::Low);

        let catalog = HeroError::CatalogError {
            message: "missing".to_string(),
        };
        assert_eq!(catalog.severity(), ErrorSeverity::Critical);
        assert!(catalog.user_friendly_message().contains("catalog"));
    }
}
