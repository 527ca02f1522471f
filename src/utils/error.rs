use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No page layout mapping found for page layout '{template}'")]
    MappingNotFound { template: String },

    #[error("Rich text field '{field}' has no canvas block: {reason}")]
    CanvasNotFound { field: String, reason: String },

    #[error("Collaborator '{collaborator}' failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Content,
    Remote,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalyzerError {
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MappingNotFound { .. }
            | Self::TomlError(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::CanvasNotFound { .. } | Self::SerializationError(_) => ErrorCategory::Content,
            Self::Collaborator { .. } => ErrorCategory::Remote,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Content => ErrorSeverity::Medium,
            ErrorCategory::Remote | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MappingNotFound { .. } => {
                "Add a page layout mapping for this layout to the mapping file or provide a fallback mapping"
            }
            Self::CanvasNotFound { .. } => {
                "Check that the rich text field contains well-formed wiki markup"
            }
            Self::Collaborator { .. } => "Check connectivity to the content store and retry",
            Self::IoError(_) => "Check that the input files exist and are readable",
            Self::SerializationError(_) | Self::TomlError(_) => {
                "Check the input file syntax"
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the reported configuration value"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MappingNotFound { template } => {
                format!("Page layout '{}' is not mapped, the page cannot be analyzed", template)
            }
            Self::Collaborator { collaborator, .. } => {
                format!("The {} could not complete the request", collaborator)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
