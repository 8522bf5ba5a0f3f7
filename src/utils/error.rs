use thiserror::Error;

/// 內嵌物件擷取失敗的原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    #[error("key or object start not found")]
    NotFound,

    #[error("object braces never balanced before end of text")]
    Unbalanced,
}

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Upstream {source_name} failed: {message}")]
    UpstreamFailed {
        source_name: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Extraction of '{key}' failed: {reason}")]
    ExtractionFailed { key: String, reason: ExtractError },

    #[error("Decode failed for {context}: {message}")]
    DecodeFailed { context: String, message: String },

    #[error("Data unavailable: {message}")]
    DataUnavailable { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    UpstreamFailed,
    ExtractionFailed,
    DecodeFailed,
    DataUnavailable,
    Configuration,
    Io,
}

impl AggregatorError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn decode(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DecodeFailed {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::UpstreamFailed { .. } => ErrorKind::UpstreamFailed,
            Self::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            Self::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorKind::Configuration
            }
            Self::IoError(_) => ErrorKind::Io,
        }
    }

    /// 呼叫端錯誤回 4xx，其餘一律 5xx
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidRequest | ErrorKind::Configuration
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidRequest { message } => message.clone(),
            Self::UpstreamFailed {
                source_name,
                status: Some(status),
                ..
            } => format!("{} upstream responded with status {}", source_name, status),
            Self::UpstreamFailed {
                source_name,
                message,
                ..
            } => format!("Could not reach {} upstream: {}", source_name, message),
            Self::ExtractionFailed { key, .. } => format!("{} not found", key),
            Self::DecodeFailed { context, message } => {
                format!("Failed to parse {}: {}", context, message)
            }
            Self::DataUnavailable { message } => message.clone(),
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            Self::IoError(e) => format!("File access failed: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_maps_to_client_error() {
        let err = AggregatorError::invalid_request("Missing required parameters: Name, Weight");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.user_friendly_message(),
            "Missing required parameters: Name, Weight"
        );
    }

    #[test]
    fn test_upstream_errors_map_to_server_error() {
        let err = AggregatorError::UpstreamFailed {
            source_name: "catalog".to_string(),
            status: Some(503),
            message: "HTTP error! status: 503".to_string(),
        };
        assert_eq!(err.status_code(), 500);
        assert!(err.user_friendly_message().contains("503"));

        let err = AggregatorError::ExtractionFailed {
            key: "weatherDataSSR".to_string(),
            reason: ExtractError::NotFound,
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.user_friendly_message(), "weatherDataSSR not found");
    }
}
