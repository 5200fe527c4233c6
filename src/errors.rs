use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Server(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Navigation error: {0}")]
    Navigation(String),
}

impl AppError {
    /// Network failures and replies that could not be understood.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Http(_)
                | AppError::Io(_)
                | AppError::Json(_)
                | AppError::UnexpectedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_display_the_raw_message() {
        let err = AppError::Server("invalid url".to_string());
        assert_eq!(err.to_string(), "invalid url");
        assert!(!err.is_transport());
    }

    #[test]
    fn parse_failures_count_as_transport() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.is_transport());
        assert!(AppError::UnexpectedResponse("empty".into()).is_transport());
        assert!(!AppError::Validation("empty".into()).is_transport());
    }
}
