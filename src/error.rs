use thiserror::Error;

use crate::anthropic::AnthropicError;
use crate::csv_io::CsvError;
use crate::limiter::LimiterError;
use crate::store::StoreError;

/// Errors that stop a whole command or request. Per-item generation failures
/// never reach this type; they become `Failed` outcomes instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid concurrency: {0}")]
    Limiter(#[from] LimiterError),

    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Anthropic API error: {0}")]
    Anthropic(#[from] AnthropicError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_error_converts() {
        let err: AppError = LimiterError::NonPositive(0).into();
        assert_eq!(
            err.to_string(),
            "Invalid concurrency: concurrency cap must be a positive integer, got 0"
        );
    }

    #[test]
    fn config_error_display() {
        let err = AppError::Config("missing token".into());
        assert_eq!(err.to_string(), "Config error: missing token");
    }
}
