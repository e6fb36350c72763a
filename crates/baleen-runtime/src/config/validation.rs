//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BaleenConfig, BotSettings, PollingConfig, RetryConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &BaleenConfig) -> ConfigResult<()> {
    validate_bot(&config.bot)?;
    validate_polling(&config.polling)?;
    validate_retry(&config.retry)?;
    Ok(())
}

/// Validates bot credentials and endpoint settings.
fn validate_bot(bot: &BotSettings) -> ConfigResult<()> {
    if bot.token.is_empty() {
        return Err(ConfigError::missing_field("bot.token"));
    }

    validate_base_url(&bot.base_url)?;

    if bot.request_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "Request timeout must be greater than 0",
        ));
    }

    Ok(())
}

/// Validates long-polling settings.
fn validate_polling(polling: &PollingConfig) -> ConfigResult<()> {
    if !(1..=120).contains(&polling.limit) {
        return Err(ConfigError::validation(format!(
            "Polling limit must be between 1 and 120, got {}",
            polling.limit
        )));
    }

    if polling.concurrency_limit == 0 {
        return Err(ConfigError::validation(
            "Concurrency limit must be greater than 0",
        ));
    }

    Ok(())
}

/// Validates retry configuration.
fn validate_retry(retry: &RetryConfig) -> ConfigResult<()> {
    if retry.initial_delay_ms == 0 {
        return Err(ConfigError::validation(
            "Initial retry delay must be greater than 0",
        ));
    }

    if retry.max_delay_ms < retry.initial_delay_ms {
        return Err(ConfigError::validation(
            "Max retry delay must be greater than or equal to initial delay",
        ));
    }

    if retry.backoff_factor < 1.0 {
        return Err(ConfigError::validation(
            "Backoff factor must be at least 1.0",
        ));
    }

    Ok(())
}

/// Validates the API base URL.
fn validate_base_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("bot.base_url"));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::invalid_url(
            url,
            "URL must start with http:// or https://",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BaleenConfig {
        let mut config = BaleenConfig::default();
        config.bot.token = "42:test-token".to_string();
        config
    }

    #[test]
    fn test_validate_accepts_defaults_with_token() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = BaleenConfig::default();

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::MissingField { field }) if field == "bot.token"));
    }

    #[test]
    fn test_validate_rejects_polling_limit_out_of_range() {
        let mut config = valid_config();
        config.polling.limit = 0;
        assert!(validate_config(&config).is_err());

        config.polling.limit = 121;
        assert!(validate_config(&config).is_err());

        config.polling.limit = 120;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = valid_config();
        config.polling.concurrency_limit = 0;

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_backoff_factor_below_one() {
        let mut config = valid_config();
        config.retry.backoff_factor = 0.5;

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_base_url() {
        let mut config = valid_config();
        config.bot.base_url = "ftp://tapi.bale.ai".to_string();

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
