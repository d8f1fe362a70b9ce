//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{FramedConfig, LogOutput, LoggingConfig, PrefixConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &FramedConfig) -> ConfigResult<()> {
    validate_prefixes(&config.prefix)?;
    validate_places(config)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_prefix(prefix: &str, key: &str) -> ConfigResult<()> {
    if prefix.is_empty() {
        return Err(ConfigError::validation(format!("{key} must not be empty")));
    }
    // The tokenizer splits on whitespace, so such a prefix could never match.
    if prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "{key} must not contain whitespace: {prefix:?}"
        )));
    }
    Ok(())
}

fn validate_prefixes(prefix: &PrefixConfig) -> ConfigResult<()> {
    validate_prefix(&prefix.default, "prefix.default")?;
    if let Some(ref p) = prefix.discord {
        validate_prefix(p, "prefix.discord")?;
    }
    if let Some(ref p) = prefix.twitch {
        validate_prefix(p, "prefix.twitch")?;
    }
    Ok(())
}

fn validate_places(config: &FramedConfig) -> ConfigResult<()> {
    for (place, prefix) in &config.places {
        if place.trim().is_empty() {
            return Err(ConfigError::validation("Place ids must not be empty"));
        }
        validate_prefix(prefix, &format!("places.{place}"))?;
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output = \"file\"",
        ));
    }
    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&FramedConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_prefixes() {
        let mut config = FramedConfig::default();
        config.prefix.default = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { .. })
        ));

        let mut config = FramedConfig::default();
        config.prefix.twitch = Some("hey bot".into());
        assert!(validate_config(&config).is_err());

        let mut config = FramedConfig::default();
        config.places.insert("1234".into(), "\t".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_place_id() {
        let mut config = FramedConfig::default();
        config.places.insert(" ".into(), "?".into());
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Place ids"));
    }

    #[test]
    fn test_validate_file_output_without_path() {
        let mut config = FramedConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("framed.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
