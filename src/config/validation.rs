use crate::config::types::{Config, CrawlerConfig, OutputConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_author_id(&config.root_author)?;

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates remote platform configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;
    validate_http_url("profile_url", &config.profile_url)?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("catalog_path", &config.catalog_path),
        ("authors_path", &config.authors_path),
        ("error_log_path", &config.error_log_path),
        ("report_path", &config.report_path),
    ];

    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.catalog_path == config.authors_path {
        return Err(ConfigError::Validation(
            "catalog_path and authors_path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates an author identifier as it would appear in a profile URL
fn validate_author_id(author: &str) -> Result<(), ConfigError> {
    if author.is_empty() {
        return Err(ConfigError::Validation(
            "root_author cannot be empty".to_string(),
        ));
    }

    if author.chars().any(|c| c.is_whitespace() || c == '/' || c == '?') {
        return Err(ConfigError::Validation(format!(
            "root_author contains characters not allowed in a profile path: '{}'",
            author
        )));
    }

    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_worker_count() {
        let mut config = Config::default();
        config.crawler.workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.workers = 101;
        assert!(validate(&config).is_err());

        config.crawler.workers = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = Config::default();
        config.crawler.request_timeout_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_root_author() {
        let mut config = Config::default();
        config.crawler.root_author = String::new();
        assert!(validate(&config).is_err());

        config.crawler.root_author = "two words".to_string();
        assert!(validate(&config).is_err());

        config.crawler.root_author = "a/b".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.source.base_url = "ftp://books.example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_output_path() {
        let mut config = Config::default();
        config.output.report_path = PathBuf::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_catalog_and_authors_paths_must_differ() {
        let mut config = Config::default();
        config.output.authors_path = config.output.catalog_path.clone();
        assert!(validate(&config).is_err());
    }
}
