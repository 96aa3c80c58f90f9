use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: String,
    pub notify_webhook_url: Option<String>,
    pub notify_timeout: Duration,
    pub request_timeout: Duration,
    pub max_page_limit: u32,
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("{0} is required")]
    MissingVar(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("MARGINALIA_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let database_url = read_required("MARGINALIA_DATABASE_URL")?;
        let notify_webhook_url = read_optional_string("MARGINALIA_NOTIFY_WEBHOOK_URL");
        let notify_timeout_ms = read_u64("MARGINALIA_NOTIFY_TIMEOUT_MS", 2000)?;
        let request_timeout_secs = read_u64("MARGINALIA_REQUEST_TIMEOUT_SECS", 15)?;
        let max_page_limit = read_u32("MARGINALIA_MAX_PAGE_LIMIT", 50)?;
        let cors_allow_origins = read_list("MARGINALIA_CORS_ALLOW_ORIGINS");

        Ok(Self {
            http_addr,
            database_url,
            notify_webhook_url,
            notify_timeout: Duration::from_millis(notify_timeout_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_page_limit,
            cors_allow_origins,
        })
    }
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in contents.lines().filter_map(parse_dotenv_line) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_required(key: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingVar(key));
    }
    Ok(trimmed.to_string())
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_u32(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_list(key: &'static str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_quotes(value.trim()).to_string()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::parse_dotenv_line;

    #[test]
    fn parse_dotenv_line_basic() {
        let (key, value) = parse_dotenv_line("FOO=bar").unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "bar");
    }

    #[test]
    fn parse_dotenv_line_export_and_quotes() {
        let (key, value) = parse_dotenv_line(r#"export FOO="hello world""#).unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "hello world");

        let (_, value) = parse_dotenv_line("BAR='single'").unwrap();
        assert_eq!(value, "single");
    }

    #[test]
    fn parse_dotenv_line_skips_comments_and_blanks() {
        assert!(parse_dotenv_line("# comment").is_none());
        assert!(parse_dotenv_line("   ").is_none());
        assert!(parse_dotenv_line("=value").is_none());
    }
}
