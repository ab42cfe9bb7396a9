use anyhow::{Context, Result, anyhow};

use super::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub secret_key: String,
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
    pub http_addr: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    const MIN_SECRET_KEY_CHARS: usize = 32;

    pub fn from_env() -> Result<Self> {
        let secret_key = get_required("SECRET_KEY").context("SECRET_KEY is required")?;
        if secret_key.chars().count() < Self::MIN_SECRET_KEY_CHARS {
            return Err(anyhow!("SECRET_KEY must be at least 32 characters"));
        }

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://blog.db".to_string());
        let database_max_connections =
            u32::try_from(parse_usize_env("DATABASE_MAX_CONNECTIONS", 5)?)
                .context("DATABASE_MAX_CONNECTIONS is too large")?;
        let session_ttl_seconds =
            i64::try_from(parse_u64_env("SESSION_TTL_SECONDS", 7 * 24 * 60 * 60)?)
                .context("SESSION_TTL_SECONDS is too large")?;
        let session_cookie_secure = parse_bool(
            "SESSION_COOKIE_SECURE",
            &std::env::var("SESSION_COOKIE_SECURE").unwrap_or_else(|_| "false".to_string()),
        )?;

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let log_format = std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .parse::<LogFormat>()?;
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 10)?;

        Ok(Self {
            database_url,
            database_max_connections,
            secret_key,
            session_ttl_seconds,
            session_cookie_secure,
            http_addr,
            log_level,
            log_format,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("{key} must be a boolean, got '{other}'")),
    }
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("X", "TRUE").expect("must parse"));
        assert!(parse_bool("X", " on ").expect("must parse"));
        assert!(!parse_bool("X", "0").expect("must parse"));
        assert!(!parse_bool("X", "").expect("must parse"));
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        let err = parse_bool("SESSION_COOKIE_SECURE", "maybe").expect_err("must fail");
        assert!(err.to_string().contains("SESSION_COOKIE_SECURE"));
    }
}
