use leadcard_errors::AppError;
use std::time::Duration;

const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CARD_IDLE_SECS: u64 = 1800;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub graphql_endpoint: url::Url,
    pub public_origin: String,
    pub share_webhook_url: Option<url::Url>,
    pub http_timeout: Duration,
    pub bind_addr: String,
    /// Cards untouched for this long are dropped by the api's sweeper.
    pub card_idle_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let graphql_endpoint = read("GRAPHQL_ENDPOINT")
            .ok_or_else(|| AppError::Config("GRAPHQL_ENDPOINT must be set".to_string()))
            .and_then(|raw| parse_url("GRAPHQL_ENDPOINT", &raw))?;

        let share_webhook_url = read("SHARE_WEBHOOK_URL")
            .map(|raw| parse_url("SHARE_WEBHOOK_URL", &raw))
            .transpose()?;

        let http_timeout = read_secs(&read, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let card_idle_timeout = read_secs(&read, "CARD_IDLE_SECS", DEFAULT_CARD_IDLE_SECS)?;
        if card_idle_timeout.is_zero() {
            return Err(AppError::Config("CARD_IDLE_SECS must be positive".to_string()));
        }

        Ok(Self {
            graphql_endpoint,
            public_origin: read("PUBLIC_ORIGIN")
                .unwrap_or_else(|| DEFAULT_PUBLIC_ORIGIN.to_string()),
            share_webhook_url,
            http_timeout,
            bind_addr: read("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            card_idle_timeout,
        })
    }
}

fn read_secs(
    read: impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, AppError> {
    match read(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Config(format!("{} is not a number: {}", key, raw))),
        None => Ok(Duration::from_secs(default)),
    }
}

fn parse_url(key: &str, raw: &str) -> Result<url::Url, AppError> {
    let parsed =
        url::Url::parse(raw).map_err(|e| AppError::Config(format!("{} is invalid: {}", key, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AppError::Config(format!(
            "{} must be http or https, got {}",
            key, other
        ))),
    }
}
