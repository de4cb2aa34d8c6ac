use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    NotANumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` keeps the server up; every generation then fails into the error panel.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub port: u16,
    /// Sessions untouched for this long are dropped by the sweeper.
    pub session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
            port: 8080,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout_secs: u64 = parse_number(&non_blank, "GEMINI_TIMEOUT_SECS")?.unwrap_or(defaults.timeout.as_secs());
        let port: u16 = parse_number(&non_blank, "PORT")?.unwrap_or(defaults.port);
        let ttl_mins: u64 = parse_number(&non_blank, "SESSION_TTL_MINS")?.unwrap_or(defaults.session_ttl.as_secs() / 60);

        Ok(Self {
            api_key: non_blank("GEMINI_API_KEY"),
            model: non_blank("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: non_blank("GEMINI_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(timeout_secs),
            port,
            session_ttl: Duration::from_secs(ttl_mins * 60),
        })
    }

    /// First few characters only, for the startup log line.
    pub fn api_key_hint(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}...", key.chars().take(6).collect::<String>()),
            None => "<missing>".to_string(),
        }
    }
}

fn parse_number<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value.parse().map(Some).map_err(|_| ConfigError::NotANumber { name, value }),
        None => Ok(None),
    }
}
