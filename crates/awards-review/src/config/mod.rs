use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub review: ReviewConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let reviews_per_entry = positive_var("APP_REVIEWS_PER_ENTRY", 3)?;
        let score_scale_max = positive_var("APP_SCORE_SCALE_MAX", 5)? as i32;
        let login_key_validity_days = positive_var("APP_LOGIN_KEY_VALIDITY_DAYS", 7)? as i64;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            review: ReviewConfig {
                reviews_per_entry,
                score_scale_max,
            },
            auth: AuthConfig {
                login_key_validity_days,
            },
        })
    }
}

fn positive_var(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidSetting { var })?,
        Err(_) => default,
    };
    if value == 0 {
        return Err(ConfigError::InvalidSetting { var });
    }
    Ok(value)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Tunables for the review workflow.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// How many reviewers the balancer assigns to each entry.
    pub reviews_per_entry: u32,
    /// Upper bound of the rubric score scale; scores run 1..=max.
    pub score_scale_max: i32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            reviews_per_entry: 3,
            score_scale_max: 5,
        }
    }
}

/// Tunables for reviewer login.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long an e-mailed login key stays redeemable.
    pub login_key_validity_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_key_validity_days: 7,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSetting { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSetting { var } => {
                write!(f, "{var} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidSetting { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_REVIEWS_PER_ENTRY");
        env::remove_var("APP_SCORE_SCALE_MAX");
        env::remove_var("APP_LOGIN_KEY_VALIDITY_DAYS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.review.reviews_per_entry, 3);
        assert_eq!(config.review.score_scale_max, 5);
        assert_eq!(config.auth.login_key_validity_days, 7);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn review_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REVIEWS_PER_ENTRY", "5");
        env::set_var("APP_LOGIN_KEY_VALIDITY_DAYS", "2");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.review.reviews_per_entry, 5);
        assert_eq!(config.auth.login_key_validity_days, 2);
    }

    #[test]
    fn zero_reviews_per_entry_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REVIEWS_PER_ENTRY", "0");
        let err = AppConfig::load().expect_err("zero must not load");
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                var: "APP_REVIEWS_PER_ENTRY"
            }
        ));
    }
}
