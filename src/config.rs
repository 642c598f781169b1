// Runtime configuration loaded from the environment
//
// | Variable                       | Description                         | Default    |
// |--------------------------------|-------------------------------------|------------|
// | `DATABASE_URL`                 | PostgreSQL connection string        | in-memory  |
// | `HOST`                         | Server bind address                 | `0.0.0.0`  |
// | `PORT`                         | Server bind port                    | `8080`     |
// | `JWT_SECRET`                   | HMAC secret for bearer tokens       | required   |
// | `JWT_EXPIRY_SECS`              | Token lifetime in seconds           | `604800`   |
// | `PENDING_REPORT_INTERVAL_SECS` | Pending achievement report interval | `86400`    |
// | `LOG_FORMAT`                   | `json` or `pretty`                  | `pretty`   |

use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// Seven days.
pub const DEFAULT_JWT_EXPIRY_SECS: i64 = 604_800;
/// Once a day.
pub const DEFAULT_PENDING_REPORT_INTERVAL_SECS: u64 = 86_400;

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// When absent the service runs on the in-memory stores
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub pending_report_interval: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = parse_or(non_empty("PORT"), "PORT", DEFAULT_PORT)?;
        let jwt_expiry_secs = parse_or(
            non_empty("JWT_EXPIRY_SECS"),
            "JWT_EXPIRY_SECS",
            DEFAULT_JWT_EXPIRY_SECS,
        )?;
        if jwt_expiry_secs <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_EXPIRY_SECS",
                value: jwt_expiry_secs.to_string(),
            });
        }

        let interval_secs = parse_or(
            non_empty("PENDING_REPORT_INTERVAL_SECS"),
            "PENDING_REPORT_INTERVAL_SECS",
            DEFAULT_PENDING_REPORT_INTERVAL_SECS,
        )?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "PENDING_REPORT_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            jwt_secret,
            jwt_expiry_secs,
            pending_report_interval: Duration::from_secs(interval_secs),
            log_format,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
