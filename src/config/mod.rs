use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

// Top-level settings, one struct per concern.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub pricing: PricingConfig,
    pub auth: AuthConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
    /// Brand shown in emails and payment descriptions.
    pub brand: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

// Seat map generation
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub premium_price: i64,
    pub regular_price: i64,
    /// Chance that any given seat is already taken when a map is generated.
    pub booked_probability: f64,
    /// Fixed seed for reproducible seat maps; random when unset.
    pub seat_map_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub otp_ttl_minutes: i64,
    /// Return the issued code in the send-otp response. Development only.
    pub expose_otp: bool,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    Log,
    Http,
}

impl FromStr for NotificationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(NotificationMode::Log),
            "http" => Ok(NotificationMode::Http),
            _ => Err(()),
        }
    }
}

// Mail relay settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub mode: NotificationMode,
    pub relay_url: String,
    pub api_key: String,
    pub sender_name: String,
    pub sender_address: String,
    pub request_timeout_seconds: u64,
    pub failure_threshold: u32,
    pub breaker_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "cinema_booking=debug,tower_http=debug".to_string(),
                log_format: LogFormat::Pretty,
                brand: "Fair-Cut".to_string(),
            },
            pricing: PricingConfig {
                premium_price: 70,
                regular_price: 150,
                booked_probability: 0.2,
                seat_map_seed: None,
            },
            auth: AuthConfig {
                otp_ttl_minutes: 10,
                expose_otp: false,
                admin_username: "admin".to_string(),
                admin_password: "admin@123".to_string(),
            },
            notification: NotificationConfig {
                mode: NotificationMode::Log,
                relay_url: String::new(),
                api_key: String::new(),
                sender_name: "Fair-Cut".to_string(),
                sender_address: "no-reply@localhost".to_string(),
                request_timeout_seconds: 30,
                failure_threshold: 5,
                breaker_timeout_seconds: 60,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Config::default();
        let parse = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        fn typed<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
            let Some(value) = raw else {
                return Ok(default);
            };
            let parsed: Result<T, _> = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }

        let mode = typed("NOTIFICATION_MODE", parse("NOTIFICATION_MODE"), d.notification.mode)?;
        let relay_url = parse("MAIL_RELAY_URL").unwrap_or(d.notification.relay_url);
        let api_key = parse("MAIL_RELAY_API_KEY").unwrap_or(d.notification.api_key);
        if mode == NotificationMode::Http {
            if relay_url.is_empty() {
                return Err(ConfigError::Missing { key: "MAIL_RELAY_URL" });
            }
            if api_key.is_empty() {
                return Err(ConfigError::Missing { key: "MAIL_RELAY_API_KEY" });
            }
        }

        let booked_probability = typed(
            "SEAT_BOOKED_PROBABILITY",
            parse("SEAT_BOOKED_PROBABILITY"),
            d.pricing.booked_probability,
        )?;
        if !(0.0..=1.0).contains(&booked_probability) {
            return Err(ConfigError::Invalid {
                key: "SEAT_BOOKED_PROBABILITY",
                value: booked_probability.to_string(),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: parse("HOST").unwrap_or(d.app.host),
                port: typed("PORT", parse("PORT"), d.app.port)?,
                environment: parse("ENVIRONMENT").unwrap_or(d.app.environment),
                rust_log: parse("RUST_LOG").unwrap_or(d.app.rust_log),
                log_format: typed("LOG_FORMAT", parse("LOG_FORMAT"), d.app.log_format)?,
                brand: parse("APP_BRAND").unwrap_or(d.app.brand),
            },
            pricing: PricingConfig {
                premium_price: typed("PREMIUM_SEAT_PRICE", parse("PREMIUM_SEAT_PRICE"), d.pricing.premium_price)?,
                regular_price: typed("REGULAR_SEAT_PRICE", parse("REGULAR_SEAT_PRICE"), d.pricing.regular_price)?,
                booked_probability,
                seat_map_seed: match parse("SEAT_MAP_SEED") {
                    Some(raw) => Some(typed("SEAT_MAP_SEED", Some(raw), 0u64)?),
                    None => None,
                },
            },
            auth: AuthConfig {
                otp_ttl_minutes: typed("OTP_TTL_MINUTES", parse("OTP_TTL_MINUTES"), d.auth.otp_ttl_minutes)?,
                expose_otp: typed("EXPOSE_OTP", parse("EXPOSE_OTP"), d.auth.expose_otp)?,
                admin_username: parse("ADMIN_USERNAME").unwrap_or(d.auth.admin_username),
                admin_password: parse("ADMIN_PASSWORD").unwrap_or(d.auth.admin_password),
            },
            notification: NotificationConfig {
                mode,
                relay_url,
                api_key,
                sender_name: parse("MAIL_SENDER_NAME").unwrap_or(d.notification.sender_name),
                sender_address: parse("MAIL_SENDER_ADDRESS").unwrap_or(d.notification.sender_address),
                request_timeout_seconds: typed(
                    "MAIL_REQUEST_TIMEOUT_SECONDS",
                    parse("MAIL_REQUEST_TIMEOUT_SECONDS"),
                    d.notification.request_timeout_seconds,
                )?,
                failure_threshold: typed(
                    "CIRCUIT_BREAKER_FAILURE_THRESHOLD",
                    parse("CIRCUIT_BREAKER_FAILURE_THRESHOLD"),
                    d.notification.failure_threshold,
                )?,
                breaker_timeout_seconds: typed(
                    "CIRCUIT_BREAKER_TIMEOUT_SECONDS",
                    parse("CIRCUIT_BREAKER_TIMEOUT_SECONDS"),
                    d.notification.breaker_timeout_seconds,
                )?,
            },
        })
    }
}
