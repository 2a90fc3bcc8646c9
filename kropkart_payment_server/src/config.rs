//! Server configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded first, if present). Missing or invalid
//! values are logged and replaced with defaults, so the server always starts. Secrets are wrapped in [`Secret`] so
//! that they never end up in logs.
//!
//! | Variable                       | Default                     |
//! |--------------------------------|-----------------------------|
//! | `KPG_HOST`                     | 127.0.0.1                   |
//! | `KPG_PORT`                     | 8370                        |
//! | `KPG_DATABASE_URL`             | sqlite://data/kropkart.db   |
//! | `KPG_DB_MAX_CONNECTIONS`       | 25                          |
//! | `KPG_RUN_MIGRATIONS`           | true                        |
//! | `KPG_DEFAULT_CURRENCY`         | INR                         |
//! | `KPG_GATEWAY_URL`              | https://api.razorpay.com    |
//! | `KPG_GATEWAY_KEY_ID`           |                             |
//! | `KPG_GATEWAY_KEY_SECRET`       |                             |
//! | `KPG_WEBHOOK_SECRET`           |                             |
//! | `KPG_WEBHOOK_SIGNATURE_HEADER` | X-Signature                 |
//! | `KPG_GATEWAY_TIMEOUT_SECS`     | 10                          |
use std::{env, str::FromStr, time::Duration};

use kpg_common::{helpers::parse_boolean_flag, Secret, DEFAULT_CURRENCY_CODE};
use kropkart_payment_engine::{RazorpayConfig, DEFAULT_GATEWAY_TIMEOUT, DEFAULT_GATEWAY_URL};
use log::*;

const DEFAULT_KPG_HOST: &str = "127.0.0.1";
const DEFAULT_KPG_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/kropkart.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_WEBHOOK_SIGNATURE_HEADER: &str = "X-Signature";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Bring the database schema up to date on startup
    pub run_migrations: bool,
    /// Used for checkouts that do not name a currency
    pub default_currency: String,
    pub gateway: GatewayConfig,
    /// The request header that carries the webhook's HMAC signature.
    pub webhook_signature_header: String,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub url: String,
    pub key_id: String,
    /// Authenticates API calls to the gateway, and is also the key that client payment confirmations are signed with.
    pub key_secret: Secret<String>,
    /// Signs the gateway's webhook deliveries. This is configured separately from the key secret.
    pub webhook_secret: Secret<String>,
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_KPG_HOST.to_string(),
            port: DEFAULT_KPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
            default_currency: DEFAULT_CURRENCY_CODE.to_string(),
            gateway: GatewayConfig::default(),
            webhook_signature_header: DEFAULT_WEBHOOK_SIGNATURE_HEADER.to_string(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            key_id: String::default(),
            key_secret: Secret::default(),
            webhook_secret: Secret::default(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("KPG_HOST").ok().unwrap_or_else(|| DEFAULT_KPG_HOST.into());
        let port = parse_env("KPG_PORT", DEFAULT_KPG_PORT);
        let database_url = env::var("KPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ KPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_connections = parse_env("KPG_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let run_migrations = parse_boolean_flag(env::var("KPG_RUN_MIGRATIONS").ok(), true);
        let default_currency = env::var("KPG_DEFAULT_CURRENCY")
            .ok()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or_else(|| {
                info!("🪛️ KPG_DEFAULT_CURRENCY is not set or invalid. Using {DEFAULT_CURRENCY_CODE}.");
                DEFAULT_CURRENCY_CODE.into()
            });
        let webhook_signature_header = env::var("KPG_WEBHOOK_SIGNATURE_HEADER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEBHOOK_SIGNATURE_HEADER.into());
        let gateway = GatewayConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_connections,
            run_migrations,
            default_currency,
            gateway,
            webhook_signature_header,
        }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let url = env::var("KPG_GATEWAY_URL").ok().unwrap_or_else(|| DEFAULT_GATEWAY_URL.into());
        let key_id = env::var("KPG_GATEWAY_KEY_ID").ok().unwrap_or_else(|| {
            error!("🪛️ KPG_GATEWAY_KEY_ID is not set. Checkouts will be rejected by the payment gateway.");
            String::default()
        });
        let key_secret = env::var("KPG_GATEWAY_KEY_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ KPG_GATEWAY_KEY_SECRET is not set. Checkouts will fail and no client payment confirmation can be \
                 verified."
            );
            String::default()
        });
        let webhook_secret = env::var("KPG_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!("🪛️ KPG_WEBHOOK_SECRET is not set. Every webhook delivery will be rejected.");
            String::default()
        });
        let timeout = Duration::from_secs(parse_env("KPG_GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT.as_secs()));
        Self { url, key_id, key_secret: Secret::new(key_secret), webhook_secret: Secret::new(webhook_secret), timeout }
    }

    pub fn razorpay_config(&self) -> RazorpayConfig {
        RazorpayConfig {
            base_url: self.url.clone(),
            key_id: self.key_id.clone(),
            key_secret: self.key_secret.clone(),
            timeout: self.timeout,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that route handlers need. It holds no secrets.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub webhook_signature_header: String,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { webhook_signature_header: config.webhook_signature_header.clone() }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { webhook_signature_header: DEFAULT_WEBHOOK_SIGNATURE_HEADER.to_string() }
    }
}
