//! Server configuration, read from `MKT_*` environment variables.
//!
//! Missing values fall back to their defaults. Values that are present but cannot be parsed are logged and also
//! replaced by the default, so a typo never stops the server from starting.
use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use log::*;
use marketplace_engine::{
    db_types::Cents,
    order_objects::{PricingPolicy, DEFAULT_SHIPPING_FEE, DEFAULT_TAX_RATE_BPS},
    SellerPolicy,
};
use mkt_common::Secret;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_MKT_HOST: &str = "127.0.0.1";
const DEFAULT_MKT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/marketplace.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;
const DEFAULT_SELLER_INACTIVITY_DAYS: i64 = 60;
const DEFAULT_REACTIVATION_FEE_CENTS: i64 = 15_000;
const DEFAULT_LOCK_INTERVAL_SECS: u64 = 86_400;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth: AuthConfig,
    /// Shipping fee and tax rate applied to every order.
    pub pricing: PricingPolicy,
    /// When sellers are locked for inactivity, and what they owe to be reinstated.
    pub seller_policy: SellerPolicy,
    /// How often the seller lock job runs.
    pub lock_interval: std::time::Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MKT_HOST.to_string(),
            port: DEFAULT_MKT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            pricing: PricingPolicy::default(),
            seller_policy: SellerPolicy::default(),
            lock_interval: std::time::Duration::from_secs(DEFAULT_LOCK_INTERVAL_SECS),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MKT_HOST").ok().unwrap_or_else(|| DEFAULT_MKT_HOST.into());
        let port = env_or_default("MKT_PORT", DEFAULT_MKT_PORT);
        let database_url = env::var("MKT_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ MKT_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env_or_default("MKT_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration. {e}. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let shipping_fee = Cents::from(env_or_default("MKT_SHIPPING_FEE_CENTS", DEFAULT_SHIPPING_FEE.value()));
        let tax_rate_bps = env_or_default("MKT_TAX_RATE_BPS", DEFAULT_TAX_RATE_BPS);
        let pricing = PricingPolicy::new(shipping_fee, tax_rate_bps);
        let inactivity_days = env_or_default("MKT_SELLER_INACTIVITY_DAYS", DEFAULT_SELLER_INACTIVITY_DAYS);
        let reactivation_fee =
            Cents::from(env_or_default("MKT_SELLER_REACTIVATION_FEE_CENTS", DEFAULT_REACTIVATION_FEE_CENTS));
        let seller_policy = SellerPolicy::new(Duration::days(inactivity_days), reactivation_fee);
        let lock_interval =
            std::time::Duration::from_secs(env_or_default("MKT_SELLER_LOCK_INTERVAL_SECS", DEFAULT_LOCK_INTERVAL_SECS));
        info!("🪛️ Shipping fee is {} and tax is {} bps", pricing.shipping_fee, pricing.tax_rate_bps);
        Self { host, port, database_url, max_connections, auth, pricing, seller_policy, lock_interval }
    }
}

/// Reads and parses `name`, falling back to `default` when it is missing or invalid.
fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long issued tokens stay valid.
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens issued now \
             will be rejected after a restart. Set MKT_JWT_SECRET in production. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self::new(secret, Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS))
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_lifetime: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_lifetime }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("MKT_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [MKT_JWT_SECRET]")))?;
        if secret.len() < 16 {
            return Err(ServerError::ConfigurationError(
                "MKT_JWT_SECRET must be at least 16 characters long".to_string(),
            ));
        }
        let hours = env_or_default("MKT_TOKEN_LIFETIME_HOURS", DEFAULT_TOKEN_LIFETIME_HOURS);
        Ok(Self::new(secret, Duration::hours(hours)))
    }
}
