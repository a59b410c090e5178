use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use sepay_engine::{db_url, DEFAULT_PRODUCT_NAME};
use spg_common::{helpers::parse_env_var, Secret, Vnd};

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8360;
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;
const DEFAULT_BANK_CODE: &str = "MBBank";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// The API key that SePay sends in the `Authorization: Apikey <key>` header of webhook calls.
    /// If `None`, webhook calls are not authenticated at all.
    pub sepay_api_key: Option<Secret<String>>,
    /// The product name that new orders are created with.
    pub product_name: String,
    /// How far a transferred amount may deviate from the order total and still settle the order.
    pub amount_tolerance: Vnd,
    pub payment_page: PaymentPageConfig,
}

/// The bank account details that customers transfer money to. These are displayed on the payment page and encoded
/// in the QR code.
#[derive(Clone, Debug)]
pub struct PaymentPageConfig {
    /// The SePay bank code, e.g. "MBBank", "Vietcombank"
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
    /// How often the payment page polls for a change in payment status
    pub poll_interval: Duration,
}

impl Default for PaymentPageConfig {
    fn default() -> Self {
        Self {
            bank_code: DEFAULT_BANK_CODE.to_string(),
            account_number: String::default(),
            account_name: String::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: String::default(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            sepay_api_key: None,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            amount_tolerance: Vnd::default(),
            payment_page: PaymentPageConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env_or_default("SPG_PORT", DEFAULT_SPG_PORT);
        let database_url = db_url();
        let max_db_connections = env_or_default("SPG_MAX_DB_CONNECTIONS", DEFAULT_MAX_DB_CONNECTIONS);
        let sepay_api_key = match env::var("SPG_SEPAY_API_KEY").ok().filter(|s| !s.trim().is_empty()) {
            Some(key) => Some(Secret::new(key.trim().to_string())),
            None => {
                warn!(
                    "🚨️🚨️🚨️ SPG_SEPAY_API_KEY is not set. Anyone can call the payment webhook and mark orders as \
                     paid. DO NOT operate on production like this. 🚨️🚨️🚨️"
                );
                None
            },
        };
        let product_name = env::var("SPG_PRODUCT_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.into());
        let amount_tolerance = env_or_default("SPG_AMOUNT_TOLERANCE", Vnd::default());
        let amount_tolerance = if amount_tolerance < Vnd::default() {
            warn!("🪛️ SPG_AMOUNT_TOLERANCE cannot be negative. Transfers must match the order total exactly.");
            Vnd::default()
        } else {
            amount_tolerance
        };
        let payment_page = PaymentPageConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_db_connections,
            sepay_api_key,
            product_name,
            amount_tolerance,
            payment_page,
        }
    }
}

impl PaymentPageConfig {
    pub fn from_env_or_default() -> Self {
        let bank_code = env::var("SPG_BANK_CODE").ok().unwrap_or_else(|| DEFAULT_BANK_CODE.into());
        let account_number = env::var("SPG_ACCOUNT_NUMBER").ok().unwrap_or_else(|| {
            error!("🪛️ SPG_ACCOUNT_NUMBER is not set. Customers will not know where to send their payments.");
            String::default()
        });
        let account_name = env::var("SPG_ACCOUNT_NAME").ok().unwrap_or_else(|| {
            warn!("🪛️ SPG_ACCOUNT_NAME is not set. The payment page will not show the account holder.");
            String::default()
        });
        let poll_interval = match env_or_default("SPG_POLL_INTERVAL_MS", 0u64) {
            0 => DEFAULT_POLL_INTERVAL,
            ms => Duration::from_millis(ms),
        };
        Self { bank_code, account_number, account_name, poll_interval }
    }
}

/// Parses the environment variable `name`, falling back to `default` (with a warning) if the value is invalid.
fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match parse_env_var::<T>(name) {
        Ok(Some(v)) => v,
        Ok(None) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
        Err(e) => {
            warn!("🪛️ {e} Using the default, {default}, instead.");
            default
        },
    }
}
