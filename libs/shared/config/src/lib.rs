use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_NO_ANSWER_TIMEOUT_SECONDS: u64 = 20;
pub const DEFAULT_LOW_BALANCE_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub no_answer_timeout_seconds: u64,
    pub low_balance_timeout_seconds: u64,
    pub currency_symbol: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            no_answer_timeout_seconds: DEFAULT_NO_ANSWER_TIMEOUT_SECONDS,
            low_balance_timeout_seconds: DEFAULT_LOW_BALANCE_TIMEOUT_SECONDS,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            no_answer_timeout_seconds: parse_var(
                "CALL_NO_ANSWER_TIMEOUT_SECONDS",
                DEFAULT_NO_ANSWER_TIMEOUT_SECONDS,
            ),
            low_balance_timeout_seconds: parse_var(
                "CALL_LOW_BALANCE_TIMEOUT_SECONDS",
                DEFAULT_LOW_BALANCE_TIMEOUT_SECONDS,
            ),
            currency_symbol: env::var("CALL_CURRENCY_SYMBOL")
                .unwrap_or_else(|_| {
                    warn!("CALL_CURRENCY_SYMBOL not set, using default");
                    DEFAULT_CURRENCY_SYMBOL.to_string()
                }),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
        };

        if !config.is_configured() {
            warn!("Call timeouts must be non-zero - calls will end immediately");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.no_answer_timeout_seconds > 0 && self.low_balance_timeout_seconds > 0
    }

    pub fn no_answer_timeout(&self) -> Duration {
        Duration::from_secs(self.no_answer_timeout_seconds)
    }

    pub fn low_balance_timeout(&self) -> Duration {
        Duration::from_secs(self.low_balance_timeout_seconds)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", name, default);
            default
        }
    }
}
