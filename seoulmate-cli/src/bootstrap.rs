use rust_decimal::Decimal;
use seoulmate_domain::{
    ExchangeRate, ExchangeRateError, RemainderPolicy, RoundingMode, SettlementContext,
    SettlementRoundingError,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected} (got '{value}')")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Scale(#[from] SettlementRoundingError),
    #[error(transparent)]
    ExchangeRate(#[from] ExchangeRateError),
}

/// Settlement and conversion settings, read from `SEOULMATE_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub context: SettlementContext,
    pub exchange_rate: ExchangeRate,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset variables fall back to whole-won settlement and the KRW to TWD rate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = SettlementContext::krw_default();

        let scale = match lookup("SEOULMATE_CURRENCY_SCALE") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SEOULMATE_CURRENCY_SCALE",
                value,
                expected: "a non-negative integer",
            })?,
            None => defaults.scale,
        };

        let rounding_mode = match lookup("SEOULMATE_ROUNDING").as_deref().map(str::trim) {
            None => defaults.rounding_mode,
            Some("half-up") => RoundingMode::HalfUp,
            Some("half-even") => RoundingMode::HalfEven,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "SEOULMATE_ROUNDING",
                    value: other.to_string(),
                    expected: "'half-up' or 'half-even'",
                });
            }
        };

        let remainder_policy = match lookup("SEOULMATE_REMAINDER").as_deref().map(str::trim) {
            None => defaults.remainder_policy,
            Some("slack") => RemainderPolicy::AcceptSlack,
            Some("carry") => RemainderPolicy::ZeroSumCarry,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "SEOULMATE_REMAINDER",
                    value: other.to_string(),
                    expected: "'slack' or 'carry'",
                });
            }
        };

        let context = SettlementContext {
            scale,
            rounding_mode,
            remainder_policy,
        };
        context.validate()?;

        Ok(Self {
            context,
            exchange_rate: exchange_rate_from(&lookup)?,
        })
    }
}

fn exchange_rate_from(lookup: &impl Fn(&str) -> Option<String>) -> Result<ExchangeRate, ConfigError> {
    let base = lookup("SEOULMATE_BASE_CURRENCY");
    let quote = lookup("SEOULMATE_QUOTE_CURRENCY");
    let rate = lookup("SEOULMATE_EXCHANGE_RATE");
    if base.is_none() && quote.is_none() && rate.is_none() {
        return Ok(ExchangeRate::krw_to_twd());
    }

    let fallback = ExchangeRate::krw_to_twd();
    let rate = match rate {
        Some(value) => value
            .trim()
            .parse::<Decimal>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "SEOULMATE_EXCHANGE_RATE",
                value,
                expected: "a decimal number",
            })?,
        None => fallback.rate(),
    };

    Ok(ExchangeRate::try_new(
        base.unwrap_or_else(|| fallback.base().to_string()),
        quote.unwrap_or_else(|| fallback.quote().to_string()),
        rate,
    )?)
}

/// Logs go to stderr so they never mix with the report on stdout.
/// `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
