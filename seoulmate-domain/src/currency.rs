use crate::model::Money;
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeRateError {
    #[error("exchange rate must be positive (got {0})")]
    NonPositiveRate(Decimal),
    #[error("currency code must not be empty")]
    EmptyCurrencyCode,
}

/// Fixed conversion rate from the trip currency into a traveller's home
/// currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeRate {
    base: String,
    quote: String,
    rate: Decimal,
}

impl ExchangeRate {
    pub fn try_new(
        base: impl Into<String>,
        quote: impl Into<String>,
        rate: Decimal,
    ) -> Result<Self, ExchangeRateError> {
        let base = base.into();
        let quote = quote.into();
        if base.trim().is_empty() || quote.trim().is_empty() {
            return Err(ExchangeRateError::EmptyCurrencyCode);
        }
        if rate <= Decimal::ZERO {
            return Err(ExchangeRateError::NonPositiveRate(rate));
        }
        Ok(Self { base, quote, rate })
    }

    /// Rough won to New Taiwan dollar rate.
    pub fn krw_to_twd() -> Self {
        Self {
            base: "KRW".to_string(),
            quote: "TWD".to_string(),
            rate: Decimal::new(24, 3),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Converts `amount` and rounds half-up to `quote_scale` decimal places.
    pub fn convert(&self, amount: Money, quote_scale: u32) -> Money {
        Money::from_decimal(amount.as_decimal() * self.rate)
            .round_dp_with_strategy(quote_scale, RoundingStrategy::MidpointAwayFromZero)
    }
}
