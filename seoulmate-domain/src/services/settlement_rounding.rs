//! Currency precision and rounding policy for settlement.
//!
//! Two concerns live here:
//! 1. Rounding a single transfer to the atomic unit (e.g. 1 won for KRW).
//! 2. Optionally quantizing every balance to the atomic unit before netting,
//!    repairing the rounding remainder so the quantized balances still sum
//!    to exactly zero. The repair touches as few members as possible and is
//!    deterministic for a given roster.

use crate::model::{Money, ParticipantBalances, ParticipantId};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sha2::{Digest, Sha256};

/// Rounding mode applied when an amount is reduced to the atomic unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (0.5 -> 1, -0.5 -> -1).
    #[default]
    HalfUp,
    /// Round half to the nearest even number (banker's rounding).
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// What happens to the sub-unit remainder left by uneven splits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Net the exact balances and round each transfer on its own.
    /// Residual imbalance is at most one atomic unit per transfer.
    #[default]
    AcceptSlack,
    /// Quantize balances first with a zero-sum repair, then net them.
    /// Transfers settle the quantized balances exactly.
    ZeroSumCarry,
}

/// Currency precision and rounding configuration.
///
/// # Example
/// ```
/// use seoulmate_domain::{Money, RemainderPolicy, RoundingMode, SettlementContext};
///
/// let usd = SettlementContext {
///     scale: 2,
///     rounding_mode: RoundingMode::HalfEven,
///     remainder_policy: RemainderPolicy::ZeroSumCarry,
/// };
/// assert_eq!(usd.round(Money::new(12345, 3)), Money::new(1234, 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementContext {
    /// Decimal places of the atomic unit (0 for KRW, 2 for USD).
    pub scale: u32,
    pub rounding_mode: RoundingMode,
    pub remainder_policy: RemainderPolicy,
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self::krw_default()
    }
}

impl SettlementContext {
    /// Whole won, half-up rounding, per-transfer rounding.
    pub fn krw_default() -> Self {
        Self {
            scale: 0,
            rounding_mode: RoundingMode::HalfUp,
            remainder_policy: RemainderPolicy::AcceptSlack,
        }
    }

    pub fn validate(self) -> Result<(), SettlementRoundingError> {
        if self.scale <= MAX_SETTLEMENT_SCALE {
            return Ok(());
        }
        Err(SettlementRoundingError::UnsupportedScale {
            scale: self.scale,
            max_supported: MAX_SETTLEMENT_SCALE,
        })
    }

    pub fn atomic_unit(self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    /// Balances within this distance of zero count as settled:
    /// a hundredth of the atomic unit.
    pub fn epsilon(self) -> Decimal {
        Decimal::new(1, self.scale + 2)
    }

    pub fn round(self, amount: Money) -> Money {
        amount.round_dp_with_strategy(self.scale, self.rounding_mode.strategy())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettlementRoundingError {
    /// Balances do not net to zero, so no zero-sum repair exists.
    #[error("balances do not sum to zero (off by {0})")]
    ImbalancedTotal(Money),
    #[error("rounding remainder could not be distributed")]
    InvalidAdjustmentCount,
    #[error("quantized balances failed to sum to zero")]
    ZeroSumInvariantViolation,
    #[error("quantized amount is not a whole number of atomic units")]
    NonIntegral,
    #[error("currency scale {scale} is not supported (max {max_supported})")]
    UnsupportedScale { scale: u32, max_supported: u32 },
}

const STABLE_KEY_FORMAT_VERSION: u8 = 1;
const EPSILON_OP_COUNT_BUDGET: i64 = 1_000_000;
const EPSILON_SAFETY_FACTOR: i64 = 100;
const MAX_SETTLEMENT_SCALE: u32 = 22;

/// Quantizes balances to the atomic unit while keeping their sum at zero.
///
/// Each balance is rounded with the context's rounding mode. If the rounded
/// values no longer sum to zero, `|V|` members (where `V` is the rounded sum
/// in atomic units) receive a one-unit correction. Candidates are ranked by
/// how far rounding pushed them in the offending direction, then by a stable
/// SHA-256 key of their id and the context, then by roster position.
///
/// The input must already sum to (almost) zero; otherwise
/// [`SettlementRoundingError::ImbalancedTotal`] is returned.
pub fn quantize_balances(
    balances: &ParticipantBalances,
    context: SettlementContext,
) -> Result<ParticipantBalances, SettlementRoundingError> {
    context.validate()?;
    let atomic_unit = context.atomic_unit();
    let tolerance = quantization_tolerance(context.scale);
    let original_sum: Money = balances.values().sum();
    if original_sum.abs().as_decimal() > tolerance {
        tracing::debug!(
            member_count = balances.len(),
            sum_original = %original_sum,
            tolerance = %tolerance,
            "Settlement quantization rejected due to input imbalance"
        );
        return Err(SettlementRoundingError::ImbalancedTotal(original_sum));
    }

    let strategy = context.rounding_mode.strategy();
    let mut entries: Vec<(&ParticipantId, i128, Decimal)> = balances
        .iter()
        .map(|(id, money)| {
            let original = money.as_decimal();
            let units = to_units(original, atomic_unit, strategy)?;
            let diff = Decimal::from(units) * atomic_unit - original;
            Ok((id, units, diff))
        })
        .collect::<Result<_, SettlementRoundingError>>()?;

    let v_int = sum_units(&entries)?;
    if v_int != 0 {
        let adjustment_count = usize::try_from(v_int.unsigned_abs())
            .map_err(|_| SettlementRoundingError::InvalidAdjustmentCount)?;
        if adjustment_count > entries.len() {
            tracing::error!(
                v_int,
                member_count = entries.len(),
                "Rounding remainder exceeds participant count"
            );
            return Err(SettlementRoundingError::InvalidAdjustmentCount);
        }

        // Take back from those who gained most when the sum is positive,
        // give to those who lost most when it is negative.
        let direction = if v_int > 0 {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        };
        let mut ranked: Vec<(usize, Decimal, [u8; 32])> = entries
            .iter()
            .enumerate()
            .map(|(idx, (id, _, diff))| (idx, *diff * direction, stable_key(id, context)))
            .collect();
        ranked.sort_by(|(idx_a, score_a, key_a), (idx_b, score_b, key_b)| {
            score_b
                .cmp(score_a)
                .then_with(|| key_a.cmp(key_b))
                .then_with(|| idx_a.cmp(idx_b))
        });

        let step: i128 = if v_int > 0 { -1 } else { 1 };
        let selected: Vec<usize> = ranked
            .iter()
            .take(adjustment_count)
            .map(|(idx, _, _)| *idx)
            .collect();
        for idx in &selected {
            entries[*idx].1 += step;
        }

        tracing::debug!(
            v_int,
            adjustment_count,
            selected = ?selected
                .iter()
                .map(|idx| entries[*idx].0.as_str())
                .collect::<Vec<_>>(),
            member_count = entries.len(),
            sum_original = %original_sum,
            "Settlement quantization carried rounding remainder"
        );

        if sum_units(&entries)? != 0 {
            tracing::error!(
                member_count = entries.len(),
                "Settlement quantization failed zero-sum invariant check"
            );
            return Err(SettlementRoundingError::ZeroSumInvariantViolation);
        }
    }

    Ok(entries
        .into_iter()
        .map(|(id, units, _)| {
            (
                id.clone(),
                Money::from_decimal(Decimal::from(units) * atomic_unit),
            )
        })
        .collect())
}

fn sum_units(entries: &[(&ParticipantId, i128, Decimal)]) -> Result<i128, SettlementRoundingError> {
    entries.iter().try_fold(0_i128, |acc, (_, units, _)| {
        acc.checked_add(*units)
            .ok_or(SettlementRoundingError::InvalidAdjustmentCount)
    })
}

fn quantization_tolerance(scale: u32) -> Decimal {
    let baseline = Decimal::new(1, scale + 6);
    let floor = Decimal::from(EPSILON_SAFETY_FACTOR * EPSILON_OP_COUNT_BUDGET)
        * Decimal::from_i128_with_scale(1, 28);
    baseline.max(floor)
}

fn to_units(
    original: Decimal,
    atomic_unit: Decimal,
    strategy: RoundingStrategy,
) -> Result<i128, SettlementRoundingError> {
    let units = (original / atomic_unit).round_dp_with_strategy(0, strategy);
    let Some(value) = units.to_i128() else {
        tracing::warn!(
            original = %original,
            atomic_unit = %atomic_unit,
            "Quantization unit conversion failed"
        );
        return Err(SettlementRoundingError::NonIntegral);
    };
    if Decimal::from(value) != units {
        return Err(SettlementRoundingError::NonIntegral);
    }
    Ok(value)
}

fn stable_key(id: &ParticipantId, context: SettlementContext) -> [u8; 32] {
    let rounding_mode_tag = match context.rounding_mode {
        RoundingMode::HalfUp => 0_u8,
        RoundingMode::HalfEven => 1_u8,
    };
    let name = id.as_str().as_bytes();

    let mut hasher = Sha256::new();
    hasher.update([STABLE_KEY_FORMAT_VERSION]);
    hasher.update((name.len() as u64).to_be_bytes());
    hasher.update(name);
    hasher.update(context.scale.to_be_bytes());
    hasher.update([rounding_mode_tag]);

    let mut out = [0_u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}
