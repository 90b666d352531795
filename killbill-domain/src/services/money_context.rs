//! Rounding configuration shared by the split calculator, pairwise balances
//! and the debt simplifier.
//!
//! Amounts are kept as fixed-point decimals; rounding only happens where a
//! share is derived from a division (equal and percentage splits) and at the
//! end of a pairwise balance.

use crate::model::Money;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounding mode for derived shares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (0.005 -> 0.01, -0.005 -> -0.01).
    #[default]
    HalfUp,
    /// Round half to nearest even (banker's rounding).
    HalfEven,
}

impl RoundingMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "half_up" | "halfup" => Some(RoundingMode::HalfUp),
            "half_even" | "halfeven" | "bankers" => Some(RoundingMode::HalfEven),
            _ => None,
        }
    }

    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// What to do with the gap between rounded shares and the expense total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResidualPolicy {
    /// Leave shares as rounded; their sum may differ from the total by up to
    /// half an atomic unit per participant.
    #[default]
    Ignore,
    /// Hand the remainder out one atomic unit at a time, in participant order,
    /// so the shares add up to the total exactly.
    Distribute,
}

impl ResidualPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ignore" => Some(ResidualPolicy::Ignore),
            "distribute" => Some(ResidualPolicy::Distribute),
            _ => None,
        }
    }
}

/// Scale, rounding and residual handling for one group's currency.
///
/// # Example
/// ```
/// use killbill_domain::services::{MoneyContext, ResidualPolicy, RoundingMode};
///
/// let ctx = MoneyContext {
///     scale: 0, // JPY
///     rounding_mode: RoundingMode::HalfUp,
///     residual_policy: ResidualPolicy::Distribute,
/// };
/// assert_eq!(ctx.epsilon().to_string(), "1");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoneyContext {
    /// Decimal places of the atomic unit (2 for cents).
    pub scale: u32,
    pub rounding_mode: RoundingMode,
    pub residual_policy: ResidualPolicy,
}

impl MoneyContext {
    /// Two decimal places, half-up, residual ignored.
    pub const fn usd_default() -> Self {
        Self {
            scale: 2,
            rounding_mode: RoundingMode::HalfUp,
            residual_policy: ResidualPolicy::Ignore,
        }
    }

    pub fn with_rounding_mode(mut self, rounding_mode: RoundingMode) -> Self {
        self.rounding_mode = rounding_mode;
        self
    }

    pub fn with_residual_policy(mut self, residual_policy: ResidualPolicy) -> Self {
        self.residual_policy = residual_policy;
        self
    }

    /// Smallest representable amount, e.g. 0.01.
    pub fn atomic_unit(self) -> Money {
        Money::from_decimal(Decimal::new(1, self.scale))
    }

    /// Amounts whose magnitude does not exceed this count as settled.
    pub fn epsilon(self) -> Money {
        self.atomic_unit()
    }

    pub fn round(self, amount: Money) -> Money {
        Money::from_decimal(
            amount
                .as_decimal()
                .round_dp_with_strategy(self.scale, self.rounding_mode.strategy()),
        )
    }
}

impl Default for MoneyContext {
    fn default() -> Self {
        Self::usd_default()
    }
}
