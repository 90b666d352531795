use crate::{
    model::{MemberId, Money, Share, SplitType},
    services::{MoneyContext, ResidualPolicy},
};
use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("equal split requires at least one participant")]
    NoParticipants,
    #[error("share arithmetic overflowed")]
    Overflow,
}

/// Divides one expense total into per-participant shares.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitCalculator {
    context: MoneyContext,
}

impl SplitCalculator {
    pub fn new(context: MoneyContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> MoneyContext {
        self.context
    }

    /// Compute each participant's share of `total`.
    ///
    /// * `equal` - `total / participants.len()` per participant, rounded.
    /// * `exact` - the detail values as given, neither rounded nor checked
    ///   against `total`.
    /// * `percentage` - `total * value / 100` per detail entry, rounded. A
    ///   value of `25` means 25%. A product outside the decimal range fails
    ///   with [`SplitError::Overflow`].
    ///
    /// `participants` is only read for `equal`; the other policies take their
    /// participants from the detail keys.
    pub fn compute(
        &self,
        total: Money,
        split_type: SplitType,
        details: &IndexMap<MemberId, Decimal>,
        participants: &[MemberId],
    ) -> Result<Vec<Share>, SplitError> {
        match split_type {
            SplitType::Equal => self.equal(total, participants),
            SplitType::Exact => Ok(exact(details)),
            SplitType::Percentage => self.percentage(total, details),
        }
    }

    fn equal(&self, total: Money, participants: &[MemberId]) -> Result<Vec<Share>, SplitError> {
        if participants.is_empty() {
            return Err(SplitError::NoParticipants);
        }

        let per_person = self
            .context
            .round(total / Decimal::from(participants.len()));
        let mut shares: Vec<Share> = participants
            .iter()
            .map(|member| Share {
                member: member.clone(),
                amount: per_person,
            })
            .collect();
        self.absorb_residual(total, &mut shares);
        Ok(shares)
    }

    fn percentage(
        &self,
        total: Money,
        details: &IndexMap<MemberId, Decimal>,
    ) -> Result<Vec<Share>, SplitError> {
        let mut shares: Vec<Share> = details
            .iter()
            .map(|(member, percentage)| {
                let amount = total
                    .checked_mul(*percentage)
                    .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or(SplitError::Overflow)?;
                Ok(Share {
                    member: member.clone(),
                    amount: self.context.round(amount),
                })
            })
            .collect::<Result<_, SplitError>>()?;

        // Percentages that do not cover the whole total leave a gap that is
        // not rounding noise. A sum too large to represent is not 100 either.
        let covered = details
            .values()
            .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value));
        if covered == Some(Decimal::ONE_HUNDRED) {
            self.absorb_residual(total, &mut shares);
        }
        Ok(shares)
    }

    fn absorb_residual(&self, total: Money, shares: &mut [Share]) {
        if self.context.residual_policy != ResidualPolicy::Distribute {
            return;
        }

        let residual = Money::checked_sum(shares.iter().map(|share| share.amount))
            .and_then(|allocated| total.checked_sub(allocated));
        let Some(residual) = residual else {
            tracing::debug!(total = %total, "Split residual overflowed; left unassigned");
            return;
        };
        if residual.is_zero() {
            return;
        }

        let unit = self.context.atomic_unit();
        let units = (residual.as_decimal() / unit.as_decimal()).trunc().abs();
        let Some(count) = units.to_usize() else {
            return;
        };
        if count > shares.len() {
            tracing::debug!(
                residual = %residual,
                share_count = shares.len(),
                "Split residual exceeds one unit per participant; left unassigned"
            );
            return;
        }

        let step = if residual.signum() > 0 { unit } else { -unit };
        let adjusted: Option<Vec<Money>> = shares
            .iter()
            .take(count)
            .map(|share| share.amount.checked_add(step))
            .collect();
        let Some(adjusted) = adjusted else {
            tracing::debug!(residual = %residual, "Split residual overflowed; left unassigned");
            return;
        };
        for (share, amount) in shares.iter_mut().zip(adjusted) {
            share.amount = amount;
        }
    }
}

fn exact(details: &IndexMap<MemberId, Decimal>) -> Vec<Share> {
    details
        .iter()
        .map(|(member, amount)| Share {
            member: member.clone(),
            amount: Money::from_decimal(*amount),
        })
        .collect()
}

/// [`SplitCalculator::compute`] under the default two-decimal context.
pub fn compute_split(
    total: Money,
    split_type: SplitType,
    details: &IndexMap<MemberId, Decimal>,
    participants: &[MemberId],
) -> Result<Vec<Share>, SplitError> {
    SplitCalculator::default().compute(total, split_type, details, participants)
}
