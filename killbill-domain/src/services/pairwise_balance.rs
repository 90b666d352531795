use crate::{
    model::{Expense, MemberId, Money, Settlement},
    services::{BalanceError, MoneyContext, SplitCalculator},
};

/// Balance between two members, recomputed from the raw records.
///
/// The group aggregate mixes in third parties, so this does not decompose
/// it; it replays only the expenses both members are involved in.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairwiseBalance {
    calculator: SplitCalculator,
}

impl PairwiseBalance {
    pub fn new(context: MoneyContext) -> Self {
        Self {
            calculator: SplitCalculator::new(context),
        }
    }

    /// Positive when `b` owes `a`, negative when `a` owes `b`.
    ///
    /// A member is involved in an expense as its payer or as a participant.
    /// Settlements keep the ledger's historical sign: a payment from `a` to
    /// `b` subtracts, one from `b` to `a` adds. The total is rounded once,
    /// after all records are folded in.
    pub fn between(
        &self,
        a: &MemberId,
        b: &MemberId,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Money, BalanceError> {
        self.fold(a, b, expenses, settlements, SettlementSign::Historical)
    }

    /// What `b` still owes `a` once settlements are paid against the debt.
    ///
    /// Expenses count exactly as in [`between`](Self::between). A payment from
    /// `b` to `a` shrinks a positive balance and one from `a` to `b` grows it,
    /// so recording the suggested settle-up brings this to zero.
    pub fn outstanding(
        &self,
        a: &MemberId,
        b: &MemberId,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Money, BalanceError> {
        self.fold(a, b, expenses, settlements, SettlementSign::PaysDown)
    }

    fn fold(
        &self,
        a: &MemberId,
        b: &MemberId,
        expenses: &[Expense],
        settlements: &[Settlement],
        settlement_sign: SettlementSign,
    ) -> Result<Money, BalanceError> {
        if a == b {
            return Ok(Money::ZERO);
        }

        let mut balance = Money::ZERO;

        for expense in expenses {
            let Some(payer) = expense.payer() else {
                continue;
            };
            let participants = expense.participants();
            let involved = |member: &MemberId| payer == member || participants.contains(member);
            if !involved(a) || !involved(b) {
                continue;
            }

            let (debtor, sign) = if payer == a {
                (b, 1)
            } else if payer == b {
                (a, -1)
            } else {
                continue;
            };

            let shares = self
                .calculator
                .compute(
                    expense.amount,
                    expense.split_type,
                    &expense.split_details,
                    &participants,
                )
                .map_err(|source| BalanceError::Split {
                    expense_id: expense.id.clone(),
                    source,
                })?;

            if let Some(share) = shares.iter().find(|share| &share.member == debtor) {
                let next = if sign > 0 {
                    balance.checked_add(share.amount)
                } else {
                    balance.checked_sub(share.amount)
                };
                balance = next.ok_or_else(|| overflow(&expense.id))?;
            }
        }

        for settlement in settlements {
            let next = match settlement.parties() {
                Some((from, to)) if from == a && to == b => match settlement_sign {
                    SettlementSign::Historical => balance.checked_sub(settlement.amount),
                    SettlementSign::PaysDown => balance.checked_add(settlement.amount),
                },
                Some((from, to)) if from == b && to == a => match settlement_sign {
                    SettlementSign::Historical => balance.checked_add(settlement.amount),
                    SettlementSign::PaysDown => balance.checked_sub(settlement.amount),
                },
                _ => continue,
            };
            balance = next.ok_or_else(|| overflow(&settlement.id))?;
        }

        Ok(self.calculator.context().round(balance))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SettlementSign {
    Historical,
    PaysDown,
}

fn overflow(record_id: &str) -> BalanceError {
    BalanceError::Overflow {
        record_id: record_id.to_owned(),
    }
}

/// [`PairwiseBalance::between`] under the default two-decimal context.
pub fn balance_between(
    a: &MemberId,
    b: &MemberId,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<Money, BalanceError> {
    PairwiseBalance::default().between(a, b, expenses, settlements)
}
