use crate::{
    model::{Expense, MemberBalances, MemberId, Money, Settlement},
    services::{MoneyContext, SplitCalculator, SplitError},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("expense '{expense_id}' could not be split: {source}")]
    Split {
        expense_id: String,
        #[source]
        source: SplitError,
    },
    #[error("record '{record_id}' overflowed the balance arithmetic")]
    Overflow { record_id: String },
}

/// Folds expenses and settlements into a signed balance per member.
///
/// Positive balances are owed money, negative balances owe money. Every
/// application moves the same amount from one member to another, so the
/// balances always sum to zero.
pub struct BalanceAccumulator {
    balances: MemberBalances,
    calculator: SplitCalculator,
}

impl BalanceAccumulator {
    pub fn new<'m, I>(members: I, context: MoneyContext) -> Self
    where
        I: IntoIterator<Item = &'m MemberId>,
    {
        let balances: MemberBalances = members
            .into_iter()
            .map(|member| (member.clone(), Money::zero()))
            .collect();

        Self {
            balances,
            calculator: SplitCalculator::new(context),
        }
    }

    /// Credit the payer with every other participant's share.
    ///
    /// Expenses without a resolvable payer are skipped.
    pub fn apply_expense(&mut self, expense: &Expense) -> Result<(), BalanceError> {
        let Some(payer) = expense.payer() else {
            tracing::debug!(expense_id = %expense.id, "Skipping expense without payer");
            return Ok(());
        };

        let participants = expense.participants();
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

        // Balances only change once every share has been applied.
        let mut staged = MemberBalances::new();
        for share in shares {
            if &share.member == payer {
                continue;
            }
            self.stage(&mut staged, payer, share.amount, &expense.id)?;
            self.stage(&mut staged, &share.member, -share.amount, &expense.id)?;
        }
        self.balances.extend(staged);
        Ok(())
    }

    /// `from` paid `to`; `from` is owed that much more.
    ///
    /// Settlements missing either party are skipped.
    pub fn apply_settlement(&mut self, settlement: &Settlement) -> Result<(), BalanceError> {
        let Some((from, to)) = settlement.parties() else {
            tracing::debug!(settlement_id = %settlement.id, "Skipping settlement without both parties");
            return Ok(());
        };

        let mut staged = MemberBalances::new();
        self.stage(&mut staged, from, settlement.amount, &settlement.id)?;
        self.stage(&mut staged, to, -settlement.amount, &settlement.id)?;
        self.balances.extend(staged);
        Ok(())
    }

    pub fn balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }

    fn stage(
        &self,
        staged: &mut MemberBalances,
        member: &MemberId,
        delta: Money,
        record_id: &str,
    ) -> Result<(), BalanceError> {
        let current = staged
            .get(member)
            .or_else(|| self.balances.get(member))
            .copied()
            .unwrap_or(Money::ZERO);
        let next = current
            .checked_add(delta)
            .ok_or_else(|| BalanceError::Overflow {
                record_id: record_id.to_owned(),
            })?;
        staged.insert(member.clone(), next);
        Ok(())
    }
}

/// Balance of every member of a group.
///
/// Listed members come first, in the given order, even when they have no
/// activity. Anyone else who appears in a record is appended as first seen.
pub fn compute_group_balances(
    expenses: &[Expense],
    settlements: &[Settlement],
    members: &[MemberId],
) -> Result<MemberBalances, BalanceError> {
    compute_group_balances_with(expenses, settlements, members, MoneyContext::default())
}

pub fn compute_group_balances_with(
    expenses: &[Expense],
    settlements: &[Settlement],
    members: &[MemberId],
    context: MoneyContext,
) -> Result<MemberBalances, BalanceError> {
    let mut accumulator = BalanceAccumulator::new(members, context);
    for expense in expenses {
        accumulator.apply_expense(expense)?;
    }
    for settlement in settlements {
        accumulator.apply_settlement(settlement)?;
    }

    tracing::debug!(
        member_count = accumulator.balances().len(),
        expense_count = expenses.len(),
        settlement_count = settlements.len(),
        "Group balances computed"
    );

    Ok(accumulator.into_balances())
}
