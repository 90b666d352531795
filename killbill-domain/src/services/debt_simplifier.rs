use crate::{
    model::{MemberBalances, MemberId, Money, Transaction},
    services::MoneyContext,
};

/// Turns a balance table into a short list of settling payments.
///
/// Greedy largest-first matching between creditors and debtors. This is a
/// heuristic: it usually needs at most `creditors + debtors - 1` payments but
/// is not guaranteed to find the minimum count.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebtSimplifier {
    context: MoneyContext,
}

impl DebtSimplifier {
    pub fn new(context: MoneyContext) -> Self {
        Self { context }
    }

    /// Payments that, once executed, bring every balance to within epsilon
    /// of zero.
    ///
    /// Members within epsilon of zero are left out. Equal magnitudes keep the
    /// order they have in `balances`.
    pub fn simplify(&self, balances: &MemberBalances) -> Vec<Transaction> {
        let epsilon = self.context.epsilon();

        let mut creditors: Vec<(&MemberId, Money)> = Vec::new();
        let mut debtors: Vec<(&MemberId, Money)> = Vec::new();
        for (member, &balance) in balances {
            if balance > epsilon {
                creditors.push((member, balance));
            } else if balance < -epsilon {
                debtors.push((member, balance.abs()));
            }
        }

        creditors.sort_by(|(_, a), (_, b)| b.cmp(a));
        debtors.sort_by(|(_, a), (_, b)| b.cmp(a));

        let mut transactions = Vec::with_capacity(creditors.len() + debtors.len());
        let mut credit_index = 0;
        let mut debt_index = 0;

        while credit_index < creditors.len() && debt_index < debtors.len() {
            let (creditor, credit) = &mut creditors[credit_index];
            let (debtor, debt) = &mut debtors[debt_index];

            let amount = (*credit).min(*debt);
            if amount > epsilon {
                transactions.push(Transaction {
                    from: (*debtor).clone(),
                    to: (*creditor).clone(),
                    amount: self.context.round(amount),
                });
            }

            *credit -= amount;
            *debt -= amount;

            if *credit < epsilon {
                credit_index += 1;
            }
            if *debt < epsilon {
                debt_index += 1;
            }
        }

        tracing::debug!(
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            transaction_count = transactions.len(),
            "Debts simplified"
        );

        transactions
    }
}

/// [`DebtSimplifier::simplify`] with the default one-cent epsilon.
pub fn simplify_debts(balances: &MemberBalances) -> Vec<Transaction> {
    DebtSimplifier::default().simplify(balances)
}
