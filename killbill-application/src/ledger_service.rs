use crate::{
    error::LedgerError,
    model::{
        ExpenseActivity, GroupBalance, GroupId, GroupSnapshot, GroupSummary, LedgerConfig,
        PairwiseEntry, UserOverview,
    },
    ports::{LedgerRepository, SettlementRecorder},
};
use arcstr::ArcStr;
use fxhash::FxHashSet;
use killbill_domain::{
    BalanceError, DebtSimplifier, MemberBalances, MemberId, Money, PairwiseBalance, Settlement,
    Transaction, compute_group_balances_with,
};

/// Use cases over the external ledger store: read-side summaries and the
/// settlement-recording flow.
#[derive(Clone)]
pub struct LedgerService<'a> {
    repository: &'a dyn LedgerRepository,
    recorder: &'a dyn SettlementRecorder,
    config: LedgerConfig,
}

impl<'a> LedgerService<'a> {
    pub fn new(repository: &'a dyn LedgerRepository, recorder: &'a dyn SettlementRecorder) -> Self {
        Self::with_config(repository, recorder, LedgerConfig::default())
    }

    pub fn with_config(
        repository: &'a dyn LedgerRepository,
        recorder: &'a dyn SettlementRecorder,
        config: LedgerConfig,
    ) -> Self {
        Self {
            repository,
            recorder,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn group_ids(&self) -> Result<Vec<GroupId>, LedgerError> {
        Ok(self.repository.group_ids()?)
    }

    pub fn load_group(&self, group_id: &GroupId) -> Result<GroupSnapshot, LedgerError> {
        self.repository
            .load_group(group_id)?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))
    }

    pub fn currency_of(&self, group: &GroupSnapshot) -> ArcStr {
        if group.currency.is_empty() {
            self.config.default_currency.clone()
        } else {
            group.currency.clone()
        }
    }

    pub fn group_balances(&self, group: &GroupSnapshot) -> Result<MemberBalances, BalanceError> {
        compute_group_balances_with(
            &group.expenses,
            &group.settlements,
            &group.member_ids(),
            self.config.money,
        )
    }

    /// Balances of every member plus the suggested settling payments.
    pub fn group_summary(&self, group_id: &GroupId) -> Result<GroupSummary, LedgerError> {
        let group = self.load_group(group_id)?;
        let balances = self.group_balances(&group)?;
        let transactions = DebtSimplifier::new(self.config.money).simplify(&balances);

        Ok(GroupSummary {
            group_id: group.id.clone(),
            currency: self.currency_of(&group),
            balances,
            transactions,
        })
    }

    /// Positive when `b` owes `a`, with settlements in the ledger's
    /// historical sign. See [`PairwiseBalance::between`].
    pub fn balance_between(
        &self,
        group_id: &GroupId,
        a: &MemberId,
        b: &MemberId,
    ) -> Result<Money, LedgerError> {
        let group = self.load_group(group_id)?;
        Ok(PairwiseBalance::new(self.config.money).between(
            a,
            b,
            &group.expenses,
            &group.settlements,
        )?)
    }

    /// Outstanding balance between `user` and every other member of the
    /// group, skipping counterparts already settled with the user.
    pub fn pairwise_balances(
        &self,
        group_id: &GroupId,
        user: &MemberId,
    ) -> Result<Vec<PairwiseEntry>, LedgerError> {
        let group = self.load_group(group_id)?;
        ensure_members(&group, [user])?;

        let epsilon = self.config.money.epsilon();
        let mut entries = Vec::with_capacity(group.members.len().saturating_sub(1));
        for member in &group.members {
            if &member.id == user {
                continue;
            }
            let amount = self.pairwise(&group, user, &member.id)?;
            if !amount.is_negligible(epsilon) {
                entries.push(PairwiseEntry {
                    counterpart: member.id.clone(),
                    amount,
                });
            }
        }
        Ok(entries)
    }

    /// The user's balance in each of their groups, with owed/owing totals.
    pub fn user_overview(&self, user: &MemberId) -> Result<UserOverview, LedgerError> {
        let mut groups = Vec::new();
        let mut total_owed = Money::ZERO;
        let mut total_owe = Money::ZERO;

        for group in self.repository.groups_of(user)? {
            let balances = self.group_balances(&group)?;
            let balance = balances.get(user).copied().unwrap_or_default();
            let totals = if balance.signum() > 0 {
                total_owed.checked_add(balance).map(|owed| (owed, total_owe))
            } else {
                total_owe.checked_add(balance.abs()).map(|owe| (total_owed, owe))
            };
            (total_owed, total_owe) = totals.ok_or_else(|| BalanceError::Overflow {
                record_id: group.id.to_string(),
            })?;
            groups.push(GroupBalance {
                group_id: group.id.clone(),
                name: group.name.clone(),
                currency: self.currency_of(&group),
                balance,
            });
        }

        Ok(UserOverview {
            user: user.clone(),
            groups,
            total_owed,
            total_owe,
        })
    }

    /// Most recently created expenses across the user's groups.
    pub fn recent_expenses(
        &self,
        user: &MemberId,
        limit: usize,
    ) -> Result<Vec<ExpenseActivity>, LedgerError> {
        let mut activity: Vec<ExpenseActivity> = self
            .repository
            .groups_of(user)?
            .into_iter()
            .flat_map(|group| {
                let currency = self.currency_of(&group);
                let group_id = group.id;
                group.expenses.into_iter().map(move |expense| ExpenseActivity {
                    group_id: group_id.clone(),
                    currency: currency.clone(),
                    expense,
                })
            })
            .collect();

        activity.sort_by(|a, b| b.expense.created_at.cmp(&a.expense.created_at));
        activity.truncate(limit);
        Ok(activity)
    }

    /// Record a settlement that clears the outstanding balance between `user`
    /// and `counterpart`.
    ///
    /// When the user owes the counterpart the user is the payer, otherwise
    /// the counterpart is. Once recorded, the pair has nothing left to settle.
    pub fn settle_with(
        &self,
        group_id: &GroupId,
        user: &MemberId,
        counterpart: &MemberId,
        note: &str,
        now: i64,
    ) -> Result<Settlement, LedgerError> {
        if user == counterpart {
            return Err(LedgerError::InvalidSettlement(
                "cannot settle with yourself",
            ));
        }

        let group = self.load_group(group_id)?;
        ensure_members(&group, [user, counterpart])?;

        let amount = self.pairwise(&group, user, counterpart)?;
        if amount.is_negligible(self.config.money.epsilon()) {
            return Err(LedgerError::NothingToSettle {
                user: user.clone(),
                counterpart: counterpart.clone(),
            });
        }

        let (from, to) = if amount.signum() < 0 {
            (user, counterpart)
        } else {
            (counterpart, user)
        };
        self.record(group_id, from, to, amount.abs(), note, now)
    }

    /// Record one suggested payment from [`Self::group_summary`].
    pub fn record_transaction(
        &self,
        group_id: &GroupId,
        transaction: &Transaction,
        note: &str,
        now: i64,
    ) -> Result<Settlement, LedgerError> {
        if transaction.from == transaction.to {
            return Err(LedgerError::InvalidSettlement(
                "payer and payee must differ",
            ));
        }
        if transaction.amount.signum() <= 0 {
            return Err(LedgerError::InvalidSettlement("amount must be positive"));
        }

        let group = self.load_group(group_id)?;
        ensure_members(&group, [&transaction.from, &transaction.to])?;
        self.record(
            group_id,
            &transaction.from,
            &transaction.to,
            transaction.amount,
            note,
            now,
        )
    }

    fn pairwise(
        &self,
        group: &GroupSnapshot,
        a: &MemberId,
        b: &MemberId,
    ) -> Result<Money, BalanceError> {
        PairwiseBalance::new(self.config.money).outstanding(
            a,
            b,
            &group.expenses,
            &group.settlements,
        )
    }

    fn record(
        &self,
        group_id: &GroupId,
        from: &MemberId,
        to: &MemberId,
        amount: Money,
        note: &str,
        now: i64,
    ) -> Result<Settlement, LedgerError> {
        let settlement = Settlement {
            id: String::new(),
            amount,
            from_user: Some(from.clone()),
            to_user: Some(to.clone()),
            note: note.to_owned(),
            date: now,
            created_at: now,
        };

        let stored = self.recorder.record(group_id, settlement).inspect_err(|err| {
            tracing::warn!(group_id = %group_id, error = %err, "Failed to record settlement");
        })?;

        tracing::info!(
            group_id = %group_id,
            settlement_id = %stored.id,
            from = %from,
            to = %to,
            amount = %amount,
            "Settlement recorded"
        );
        Ok(stored)
    }
}

fn ensure_members<'m>(
    group: &GroupSnapshot,
    members: impl IntoIterator<Item = &'m MemberId>,
) -> Result<(), LedgerError> {
    let known: FxHashSet<&MemberId> = group.members.iter().map(|member| &member.id).collect();
    for member in members {
        if !known.contains(member) {
            return Err(LedgerError::NotAMember {
                group_id: group.id.clone(),
                member: member.clone(),
            });
        }
    }
    Ok(())
}
