use arcstr::ArcStr;
use killbill_domain::{
    Expense, Member, MemberBalances, MemberId, Money, MoneyContext, Settlement, Transaction,
};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub ArcStr);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(ArcStr::from(value))
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(ArcStr::from(value))
    }
}

/// Currency code used when a group does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Service-wide settings for balance computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    pub money: MoneyContext,
    pub default_currency: ArcStr,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            money: MoneyContext::usd_default(),
            default_currency: ArcStr::from(DEFAULT_CURRENCY),
        }
    }
}

/// Everything the store knows about one group at read time.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub name: String,
    pub emoji: String,
    /// ISO currency code; empty when the group never set one.
    pub currency: ArcStr,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

impl GroupSnapshot {
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.members.iter().any(|member| &member.id == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub currency: ArcStr,
    pub balances: MemberBalances,
    pub transactions: Vec<Transaction>,
}

impl GroupSummary {
    pub fn is_settled(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Balance between the viewing user and one other member.
/// Positive: the counterpart owes the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairwiseEntry {
    pub counterpart: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupBalance {
    pub group_id: GroupId,
    pub name: String,
    pub currency: ArcStr,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserOverview {
    pub user: MemberId,
    pub groups: Vec<GroupBalance>,
    /// Sum of positive group balances.
    pub total_owed: Money,
    /// Sum of the magnitudes of negative group balances.
    pub total_owe: Money,
}

impl UserOverview {
    pub fn net(&self) -> Money {
        self.total_owed - self.total_owe
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseActivity {
    pub group_id: GroupId,
    pub currency: ArcStr,
    pub expense: Expense,
}
