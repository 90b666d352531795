use arcstr::ArcStr;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

/// Opaque member identifier, as issued by the external store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub ArcStr);

impl MemberId {
    pub fn new(id: impl Into<ArcStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty identifiers come from dangling links and count as unresolved.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self(ArcStr::from(value))
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(ArcStr::from(value))
    }
}

/// Balance table keyed by member. Iteration follows insertion order, which is
/// what the debt simplifier relies on for tie-breaking.
pub type MemberBalances = IndexMap<MemberId, Money>;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Threshold under which an amount counts as settled (one cent).
    pub const EPSILON: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn signum(self) -> i64 {
        if self.0.is_zero() {
            0
        } else if self.0.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Decimal) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn checked_div(self, rhs: Decimal) -> Option<Self> {
        self.0.checked_div(rhs).map(Self)
    }

    /// Sum that reports overflow instead of panicking.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// True when the amount is within `epsilon` of zero, inclusive.
    pub fn is_negligible(self, epsilon: Money) -> bool {
        self.0.abs() <= epsilon.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// How an expense's total is divided between its participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SplitType {
    #[default]
    Equal,
    Exact,
    Percentage,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Exact => "exact",
            SplitType::Percentage => "percentage",
        }
    }

    /// Unknown names fall back to [`SplitType::Equal`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "exact" => SplitType::Exact,
            "percentage" => SplitType::Percentage,
            _ => SplitType::Equal,
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SplitType {
    fn from(value: &str) -> Self {
        Self::from_name(value)
    }
}

impl From<String> for SplitType {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<SplitType> for String {
    fn from(value: SplitType) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Shopping,
    Utilities,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Accommodation,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Shopping,
        ExpenseCategory::Utilities,
        ExpenseCategory::Other,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Accommodation => "accommodation",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food & Drinks",
            ExpenseCategory::Transport => "Transport",
            ExpenseCategory::Accommodation => "Accommodation",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Other => "Other",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "🍔",
            ExpenseCategory::Transport => "🚗",
            ExpenseCategory::Accommodation => "🏨",
            ExpenseCategory::Entertainment => "🎬",
            ExpenseCategory::Shopping => "🛍️",
            ExpenseCategory::Utilities => "💡",
            ExpenseCategory::Other => "📦",
        }
    }

    /// Unknown ids resolve to [`ExpenseCategory::Other`].
    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.id() == id)
            .unwrap_or_default()
    }
}

impl From<String> for ExpenseCategory {
    fn from(value: String) -> Self {
        Self::from_id(&value)
    }
}

impl From<ExpenseCategory> for String {
    fn from(value: ExpenseCategory) -> Self {
        value.id().to_owned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub split_type: SplitType,
    #[serde(default)]
    pub split_details: IndexMap<MemberId, Decimal>,
    #[serde(default)]
    pub paid_by: Option<MemberId>,
    #[serde(default)]
    pub split_with: Vec<MemberId>,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub created_at: i64,
}

impl Expense {
    /// Equal split of `amount` between `split_with`, paid by `paid_by`.
    pub fn equal(
        amount: Money,
        paid_by: impl Into<MemberId>,
        split_with: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        Self {
            id: String::new(),
            description: String::new(),
            amount,
            category: ExpenseCategory::default(),
            split_type: SplitType::Equal,
            split_details: IndexMap::new(),
            paid_by: Some(paid_by.into()),
            split_with: split_with.into_iter().collect(),
            date: 0,
            created_at: 0,
        }
    }

    /// Split driven by `details`; the detail keys become the participants.
    pub fn with_details(
        amount: Money,
        split_type: SplitType,
        paid_by: impl Into<MemberId>,
        details: impl IntoIterator<Item = (MemberId, Decimal)>,
    ) -> Self {
        let split_details: IndexMap<MemberId, Decimal> = details.into_iter().collect();
        Self {
            id: String::new(),
            description: String::new(),
            amount,
            category: ExpenseCategory::default(),
            split_type,
            split_with: split_details.keys().cloned().collect(),
            split_details,
            paid_by: Some(paid_by.into()),
            date: 0,
            created_at: 0,
        }
    }

    pub fn payer(&self) -> Option<&MemberId> {
        self.paid_by.as_ref().filter(|id| !id.is_empty())
    }

    /// Participants that share the cost: the detail keys for `exact` and
    /// `percentage` splits, `split_with` otherwise.
    pub fn participants(&self) -> Cow<'_, [MemberId]> {
        match self.split_type {
            SplitType::Equal => Cow::Borrowed(&self.split_with),
            SplitType::Exact | SplitType::Percentage => {
                Cow::Owned(self.split_details.keys().cloned().collect())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    #[serde(default)]
    pub id: String,
    pub amount: Money,
    #[serde(default)]
    pub from_user: Option<MemberId>,
    #[serde(default)]
    pub to_user: Option<MemberId>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub created_at: i64,
}

impl Settlement {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            id: String::new(),
            amount,
            from_user: Some(from.into()),
            to_user: Some(to.into()),
            note: String::new(),
            date: 0,
            created_at: 0,
        }
    }

    /// Both parties, or `None` when either link is missing.
    pub fn parties(&self) -> Option<(&MemberId, &MemberId)> {
        let from = self.from_user.as_ref().filter(|id| !id.is_empty())?;
        let to = self.to_user.as_ref().filter(|id| !id.is_empty())?;
        Some((from, to))
    }
}

/// One participant's owed portion of an expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub member: MemberId,
    pub amount: Money,
}

/// A suggested payment that moves `amount` from `from` to `to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}
