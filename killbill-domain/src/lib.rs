#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Expense, ExpenseCategory, Member, MemberBalances, MemberId, Money, Settlement, Share,
    SplitType, Transaction,
};
pub use services::{
    BalanceAccumulator, BalanceError, DebtSimplifier, MoneyContext, PairwiseBalance,
    ResidualPolicy, RoundingMode, SplitCalculator, SplitError, balance_between,
    compute_group_balances, compute_group_balances_with, compute_split, simplify_debts,
};
