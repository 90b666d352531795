pub mod balance_engine;
pub mod debt_simplifier;
pub mod money_context;
pub mod pairwise_balance;
pub mod split_calculator;

pub use balance_engine::{
    BalanceAccumulator, BalanceError, compute_group_balances, compute_group_balances_with,
};
pub use debt_simplifier::{DebtSimplifier, simplify_debts};
pub use money_context::{MoneyContext, ResidualPolicy, RoundingMode};
pub use pairwise_balance::{PairwiseBalance, balance_between};
pub use split_calculator::{SplitCalculator, SplitError, compute_split};
