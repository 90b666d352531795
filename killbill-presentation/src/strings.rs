pub const MEMBER: &str = "Member";
pub const BALANCE: &str = "Balance";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const AMOUNT: &str = "Amount";
pub const GROUP: &str = "Group";
pub const EXPENSE: &str = "Expense";
pub const PAID_BY: &str = "Paid by";
pub const DATE: &str = "When";
pub const ALL_SETTLED: &str = "All settled up.";
pub const NO_OPEN_BALANCES: &str = "No open balances.";
pub const NO_GROUPS: &str = "Not a member of any group.";
pub const YOU_ARE_OWED: &str = "You are owed";
pub const YOU_OWE: &str = "You owe";
pub const SUGGESTED_PAYMENTS: &str = "Suggested payments";

pub fn owes_you(name: impl std::fmt::Display, amount: impl std::fmt::Display) -> String {
    format!("{name} owes you {amount}")
}

pub fn you_owe(name: impl std::fmt::Display, amount: impl std::fmt::Display) -> String {
    format!("You owe {name} {amount}")
}

pub fn settlement_recorded(
    from: impl std::fmt::Display,
    to: impl std::fmt::Display,
    amount: impl std::fmt::Display,
) -> String {
    format!("Recorded: {from} paid {to} {amount}")
}
