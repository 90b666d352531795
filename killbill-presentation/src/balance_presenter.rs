use crate::{
    currency::{Currency, format_balance, format_currency},
    dates::format_relative_date,
    strings,
    text_table::{Alignment, TextTableBuilder},
};
use killbill_application::{
    ExpenseActivity, GroupSummary, MemberDirectory, PairwiseEntry, UserOverview,
};
use killbill_domain::{MemberId, Settlement, Transaction};
use std::{borrow::Cow, fmt::Write};

pub struct BalancePresenter;

impl BalancePresenter {
    /// Balance table followed by the suggested payments, if any.
    pub fn render_summary(
        summary: &GroupSummary,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let currency = Currency::from_code(&summary.currency);
        let mut out = Self::build_balance_table(summary, &currency, member_directory);
        out.push_str("\n\n");

        if summary.is_settled() {
            out.push_str(strings::ALL_SETTLED);
        } else {
            let _ = writeln!(out, "{}:", strings::SUGGESTED_PAYMENTS);
            out.push_str(&Self::build_transaction_table(
                &summary.transactions,
                &currency,
                member_directory,
            ));
        }
        out
    }

    pub fn build_balance_table(
        summary: &GroupSummary,
        currency: &Currency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let headers = [
            Cow::Borrowed(strings::MEMBER),
            Cow::Borrowed(strings::BALANCE),
        ];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(summary.balances.iter().map(|(member, balance)| {
                [
                    format_member_label(member, member_directory),
                    Cow::Owned(format_balance(*balance, currency)),
                ]
            }))
            .build()
    }

    pub fn build_transaction_table(
        transactions: &[Transaction],
        currency: &Currency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let headers = [
            Cow::Borrowed(strings::FROM),
            Cow::Borrowed(strings::TO),
            Cow::Borrowed(strings::AMOUNT),
        ];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(transactions.iter().map(|transaction| {
                [
                    format_member_label(&transaction.from, member_directory),
                    format_member_label(&transaction.to, member_directory),
                    Cow::Owned(format_currency(transaction.amount, currency)),
                ]
            }))
            .build()
    }

    /// "owes you" / "you owe" lines from the viewing user's side.
    pub fn render_pairwise(
        entries: &[PairwiseEntry],
        currency: &Currency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        if entries.is_empty() {
            return strings::NO_OPEN_BALANCES.to_owned();
        }

        entries
            .iter()
            .map(|entry| {
                let name = format_member_label(&entry.counterpart, member_directory);
                let amount = format_currency(entry.amount.abs(), currency);
                if entry.amount.signum() > 0 {
                    strings::owes_you(name, amount)
                } else {
                    strings::you_owe(name, amount)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Totals across groups, then one row per group in its own currency.
    pub fn render_overview(overview: &UserOverview, totals_currency: &Currency) -> String {
        if overview.groups.is_empty() {
            return strings::NO_GROUPS.to_owned();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {}",
            strings::BALANCE,
            format_balance(overview.net(), totals_currency)
        );
        let _ = writeln!(
            out,
            "{}: {}",
            strings::YOU_ARE_OWED,
            format_currency(overview.total_owed, totals_currency)
        );
        let _ = writeln!(
            out,
            "{}: {}",
            strings::YOU_OWE,
            format_currency(overview.total_owe, totals_currency)
        );
        out.push('\n');

        let headers = [
            Cow::Borrowed(strings::GROUP),
            Cow::Borrowed(strings::BALANCE),
        ];
        let table = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(overview.groups.iter().map(|group| {
                let label = if group.name.is_empty() {
                    group.group_id.as_str()
                } else {
                    group.name.as_str()
                };
                [
                    Cow::Borrowed(label),
                    Cow::Owned(format_balance(
                        group.balance,
                        &Currency::from_code(&group.currency),
                    )),
                ]
            }))
            .build();
        out.push_str(&table);
        out
    }

    /// One row per expense, dated relative to `now_millis`. The expense
    /// date is used when set, its creation time otherwise.
    pub fn render_recent(
        activity: &[ExpenseActivity],
        member_directory: &dyn MemberDirectory,
        now_millis: i64,
    ) -> String {
        let headers = [
            Cow::Borrowed(strings::DATE),
            Cow::Borrowed(strings::GROUP),
            Cow::Borrowed(strings::EXPENSE),
            Cow::Borrowed(strings::PAID_BY),
            Cow::Borrowed(strings::AMOUNT),
        ];
        TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
            ])
            .headers(&headers)
            .rows(activity.iter().map(|item| {
                let expense = &item.expense;
                let payer = expense
                    .payer()
                    .map(|payer| format_member_label(payer, member_directory))
                    .unwrap_or(Cow::Borrowed("?"));
                let when = if expense.date != 0 {
                    expense.date
                } else {
                    expense.created_at
                };
                [
                    Cow::Owned(format_relative_date(when, now_millis)),
                    Cow::Borrowed(item.group_id.as_str()),
                    Cow::Owned(format!(
                        "{} {}",
                        expense.category.emoji(),
                        expense.description
                    )),
                    payer,
                    Cow::Owned(format_currency(
                        expense.amount,
                        &Currency::from_code(&item.currency),
                    )),
                ]
            }))
            .build()
    }

    pub fn render_settlement(
        settlement: &Settlement,
        currency: &Currency,
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let amount = format_currency(settlement.amount, currency);
        match settlement.parties() {
            Some((from, to)) => strings::settlement_recorded(
                format_member_label(from, member_directory),
                format_member_label(to, member_directory),
                amount,
            ),
            None => amount,
        }
    }
}

fn format_member_label<'a>(
    member_id: &'a MemberId,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    match member_directory.display_name(member_id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Borrowed(member_id.as_str()),
    }
}
