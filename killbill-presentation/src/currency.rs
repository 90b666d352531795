use arcstr::ArcStr;
use killbill_domain::Money;
use rust_decimal::RoundingStrategy;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Inr,
    Jpy,
    Cad,
    Aud,
    Other(ArcStr),
}

impl Currency {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "" | "USD" => Currency::Usd,
            "EUR" => Currency::Eur,
            "GBP" => Currency::Gbp,
            "INR" => Currency::Inr,
            "JPY" => Currency::Jpy,
            "CAD" => Currency::Cad,
            "AUD" => Currency::Aud,
            other => Currency::Other(ArcStr::from(other)),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Other(code) => code,
        }
    }

    /// Display symbol; currencies without one use their code.
    pub fn symbol(&self) -> &str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Inr => "₹",
            Currency::Jpy => "¥",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Other(code) => code,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `$1,234.50`, `-$5.00`, `CHF 12.00`.
pub fn format_currency(amount: Money, currency: &Currency) -> String {
    let rounded = amount
        .as_decimal()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let mut magnitude = rounded.abs();
    magnitude.rescale(2);
    let digits = magnitude.to_string();
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let separator = if matches!(currency, Currency::Other(_)) {
        " "
    } else {
        ""
    };
    format!(
        "{sign}{}{separator}{}.{fraction}",
        currency.symbol(),
        group_thousands(whole)
    )
}

/// Like [`format_currency`] but with an explicit `+` on positive amounts.
pub fn format_balance(amount: Money, currency: &Currency) -> String {
    let formatted = format_currency(amount.abs(), currency);
    match amount.signum() {
        1 => format!("+{formatted}"),
        -1 => format!("-{formatted}"),
        _ => formatted,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn money(value: &str) -> Money {
        Money::from_decimal(Decimal::from_str(value).expect("valid decimal"))
    }

    #[rstest]
    #[case::usd("USD", "$")]
    #[case::lowercase("eur", "€")]
    #[case::pound("GBP", "£")]
    #[case::rupee("INR", "₹")]
    #[case::yen("JPY", "¥")]
    #[case::canadian("CAD", "C$")]
    #[case::australian("AUD", "A$")]
    #[case::unknown("CHF", "CHF")]
    #[case::missing("", "$")]
    fn symbols(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(Currency::from_code(code).symbol(), expected);
    }

    #[rstest]
    #[case::thousands("1234.5", "USD", "$1,234.50")]
    #[case::millions("1234567.891", "USD", "$1,234,567.89")]
    #[case::negative("-5", "USD", "-$5.00")]
    #[case::small("0.005", "EUR", "€0.01")]
    #[case::negative_rounds_to_zero("-0.004", "USD", "$0.00")]
    #[case::hundreds("999.999", "GBP", "£1,000.00")]
    #[case::unknown_code("12", "CHF", "CHF 12.00")]
    fn currency_formatting(#[case] amount: &str, #[case] code: &str, #[case] expected: &str) {
        assert_eq!(
            format_currency(money(amount), &Currency::from_code(code)),
            expected
        );
    }

    #[rstest]
    #[case::positive("25", "+$25.00")]
    #[case::negative("-25", "-$25.00")]
    #[case::zero("0", "$0.00")]
    fn balance_formatting(#[case] amount: &str, #[case] expected: &str) {
        assert_eq!(format_balance(money(amount), &Currency::Usd), expected);
    }
}
