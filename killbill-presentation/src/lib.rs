#![warn(clippy::uninlined_format_args)]

pub mod balance_presenter;
pub mod currency;
pub mod dates;
pub mod strings;
pub mod text_table;

pub use balance_presenter::BalancePresenter;
pub use currency::{Currency, format_balance, format_currency};
pub use dates::{format_date, format_relative_date};
pub use text_table::{Alignment, TextTableBuilder};
