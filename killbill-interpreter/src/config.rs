use crate::CliResult;
use arcstr::ArcStr;
use killbill_application::{DEFAULT_CURRENCY, LedgerConfig};
use killbill_domain::{MoneyContext, ResidualPolicy, RoundingMode};
use std::{env, path::PathBuf};

const LEDGER_VAR: &str = "KILLBILL_LEDGER";
const CURRENCY_VAR: &str = "KILLBILL_CURRENCY";
const ROUNDING_VAR: &str = "KILLBILL_ROUNDING";
const RESIDUAL_VAR: &str = "KILLBILL_RESIDUAL";

/// Settings read from the environment (and `.env`, when present).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub ledger_path: Option<PathBuf>,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn from_env() -> CliResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CliResult<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut money = MoneyContext::usd_default();
        if let Some(name) = var(ROUNDING_VAR) {
            let mode = RoundingMode::from_name(&name)
                .ok_or_else(|| format!("{ROUNDING_VAR} must be half_up or half_even, got '{name}'"))?;
            money = money.with_rounding_mode(mode);
        }
        if let Some(name) = var(RESIDUAL_VAR) {
            let policy = ResidualPolicy::from_name(&name)
                .ok_or_else(|| format!("{RESIDUAL_VAR} must be ignore or distribute, got '{name}'"))?;
            money = money.with_residual_policy(policy);
        }

        let default_currency = var(CURRENCY_VAR)
            .map(|code| ArcStr::from(code.trim().to_ascii_uppercase()))
            .unwrap_or_else(|| ArcStr::from(DEFAULT_CURRENCY));

        Ok(Self {
            ledger_path: var(LEDGER_VAR).map(PathBuf::from),
            ledger: LedgerConfig {
                money,
                default_currency,
            },
        })
    }
}
