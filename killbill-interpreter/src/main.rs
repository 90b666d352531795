#![warn(clippy::uninlined_format_args)]

mod config;

use std::{
    borrow::Cow,
    collections::HashMap,
    env,
    path::PathBuf,
    process,
};

use config::AppConfig;
use killbill_application::{GroupId, LedgerService};
use killbill_domain::MemberId;
use killbill_infrastructure::JsonLedgerStore;
use killbill_presentation::{BalancePresenter, Currency, format_balance};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "\
Usage: killbill [--ledger <path> | <path>] <command>

Commands:
  groups                                      list groups
  summary <group>                             balances and suggested payments
  between <group> <a> <b>                     balance between two members
  balances <group> <user>                     who owes <user> and whom <user> owes
  overview <user>                             <user>'s balance in every group
  recent <user> [limit]                       latest expenses in <user>'s groups
  settle <group> <user> <counterpart> [note]  record a settle-up payment

A leading argument that is not a command is taken as the ledger path.
The path may be omitted when KILLBILL_LEDGER is set.";

const COMMANDS: &[&str] = &[
    "groups", "summary", "between", "balances", "overview", "recent", "settle",
];
const LEDGER_FLAG: &str = "--ledger";

const DEFAULT_RECENT_LIMIT: usize = 10;

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let config = AppConfig::from_env()?;
    let (explicit_path, args) = split_ledger_arg(env::args().skip(1).collect())?;
    let ledger_path = match explicit_path {
        Some(path) => path,
        None => config
            .ledger_path
            .clone()
            .ok_or(Cow::Borrowed(USAGE))?,
    };
    let Some((command, rest)) = args.split_first() else {
        return Err(USAGE.into());
    };

    let store = JsonLedgerStore::open(&ledger_path).map_err(|err| err.to_string())?;
    tracing::debug!(command = %command, path = %ledger_path.display(), "Running command");
    let names: HashMap<MemberId, String> = store
        .user_names()
        .map_err(|err| err.to_string())?
        .into_iter()
        .collect();
    let service = LedgerService::with_config(&store, &store, config.ledger.clone());

    let output = match (command.as_str(), rest) {
        ("groups", []) => list_groups(&service)?,
        ("summary", [group]) => {
            let summary = service
                .group_summary(&GroupId::from(group.as_str()))
                .map_err(|err| err.to_string())?;
            BalancePresenter::render_summary(&summary, &names)
        }
        ("between", [group, a, b]) => {
            let group_id = GroupId::from(group.as_str());
            let group = service.load_group(&group_id).map_err(|err| err.to_string())?;
            let amount = service
                .balance_between(&group_id, &member(a), &member(b))
                .map_err(|err| err.to_string())?;
            let currency = Currency::from_code(&service.currency_of(&group));
            format!("{a} / {b}: {}", format_balance(amount, &currency))
        }
        ("balances", [group, user]) => {
            let group_id = GroupId::from(group.as_str());
            let group = service.load_group(&group_id).map_err(|err| err.to_string())?;
            let entries = service
                .pairwise_balances(&group_id, &member(user))
                .map_err(|err| err.to_string())?;
            let currency = Currency::from_code(&service.currency_of(&group));
            BalancePresenter::render_pairwise(&entries, &currency, &names)
        }
        ("overview", [user]) => {
            let overview = service
                .user_overview(&member(user))
                .map_err(|err| err.to_string())?;
            let currency = Currency::from_code(&config.ledger.default_currency);
            BalancePresenter::render_overview(&overview, &currency)
        }
        ("recent", [user, limit @ ..]) if limit.len() <= 1 => {
            let limit = match limit.first() {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| format!("limit must be a whole number, got '{raw}'"))?,
                None => DEFAULT_RECENT_LIMIT,
            };
            let activity = service
                .recent_expenses(&member(user), limit)
                .map_err(|err| err.to_string())?;
            BalancePresenter::render_recent(&activity, &names, now_millis())
        }
        ("settle", [group, user, counterpart, note @ ..]) => {
            let group_id = GroupId::from(group.as_str());
            let settlement = service
                .settle_with(
                    &group_id,
                    &member(user),
                    &member(counterpart),
                    &note.join(" "),
                    now_millis(),
                )
                .map_err(|err| err.to_string())?;
            let group = service.load_group(&group_id).map_err(|err| err.to_string())?;
            let currency = Currency::from_code(&service.currency_of(&group));
            BalancePresenter::render_settlement(&settlement, &currency, &names)
        }
        _ => return Err(USAGE.into()),
    };

    println!("{output}");
    Ok(())
}

/// Takes the ledger path off the front of `args`, if one was given.
fn split_ledger_arg(mut args: Vec<String>) -> CliResult<(Option<PathBuf>, Vec<String>)> {
    let Some(first) = args.first() else {
        return Ok((None, args));
    };

    if let Some(path) = first.strip_prefix(LEDGER_FLAG).and_then(|rest| rest.strip_prefix('=')) {
        if path.is_empty() {
            return Err(USAGE.into());
        }
        let path = PathBuf::from(path);
        args.remove(0);
        return Ok((Some(path), args));
    }
    if first == LEDGER_FLAG {
        if args.len() < 2 {
            return Err(USAGE.into());
        }
        let path = PathBuf::from(args.remove(1));
        args.remove(0);
        return Ok((Some(path), args));
    }
    if COMMANDS.contains(&first.as_str()) {
        return Ok((None, args));
    }

    let path = PathBuf::from(args.remove(0));
    Ok((Some(path), args))
}

fn list_groups(service: &LedgerService<'_>) -> CliResult<String> {
    let mut lines = Vec::new();
    for group_id in service.group_ids().map_err(|err| err.to_string())? {
        let group = service.load_group(&group_id).map_err(|err| err.to_string())?;
        let label = if group.name.is_empty() {
            group.id.to_string()
        } else {
            format!("{} {}", group.emoji, group.name).trim().to_owned()
        };
        lines.push(format!(
            "{group_id}\t{label}\t{} members",
            group.members.len()
        ));
    }
    Ok(lines.join("\n"))
}

fn member(raw: &str) -> MemberId {
    MemberId::from(raw)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect()
    }

    #[rstest]
    #[case::command_only(&["summary", "trip"], None, &["summary", "trip"])]
    #[case::plain_path(&["ledger.json", "groups"], Some("ledger.json"), &["groups"])]
    #[case::path_without_extension(&["/var/lib/ledger", "groups"], Some("/var/lib/ledger"), &["groups"])]
    #[case::flag(&["--ledger", "data", "summary", "trip"], Some("data"), &["summary", "trip"])]
    #[case::flag_with_equals(&["--ledger=groups", "groups"], Some("groups"), &["groups"])]
    #[case::group_named_like_a_file(&["summary", "trip.json"], None, &["summary", "trip.json"])]
    #[case::empty(&[], None, &[])]
    fn ledger_path_is_split_off(
        #[case] raw: &[&str],
        #[case] expected_path: Option<&str>,
        #[case] expected_rest: &[&str],
    ) {
        let (path, rest) = split_ledger_arg(args(raw)).expect("valid arguments");
        assert_eq!(path, expected_path.map(PathBuf::from));
        assert_eq!(rest, args(expected_rest));
    }

    #[rstest]
    #[case::flag_without_value(&["--ledger"])]
    #[case::empty_flag_value(&["--ledger=", "groups"])]
    fn incomplete_ledger_flag_is_rejected(#[case] raw: &[&str]) {
        assert!(split_ledger_arg(args(raw)).is_err());
    }
}
