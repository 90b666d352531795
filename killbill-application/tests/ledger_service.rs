use arcstr::ArcStr;
use killbill_application::{
    GroupId, GroupSnapshot, LedgerError, LedgerRepository, LedgerService, SettlementRecorder,
    StorageError,
};
use killbill_domain::{BalanceError, Expense, Member, MemberId, Money, Settlement, SplitType, Transaction};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::Mutex};

struct FakeStore {
    groups: Mutex<Vec<GroupSnapshot>>,
}

impl FakeStore {
    fn new(groups: Vec<GroupSnapshot>) -> Self {
        Self {
            groups: Mutex::new(groups),
        }
    }

    fn settlements(&self, group_id: &str) -> Vec<Settlement> {
        let groups = self.groups.lock().expect("lock poisoned");
        groups
            .iter()
            .find(|group| group.id.as_str() == group_id)
            .map(|group| group.settlements.clone())
            .unwrap_or_default()
    }
}

impl LedgerRepository for FakeStore {
    fn group_ids(&self) -> Result<Vec<GroupId>, StorageError> {
        let groups = self.groups.lock().expect("lock poisoned");
        Ok(groups.iter().map(|group| group.id.clone()).collect())
    }

    fn load_group(&self, group_id: &GroupId) -> Result<Option<GroupSnapshot>, StorageError> {
        let groups = self.groups.lock().expect("lock poisoned");
        Ok(groups.iter().find(|group| &group.id == group_id).cloned())
    }
}

impl SettlementRecorder for FakeStore {
    fn record(
        &self,
        group_id: &GroupId,
        mut settlement: Settlement,
    ) -> Result<Settlement, StorageError> {
        let mut groups = self.groups.lock().expect("lock poisoned");
        let group = groups
            .iter_mut()
            .find(|group| &group.id == group_id)
            .ok_or_else(|| StorageError::UnknownGroup(group_id.clone()))?;
        settlement.id = format!("s{}", group.settlements.len() + 1);
        group.settlements.push(settlement.clone());
        Ok(settlement)
    }
}

struct FailingRecorder;

impl SettlementRecorder for FailingRecorder {
    fn record(&self, _: &GroupId, _: Settlement) -> Result<Settlement, StorageError> {
        Err(StorageError::Backend("disk full".to_owned()))
    }
}

fn money(value: &str) -> Money {
    Money::from_decimal(Decimal::from_str(value).expect("valid decimal"))
}

fn id(name: &str) -> MemberId {
    MemberId::from(name)
}

fn ids(names: &[&str]) -> Vec<MemberId> {
    names.iter().copied().map(MemberId::from).collect()
}

fn trip() -> GroupSnapshot {
    let mut hotel = Expense::equal(money("300"), "ana", ids(&["ana", "ben", "cho"]));
    hotel.id = "e1".to_owned();
    hotel.created_at = 10;
    let mut taxi = Expense::with_details(
        money("60"),
        SplitType::Exact,
        "ben",
        [(id("ana"), Decimal::from(20)), (id("cho"), Decimal::from(40))],
    );
    taxi.id = "e2".to_owned();
    taxi.created_at = 30;

    GroupSnapshot {
        id: GroupId::from("trip"),
        name: "Trip".to_owned(),
        emoji: "🏖️".to_owned(),
        currency: ArcStr::from("EUR"),
        members: vec![
            Member::new("ana", "Ana"),
            Member::new("ben", "Ben"),
            Member::new("cho", "Cho"),
        ],
        expenses: vec![hotel, taxi],
        settlements: Vec::new(),
    }
}

fn flat() -> GroupSnapshot {
    let mut rent = Expense::equal(money("1000"), "dev", ids(&["ana", "dev"]));
    rent.id = "e3".to_owned();
    rent.created_at = 20;

    GroupSnapshot {
        id: GroupId::from("flat"),
        name: "Flat".to_owned(),
        emoji: "🏠".to_owned(),
        currency: ArcStr::default(),
        members: vec![Member::new("ana", "Ana"), Member::new("dev", "Dev")],
        expenses: vec![rent],
        settlements: Vec::new(),
    }
}

#[fixture]
fn store() -> FakeStore {
    FakeStore::new(vec![trip(), flat()])
}

#[rstest]
fn summary_lists_balances_and_transactions(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let summary = service
        .group_summary(&GroupId::from("trip"))
        .expect("group exists");

    assert_eq!(summary.currency.as_str(), "EUR");
    let balances: Vec<(&str, Money)> = summary
        .balances
        .iter()
        .map(|(member, balance)| (member.as_str(), *balance))
        .collect();
    assert_eq!(
        balances,
        vec![
            ("ana", money("180")),
            ("ben", money("-40")),
            ("cho", money("-140")),
        ]
    );
    assert_eq!(
        summary.transactions,
        vec![
            Transaction {
                from: id("cho"),
                to: id("ana"),
                amount: money("140"),
            },
            Transaction {
                from: id("ben"),
                to: id("ana"),
                amount: money("40"),
            },
        ]
    );
}

#[rstest]
fn missing_group_is_reported(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let result = service.group_summary(&GroupId::from("nope"));
    assert_eq!(result, Err(LedgerError::GroupNotFound(GroupId::from("nope"))));
}

#[rstest]
fn group_without_currency_uses_default(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let summary = service
        .group_summary(&GroupId::from("flat"))
        .expect("group exists");
    assert_eq!(summary.currency.as_str(), "USD");
}

#[rstest]
fn pairwise_list_skips_settled_counterparts(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let entries = service
        .pairwise_balances(&GroupId::from("trip"), &id("ben"))
        .expect("ben is a member");

    let summary: Vec<(&str, Money)> = entries
        .iter()
        .map(|entry| (entry.counterpart.as_str(), entry.amount))
        .collect();
    assert_eq!(summary, vec![("ana", money("-80")), ("cho", money("40"))]);
}

#[rstest]
fn pairwise_list_requires_membership(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let result = service.pairwise_balances(&GroupId::from("flat"), &id("ben"));
    assert_eq!(
        result,
        Err(LedgerError::NotAMember {
            group_id: GroupId::from("flat"),
            member: id("ben"),
        })
    );
}

#[rstest]
fn overview_totals_across_groups(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let overview = service.user_overview(&id("ana")).expect("store readable");

    let per_group: Vec<(&str, Money)> = overview
        .groups
        .iter()
        .map(|group| (group.group_id.as_str(), group.balance))
        .collect();
    assert_eq!(
        per_group,
        vec![("trip", money("180")), ("flat", money("-500"))]
    );
    assert_eq!(overview.total_owed, money("180"));
    assert_eq!(overview.total_owe, money("500"));
    assert_eq!(overview.net(), money("-320"));
}

#[test]
fn overview_totals_report_overflow() {
    let group = |name: &str| {
        let mut expense = Expense::equal(Money::from_decimal(Decimal::MAX), "ana", ids(&["ben"]));
        expense.id = format!("{name}-e");
        GroupSnapshot {
            id: GroupId::from(name),
            name: name.to_owned(),
            emoji: String::new(),
            currency: ArcStr::default(),
            members: vec![Member::new("ana", "Ana"), Member::new("ben", "Ben")],
            expenses: vec![expense],
            settlements: Vec::new(),
        }
    };
    let store = FakeStore::new(vec![group("g1"), group("g2")]);
    let service = LedgerService::new(&store, &store);

    assert_eq!(
        service.user_overview(&id("ana")),
        Err(LedgerError::Balance(BalanceError::Overflow {
            record_id: "g2".to_owned(),
        }))
    );
}

#[rstest]
fn recent_expenses_are_newest_first(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let recent = service
        .recent_expenses(&id("ana"), 2)
        .expect("store readable");

    let order: Vec<(&str, &str)> = recent
        .iter()
        .map(|item| (item.group_id.as_str(), item.expense.id.as_str()))
        .collect();
    assert_eq!(order, vec![("trip", "e2"), ("flat", "e3")]);
}

#[rstest]
fn settling_with_a_creditor_pays_them(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let trip_id = GroupId::from("trip");

    let settlement = service
        .settle_with(&trip_id, &id("cho"), &id("ana"), "bank transfer", 1_000)
        .expect("cho owes ana");

    assert_eq!(settlement.id, "s1");
    assert_eq!(settlement.parties(), Some((&id("cho"), &id("ana"))));
    assert_eq!(settlement.amount, money("100"));
    assert_eq!(settlement.note, "bank transfer");
    assert_eq!(settlement.created_at, 1_000);
    assert_eq!(store.settlements("trip").len(), 1);

    let summary = service.group_summary(&trip_id).expect("group exists");
    assert_eq!(summary.balances[&id("cho")], money("-40"));
    assert_eq!(summary.balances[&id("ana")], money("80"));
}

#[rstest]
fn settling_up_clears_the_pair(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let trip_id = GroupId::from("trip");

    service
        .settle_with(&trip_id, &id("cho"), &id("ana"), "", 1)
        .expect("cho owes ana");

    let entries = service
        .pairwise_balances(&trip_id, &id("cho"))
        .expect("cho is a member");
    assert!(entries.iter().all(|entry| entry.counterpart != id("ana")));
    assert_eq!(
        service.settle_with(&trip_id, &id("cho"), &id("ana"), "", 2),
        Err(LedgerError::NothingToSettle {
            user: id("cho"),
            counterpart: id("ana"),
        })
    );
    assert_eq!(store.settlements("trip").len(), 1);

    let historical = service
        .balance_between(&trip_id, &id("cho"), &id("ana"))
        .expect("members exist");
    assert_eq!(historical, money("-200"));
}

#[rstest]
fn settling_with_a_debtor_makes_them_pay(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let settlement = service
        .settle_with(&GroupId::from("trip"), &id("ben"), &id("cho"), "", 5)
        .expect("cho owes ben");

    assert_eq!(settlement.parties(), Some((&id("cho"), &id("ben"))));
    assert_eq!(settlement.amount, money("40"));
}

#[rstest]
fn settling_requires_an_open_balance() {
    let mut group = flat();
    group.expenses.clear();
    let store = FakeStore::new(vec![group]);
    let service = LedgerService::new(&store, &store);

    let result = service.settle_with(&GroupId::from("flat"), &id("ana"), &id("dev"), "", 0);
    assert_eq!(
        result,
        Err(LedgerError::NothingToSettle {
            user: id("ana"),
            counterpart: id("dev"),
        })
    );
}

#[rstest]
fn settling_with_yourself_is_rejected(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let result = service.settle_with(&GroupId::from("trip"), &id("ana"), &id("ana"), "", 0);
    assert!(matches!(result, Err(LedgerError::InvalidSettlement(_))));
}

#[rstest]
fn recording_every_suggestion_settles_the_group(store: FakeStore) {
    let service = LedgerService::new(&store, &store);
    let trip_id = GroupId::from("trip");

    let summary = service.group_summary(&trip_id).expect("group exists");
    for transaction in &summary.transactions {
        service
            .record_transaction(&trip_id, transaction, "", 0)
            .expect("recorded");
    }

    let settled = service.group_summary(&trip_id).expect("group exists");
    assert!(settled.is_settled());
    assert!(settled.balances.values().all(|balance| balance.is_zero()));
}

#[rstest]
#[case::same_party(Transaction { from: id("ana"), to: id("ana"), amount: money("1") })]
#[case::zero_amount(Transaction { from: id("ben"), to: id("ana"), amount: Money::ZERO })]
fn malformed_transactions_are_rejected(store: FakeStore, #[case] transaction: Transaction) {
    let service = LedgerService::new(&store, &store);
    let result = service.record_transaction(&GroupId::from("trip"), &transaction, "", 0);
    assert!(matches!(result, Err(LedgerError::InvalidSettlement(_))));
    assert!(store.settlements("trip").is_empty());
}

#[rstest]
fn storage_failures_surface(store: FakeStore) {
    let service = LedgerService::new(&store, &FailingRecorder);
    let transaction = Transaction {
        from: id("ben"),
        to: id("ana"),
        amount: money("40"),
    };
    let result = service.record_transaction(&GroupId::from("trip"), &transaction, "", 0);
    assert_eq!(
        result,
        Err(LedgerError::Storage(StorageError::Backend(
            "disk full".to_owned()
        )))
    );
}
