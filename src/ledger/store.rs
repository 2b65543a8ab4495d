//! The record store: every monthly record plus the user's display name.
//!
//! Records are kept sorted by month with no duplicates. Every mutation is scoped
//! to a single month. A mutation that cannot apply (unknown month, unknown id,
//! invalid amount) leaves the store untouched and reports that nothing changed.

use tracing::debug;

use crate::domain::{Expense, Income, Jar, JarId, JarRef, MonthKey, MonthlyRecord};
use crate::ledger::hydrate::{hydrate_records, RawRecord};

/// A user intent expressed as data, applied with [`RecordStore::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreIntent {
    AddIncome {
        month: MonthKey,
        amount: f64,
        description: String,
    },
    EditIncome {
        month: MonthKey,
        id: String,
        amount: f64,
        description: String,
    },
    DeleteIncome {
        month: MonthKey,
        id: String,
    },
    AddExpense {
        month: MonthKey,
        jar: JarRef,
        amount: f64,
        description: String,
    },
    EditExpense {
        month: MonthKey,
        id: String,
        jar: JarRef,
        amount: f64,
        description: String,
    },
    DeleteExpense {
        month: MonthKey,
        id: String,
    },
    SetJarPercentage {
        month: MonthKey,
        jar: JarId,
        percentage: u8,
    },
    /// Append the month after `after`, copying its jars. Replaying the same
    /// intent is a no-op.
    AddMonth {
        after: MonthKey,
    },
    SetUserName(String),
    Restore {
        history: Vec<RawRecord>,
        user_name: String,
    },
}

/// What applying an intent did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Unchanged,
    Changed,
    /// A new income or expense was stored under this id.
    Created(String),
    MonthAdded(MonthKey),
}

impl IntentOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, IntentOutcome::Unchanged)
    }

    fn from_flag(changed: bool) -> Self {
        if changed {
            IntentOutcome::Changed
        } else {
            IntentOutcome::Unchanged
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<MonthlyRecord>,
    user_name: String,
}

impl RecordStore {
    /// A store holding a single default month and no user name.
    pub fn new(month: MonthKey) -> Self {
        Self {
            records: vec![MonthlyRecord::new(month)],
            user_name: String::new(),
        }
    }

    /// Builds a store from already hydrated records. Later duplicates of a
    /// month are discarded.
    pub fn from_records(records: Vec<MonthlyRecord>, user_name: impl Into<String>) -> Self {
        let mut store = Self {
            records: Vec::with_capacity(records.len()),
            user_name: user_name.into(),
        };
        for record in records {
            if store.position(record.month).is_ok() {
                debug!(month = %record.month, "dropping duplicate month record");
                continue;
            }
            store.insert_sorted(record);
        }
        store
    }

    pub fn records(&self) -> &[MonthlyRecord] {
        &self.records
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, month: MonthKey) -> Option<&MonthlyRecord> {
        self.position(month).ok().map(|index| &self.records[index])
    }

    /// Months in ascending order.
    pub fn months(&self) -> Vec<MonthKey> {
        self.records.iter().map(|record| record.month).collect()
    }

    pub fn latest(&self) -> Option<&MonthlyRecord> {
        self.records.last()
    }

    pub fn total_percentage(&self, month: MonthKey) -> Option<u32> {
        self.record(month).map(MonthlyRecord::total_percentage)
    }

    pub fn add_income(
        &mut self,
        month: MonthKey,
        amount: f64,
        description: impl Into<String>,
    ) -> Option<String> {
        if !valid_amount(amount) {
            debug!(%month, amount, "ignoring income with invalid amount");
            return None;
        }
        let record = self.record_mut(month)?;
        let income = Income::new(amount, description);
        let id = income.id.clone();
        record.incomes.push(income);
        Some(id)
    }

    pub fn edit_income(
        &mut self,
        month: MonthKey,
        id: &str,
        amount: f64,
        description: impl Into<String>,
    ) -> bool {
        if !valid_amount(amount) {
            debug!(%month, amount, "ignoring income edit with invalid amount");
            return false;
        }
        let Some(income) = self
            .record_mut(month)
            .and_then(|record| record.incomes.iter_mut().find(|income| income.id == id))
        else {
            return false;
        };
        income.amount = amount;
        income.description = description.into();
        true
    }

    pub fn delete_income(&mut self, month: MonthKey, id: &str) -> bool {
        let Some(record) = self.record_mut(month) else {
            return false;
        };
        let before = record.incomes.len();
        record.incomes.retain(|income| income.id != id);
        record.incomes.len() != before
    }

    pub fn add_expense(
        &mut self,
        month: MonthKey,
        jar: impl Into<JarRef>,
        amount: f64,
        description: impl Into<String>,
    ) -> Option<String> {
        if !valid_amount(amount) {
            debug!(%month, amount, "ignoring expense with invalid amount");
            return None;
        }
        let record = self.record_mut(month)?;
        let expense = Expense::new(jar, amount, description);
        let id = expense.id.clone();
        record.expenses.push(expense);
        Some(id)
    }

    pub fn edit_expense(
        &mut self,
        month: MonthKey,
        id: &str,
        jar: impl Into<JarRef>,
        amount: f64,
        description: impl Into<String>,
    ) -> bool {
        if !valid_amount(amount) {
            debug!(%month, amount, "ignoring expense edit with invalid amount");
            return false;
        }
        let Some(expense) = self
            .record_mut(month)
            .and_then(|record| record.expenses.iter_mut().find(|expense| expense.id == id))
        else {
            return false;
        };
        expense.jar_id = jar.into();
        expense.amount = amount;
        expense.description = description.into();
        true
    }

    pub fn delete_expense(&mut self, month: MonthKey, id: &str) -> bool {
        let Some(record) = self.record_mut(month) else {
            return false;
        };
        let before = record.expenses.len();
        record.expenses.retain(|expense| expense.id != id);
        record.expenses.len() != before
    }

    /// Changes one jar's percentage in one month only. Later months keep
    /// their own copies.
    pub fn set_jar_percentage(&mut self, month: MonthKey, jar: JarId, percentage: u8) -> bool {
        if percentage > 100 {
            debug!(%month, %jar, percentage, "ignoring percentage above 100");
            return false;
        }
        match self
            .record_mut(month)
            .and_then(|record| record.jars.iter_mut().find(|entry| entry.id == jar))
        {
            Some(entry) => {
                entry.percentage = percentage;
                true
            }
            None => false,
        }
    }

    /// Appends the month after the latest record, copying its jar
    /// configuration.
    pub fn add_month(&mut self) -> Option<MonthKey> {
        let latest = self.records.last()?.month;
        self.add_month_after(latest)
    }

    /// The intent `add_month` would apply against this snapshot.
    pub fn add_month_intent(&self) -> Option<StoreIntent> {
        self.records
            .last()
            .map(|record| StoreIntent::AddMonth {
                after: record.month,
            })
    }

    /// Creates the month following `after` with a copy of its jars. Returns
    /// `None` when that month already exists or `after` has no record.
    pub fn add_month_after(&mut self, after: MonthKey) -> Option<MonthKey> {
        let next = after.next()?;
        if self.position(next).is_ok() {
            debug!(month = %next, "month already exists");
            return None;
        }
        let jars: Vec<Jar> = self.record(after)?.jars.clone();
        self.insert_sorted(MonthlyRecord::with_jars(next, jars));
        Some(next)
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.user_name {
            return false;
        }
        self.user_name = name;
        true
    }

    /// Replaces the whole store with hydrated external records. Returns
    /// whether the contents differ from before. An empty history is ignored
    /// so the store always keeps at least one month.
    pub fn restore(&mut self, history: Vec<RawRecord>, user_name: impl Into<String>) -> bool {
        let records = hydrate_records(history);
        if records.is_empty() {
            debug!("ignoring restore with no monthly records");
            return false;
        }
        let restored = Self::from_records(records, user_name);
        let previous = std::mem::replace(self, restored);
        previous != *self
    }

    /// Applies `intent` in place.
    pub fn apply(&mut self, intent: StoreIntent) -> IntentOutcome {
        match intent {
            StoreIntent::AddIncome {
                month,
                amount,
                description,
            } => self
                .add_income(month, amount, description)
                .map_or(IntentOutcome::Unchanged, IntentOutcome::Created),
            StoreIntent::EditIncome {
                month,
                id,
                amount,
                description,
            } => IntentOutcome::from_flag(self.edit_income(month, &id, amount, description)),
            StoreIntent::DeleteIncome { month, id } => {
                IntentOutcome::from_flag(self.delete_income(month, &id))
            }
            StoreIntent::AddExpense {
                month,
                jar,
                amount,
                description,
            } => self
                .add_expense(month, jar, amount, description)
                .map_or(IntentOutcome::Unchanged, IntentOutcome::Created),
            StoreIntent::EditExpense {
                month,
                id,
                jar,
                amount,
                description,
            } => IntentOutcome::from_flag(self.edit_expense(month, &id, jar, amount, description)),
            StoreIntent::DeleteExpense { month, id } => {
                IntentOutcome::from_flag(self.delete_expense(month, &id))
            }
            StoreIntent::SetJarPercentage {
                month,
                jar,
                percentage,
            } => IntentOutcome::from_flag(self.set_jar_percentage(month, jar, percentage)),
            StoreIntent::AddMonth { after } => self
                .add_month_after(after)
                .map_or(IntentOutcome::Unchanged, IntentOutcome::MonthAdded),
            StoreIntent::SetUserName(name) => IntentOutcome::from_flag(self.set_user_name(name)),
            StoreIntent::Restore { history, user_name } => {
                IntentOutcome::from_flag(self.restore(history, user_name))
            }
        }
    }

    /// Applies `intent` to a copy, leaving `self` as it was.
    pub fn applied(&self, intent: StoreIntent) -> (RecordStore, IntentOutcome) {
        let mut next = self.clone();
        let outcome = next.apply(intent);
        (next, outcome)
    }

    fn position(&self, month: MonthKey) -> Result<usize, usize> {
        self.records
            .binary_search_by(|record| record.month.cmp(&month))
    }

    fn record_mut(&mut self, month: MonthKey) -> Option<&mut MonthlyRecord> {
        match self.position(month) {
            Ok(index) => Some(&mut self.records[index]),
            Err(_) => {
                debug!(%month, "no record for month");
                None
            }
        }
    }

    fn insert_sorted(&mut self, record: MonthlyRecord) {
        if let Err(index) = self.position(record.month) {
            self.records.insert(index, record);
        }
    }
}

fn valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn store() -> RecordStore {
        RecordStore::new(key("2024-01"))
    }

    #[test]
    fn add_income_appends_with_fresh_id() {
        let mut store = store();
        let first = store.add_income(key("2024-01"), 1000.0, "salary").unwrap();
        let second = store.add_income(key("2024-01"), 200.0, "bonus").unwrap();
        assert_ne!(first, second);
        let record = store.record(key("2024-01")).unwrap();
        assert_eq!(record.incomes.len(), 2);
        assert_eq!(record.incomes[1].description, "bonus");
    }

    #[test]
    fn mutations_on_missing_month_are_no_ops() {
        let mut store = store();
        let before = store.clone();
        assert!(store.add_income(key("2030-01"), 10.0, "x").is_none());
        assert!(store
            .add_expense(key("2030-01"), JarId::Nec, 10.0, "x")
            .is_none());
        assert!(!store.set_jar_percentage(key("2030-01"), JarId::Nec, 40));
        assert!(!store.delete_income(key("2030-01"), "nope"));
        assert_eq!(store, before);
    }

    #[test]
    fn edit_and_delete_by_id() {
        let mut store = store();
        let month = key("2024-01");
        let id = store.add_expense(month, JarId::Play, 50.0, "games").unwrap();
        assert!(store.edit_expense(month, &id, JarId::Edu, 45.0, "course"));
        let expense = store.record(month).unwrap().expense(&id).unwrap();
        assert_eq!(expense.jar_id, JarRef::Known(JarId::Edu));
        assert_eq!(expense.amount, 45.0);

        assert!(!store.edit_expense(month, "missing", JarId::Edu, 1.0, "x"));
        assert!(store.delete_expense(month, &id));
        assert!(!store.delete_expense(month, &id));
        assert!(store.record(month).unwrap().expenses.is_empty());
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        let mut store = store();
        let month = key("2024-01");
        assert!(store.add_income(month, -5.0, "refund").is_none());
        assert!(store.add_income(month, f64::NAN, "nan").is_none());
        let id = store.add_income(month, 5.0, "ok").unwrap();
        assert!(!store.edit_income(month, &id, f64::INFINITY, "inf"));
        assert_eq!(store.record(month).unwrap().incomes[0].amount, 5.0);
    }

    #[test]
    fn percentage_change_stays_in_its_month() {
        let mut store = store();
        store.add_month();
        assert!(store.set_jar_percentage(key("2024-02"), JarId::Nec, 40));
        assert_eq!(
            store.record(key("2024-01")).unwrap().jar(JarId::Nec).unwrap().percentage,
            55
        );
        assert_eq!(store.total_percentage(key("2024-02")), Some(85));
        assert!(!store.set_jar_percentage(key("2024-02"), JarId::Nec, 101));
    }

    #[test]
    fn add_month_copies_latest_configuration() {
        let mut store = store();
        store.set_jar_percentage(key("2024-01"), JarId::Give, 15);
        assert_eq!(store.add_month(), Some(key("2024-02")));
        let added = store.record(key("2024-02")).unwrap();
        assert_eq!(added.jar(JarId::Give).unwrap().percentage, 15);
        assert!(added.incomes.is_empty() && added.expenses.is_empty());
    }

    #[test]
    fn replayed_add_month_intent_creates_one_record() {
        let mut store = store();
        let intent = store.add_month_intent().unwrap();
        assert_eq!(
            store.apply(intent.clone()),
            IntentOutcome::MonthAdded(key("2024-02"))
        );
        assert_eq!(store.apply(intent), IntentOutcome::Unchanged);
        assert_eq!(store.months(), vec![key("2024-01"), key("2024-02")]);
    }

    #[test]
    fn add_month_follows_chronologically_latest_record() {
        let records = vec![
            MonthlyRecord::new(key("2024-03")),
            MonthlyRecord::new(key("2024-01")),
        ];
        let mut store = RecordStore::from_records(records, "");
        assert_eq!(store.months(), vec![key("2024-01"), key("2024-03")]);
        assert_eq!(store.add_month(), Some(key("2024-04")));
        assert_eq!(store.add_month_after(key("2024-03")), None);
        assert_eq!(store.add_month_after(key("2023-06")), None);

        let mut empty = RecordStore::default();
        assert_eq!(empty.add_month(), None);
        assert!(empty.add_month_intent().is_none());
    }

    #[test]
    fn from_records_keeps_first_duplicate() {
        let mut first = MonthlyRecord::new(key("2024-01"));
        first.incomes.push(Income::new(1.0, "first"));
        let second = MonthlyRecord::new(key("2024-01"));
        let store = RecordStore::from_records(vec![first.clone(), second], "Ana");
        assert_eq!(store.records(), &[first]);
        assert_eq!(store.user_name(), "Ana");
    }

    #[test]
    fn applied_leaves_original_snapshot_untouched() {
        let original = store();
        let intent = original.add_month_intent().unwrap();
        let (next, outcome) = original.applied(intent);
        assert_eq!(outcome, IntentOutcome::MonthAdded(key("2024-02")));
        assert_eq!(original.months().len(), 1);
        assert_eq!(next.months().len(), 2);

        let (same, outcome) = original.applied(StoreIntent::DeleteIncome {
            month: key("2024-01"),
            id: "missing".into(),
        });
        assert_eq!(outcome, IntentOutcome::Unchanged);
        assert_eq!(same, original);
    }

    #[test]
    fn restore_replaces_everything_and_reports_changes() {
        let mut original = store();
        original.add_income(key("2024-01"), 50.0, "gift");
        let history: Vec<RawRecord> = original.records().iter().map(RawRecord::from).collect();

        let mut target = RecordStore::new(key("2020-05"));
        assert!(target.restore(history.clone(), "Vy"));
        assert_eq!(target.months(), vec![key("2024-01")]);
        assert_eq!(target.user_name(), "Vy");
        assert!(!target.restore(history, "Vy"));
    }

    #[test]
    fn restore_without_months_keeps_the_store() {
        let mut original = store();
        original.add_income(key("2024-01"), 75.0, "refund");
        let before = original.clone();

        let outcome = original.apply(StoreIntent::Restore {
            history: Vec::new(),
            user_name: "Nobody".into(),
        });
        assert_eq!(outcome, IntentOutcome::Unchanged);
        assert_eq!(original, before);
        assert_eq!(original.add_month(), Some(key("2024-02")));
    }
}
