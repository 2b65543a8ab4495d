//! Balance accumulation across the monthly history.
//!
//! Balances are never stored. They are a left fold over the records in
//! chronological order: each month adds `income * percentage / 100` to every
//! configured jar and subtracts that jar's tagged expenses, on top of the
//! balance the jar carried out of the previous month.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{Jar, JarId, MonthKey, MonthlyRecord};
use crate::ledger::RecordStore;

/// A jar's state at the end of one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedJar {
    #[serde(flatten)]
    pub jar: Jar,
    /// Running balance through this month, inclusive. May be negative.
    pub amount: f64,
    pub amount_added_this_month: f64,
    pub amount_spent_this_month: f64,
}

impl AllocatedJar {
    pub fn id(&self) -> JarId {
        self.jar.id
    }
}

/// Allocated jars for every month, keyed and ordered by month.
pub type BalanceView = BTreeMap<MonthKey, Vec<AllocatedJar>>;

pub fn compute_balances(store: &RecordStore) -> BalanceView {
    accumulate(store.records())
}

/// Folds `records` into per-month balances. Input order does not matter.
pub fn accumulate(records: &[MonthlyRecord]) -> BalanceView {
    let mut sorted: Vec<&MonthlyRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.month);

    let mut running: HashMap<JarId, f64> = HashMap::new();
    let mut view = BalanceView::new();

    for record in sorted {
        let total_income = record.total_income();
        let allocations = record
            .jars
            .iter()
            .map(|jar| {
                let added = total_income * f64::from(jar.percentage) / 100.0;
                let spent = record.spent_from(jar.id);
                let balance = running.entry(jar.id).or_insert(0.0);
                *balance += added - spent;
                AllocatedJar {
                    jar: jar.clone(),
                    amount: *balance,
                    amount_added_this_month: added,
                    amount_spent_this_month: spent,
                }
            })
            .collect();
        view.insert(record.month, allocations);
    }
    view
}

/// Memoized balance view, recomputed only when the store revision moves.
#[derive(Debug, Default)]
pub struct BalanceCache {
    revision: Option<u64>,
    view: BalanceView,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, revision: u64, store: &RecordStore) -> &BalanceView {
        if self.revision != Some(revision) {
            self.view = compute_balances(store);
            self.revision = Some(revision);
        }
        &self.view
    }

}
