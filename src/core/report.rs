use serde::Serialize;

use crate::core::balances::{AllocatedJar, BalanceView};
use crate::domain::{MonthKey, MonthlyRecord};

/// Per-month totals alongside the allocated jars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: MonthKey,
    pub total_income: f64,
    pub total_spent: f64,
    pub total_percentage: u32,
    /// Sum of the running balances of every jar configured this month.
    pub total_balance: f64,
    pub jars: Vec<AllocatedJar>,
}

impl MonthlyReport {
    pub fn build(record: &MonthlyRecord, view: &BalanceView) -> Self {
        let jars = view.get(&record.month).cloned().unwrap_or_default();
        Self {
            month: record.month,
            total_income: record.total_income(),
            total_spent: record.total_spent(),
            total_percentage: record.total_percentage(),
            total_balance: jars.iter().map(|jar| jar.amount).sum(),
            jars,
        }
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.total_percentage == 100
    }
}

/// Reports for every record, oldest first.
pub fn history_report(records: &[MonthlyRecord], view: &BalanceView) -> Vec<MonthlyReport> {
    let mut reports: Vec<MonthlyReport> = records
        .iter()
        .map(|record| MonthlyReport::build(record, view))
        .collect();
    reports.sort_by_key(|report| report.month);
    reports
}
