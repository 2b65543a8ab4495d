//! Reconciles externally sourced records against the jar catalog.
//!
//! Backups, the persisted state file, and share links may carry data written by
//! older or newer builds. Saved jars are matched to the catalog by id: unknown
//! ids are dropped, catalog metadata replaces whatever was saved, and only the
//! percentage survives (falling back to the catalog default when missing).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{default_jars, Expense, Income, Jar, JarId, MonthKey, MonthlyRecord};

/// A saved jar entry before hydration. Any other saved fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJar {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

impl From<&Jar> for RawJar {
    fn from(jar: &Jar) -> Self {
        Self {
            id: Some(jar.id.as_str().to_string()),
            percentage: Some(jar.percentage as f64),
        }
    }
}

/// A saved monthly record before hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub month: MonthKey,
    #[serde(default)]
    pub incomes: Option<Vec<Income>>,
    #[serde(default)]
    pub expenses: Option<Vec<Expense>>,
    #[serde(default)]
    pub jars: Option<Vec<RawJar>>,
}

impl From<&MonthlyRecord> for RawRecord {
    fn from(record: &MonthlyRecord) -> Self {
        Self {
            month: record.month,
            incomes: Some(record.incomes.clone()),
            expenses: Some(record.expenses.clone()),
            jars: Some(record.jars.iter().map(RawJar::from).collect()),
        }
    }
}

/// Hydrates every record. Month uniqueness is enforced by the store.
pub fn hydrate_records(records: Vec<RawRecord>) -> Vec<MonthlyRecord> {
    records.into_iter().map(hydrate_record).collect()
}

pub fn hydrate_record(raw: RawRecord) -> MonthlyRecord {
    let jars = match raw.jars {
        Some(saved) => hydrate_jars(&saved),
        None => default_jars(),
    };
    MonthlyRecord {
        month: raw.month,
        incomes: raw.incomes.unwrap_or_default(),
        expenses: raw.expenses.unwrap_or_default(),
        jars,
    }
}

/// Overlays saved percentages onto catalog jars, preserving the saved order.
pub fn hydrate_jars(saved: &[RawJar]) -> Vec<Jar> {
    let mut seen = HashSet::new();
    saved
        .iter()
        .filter_map(|raw| {
            let code = raw.id.as_deref()?;
            let Some(id) = JarId::from_code(code) else {
                warn!(jar = code, "dropping saved jar missing from the catalog");
                return None;
            };
            if !seen.insert(id) {
                warn!(jar = code, "dropping duplicate saved jar");
                return None;
            }
            let percentage = raw
                .percentage
                .map(|value| saved_percentage(id, value))
                .unwrap_or(id.catalog_entry().default_percentage);
            Some(Jar::with_percentage(id, percentage))
        })
        .collect()
}

fn saved_percentage(id: JarId, value: f64) -> u8 {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=100.0).contains(&value) {
        value as u8
    } else {
        warn!(jar = %id, value, "saved percentage out of range, using catalog default");
        id.catalog_entry().default_percentage
    }
}
