//! Per-month records: incomes, expenses, and that month's jar configuration.

use serde::{Deserialize, Serialize};

use crate::domain::{
    common::{new_entry_id, Displayable, Identifiable},
    jar::{default_jars, Jar, JarId},
    month::MonthKey,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub amount: f64,
    pub description: String,
}

impl Income {
    pub fn new(amount: f64, description: impl Into<String>) -> Self {
        Self {
            id: new_entry_id(),
            amount,
            description: description.into(),
        }
    }
}

impl Identifiable for Income {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Income {
    fn display_label(&self) -> String {
        format!("{:.2} {}", self.amount, self.description)
    }
}

/// The jar an expense is tagged with.
///
/// Persisted data may name categories this build does not know; those
/// expenses are kept verbatim but never count towards any jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JarRef {
    Known(JarId),
    Unrecognized(String),
}

impl JarRef {
    pub fn jar_id(&self) -> Option<JarId> {
        match self {
            JarRef::Known(id) => Some(*id),
            JarRef::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JarRef::Known(id) => id.as_str(),
            JarRef::Unrecognized(raw) => raw,
        }
    }
}

impl From<JarId> for JarRef {
    fn from(id: JarId) -> Self {
        JarRef::Known(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub jar_id: JarRef,
    pub amount: f64,
    pub description: String,
}

impl Expense {
    pub fn new(jar_id: impl Into<JarRef>, amount: f64, description: impl Into<String>) -> Self {
        Self {
            id: new_entry_id(),
            jar_id: jar_id.into(),
            amount,
            description: description.into(),
        }
    }

    pub fn is_tagged(&self, jar: JarId) -> bool {
        self.jar_id == JarRef::Known(jar)
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!(
            "[{}] {:.2} {}",
            self.jar_id.as_str(),
            self.amount,
            self.description
        )
    }
}

/// One calendar month's incomes, expenses, and jar percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month: MonthKey,
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub jars: Vec<Jar>,
}

impl MonthlyRecord {
    /// An empty month using the catalog's default jars.
    pub fn new(month: MonthKey) -> Self {
        Self::with_jars(month, default_jars())
    }

    pub fn with_jars(month: MonthKey, jars: Vec<Jar>) -> Self {
        Self {
            month,
            incomes: Vec::new(),
            expenses: Vec::new(),
            jars,
        }
    }

    pub fn total_income(&self) -> f64 {
        self.incomes.iter().map(|income| income.amount).sum()
    }

    /// Sum of the expenses tagged to `jar` this month.
    pub fn spent_from(&self, jar: JarId) -> f64 {
        self.expenses
            .iter()
            .filter(|expense| expense.is_tagged(jar))
            .map(|expense| expense.amount)
            .sum()
    }

    pub fn total_spent(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    /// Sum of the configured percentages. Not required to equal 100.
    pub fn total_percentage(&self) -> u32 {
        self.jars.iter().map(|jar| jar.percentage as u32).sum()
    }

    pub fn jar(&self, id: JarId) -> Option<&Jar> {
        self.jars.iter().find(|jar| jar.id == id)
    }

    pub fn income(&self, id: &str) -> Option<&Income> {
        self.incomes.iter().find(|income| income.id == id)
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }
}
