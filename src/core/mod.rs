//! Balance accumulation, reporting, and the application facade.

pub mod balances;
pub mod budget_manager;
pub mod report;
pub mod utils;

pub use balances::{accumulate, compute_balances, AllocatedJar, BalanceCache, BalanceView};
pub use budget_manager::{BudgetManager, SeedSource};
pub use report::{history_report, MonthlyReport};
