pub mod common;
pub mod jar;
pub mod month;
pub mod record;

pub use common::{Displayable, Identifiable};
pub use jar::{catalog, default_jars, CatalogEntry, Jar, JarId};
pub use month::MonthKey;
pub use record::{Expense, Income, JarRef, MonthlyRecord};
