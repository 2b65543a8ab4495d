/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Generates a fresh identifier for incomes and expenses.
pub(crate) fn new_entry_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
