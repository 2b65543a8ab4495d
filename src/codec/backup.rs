//! Full-fidelity backup documents: `{ "history": [...], "userName": "..." }`.
//!
//! The same document shape is used for the persisted state file. Import is
//! all-or-nothing: a document either decodes completely or is rejected
//! without touching the current store.

use serde::{Deserialize, Serialize};

use crate::domain::MonthlyRecord;
use crate::errors::{JarsError, Result};
use crate::ledger::{RawRecord, RecordStore, StoreIntent};

/// A decoded backup, still unhydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub history: Vec<RawRecord>,
    #[serde(default)]
    pub user_name: String,
}

impl BackupDocument {
    pub fn from_store(store: &RecordStore) -> Self {
        Self {
            history: store.records().iter().map(RawRecord::from).collect(),
            user_name: store.user_name().to_string(),
        }
    }

    /// The restore intent that replaces a store with this document.
    pub fn into_intent(self) -> StoreIntent {
        StoreIntent::Restore {
            history: self.history,
            user_name: self.user_name,
        }
    }

    pub fn into_store(self) -> RecordStore {
        let mut store = RecordStore::default();
        store.apply(self.into_intent());
        store
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupView<'a> {
    history: &'a [MonthlyRecord],
    user_name: &'a str,
}

/// Serializes the complete store, catalog metadata included.
pub fn encode_backup(store: &RecordStore) -> Result<String> {
    let view = BackupView {
        history: store.records(),
        user_name: store.user_name(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

pub fn decode_backup(text: &str) -> Result<BackupDocument> {
    let document: BackupDocument = serde_json::from_str(text)?;
    if document.history.is_empty() {
        return Err(JarsError::Storage(
            "backup document contains no monthly records".into(),
        ));
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JarId, MonthKey};

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn populated_store() -> RecordStore {
        let mut store = RecordStore::new(key("2024-01"));
        store.set_user_name("Bảo");
        store.add_income(key("2024-01"), 1200.0, "salary");
        store.add_expense(key("2024-01"), JarId::Nec, 300.0, "rent");
        store.set_jar_percentage(key("2024-01"), JarId::Play, 15);
        store.add_month();
        store.add_expense(key("2024-02"), JarId::Give, 20.0, "gift");
        store
    }

    #[test]
    fn encode_then_restore_reproduces_store() {
        let store = populated_store();
        let json = encode_backup(&store).unwrap();
        let restored = decode_backup(&json).unwrap().into_store();
        assert_eq!(restored, store);
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let json = encode_backup(&populated_store()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["userName"], "Bảo");
        assert_eq!(value["history"][0]["month"], "2024-01");
        assert_eq!(value["history"][0]["expenses"][0]["jarId"], "NEC");
        assert_eq!(value["history"][0]["jars"][4]["percentage"], 15);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(decode_backup("not json").is_err());
        assert!(decode_backup(r#"{"userName":"x"}"#).is_err());
        assert!(decode_backup(r#"{"history":[],"userName":"x"}"#).is_err());
        assert!(decode_backup(r#"{"history":[{"month":"January"}]}"#).is_err());
    }

    #[test]
    fn restore_hydrates_unknown_jars_away() {
        let json = r#"{
            "history": [{
                "month": "2023-12",
                "incomes": [{"id": "i1", "amount": 100, "description": "pay"}],
                "expenses": [{"id": "e1", "jarId": "GIVE", "amount": 5, "description": "tip"}],
                "jars": [{"id": "NEC", "percentage": 60}, {"id": "CRYPTO", "percentage": 40}]
            }],
            "userName": "Old"
        }"#;
        let store = decode_backup(json).unwrap().into_store();
        let record = store.record(key("2023-12")).unwrap();
        assert_eq!(record.jars.len(), 1);
        assert_eq!(record.jars[0].percentage, 60);
        assert_eq!(record.expenses.len(), 1);
    }
}
