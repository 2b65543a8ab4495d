//! The record store and hydration of externally sourced records.

pub mod hydrate;
pub mod store;

pub use hydrate::{hydrate_jars, hydrate_record, hydrate_records, RawJar, RawRecord};
pub use store::{IntentOutcome, RecordStore, StoreIntent};
