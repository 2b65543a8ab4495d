#![doc(test(attr(deny(warnings))))]

//! Six Jars splits monthly income into six budget jars by percentage and keeps
//! a running balance for every jar across the months of a household history.

pub mod advice;
pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Six Jars tracing initialized.");
    });
}
