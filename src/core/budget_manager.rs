use tracing::{info, warn};

use crate::advice::{AdviceError, AdviceProvider, AdviceRequest, AdviceState, AdviceTracker, RequestToken};
use crate::codec::{backup, share};
use crate::core::balances::{AllocatedJar, BalanceCache, BalanceView};
use crate::core::report::{history_report, MonthlyReport};
use crate::domain::{Jar, JarId, JarRef, MonthKey};
use crate::errors::JarsError;
use crate::ledger::{IntentOutcome, RecordStore, StoreIntent};
use crate::storage::{BackupInfo, StateStorage};

/// Where the session's initial state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    SharedLink,
    Persisted,
    Fresh,
}

/// Facade that owns the record store and coordinates balances, persistence,
/// backups, share links, and advice requests.
///
/// Every change goes through [`BudgetManager::dispatch`]: the intent is applied
/// to a copy of the store, and only a real change replaces the current
/// snapshot, bumps the revision, and rewrites the persisted state. Persistence
/// failures are logged and never undo or fail the change.
pub struct BudgetManager {
    store: RecordStore,
    selected: MonthKey,
    revision: u64,
    balances: BalanceCache,
    advice: AdviceTracker,
    storage: Box<dyn StateStorage>,
    seed: SeedSource,
}

impl BudgetManager {
    /// Seeds a session. A valid share payload wins over persisted state, which
    /// wins over a fresh single-month store for `today`.
    pub fn open(storage: Box<dyn StateStorage>, share_payload: Option<&str>, today: MonthKey) -> Self {
        if let Some(payload) = share_payload {
            match share::decode_compact(payload) {
                Ok(shared) => {
                    info!(month = %today, "seeding session from shared link");
                    let manager = Self::with_store(storage, shared.into_store(today), SeedSource::SharedLink);
                    manager.persist();
                    return manager;
                }
                Err(err) => warn!(%err, "ignoring malformed share payload"),
            }
        }

        if let Some(store) = load_persisted(storage.as_ref()) {
            info!(months = store.records().len(), "restored persisted state");
            return Self::with_store(storage, store, SeedSource::Persisted);
        }

        info!(month = %today, "starting with a fresh record store");
        Self::with_store(storage, RecordStore::new(today), SeedSource::Fresh)
    }

    fn with_store(storage: Box<dyn StateStorage>, store: RecordStore, seed: SeedSource) -> Self {
        let selected = latest_month(&store);
        Self {
            store,
            selected,
            revision: 0,
            balances: BalanceCache::new(),
            advice: AdviceTracker::new(),
            storage,
            seed,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn seed_source(&self) -> SeedSource {
        self.seed
    }

    /// Increments on every change to the store.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn user_name(&self) -> &str {
        self.store.user_name()
    }

    pub fn selected_month(&self) -> MonthKey {
        self.selected
    }

    pub fn select_month(&mut self, month: MonthKey) -> bool {
        if self.store.record(month).is_none() {
            return false;
        }
        self.selected = month;
        true
    }

    /// Applies `intent`, then persists when it changed anything.
    pub fn dispatch(&mut self, intent: StoreIntent) -> IntentOutcome {
        let restoring = matches!(intent, StoreIntent::Restore { .. });
        let (next, outcome) = self.store.applied(intent);
        if !outcome.is_change() {
            return outcome;
        }
        self.store = next;
        self.revision += 1;
        if let IntentOutcome::MonthAdded(month) = outcome {
            self.selected = month;
        } else if restoring || self.store.record(self.selected).is_none() {
            self.selected = latest_month(&self.store);
        }
        self.persist();
        outcome
    }

    pub fn add_income(&mut self, amount: f64, description: impl Into<String>) -> Option<String> {
        created_id(self.dispatch(StoreIntent::AddIncome {
            month: self.selected,
            amount,
            description: description.into(),
        }))
    }

    pub fn edit_income(&mut self, id: &str, amount: f64, description: impl Into<String>) -> bool {
        self.dispatch(StoreIntent::EditIncome {
            month: self.selected,
            id: id.to_string(),
            amount,
            description: description.into(),
        })
        .is_change()
    }

    /// Callers confirm with the user before deleting.
    pub fn delete_income(&mut self, id: &str) -> bool {
        self.dispatch(StoreIntent::DeleteIncome {
            month: self.selected,
            id: id.to_string(),
        })
        .is_change()
    }

    pub fn add_expense(
        &mut self,
        jar: impl Into<JarRef>,
        amount: f64,
        description: impl Into<String>,
    ) -> Option<String> {
        created_id(self.dispatch(StoreIntent::AddExpense {
            month: self.selected,
            jar: jar.into(),
            amount,
            description: description.into(),
        }))
    }

    pub fn edit_expense(
        &mut self,
        id: &str,
        jar: impl Into<JarRef>,
        amount: f64,
        description: impl Into<String>,
    ) -> bool {
        self.dispatch(StoreIntent::EditExpense {
            month: self.selected,
            id: id.to_string(),
            jar: jar.into(),
            amount,
            description: description.into(),
        })
        .is_change()
    }

    /// Callers confirm with the user before deleting.
    pub fn delete_expense(&mut self, id: &str) -> bool {
        self.dispatch(StoreIntent::DeleteExpense {
            month: self.selected,
            id: id.to_string(),
        })
        .is_change()
    }

    pub fn set_jar_percentage(&mut self, jar: JarId, percentage: u8) -> bool {
        self.dispatch(StoreIntent::SetJarPercentage {
            month: self.selected,
            jar,
            percentage,
        })
        .is_change()
    }

    /// Appends the month after the latest one and selects it.
    pub fn add_month(&mut self) -> Option<MonthKey> {
        let intent = self.store.add_month_intent()?;
        match self.dispatch(intent) {
            IntentOutcome::MonthAdded(month) => Some(month),
            _ => None,
        }
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) -> bool {
        self.dispatch(StoreIntent::SetUserName(name.into())).is_change()
    }

    /// Balances for every month, recomputed only after a change.
    pub fn balances(&mut self) -> &BalanceView {
        self.balances.get(self.revision, &self.store)
    }

    pub fn allocations(&mut self, month: MonthKey) -> Vec<AllocatedJar> {
        self.balances().get(&month).cloned().unwrap_or_default()
    }

    pub fn selected_allocations(&mut self) -> Vec<AllocatedJar> {
        self.allocations(self.selected)
    }

    pub fn total_percentage(&self) -> u32 {
        self.store.total_percentage(self.selected).unwrap_or(0)
    }

    pub fn report(&mut self, month: MonthKey) -> Option<MonthlyReport> {
        let view = self.balances.get(self.revision, &self.store);
        self.store
            .record(month)
            .map(|record| MonthlyReport::build(record, view))
    }

    pub fn history_report(&mut self) -> Vec<MonthlyReport> {
        let view = self.balances.get(self.revision, &self.store);
        history_report(self.store.records(), view)
    }

    /// Compact payload for the selected month's jar configuration.
    pub fn share_payload(&self) -> String {
        let jars = self
            .store
            .record(self.selected)
            .map(|record| record.jars.as_slice())
            .unwrap_or_default();
        share::encode_compact(self.store.user_name(), jars)
    }

    pub fn share_url(&self, base_url: &str) -> Result<String, JarsError> {
        share::share_url(base_url, &self.share_payload())
    }

    pub fn export_backup(&self) -> Result<String, JarsError> {
        backup::encode_backup(&self.store)
    }

    pub fn write_backup(&self, note: Option<&str>) -> Result<BackupInfo, JarsError> {
        let document = self.export_backup()?;
        self.storage.write_backup(&document, note)
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, JarsError> {
        self.storage.list_backups()
    }

    /// Replaces the whole store with a backup document. A document that fails
    /// to decode leaves the current store untouched.
    pub fn restore_backup(&mut self, document: &str) -> Result<IntentOutcome, JarsError> {
        let decoded = backup::decode_backup(document)?;
        Ok(self.dispatch(decoded.into_intent()))
    }

    pub fn restore_named_backup(&mut self, name: &str) -> Result<IntentOutcome, JarsError> {
        let document = self.storage.read_backup(name)?;
        self.restore_backup(&document)
    }

    /// Starts an advice request for the selected month's jars.
    pub fn begin_advice(&mut self, situation: impl Into<String>) -> (RequestToken, AdviceRequest) {
        let request = AdviceRequest::new(situation, self.selected_jars());
        (self.advice.begin(), request)
    }

    /// Applies a response; stale tokens are ignored.
    pub fn complete_advice(&mut self, token: RequestToken, result: Result<String, AdviceError>) -> bool {
        self.advice.complete(token, result)
    }

    pub fn request_advice(&mut self, provider: &dyn AdviceProvider, situation: impl Into<String>) -> &AdviceState {
        let request = AdviceRequest::new(situation, self.selected_jars());
        self.advice.fetch(provider, &request)
    }

    pub fn advice_state(&self) -> &AdviceState {
        self.advice.state()
    }

    fn selected_jars(&self) -> Vec<Jar> {
        self.store
            .record(self.selected)
            .map(|record| record.jars.clone())
            .unwrap_or_default()
    }

    fn persist(&self) {
        let result = backup::encode_backup(&self.store)
            .and_then(|document| self.storage.save_state(&document));
        if let Err(err) = result {
            warn!(%err, "failed to persist state");
        }
    }
}

fn load_persisted(storage: &dyn StateStorage) -> Option<RecordStore> {
    let document = match storage.load_state() {
        Ok(Some(document)) => document,
        Ok(None) => return None,
        Err(err) => {
            warn!(%err, "could not read persisted state");
            return None;
        }
    };
    match backup::decode_backup(&document) {
        Ok(decoded) => Some(decoded.into_store()),
        Err(err) => {
            warn!(%err, "persisted state is malformed, starting fresh");
            None
        }
    }
}

fn latest_month(store: &RecordStore) -> MonthKey {
    store
        .latest()
        .map(|record| record.month)
        .unwrap_or_else(MonthKey::current)
}

fn created_id(outcome: IntentOutcome) -> Option<String> {
    match outcome {
        IntentOutcome::Created(id) => Some(id),
        _ => None,
    }
}
