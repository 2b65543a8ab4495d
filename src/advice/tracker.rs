use tracing::warn;

use super::{AdviceError, AdviceProvider, AdviceRequest};

/// Identifies one advice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

/// What the presentation layer should show for advice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdviceState {
    #[default]
    Idle,
    Loading(RequestToken),
    Ready(String),
    Failed(String),
}

/// Keeps only the newest request's result; anything older is discarded.
#[derive(Debug, Default)]
pub struct AdviceTracker {
    issued: u64,
    latest: Option<RequestToken>,
    state: AdviceState,
}

impl AdviceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding any outstanding one.
    pub fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.latest = Some(token);
        self.state = AdviceState::Loading(token);
        token
    }

    /// Records the outcome for `token`. Returns `false` and leaves the state
    /// alone when a newer request has started since.
    pub fn complete(&mut self, token: RequestToken, result: Result<String, AdviceError>) -> bool {
        if self.latest != Some(token) {
            warn!(?token, "discarding stale advice response");
            return false;
        }
        self.latest = None;
        self.state = match result {
            Ok(text) => AdviceState::Ready(text),
            Err(err) => AdviceState::Failed(err.user_message()),
        };
        true
    }

    /// Runs `request` against `provider` synchronously.
    pub fn fetch(&mut self, provider: &dyn AdviceProvider, request: &AdviceRequest) -> &AdviceState {
        let token = self.begin();
        let result = provider.advise(request);
        self.complete(token, result);
        &self.state
    }

    pub fn state(&self) -> &AdviceState {
        &self.state
    }
}
