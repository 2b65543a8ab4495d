//! Contract with the external advice service.
//!
//! The service receives a free-text description of the user's situation plus
//! the selected month's jar configuration and answers with free text. Calls are
//! never retried here; responses are matched to the request that asked for
//! them by [`AdviceTracker`].

pub mod tracker;

use thiserror::Error;

use crate::domain::Jar;

pub use tracker::{AdviceState, AdviceTracker, RequestToken};

/// Input handed to an [`AdviceProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    pub situation: String,
    pub jars: Vec<Jar>,
}

impl AdviceRequest {
    pub fn new(situation: impl Into<String>, jars: Vec<Jar>) -> Self {
        Self {
            situation: situation.into(),
            jars,
        }
    }

    /// Plain-text prompt describing the jars and the user's situation.
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(
            "You are a personal finance coach using the six jars method.\nCurrent jars:\n",
        );
        for jar in &self.jars {
            prompt.push_str(&format!(
                "- {} ({}): {}% - {}\n",
                jar.name, jar.id, jar.percentage, jar.description
            ));
        }
        prompt.push_str("\nSituation:\n");
        prompt.push_str(self.situation.trim());
        prompt.push_str("\n\nGive short, practical advice on how to use these jars.");
        prompt
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdviceError {
    /// The service could not be reached or did not answer.
    #[error("no response from the advice service: {0}")]
    NoResponse(String),
    #[error("advice service error: {0}")]
    Service(String),
}

impl AdviceError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AdviceError::NoResponse(_) => {
                "Could not reach the advice service. Check your connection and try again.".into()
            }
            AdviceError::Service(detail) => format!("The advice service failed: {}", detail),
        }
    }
}

/// Something that turns an [`AdviceRequest`] into advisory text.
pub trait AdviceProvider: Send + Sync {
    fn advise(&self, request: &AdviceRequest) -> Result<String, AdviceError>;
}

impl<F> AdviceProvider for F
where
    F: Fn(&AdviceRequest) -> Result<String, AdviceError> + Send + Sync,
{
    fn advise(&self, request: &AdviceRequest) -> Result<String, AdviceError> {
        self(request)
    }
}
