use crate::notifications::{PushDelivery, PushError};
use async_trait::async_trait;
use cadenza_core::models::Subscription;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Scripted answer for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockPushOutcome {
    Gone,
    Rejected(u16),
    Transport,
}

/// Push delivery that records payloads and answers per endpoint.
/// Endpoints without a scripted outcome succeed.
#[derive(Clone, Default)]
pub struct RecordingPushDelivery {
    outcomes: Arc<Mutex<HashMap<String, MockPushOutcome>>>,
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingPushDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, endpoint: &str, outcome: MockPushOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), outcome);
    }

    /// `(endpoint, payload)` for every delivery attempt
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDelivery for RecordingPushDelivery {
    async fn deliver(&self, subscription: &Subscription, payload: &str) -> Result<(), PushError> {
        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.to_string()));

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&subscription.endpoint)
            .copied();
        match outcome {
            None => Ok(()),
            Some(MockPushOutcome::Gone) => Err(PushError::Gone(410)),
            Some(MockPushOutcome::Rejected(status)) => Err(PushError::Rejected {
                status,
                body: String::new(),
            }),
            Some(MockPushOutcome::Transport) => {
                Err(PushError::Transport("connection refused".to_string()))
            }
        }
    }
}
