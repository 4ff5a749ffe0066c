//! Canned-response transport and envelope builders for tests.

mod test_helpers;

pub use test_helpers::{create_test_row, error_body, success_body};

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::D1MiddlewareError;
use crate::transport::{ExecutionRequest, Transport};
use crate::types::RowValues;

/// A request as the transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub sql: String,
    pub params: Vec<RowValues>,
}

#[derive(Debug)]
enum Canned {
    Body(String),
    TransportFailure(String),
}

/// Transport that replays queued responses in order and records every request.
///
/// Running out of queued responses is reported as a transport failure.
#[derive(Debug, Default)]
pub struct StaticTransport {
    responses: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StaticTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body(self, body: impl Into<String>) -> Self {
        self.push(Canned::Body(body.into()));
        self
    }

    #[must_use]
    pub fn with_transport_error(self, message: impl Into<String>) -> Self {
        self.push(Canned::TransportFailure(message.into()));
        self
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, canned: Canned) {
        match self.responses.lock() {
            Ok(mut guard) => guard.push_back(canned),
            Err(poisoned) => poisoned.into_inner().push_back(canned),
        }
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn execute_remote(
        &self,
        request: &ExecutionRequest<'_>,
    ) -> Result<String, D1MiddlewareError> {
        let recorded = RecordedRequest {
            sql: request.sql.to_string(),
            params: request.params.to_vec(),
        };
        match self.requests.lock() {
            Ok(mut guard) => guard.push(recorded),
            Err(poisoned) => poisoned.into_inner().push(recorded),
        }

        let next = match self.responses.lock() {
            Ok(mut guard) => guard.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        match next {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::TransportFailure(message)) => {
                Err(D1MiddlewareError::Transport(message))
            }
            None => Err(D1MiddlewareError::Transport(
                "no canned response queued".to_string(),
            )),
        }
    }
}
