//! Recording completer for tests: no network, scripted outcome.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completer, LlmError, Provider, ProviderError, SamplingParams};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub provider: Provider,
    pub params: SamplingParams,
}

pub struct StubCompleter {
    reply: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubCompleter {
    /// Answers every call with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with an API error from the requested provider.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for StubCompleter {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        provider: Provider,
        params: SamplingParams,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
            provider,
            params,
        });

        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError {
                provider,
                cause: LlmError::Api {
                    status: 503,
                    message: "upstream unavailable".to_string(),
                },
            }),
        }
    }
}
