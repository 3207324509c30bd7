//! One request/response cycle at a time
//!
//! The controller owns the transcript. A submission appends the user's turn
//! immediately, then a background task asks the provider for a reply. The UI
//! polls for completion and the controller records either the reply or the
//! fallback message. While a request is in flight further submissions are
//! ignored.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::ai::{LlmClient, ServiceError};
use crate::context::{ContextWindow, ContextWindowBuilder};
use crate::persona::FALLBACK_MESSAGE;
use crate::redact::redact_secrets;
use crate::state::{PendingState, Speaker, Turn};
use crate::transcript::TranscriptStore;

type ReplyTask = JoinHandle<Result<String, ServiceError>>;

pub struct TurnController {
    transcript: TranscriptStore,
    builder: ContextWindowBuilder,
    client: Arc<dyn LlmClient>,
    state: PendingState,
    in_flight: Option<ReplyTask>,
    last_window: Option<ContextWindow>,
    fallback_message: String,
    request_timeout: Option<Duration>,
}

impl TurnController {
    pub fn new(client: Arc<dyn LlmClient>, builder: ContextWindowBuilder) -> Self {
        Self {
            transcript: TranscriptStore::new(),
            builder,
            client,
            state: PendingState::Idle,
            in_flight: None,
            last_window: None,
            fallback_message: FALLBACK_MESSAGE.to_string(),
            request_timeout: None,
        }
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Treat a request that has not completed within `timeout` as failed.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn transcript(&self) -> &[Turn] {
        self.transcript.all()
    }

    pub fn state(&self) -> PendingState {
        self.state
    }

    pub fn client(&self) -> &dyn LlmClient {
        self.client.as_ref()
    }

    pub fn context_builder(&self) -> &ContextWindowBuilder {
        &self.builder
    }

    /// The window sent with the most recent request, if any.
    pub fn last_window(&self) -> Option<&ContextWindow> {
        self.last_window.as_ref()
    }

    /// Start a turn. Returns `false` (and changes nothing) when `text` is
    /// blank or a reply is still pending; the caller keeps its input then.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, text: &str) -> bool {
        if self.state.is_awaiting() {
            debug!("submission ignored while awaiting a reply");
            return false;
        }
        if text.trim().is_empty() {
            return false;
        }

        self.transcript.append(Speaker::User, text);
        self.state = PendingState::AwaitingResponse;

        let window = self.builder.build(self.transcript.all());
        let prompt = window.prompt.clone();
        info!(
            provider = self.client.provider().as_str(),
            model = self.client.model(),
            turns = window.included_turns,
            dropped = window.dropped_turns,
            units = window.estimated_units,
            "dispatching prompt"
        );
        self.last_window = Some(window);

        let client = Arc::clone(&self.client);
        let timeout = self.request_timeout;
        self.in_flight = Some(tokio::spawn(async move {
            request_reply(client, prompt, timeout).await
        }));

        true
    }

    /// Record the reply if the in-flight request has finished. Never waits.
    pub async fn poll_response(&mut self) -> Option<Turn> {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return None;
        }
        self.wait_for_response().await
    }

    /// Wait for the in-flight request and record its outcome.
    pub async fn wait_for_response(&mut self) -> Option<Turn> {
        let task = self.in_flight.take()?;
        let outcome = match task.await {
            Ok(result) => result,
            Err(join_error) => Err(ServiceError::Aborted(join_error.to_string())),
        };
        Some(self.resolve(outcome))
    }

    /// Submit and wait for the reply in one step.
    pub async fn exchange(&mut self, text: &str) -> Option<Turn> {
        if !self.submit(text) {
            return None;
        }
        self.wait_for_response().await
    }

    fn resolve(&mut self, outcome: Result<String, ServiceError>) -> Turn {
        debug_assert!(self.state.is_awaiting());
        self.state = PendingState::Idle;

        match outcome {
            Ok(reply) => {
                info!(chars = reply.chars().count(), "reply received");
                self.transcript.append(Speaker::Bot, reply)
            }
            Err(err) => {
                error!(
                    target: "safechat::llm",
                    provider = self.client.provider().as_str(),
                    model = self.client.model(),
                    error = %redact_secrets(&err.to_string()),
                    "request failed, recorded fallback reply"
                );
                self.transcript
                    .append(Speaker::Bot, self.fallback_message.clone())
            }
        }
    }
}

async fn request_reply(
    client: Arc<dyn LlmClient>,
    prompt: String,
    timeout: Option<Duration>,
) -> Result<String, ServiceError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, client.submit_prompt(&prompt))
            .await
            .map_err(|_| ServiceError::Timeout(limit))?,
        None => client.submit_prompt(&prompt).await,
    }
}
