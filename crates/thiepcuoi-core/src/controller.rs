//! The message-exchange state machine.
//!
//! ```text
//! Idle --send(valid, key present)--> Sending --reply text--> Idle (bot reply appended)
//!                                    Sending --no text----> Idle (fallback appended)
//!                                    Sending --failure----> Idle (notification only)
//! Idle --send(blank)--> Idle
//! Idle --send(no key)--> Idle (notification)
//! ```
//!
//! `Sending` is the only state with `busy == true` and it is never re-entered.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::ai::{Completion, CompletionBackend, CompletionRequest};
use crate::config::{ApiKey, ChatConfig};
use crate::error::{ExchangeError, ExchangeResult};
use crate::notify::{Notification, Notifier};
use crate::prompt::{system_prompt, FALLBACK_REPLY};
use crate::state::{ChatMessage, ExchangeSnapshot, Sender};
use crate::transcript::Transcript;

const EVENT_CAPACITY: usize = 64;

/// Change notifications for views. Subscribers redraw from
/// [`ExchangeController::snapshot`] or apply the event directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Appended(ChatMessage),
    Reset,
    BusyChanged(bool),
    InputChanged,
}

/// Which transition a `send` took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Bot reply appended.
    Replied,
    /// Provider answered without text; fallback apology appended.
    Fallback,
    /// Connection failure; only the user message was appended.
    Failed,
    /// Reply arrived after a reset and was dropped.
    Discarded,
    /// Never left `Idle` (blank input, busy, or no credential).
    Rejected(ExchangeError),
}

struct ExchangeState {
    transcript: Transcript,
    pending_input: String,
    busy: bool,
    /// Bumped on every reset; in-flight requests remember the value they started with.
    generation: u64,
}

struct Inner {
    config: ChatConfig,
    system_prompt: String,
    backend: Arc<dyn CompletionBackend>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ExchangeState>,
    events: broadcast::Sender<ChatEvent>,
}

/// Cheap-to-clone handle; all clones share one transcript.
#[derive(Clone)]
pub struct ExchangeController {
    inner: Arc<Inner>,
}

impl ExchangeController {
    pub fn new(
        config: ChatConfig,
        backend: Arc<dyn CompletionBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                config,
                system_prompt: system_prompt(),
                backend,
                notifier,
                state: Mutex::new(ExchangeState {
                    transcript: Transcript::new(),
                    pending_input: String::new(),
                    busy: false,
                    generation: 0,
                }),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    pub fn snapshot(&self) -> ExchangeSnapshot {
        let state = self.lock();
        ExchangeSnapshot {
            messages: state.transcript.messages().to_vec(),
            pending_input: state.pending_input.clone(),
            busy: state.busy,
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().transcript.messages().to_vec()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn pending_input(&self) -> String {
        self.lock().pending_input.clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.update_input(|input| *input = text.into());
    }

    /// Edit the pending input in place.
    pub fn update_input<F>(&self, edit: F)
    where
        F: FnOnce(&mut String),
    {
        edit(&mut self.lock().pending_input);
        self.emit(ChatEvent::InputChanged);
    }

    /// Send whatever is in the pending input.
    pub async fn submit(&self) -> SendOutcome {
        let text = self.pending_input();
        self.send(text).await
    }

    pub async fn send(&self, text: impl Into<String>) -> SendOutcome {
        match self.begin(text) {
            Ok(pending) => pending.resolve().await,
            Err(err) => SendOutcome::Rejected(err),
        }
    }

    /// Run the synchronous half of a send: validate, append the user message
    /// and enter `Sending`. The returned exchange must be resolved to issue the
    /// request; dropping it unresolved releases the busy flag.
    pub fn begin(&self, text: impl Into<String>) -> ExchangeResult<PendingExchange> {
        let text = text.into();
        match self.try_begin(text) {
            Ok(pending) => Ok(pending),
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    fn try_begin(&self, text: String) -> ExchangeResult<PendingExchange> {
        if text.trim().is_empty() {
            return Err(ExchangeError::EmptyInput);
        }

        let mut state = self.lock();
        if state.busy {
            return Err(ExchangeError::Busy);
        }
        let api_key = self
            .inner
            .config
            .api_key
            .clone()
            .ok_or(ExchangeError::MissingCredential)?;

        let message = state.transcript.push(Sender::User, text.clone());
        state.pending_input.clear();
        state.busy = true;
        let generation = state.generation;
        drop(state);

        info!(id = %message.id, chars = text.chars().count(), "user message queued");
        self.emit(ChatEvent::Appended(message));
        self.emit(ChatEvent::InputChanged);
        self.emit(ChatEvent::BusyChanged(true));

        Ok(PendingExchange {
            controller: self.clone(),
            request: Some(self.request_for(api_key, text)),
            generation,
            settled: false,
        })
    }

    fn request_for(&self, api_key: ApiKey, user: String) -> CompletionRequest {
        CompletionRequest {
            api_key,
            system: self.inner.system_prompt.clone(),
            user,
        }
    }

    fn reject(&self, err: &ExchangeError) {
        match err {
            ExchangeError::MissingCredential => {
                warn!("send refused: no API key configured");
                self.inner.notifier.notify(Notification::missing_credential());
            }
            other => debug!(reason = %other, "send ignored"),
        }
    }

    /// Restore the transcript to the seeded greeting. Replies to requests
    /// issued before this point are discarded when they arrive.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.transcript.reset();
        state.generation += 1;
        let in_flight = state.busy;
        drop(state);

        info!(in_flight, "transcript cleared");
        self.emit(ChatEvent::Reset);
    }

    fn finish(&self, generation: u64, result: ExchangeResult<Completion>) -> SendOutcome {
        let mut state = self.lock();
        state.busy = false;
        let stale = state.generation != generation;

        let (outcome, appended, alert) = match result {
            Ok(_) if stale => {
                info!("reply arrived after reset; discarding");
                (SendOutcome::Discarded, None, None)
            }
            Ok(Completion::Text(text)) => {
                let message = state.transcript.push(Sender::Bot, text);
                (SendOutcome::Replied, Some(message), None)
            }
            Ok(Completion::Missing) => {
                warn!(error = %ExchangeError::MalformedReply, "using fallback reply");
                let message = state.transcript.push(Sender::Bot, FALLBACK_REPLY);
                (SendOutcome::Fallback, Some(message), None)
            }
            Err(err) => {
                error!(error = %err, stale, "exchange failed");
                (
                    SendOutcome::Failed,
                    None,
                    Some(Notification::connection_failure()),
                )
            }
        };
        drop(state);

        if let Some(message) = appended {
            debug!(id = %message.id, "bot message appended");
            self.emit(ChatEvent::Appended(message));
        }
        self.emit(ChatEvent::BusyChanged(false));
        if let Some(alert) = alert {
            self.inner.notifier.notify(alert);
        }
        outcome
    }

    fn abandon(&self) {
        let mut state = self.lock();
        if !state.busy {
            return;
        }
        state.busy = false;
        drop(state);

        warn!("exchange dropped before resolving");
        self.emit(ChatEvent::BusyChanged(false));
    }

    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, ExchangeState> {
        match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// An exchange in the `Sending` state, waiting to issue its request.
#[must_use = "the request is only sent when the exchange is resolved"]
pub struct PendingExchange {
    controller: ExchangeController,
    request: Option<CompletionRequest>,
    generation: u64,
    settled: bool,
}

impl PendingExchange {
    /// Issue the request and fold the result into the transcript.
    pub async fn resolve(mut self) -> SendOutcome {
        let Some(request) = self.request.take() else {
            return SendOutcome::Discarded;
        };

        let backend = Arc::clone(&self.controller.inner.backend);
        let result = backend.complete(request).await;
        self.settled = true;
        self.controller.finish(self.generation, result)
    }
}

impl Drop for PendingExchange {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon();
        }
    }
}
