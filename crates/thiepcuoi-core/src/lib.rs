pub mod ai;
pub mod config;
pub mod controller;
pub mod error;
pub mod notify;
pub mod prompt;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use ai::{Completion, CompletionBackend, CompletionRequest, OpenRouterClient};
pub use config::{ApiKey, ChatConfig, Config};
pub use controller::{ChatEvent, ExchangeController, PendingExchange, SendOutcome};
pub use error::{ExchangeError, ExchangeResult};
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, Severity};
pub use prompt::{system_prompt, FALLBACK_REPLY, GREETING};
pub use state::{ChatMessage, ExchangeSnapshot, MessageId, Sender};
pub use transcript::Transcript;
