pub mod ai;
pub mod config;
pub mod context;
pub mod controller;
pub mod logging;
pub mod persona;
pub mod provider;
pub mod redact;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use ai::{client_from_config, LlmClient, ServiceError};
pub use config::Config;
pub use context::{ContextBudget, ContextWindow, ContextWindowBuilder, SizeEstimator};
pub use controller::TurnController;
pub use provider::Provider;
pub use state::{PendingState, Speaker, Turn};
pub use transcript::TranscriptStore;
