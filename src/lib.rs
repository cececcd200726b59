//! Twenty Questions library - turn coordination for human and LLM players
//!
//! One player thinks of an object and answers yes/no questions; the other
//! asks questions and guesses. Either seat can be a person or an LLM.
//!
//! # Architecture
//!
//! - **Session**: the turn-coordination state machine and its store
//! - **Players**: passive (externally driven) and automated (LLM-driven) seats
//! - **LLM client**: provider HTTP transports behind a bounded retry policy
//! - **Server**: REST routes over the session store
//! - **Terminal**: line-based console play
//!
//! # Example
//!
//! ```no_run
//! use twenty_questions::{AppConfig, LlmClient, PlayerKind, SessionStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::default();
//! let client = LlmClient::new(config.create_llm_config(), config.retry_policy())?;
//! let store = SessionStore::new(client);
//! let view = store.create(PlayerKind::Automated, PlayerKind::Passive).await?;
//! println!("Started game {}", view.id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod games;
mod llm_client;
mod players;
mod retry;
mod server;
mod session;
mod terminal;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, LlmSettings, RetrySettings, ServerSettings};

// Crate-level exports - LLM client
pub use llm_client::{
    ChatMessage, ChatRole, CompletionTransport, HttpTransport, LlmClient, LlmConfig, LlmError,
    LlmErrorKind, LlmProvider,
};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};

// Crate-level exports - Players
pub use players::{AutomatedPlayer, PassivePlayer, Player, build_player};

// Crate-level exports - Sessions
pub use session::{GameSession, GameView, SessionId, SessionStore, SharedSession};

// Crate-level exports - Outer surfaces
pub use server::{ApiError, CreateGameRequest, GameServer, MoveResponse, SetObjectRequest};
pub use terminal::Console;

// Crate-level exports - Game types
pub use games::twenty_questions::{
    ActionType, Answer, Decision, Exchange, GameError, GameStatus, MAX_QUESTIONS, MoveOutcome,
    Phase, PlayerAction, PlayerKind, Role,
};
