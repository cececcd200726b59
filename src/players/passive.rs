//! Player whose moves are supplied from outside.

use super::Player;
use crate::games::twenty_questions::{Answer, Decision, Exchange, PlayerKind, Role};
use crate::llm_client::LlmError;
use tracing::debug;

/// Externally driven player.
///
/// Input reaches the session through its action methods, so every
/// move-producing method here is a no-op.
#[derive(Debug, Clone)]
pub struct PassivePlayer {
    role: Role,
    history: Vec<Exchange>,
}

impl PassivePlayer {
    /// Creates a passive player for `role`.
    pub fn new(role: Role) -> Self {
        debug!(role = %role, "Creating passive player");
        Self {
            role,
            history: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Player for PassivePlayer {
    fn role(&self) -> Role {
        self.role
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Passive
    }

    fn history(&self) -> &[Exchange] {
        &self.history
    }

    fn record_interaction(&mut self, question: String, answer: Answer) {
        self.history.push(Exchange::new(question, answer));
    }

    async fn choose_secret(&mut self) -> Result<Option<String>, LlmError> {
        Ok(None)
    }

    async fn answer_question(&mut self, _secret: &str, _question: &str) -> Option<Answer> {
        None
    }

    async fn ask_question(&mut self) -> Option<String> {
        None
    }

    async fn make_guess(&mut self) -> Option<String> {
        None
    }

    async fn decide_action(&mut self, _question_count: u32) -> Option<Decision> {
        None
    }
}
