//! Player trait and implementations.
//!
//! A session owns two players. A [`PassivePlayer`] never computes a move:
//! its moves arrive through the session's external-action methods. An
//! [`AutomatedPlayer`] computes every move with the reasoning service.

mod automated;
mod passive;

pub use automated::AutomatedPlayer;
pub use passive::PassivePlayer;

use crate::games::twenty_questions::{Answer, Decision, Exchange, PlayerKind, Role};
use crate::llm_client::{LlmClient, LlmError};
use tracing::instrument;

/// Capabilities a seat at the table offers to the session.
///
/// Methods a variant cannot perform return `None`, meaning "no move produced".
#[async_trait::async_trait]
pub trait Player: Send + Sync + std::fmt::Debug {
    /// The seat this player occupies.
    fn role(&self) -> Role;

    /// Who produces this player's moves.
    fn kind(&self) -> PlayerKind;

    /// Question/answer pairs in the order they happened.
    fn history(&self) -> &[Exchange];

    /// Records a resolved question.
    fn record_interaction(&mut self, question: String, answer: Answer);

    /// Chooses the secret object.
    ///
    /// `Err` means the reasoning service failed and the game cannot start.
    async fn choose_secret(&mut self) -> Result<Option<String>, LlmError>;

    /// Answers `question` about `secret`.
    async fn answer_question(&mut self, secret: &str, question: &str) -> Option<Answer>;

    /// Produces the next question.
    async fn ask_question(&mut self) -> Option<String>;

    /// Produces a guess.
    async fn make_guess(&mut self) -> Option<String>;

    /// Chooses between asking and guessing with `question_count` turns used.
    async fn decide_action(&mut self, question_count: u32) -> Option<Decision>;
}

/// Builds the player variant for `kind`.
#[instrument(skip(client))]
pub fn build_player(role: Role, kind: PlayerKind, client: &LlmClient) -> Box<dyn Player> {
    match kind {
        PlayerKind::Passive => Box::new(PassivePlayer::new(role)),
        PlayerKind::Automated => Box::new(AutomatedPlayer::new(role, client.clone())),
    }
}
