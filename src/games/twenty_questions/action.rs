//! Move results and move errors.

use super::types::{Answer, GameStatus, Phase};
use crate::llm_client::LlmError;
use serde::{Deserialize, Serialize};

/// What a move did to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The secret object was set.
    ObjectSet,
    /// A question is waiting for a passive answerer.
    QuestionPending {
        /// The question asked.
        question: String,
    },
    /// A question was asked and answered.
    QuestionAnswered {
        /// The question asked.
        question: String,
        /// The normalized answer.
        answer: Answer,
    },
    /// A guess was compared with the secret.
    GuessResolved {
        /// The guess as compared.
        guess: String,
        /// Whether it named the secret.
        correct: bool,
    },
    /// The automated player produced nothing. Nothing changed; try again.
    NoMove,
    /// Nothing to automate; the game is waiting on someone else.
    Waiting {
        /// Whose output is awaited.
        phase: Phase,
    },
    /// The game is over; nothing changed.
    Finished {
        /// Final status.
        status: GameStatus,
    },
}

/// Kind of externally submitted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    /// Player 1 names the secret object.
    SetObject,
    /// Player 1 answers the pending question.
    AnswerQuestion,
    /// Player 2 asks a question.
    AskQuestion,
    /// Player 2 guesses.
    MakeGuess,
}

/// A move submitted on behalf of a passive player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct PlayerAction {
    /// Which move.
    pub action_type: ActionType,
    /// Object, answer, question, or guess text.
    #[serde(default)]
    pub content: String,
}

/// Error that can occur when validating or applying a move.
///
/// Every variant leaves the session unchanged.
#[derive(Debug, Clone, derive_more::Display, derive_more::From)]
pub enum GameError {
    /// Wrong phase or wrong role for the requested move.
    #[display("Illegal move: {}", _0)]
    IllegalMove(String),

    /// Empty, oversized or malformed content.
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),

    /// A passive answer that is not yes/no.
    #[display("Invalid answer: {}", _0)]
    InvalidAnswer(String),

    /// The reasoning service failed where no safe default exists.
    #[display("Reasoning service failure: {}", _0)]
    #[from]
    ReasoningService(LlmError),

    /// No session with this id.
    #[display("Session not found: {}", _0)]
    SessionNotFound(String),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::ReasoningService(e) => Some(e),
            _ => None,
        }
    }
}
