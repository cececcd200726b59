//! Core domain types for Twenty Questions.

use serde::{Deserialize, Serialize};

/// Combined cap on questions and guesses.
pub const MAX_QUESTIONS: u32 = 20;

/// Seat at the table.
///
/// The first role thinks of the secret object and answers questions.
/// The second role asks questions and guesses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Object setter and answerer.
    #[strum(to_string = "Player 1")]
    First,
    /// Questioner and guesser.
    #[strum(to_string = "Player 2")]
    Second,
}

/// Who produces a player's moves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum PlayerKind {
    /// Moves arrive from outside (a person at a terminal or an HTTP client).
    #[serde(rename = "human")]
    #[strum(serialize = "human")]
    Passive,
    /// Moves are computed by the reasoning service.
    #[serde(rename = "llm")]
    #[strum(serialize = "llm")]
    Automated,
}

impl PlayerKind {
    /// Returns true for the externally driven variant.
    pub fn is_passive(self) -> bool {
        matches!(self, PlayerKind::Passive)
    }

    /// Returns true for the reasoning-service-driven variant.
    pub fn is_automated(self) -> bool {
        matches!(self, PlayerKind::Automated)
    }
}

/// Outcome status of a game. Terminal once `Won` or `Lost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Game in progress.
    Playing,
    /// The guesser named the secret object.
    Won,
    /// The turn budget ran out.
    Lost,
}

impl GameStatus {
    /// Returns true once the game can no longer change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Playing)
    }

    /// The role that won, if the game is over.
    pub fn winner(self) -> Option<Role> {
        match self {
            GameStatus::Playing => None,
            GameStatus::Won => Some(Role::Second),
            GameStatus::Lost => Some(Role::First),
        }
    }
}

/// Whose output the game is waiting for.
///
/// Derived from the session fields, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// The first role has not chosen the secret yet.
    WaitingForObject,
    /// A passive questioner must ask or guess.
    WaitingForQuestion,
    /// A question is pending for a passive answerer.
    WaitingForAnswer,
    /// An automated questioner must decide its next move.
    WaitingForDecision,
    /// The guesser won.
    Won,
    /// The turn budget ran out.
    Lost,
}

/// Canonical yes/no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Answer {
    /// Affirmative.
    Yes,
    /// Negative, and the default for anything ambiguous.
    No,
}

/// An automated questioner's choice for its next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    /// Ask another yes/no question.
    Question,
    /// Name the object.
    Guess,
}

/// One resolved question with its answer.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new, derive_getters::Getters,
)]
pub struct Exchange {
    /// The question as asked.
    question: String,
    /// The normalized answer.
    answer: Answer,
}
