mod action;
mod normalize;
pub mod prompts;
mod rules;
mod types;

pub use action::{ActionType, GameError, MoveOutcome, PlayerAction};
pub use normalize::{
    clean_guess, clean_secret, normalize_yes_no, parse_decision, parse_strict_answer,
};
pub use rules::{
    FORCED_GUESS_THRESHOLD, MAX_GUESS_WORDS, guess_matches, must_guess, remaining_turns,
    status_after_guess, status_after_question, within_word_cap,
};
pub use types::{Answer, Decision, Exchange, GameStatus, MAX_QUESTIONS, Phase, PlayerKind, Role};
