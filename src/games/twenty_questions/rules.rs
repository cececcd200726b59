//! Turn accounting and guess matching.

use super::types::{GameStatus, MAX_QUESTIONS};
use tracing::instrument;

/// Longest guess, in whitespace-separated words, a passive guesser may submit.
pub const MAX_GUESS_WORDS: usize = 2;

/// Remaining turns before the budget is spent.
pub fn remaining_turns(question_count: u32) -> u32 {
    MAX_QUESTIONS.saturating_sub(question_count)
}

/// Turns left at or below which an automated guesser stops asking.
pub const FORCED_GUESS_THRESHOLD: u32 = 2;

/// Whether an automated guesser must guess now.
pub fn must_guess(question_count: u32) -> bool {
    remaining_turns(question_count) <= FORCED_GUESS_THRESHOLD
}

/// Whether `guess` names `secret`, ignoring case and one leading article.
///
/// Automated guesses lose their article during cleanup, so the secret side
/// is folded the same way.
#[instrument(level = "debug")]
pub fn guess_matches(guess: &str, secret: &str) -> bool {
    fold_article(&guess.to_lowercase()) == fold_article(&secret.to_lowercase())
}

fn fold_article(text: &str) -> &str {
    ["a ", "an ", "the "]
        .iter()
        .find_map(|article| text.strip_prefix(article))
        .unwrap_or(text)
}

/// Whether a passive guess is short enough to be a single object name.
pub fn within_word_cap(guess: &str) -> bool {
    guess.split_whitespace().count() <= MAX_GUESS_WORDS
}

/// Status after a question has been answered.
pub fn status_after_question(question_count: u32) -> GameStatus {
    if question_count >= MAX_QUESTIONS {
        GameStatus::Lost
    } else {
        GameStatus::Playing
    }
}

/// Status after a guess. A correct guess wins even on the final turn.
pub fn status_after_guess(correct: bool, question_count: u32) -> GameStatus {
    if correct {
        GameStatus::Won
    } else {
        status_after_question(question_count)
    }
}
