//! Normalization of free-form text into the game's closed vocabulary.
//!
//! Reasoning-service replies are chatty ("Yes, it is!", "I think it's a
//! kite."). These functions map them onto yes/no tokens, decisions, and bare
//! guess phrases.

use super::types::{Answer, Decision};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Leading filler and trailing punctuation stripped from automated guesses.
///
/// Applied in order, repeatedly, until nothing matches.
static GUESS_FILLER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^i (think|guess|believe) (that )?(it['’]?s |it is )?",
        r"(?i)^it['’]?s (probably |maybe )?",
        r"(?i)^it is (probably |maybe )?",
        r"(?i)^the (object|answer|thing) (is |might be )?",
        r"(?i)^(my guess is |i would say )",
        r"(?i)^is it (a |an )?",
        r"(?i)^could it be (a |an )?",
        r"(?i)^(a|an|the) ",
        r"[.?]$",
    ]
    .iter()
    .map(|pattern| {
        #[allow(clippy::unwrap_used)]
        Regex::new(pattern).unwrap()
    })
    .collect()
});

/// Maps any text onto yes or no.
///
/// Total: anything that does not start with "y" (after trimming and
/// lowercasing) is `No`, including the empty string.
#[instrument(level = "debug")]
pub fn normalize_yes_no(text: &str) -> Answer {
    let lowered = text.trim().to_lowercase();
    // "yes" is covered by the "y" prefix
    if lowered.starts_with('y') {
        Answer::Yes
    } else {
        Answer::No
    }
}

/// Parses a passive answerer's input, accepting only yes/no/y/n.
#[instrument(level = "debug")]
pub fn parse_strict_answer(text: &str) -> Option<Answer> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(Answer::Yes),
        "no" | "n" => Some(Answer::No),
        _ => None,
    }
}

/// Interprets a decision reply from the reasoning service.
#[instrument(level = "debug")]
pub fn parse_decision(text: &str) -> Decision {
    let lowered = text.trim().to_lowercase();
    if lowered.starts_with("guess") || lowered == "g" {
        Decision::Guess
    } else {
        Decision::Question
    }
}

/// Strips conversational filler from a guess.
///
/// Never returns an empty string: if stripping consumes everything, the
/// original input comes back untouched.
#[instrument(level = "debug")]
pub fn clean_guess(text: &str) -> String {
    let mut cleaned = text.trim().to_string();

    loop {
        let before = cleaned.clone();
        for pattern in GUESS_FILLER.iter() {
            if cleaned.is_empty() {
                break;
            }
            cleaned = pattern.replace(&cleaned, "").trim().to_string();
        }
        if cleaned == before || cleaned.is_empty() {
            break;
        }
    }

    if cleaned.is_empty() {
        debug!("Cleanup emptied the guess, keeping original");
        text.to_string()
    } else {
        cleaned
    }
}

/// Tidies a chosen secret object.
///
/// Only surrounding quotes and trailing punctuation go; articles and wording
/// are kept as given.
#[instrument(level = "debug")]
pub fn clean_secret(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '?', '!'])
        .trim()
        .trim_matches(['"', '\'', '`'])
        .trim()
        .to_string()
}
