//! Prompt construction for automated players.

use super::types::{Exchange, MAX_QUESTIONS};
use crate::llm_client::ChatMessage;
use std::fmt::Write;

const GAME_RULES: &str = "You are playing Twenty Questions. Player 1 thinks of a \
common physical object. Player 2 has twenty turns, shared between yes/no questions \
and guesses, to name it.";

/// Appends the question/answer transcript in the order it happened.
fn transcript(history: &[Exchange]) -> String {
    let mut out = String::new();
    if history.is_empty() {
        out.push_str("No questions have been asked yet.\n");
        return out;
    }
    out.push_str("Questions and answers so far:\n");
    for exchange in history {
        // Writing to a String cannot fail
        let _ = writeln!(out, "Q: {}\nA: {}", exchange.question(), exchange.answer());
    }
    out
}

/// Player 1 picks the secret object.
pub fn choose_secret() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GAME_RULES),
        ChatMessage::user(
            "You are Player 1. Pick one random, concrete, everyday object that most \
             people know (an animal, food, tool, toy, vehicle, household item and so on). \
             Prefer a single plain noun such as \"kite\" over a qualified one such as \
             \"red kite\". Reply with the object name only.",
        ),
    ]
}

/// Player 1 answers a question about its secret.
pub fn answer_question(secret: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GAME_RULES),
        ChatMessage::user(format!(
            "You are Player 1 and your object is: {secret}\n\n\
             Player 2 asks: {question}\n\n\
             Answer truthfully for your object. Reply with only \"yes\" or \"no\"."
        )),
    ]
}

/// Player 2 asks its next question.
pub fn ask_question(history: &[Exchange]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GAME_RULES),
        ChatMessage::user(format!(
            "You are Player 2. Ask one yes/no question that splits the remaining \
             possibilities as evenly as you can, starting broad and narrowing down.\n\n\
             {}\nReply with the question only.",
            transcript(history)
        )),
    ]
}

/// Player 2 names its best candidate.
pub fn make_guess(history: &[Exchange]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GAME_RULES),
        ChatMessage::user(format!(
            "You are Player 2. Name the single object most consistent with every \
             answer below.\n\n{}\nReply with the object name only, without any \
             preamble.",
            transcript(history)
        )),
    ]
}

/// Player 2 chooses between asking and guessing.
pub fn decide_action(question_count: u32, history: &[Exchange]) -> Vec<ChatMessage> {
    let remaining = MAX_QUESTIONS.saturating_sub(question_count);
    vec![
        ChatMessage::system(GAME_RULES),
        ChatMessage::user(format!(
            "You are Player 2 with {remaining} turns left. If the answers below point \
             to one object with confidence, reply \"guess\". If several objects still \
             fit, reply \"question\".\n\n{}\nReply with exactly one word: guess or \
             question.",
            transcript(history)
        )),
    ]
}
