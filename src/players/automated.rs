//! Player whose moves come from the reasoning service.

use super::Player;
use crate::games::twenty_questions::{
    Answer, Decision, Exchange, PlayerKind, Role, clean_guess, clean_secret, must_guess,
    normalize_yes_no, parse_decision, prompts,
};
use crate::llm_client::{LlmClient, LlmError};
use tracing::{debug, info, instrument, warn};

/// Reasoning-service-driven player.
///
/// Falls back to a safe default whenever one exists: "no" for answers,
/// "question" for decisions, and no move for questions and guesses.
#[derive(Debug, Clone)]
pub struct AutomatedPlayer {
    role: Role,
    client: LlmClient,
    history: Vec<Exchange>,
    chosen_secret: Option<String>,
}

impl AutomatedPlayer {
    /// Creates an automated player for `role`.
    pub fn new(role: Role, client: LlmClient) -> Self {
        debug!(role = %role, "Creating automated player");
        Self {
            role,
            client,
            history: Vec::new(),
            chosen_secret: None,
        }
    }

    /// The secret this player chose or was told about.
    pub fn chosen_secret(&self) -> Option<&str> {
        self.chosen_secret.as_deref()
    }
}

#[async_trait::async_trait]
impl Player for AutomatedPlayer {
    fn role(&self) -> Role {
        self.role
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Automated
    }

    fn history(&self) -> &[Exchange] {
        &self.history
    }

    fn record_interaction(&mut self, question: String, answer: Answer) {
        self.history.push(Exchange::new(question, answer));
    }

    #[instrument(skip(self), fields(role = %self.role))]
    async fn choose_secret(&mut self) -> Result<Option<String>, LlmError> {
        if self.role != Role::First {
            return Ok(None);
        }

        let raw = self.client.generate(&prompts::choose_secret()).await?;
        let secret = clean_secret(&raw);
        if secret.is_empty() {
            warn!("Reasoning service returned an empty object");
            return Ok(None);
        }

        info!("Secret object chosen");
        self.chosen_secret = Some(secret.clone());
        Ok(Some(secret))
    }

    #[instrument(skip(self, secret), fields(role = %self.role))]
    async fn answer_question(&mut self, secret: &str, question: &str) -> Option<Answer> {
        if self.role != Role::First {
            return None;
        }

        let secret = self
            .chosen_secret
            .get_or_insert_with(|| secret.to_string())
            .clone();

        match self
            .client
            .generate(&prompts::answer_question(&secret, question))
            .await
        {
            Ok(raw) => {
                let answer = normalize_yes_no(&raw);
                debug!(raw = %raw, answer = %answer, "Answered question");
                Some(answer)
            }
            Err(e) => {
                warn!(error = %e, "Answering failed, defaulting to no");
                Some(Answer::No)
            }
        }
    }

    #[instrument(skip(self), fields(role = %self.role, history_len = self.history.len()))]
    async fn ask_question(&mut self) -> Option<String> {
        if self.role != Role::Second {
            return None;
        }

        match self.client.generate(&prompts::ask_question(&self.history)).await {
            Ok(raw) => {
                let question = raw.trim();
                if question.is_empty() {
                    warn!("Reasoning service returned an empty question");
                    None
                } else {
                    Some(question.to_string())
                }
            }
            Err(e) => {
                warn!(error = %e, "Asking failed, no move produced");
                None
            }
        }
    }

    #[instrument(skip(self), fields(role = %self.role, history_len = self.history.len()))]
    async fn make_guess(&mut self) -> Option<String> {
        if self.role != Role::Second {
            return None;
        }

        match self.client.generate(&prompts::make_guess(&self.history)).await {
            Ok(raw) if raw.trim().is_empty() => {
                warn!("Reasoning service returned an empty guess");
                None
            }
            Ok(raw) => {
                let guess = clean_guess(&raw);
                debug!(raw = %raw, guess = %guess, "Guess produced");
                Some(guess)
            }
            Err(e) => {
                warn!(error = %e, "Guessing failed, no move produced");
                None
            }
        }
    }

    #[instrument(skip(self), fields(role = %self.role))]
    async fn decide_action(&mut self, question_count: u32) -> Option<Decision> {
        if self.role != Role::Second {
            return None;
        }

        if must_guess(question_count) {
            info!(question_count, "Turn budget nearly spent, forcing a guess");
            return Some(Decision::Guess);
        }

        let decision = match self
            .client
            .generate(&prompts::decide_action(question_count, &self.history))
            .await
        {
            Ok(raw) => parse_decision(&raw),
            Err(e) => {
                warn!(error = %e, "Deciding failed, defaulting to question");
                Decision::Question
            }
        };
        debug!(decision = %decision, "Decided next move");
        Some(decision)
    }
}
