//! Game sessions and the store that owns them.
//!
//! [`GameSession`] is the turn-coordination state machine. Its fields are
//! private; every change goes through a transition method that validates the
//! move first and leaves the session untouched when it refuses.

use crate::games::twenty_questions::{
    ActionType, Answer, Decision, Exchange, GameError, GameStatus, MAX_GUESS_WORDS,
    MAX_QUESTIONS, MoveOutcome, Phase, PlayerAction, PlayerKind, Role, guess_matches,
    parse_strict_answer, status_after_guess, status_after_question, within_word_cap,
};
use crate::llm_client::{LlmClient, LlmError, LlmErrorKind};
use crate::players::{Player, build_player};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// A session behind its own lock, so moves on one session are serialized
/// without blocking the others.
pub type SharedSession = Arc<tokio::sync::Mutex<GameSession>>;

/// One game of Twenty Questions between two players.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    status: GameStatus,
    question_count: u32,
    secret_object: Option<String>,
    pending_question: Option<String>,
    first: Box<dyn Player>,
    second: Box<dyn Player>,
}

/// Read-only snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Session ID.
    pub id: SessionId,
    /// Outcome status.
    pub status: GameStatus,
    /// Whose output is awaited.
    pub phase: Phase,
    /// Turns used so far.
    pub question_count: u32,
    /// Turn budget.
    pub max_questions: u32,
    /// The secret, revealed only once the game is over.
    pub secret_object: Option<String>,
    /// Question awaiting a passive answer.
    pub pending_question: Option<String>,
    /// Kind of Player 1.
    pub player1_type: PlayerKind,
    /// Kind of Player 2.
    pub player2_type: PlayerKind,
    /// "Player 1" or "Player 2" once the game is over.
    pub winner: Option<String>,
    /// Resolved questions in order.
    pub history: Vec<Exchange>,
}

impl GameSession {
    /// Starts a session.
    ///
    /// An automated first player picks the secret now; if it cannot, the
    /// game cannot start and the failure is returned.
    #[instrument(skip(first, second), fields(first_kind = %first.kind(), second_kind = %second.kind()))]
    pub async fn start(
        id: SessionId,
        mut first: Box<dyn Player>,
        second: Box<dyn Player>,
    ) -> Result<Self, GameError> {
        if first.role() != Role::First || second.role() != Role::Second {
            return Err(GameError::IllegalMove(
                "Players must occupy the first and second seats".to_string(),
            ));
        }

        let secret_object = if first.kind().is_automated() {
            match first.choose_secret().await? {
                Some(secret) => Some(secret),
                None => {
                    return Err(GameError::ReasoningService(LlmError::new(
                        LlmErrorKind::MalformedResponse,
                        "Player 1 did not produce an object".to_string(),
                    )));
                }
            }
        } else {
            None
        };

        let session = Self {
            id,
            status: GameStatus::Playing,
            question_count: 0,
            secret_object,
            pending_question: None,
            first,
            second,
        };
        info!(session_id = %session.id, phase = %session.phase(), "Created game session");
        Ok(session)
    }

    /// Session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Outcome status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Turns used so far.
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// Question awaiting a passive answer.
    pub fn pending_question(&self) -> Option<&str> {
        self.pending_question.as_deref()
    }

    /// The questioner's view of the game so far.
    pub fn history(&self) -> &[Exchange] {
        self.second.history()
    }

    /// Player 1.
    pub fn first(&self) -> &dyn Player {
        self.first.as_ref()
    }

    /// Player 2.
    pub fn second(&self) -> &dyn Player {
        self.second.as_ref()
    }

    /// Whose output the game is waiting for.
    pub fn phase(&self) -> Phase {
        match self.status {
            GameStatus::Won => Phase::Won,
            GameStatus::Lost => Phase::Lost,
            GameStatus::Playing if self.secret_object.is_none() => Phase::WaitingForObject,
            GameStatus::Playing if self.pending_question.is_some() => Phase::WaitingForAnswer,
            GameStatus::Playing if self.second.kind().is_passive() => Phase::WaitingForQuestion,
            GameStatus::Playing => Phase::WaitingForDecision,
        }
    }

    /// Snapshot for callers outside the session.
    pub fn view(&self) -> GameView {
        let terminal = self.status.is_terminal();
        GameView {
            id: self.id.clone(),
            status: self.status,
            phase: self.phase(),
            question_count: self.question_count,
            max_questions: MAX_QUESTIONS,
            secret_object: if terminal {
                self.secret_object.clone()
            } else {
                None
            },
            pending_question: self.pending_question.clone(),
            player1_type: self.first.kind(),
            player2_type: self.second.kind(),
            winner: self.status.winner().map(|role| role.to_string()),
            history: self.history().to_vec(),
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Guards
    // ─────────────────────────────────────────────────────────────

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.status.is_terminal() {
            warn!(session_id = %self.id, status = %self.status, "Move on finished game");
            return Err(GameError::IllegalMove("Game is not in progress".to_string()));
        }
        Ok(())
    }

    fn secret(&self) -> Result<&str, GameError> {
        self.secret_object
            .as_deref()
            .ok_or_else(|| GameError::IllegalMove("The secret object has not been set".to_string()))
    }

    /// Player 2 may act: game running, secret set, nothing pending.
    fn ensure_questioner_turn(&self) -> Result<(), GameError> {
        self.ensure_playing()?;
        self.secret()?;
        if self.pending_question.is_some() {
            return Err(GameError::IllegalMove(
                "A question is already waiting for an answer".to_string(),
            ));
        }
        Ok(())
    }

    fn check_invariants(&self) {
        debug_assert!(self.question_count <= MAX_QUESTIONS);
        debug_assert!(
            self.status == GameStatus::Playing || self.pending_question.is_none(),
            "a finished game never carries a pending question"
        );
    }

    // ─────────────────────────────────────────────────────────────
    //  Transitions
    // ─────────────────────────────────────────────────────────────

    /// A passive Player 1 names the secret object.
    #[instrument(skip(self, text), fields(session_id = %self.id))]
    pub fn set_object(&mut self, text: &str) -> Result<MoveOutcome, GameError> {
        self.ensure_playing()?;
        if self.secret_object.is_some() {
            return Err(GameError::IllegalMove("The secret object is already set".to_string()));
        }
        if self.first.kind().is_automated() {
            return Err(GameError::IllegalMove(
                "Only a human Player 1 can set the object".to_string(),
            ));
        }
        let object = text.trim();
        if object.is_empty() {
            return Err(GameError::InvalidInput("Object required".to_string()));
        }

        self.secret_object = Some(object.to_string());
        info!("Secret object set");
        Ok(MoveOutcome::ObjectSet)
    }

    /// A passive Player 2 asks a question.
    ///
    /// An automated Player 1 answers within this call; a passive one leaves
    /// the question pending.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn ask_question(&mut self, text: &str) -> Result<MoveOutcome, GameError> {
        self.ensure_questioner_turn()?;
        if self.second.kind().is_automated() {
            return Err(GameError::IllegalMove(
                "Only a human Player 2 can ask questions".to_string(),
            ));
        }
        let question = text.trim();
        if question.is_empty() {
            return Err(GameError::InvalidInput("Question required".to_string()));
        }

        self.pose_question(question.to_string()).await
    }

    /// A passive Player 1 answers the pending question.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn answer_question(&mut self, text: &str) -> Result<MoveOutcome, GameError> {
        self.ensure_playing()?;
        if self.pending_question.is_none() {
            return Err(GameError::IllegalMove("No pending question".to_string()));
        }
        if self.first.kind().is_automated() {
            return Err(GameError::IllegalMove(
                "Only a human Player 1 can answer questions".to_string(),
            ));
        }
        let answer = parse_strict_answer(text)
            .ok_or_else(|| GameError::InvalidAnswer("Answer must be yes or no".to_string()))?;

        self.resolve_answer(answer)
    }

    /// An automated Player 2 chooses its next move. Changes nothing.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn decide_action(&mut self) -> Result<Decision, GameError> {
        self.ensure_questioner_turn()?;
        if self.second.kind().is_passive() {
            return Err(GameError::IllegalMove(
                "Only an automated Player 2 decides on its own".to_string(),
            ));
        }

        self.second
            .decide_action(self.question_count)
            .await
            .ok_or_else(|| GameError::IllegalMove("Player 2 cannot decide".to_string()))
    }

    /// A passive Player 2 guesses.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn make_guess(&mut self, text: &str) -> Result<MoveOutcome, GameError> {
        self.ensure_questioner_turn()?;
        if self.second.kind().is_automated() {
            return Err(GameError::IllegalMove(
                "Only a human Player 2 can make guesses".to_string(),
            ));
        }
        let guess = text.trim();
        if guess.is_empty() {
            return Err(GameError::InvalidInput("Guess required".to_string()));
        }
        if !within_word_cap(guess) {
            return Err(GameError::InvalidInput(format!(
                "A guess may have at most {} words",
                MAX_GUESS_WORDS
            )));
        }

        self.resolve_guess(guess.to_string())
    }

    /// Runs whatever automated step is due.
    ///
    /// Reports the phase instead of moving when a passive player is up.
    #[instrument(skip(self), fields(session_id = %self.id, question_count = self.question_count))]
    pub async fn advance(&mut self) -> Result<MoveOutcome, GameError> {
        if self.status.is_terminal() {
            return Ok(MoveOutcome::Finished {
                status: self.status,
            });
        }

        let phase = self.phase();
        if phase != Phase::WaitingForDecision {
            debug!(phase = %phase, "Waiting on a passive player");
            return Ok(MoveOutcome::Waiting { phase });
        }

        match self.decide_action().await? {
            Decision::Guess => match self.second.make_guess().await {
                Some(guess) => self.resolve_guess(guess),
                None => Ok(MoveOutcome::NoMove),
            },
            Decision::Question => match self.second.ask_question().await {
                Some(question) => self.pose_question(question).await,
                None => Ok(MoveOutcome::NoMove),
            },
        }
    }

    /// Applies an externally submitted move.
    #[instrument(skip(self, action), fields(session_id = %self.id, action_type = %action.action_type))]
    pub async fn apply(&mut self, action: &PlayerAction) -> Result<MoveOutcome, GameError> {
        match action.action_type {
            ActionType::SetObject => self.set_object(&action.content),
            ActionType::AnswerQuestion => self.answer_question(&action.content),
            ActionType::AskQuestion => self.ask_question(&action.content).await,
            ActionType::MakeGuess => self.make_guess(&action.content),
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Resolution
    // ─────────────────────────────────────────────────────────────

    async fn pose_question(&mut self, question: String) -> Result<MoveOutcome, GameError> {
        let secret = self.secret()?.to_string();
        self.pending_question = Some(question.clone());

        if self.first.kind().is_passive() {
            info!(question = %question, "Question waiting for an answer");
            return Ok(MoveOutcome::QuestionPending { question });
        }

        let answer = self
            .first
            .answer_question(&secret, &question)
            .await
            .unwrap_or(Answer::No);
        self.resolve_answer(answer)
    }

    fn resolve_answer(&mut self, answer: Answer) -> Result<MoveOutcome, GameError> {
        let question = self
            .pending_question
            .take()
            .ok_or_else(|| GameError::IllegalMove("No pending question".to_string()))?;

        self.question_count += 1;
        self.second.record_interaction(question.clone(), answer);
        self.status = status_after_question(self.question_count);
        self.check_invariants();

        info!(
            question_count = self.question_count,
            answer = %answer,
            status = %self.status,
            "Question answered"
        );
        Ok(MoveOutcome::QuestionAnswered { question, answer })
    }

    fn resolve_guess(&mut self, guess: String) -> Result<MoveOutcome, GameError> {
        let correct = guess_matches(&guess, self.secret()?);

        self.question_count += 1;
        self.status = status_after_guess(correct, self.question_count);
        self.check_invariants();

        info!(
            question_count = self.question_count,
            correct,
            status = %self.status,
            "Guess resolved"
        );
        Ok(MoveOutcome::GuessResolved { guess, correct })
    }
}

/// Live sessions plus every id that has been removed.
#[derive(Debug, Default)]
struct Registry {
    live: HashMap<SessionId, SharedSession>,
    retired: HashSet<SessionId>,
}

/// Owns every live session.
///
/// Ids are minted by [`SessionStore::create`]; an id maps to exactly one
/// session and is never reused after removal.
#[derive(Debug, Clone)]
pub struct SessionStore {
    registry: Arc<Mutex<Registry>>,
    client: LlmClient,
}

impl SessionStore {
    /// Creates an empty store whose automated players use `client`.
    #[instrument(skip(client))]
    pub fn new(client: LlmClient) -> Self {
        info!("Creating session store");
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            client,
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new game and stores it.
    ///
    /// The registry lock is not held while an automated Player 1 picks its
    /// object.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        first: PlayerKind,
        second: PlayerKind,
    ) -> Result<GameView, GameError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = GameSession::start(
            id,
            build_player(Role::First, first, &self.client),
            build_player(Role::Second, second, &self.client),
        )
        .await?;
        let view = session.view();
        self.insert(session)?;
        Ok(view)
    }

    /// Stores a started session under its own id.
    ///
    /// Refuses an id that is live or was removed earlier.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    fn insert(&self, session: GameSession) -> Result<SessionId, GameError> {
        let id = session.id().to_string();
        let mut registry = self.registry();
        if registry.live.contains_key(&id) || registry.retired.contains(&id) {
            warn!("Session id already used");
            return Err(GameError::IllegalMove(format!(
                "Session id already used: {}",
                id
            )));
        }
        registry
            .live
            .insert(id.clone(), Arc::new(tokio::sync::Mutex::new(session)));
        debug!(count = registry.live.len(), "Session stored");
        Ok(id)
    }

    /// Looks up a session.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<SharedSession, GameError> {
        self.registry().live.get(id).cloned().ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            GameError::SessionNotFound(id.to_string())
        })
    }

    /// Drops a session. Its id is never accepted again.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Result<(), GameError> {
        let mut registry = self.registry();
        if registry.live.remove(id).is_none() {
            return Err(GameError::SessionNotFound(id.to_string()));
        }
        registry.retired.insert(id.to_string());
        info!(session_id = id, "Session removed");
        Ok(())
    }

    /// Lists all session IDs.
    #[instrument(skip(self))]
    pub fn ids(&self) -> Vec<SessionId> {
        self.registry().live.keys().cloned().collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.registry().live.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
