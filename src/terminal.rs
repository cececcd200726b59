//! Line-based console game loop.

use crate::games::twenty_questions::{GameError, MoveOutcome, Phase};
use crate::session::{GameSession, GameView};
use anyhow::{Result, bail};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info, instrument, warn};

/// Consecutive automated turns without a move before the loop gives up.
const MAX_IDLE_TURNS: u32 = 3;

/// Plays one game on a console, prompting for every passive move.
///
/// A passive questioner types a question, or `guess <object>` to guess.
pub struct Console<R, W> {
    input: Lines<R>,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Creates a console over `input` and `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: input.lines(),
            output,
        }
    }

    /// Gives back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs `session` to completion and returns the final view.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn run(&mut self, session: &mut GameSession) -> Result<GameView> {
        info!("Starting console game");
        writeln!(
            self.output,
            "Twenty Questions: {} ({}) vs {} ({})",
            session.first().role(),
            session.first().kind(),
            session.second().role(),
            session.second().kind()
        )?;

        let mut idle_turns = 0;
        loop {
            let phase = session.phase();
            debug!(phase = %phase, question_count = session.question_count(), "Console turn");

            let result = match phase {
                Phase::Won | Phase::Lost => {
                    let view = session.view();
                    self.announce(&view)?;
                    return Ok(view);
                }
                Phase::WaitingForObject => {
                    let line = self.prompt("Player 1, think of an object: ").await?;
                    session.set_object(&line)
                }
                Phase::WaitingForAnswer => {
                    let question = session.pending_question().unwrap_or_default().to_string();
                    let line = self
                        .prompt(&format!("Q{}: {} (yes/no) ", session.question_count() + 1, question))
                        .await?;
                    session.answer_question(&line)
                }
                Phase::WaitingForQuestion => {
                    let line = self
                        .prompt(&format!(
                            "Question {} of {}, or 'guess <object>': ",
                            session.question_count() + 1,
                            crate::games::twenty_questions::MAX_QUESTIONS
                        ))
                        .await?;
                    match guess_command(&line) {
                        Some(guess) => session.make_guess(guess),
                        None => session.ask_question(&line).await,
                    }
                }
                Phase::WaitingForDecision => session.advance().await,
            };

            match result {
                Ok(MoveOutcome::NoMove) => {
                    idle_turns += 1;
                    warn!(idle_turns, "Automated player produced no move");
                    writeln!(self.output, "(no move produced, retrying)")?;
                    if idle_turns >= MAX_IDLE_TURNS {
                        bail!("Automated player produced no move {} times in a row", idle_turns);
                    }
                }
                Ok(outcome) => {
                    idle_turns = 0;
                    self.report(&outcome)?;
                }
                Err(GameError::ReasoningService(e)) => return Err(e.into()),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        match self.input.next_line().await? {
            Some(line) => Ok(line),
            None => bail!("Input closed before the game finished"),
        }
    }

    fn report(&mut self, outcome: &MoveOutcome) -> Result<()> {
        match outcome {
            MoveOutcome::ObjectSet => writeln!(self.output, "Object set.")?,
            MoveOutcome::QuestionPending { .. } => {}
            MoveOutcome::QuestionAnswered { question, answer } => {
                writeln!(self.output, "{} -> {}", question, answer)?
            }
            MoveOutcome::GuessResolved { guess, correct } => writeln!(
                self.output,
                "Guess: {} ({})",
                guess,
                if *correct { "correct" } else { "wrong" }
            )?,
            MoveOutcome::NoMove | MoveOutcome::Waiting { .. } | MoveOutcome::Finished { .. } => {}
        }
        Ok(())
    }

    fn announce(&mut self, view: &GameView) -> Result<()> {
        let winner = view.winner.as_deref().unwrap_or("Nobody");
        writeln!(
            self.output,
            "Game over after {} turns: {} wins. The object was {}.",
            view.question_count,
            winner,
            view.secret_object.as_deref().unwrap_or("unknown")
        )?;
        Ok(())
    }
}

/// Extracts the guess from `guess <object>`.
fn guess_command(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let prefix = trimmed.get(..6)?;
    if prefix.eq_ignore_ascii_case("guess ") {
        Some(trimmed[6..].trim())
    } else {
        None
    }
}
