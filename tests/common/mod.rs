//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use twenty_questions::{
    ChatMessage, CompletionTransport, LlmClient, LlmError, LlmErrorKind, RetryPolicy, Sleeper,
};

/// Which automated move a request is for, recognised from its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    Secret,
    Answer,
    Question,
    Guess,
    Decision,
    Other,
}

impl Prompt {
    pub fn of(messages: &[ChatMessage]) -> Self {
        let text = messages
            .last()
            .map(|message| message.content.as_str())
            .unwrap_or_default();
        if text.contains("Pick one random") {
            Prompt::Secret
        } else if text.contains("your object is") {
            Prompt::Answer
        } else if text.contains("Ask one yes/no question") {
            Prompt::Question
        } else if text.contains("Name the single object") {
            Prompt::Guess
        } else if text.contains("guess or") {
            Prompt::Decision
        } else {
            Prompt::Other
        }
    }
}

/// Transport that replies from per-prompt queues, then per-prompt defaults.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<Prompt, VecDeque<Result<String, LlmError>>>>,
    defaults: Mutex<HashMap<Prompt, String>>,
    calls: Mutex<Vec<(Prompt, Vec<ChatMessage>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reply used whenever the queue for `prompt` is empty.
    pub fn default_reply(self: &Arc<Self>, prompt: Prompt, reply: &str) -> Arc<Self> {
        self.defaults
            .lock()
            .unwrap()
            .insert(prompt, reply.to_string());
        Arc::clone(self)
    }

    /// Queues one reply for `prompt`.
    pub fn push(self: &Arc<Self>, prompt: Prompt, reply: Result<&str, LlmErrorKind>) -> Arc<Self> {
        let reply = reply
            .map(str::to_string)
            .map_err(|kind| LlmError::new(kind, format!("scripted {}", kind)));
        self.queued
            .lock()
            .unwrap()
            .entry(prompt)
            .or_default()
            .push_back(reply);
        Arc::clone(self)
    }

    /// Number of requests seen for `prompt`.
    pub fn count(&self, prompt: Prompt) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(seen, _)| *seen == prompt)
            .count()
    }

    /// Messages of the most recent request for `prompt`.
    pub fn last_request(&self, prompt: Prompt) -> Option<Vec<ChatMessage>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(seen, _)| *seen == prompt)
            .map(|(_, messages)| messages.clone())
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let prompt = Prompt::of(messages);
        self.calls.lock().unwrap().push((prompt, messages.to_vec()));

        if let Some(reply) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&prompt)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }

        match self.defaults.lock().unwrap().get(&prompt) {
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmError::new(
                LlmErrorKind::Configuration,
                format!("no scripted reply for {:?}", prompt),
            )),
        }
    }
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Base delay used by test clients.
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Client over `transport` with three attempts and a recording sleeper.
pub fn client(transport: &Arc<ScriptedTransport>) -> (LlmClient, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = LlmClient::with_transport(
        Arc::clone(transport) as Arc<dyn CompletionTransport>,
        RetryPolicy::new(3, BASE_DELAY),
        Arc::clone(&sleeper) as Arc<dyn Sleeper>,
    );
    (client, sleeper)
}

/// Transport for two automated players that never guess on their own.
pub fn cautious_players(secret: &str) -> Arc<ScriptedTransport> {
    ScriptedTransport::new()
        .default_reply(Prompt::Secret, secret)
        .default_reply(Prompt::Decision, "question")
        .default_reply(Prompt::Question, "Is it bigger than a breadbox?")
        .default_reply(Prompt::Answer, "No.")
        .default_reply(Prompt::Guess, "I think it's a kite.")
}
