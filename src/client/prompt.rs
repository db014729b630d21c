//! Username intake for the first connection.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use super::event::{ClientEvent, EventSender};

/// Source of the username when a server asks for it.
#[async_trait]
pub trait UsernamePrompt: Send + Sync {
    /// Ask the operator, showing the server's `prompt` text. `None` means
    /// the operator will never answer (input closed).
    async fn ask(&self, prompt: &str) -> Option<String>;
}

/// Operator input lines, shared by the prompt and the send loop.
pub type SharedInput = Arc<Mutex<mpsc::Receiver<String>>>;

/// Prompts through the event stream and answers from operator input.
pub struct ConsolePrompt {
    input: SharedInput,
    events: EventSender,
}

impl ConsolePrompt {
    pub fn new(input: SharedInput, events: EventSender) -> Self {
        Self { input, events }
    }
}

#[async_trait]
impl UsernamePrompt for ConsolePrompt {
    async fn ask(&self, prompt: &str) -> Option<String> {
        let mut input = self.input.lock().await;
        loop {
            let _ = self.events.send(ClientEvent::Prompt(prompt.to_string()));
            let line = input.recv().await?;
            let username = line.trim();
            if !username.is_empty() {
                return Some(username.to_string());
            }
        }
    }
}
