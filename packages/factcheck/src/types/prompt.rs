//! Prompts: a bare string or an explicit conversation.

use openai_client::Message;

/// A rendered prompt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Sent as a single user turn.
    Text(String),
    /// Sent as-is.
    Turns(Vec<Message>),
}

impl Prompt {
    /// Conversation to send to the model.
    pub fn to_messages(&self) -> Vec<Message> {
        match self {
            Prompt::Text(text) => vec![Message::user(text.clone())],
            Prompt::Turns(turns) => turns.clone(),
        }
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(turns: Vec<Message>) -> Self {
        Prompt::Turns(turns)
    }
}
