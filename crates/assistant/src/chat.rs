//! Conversation model for the assistant panel.
//!
//! The log is append-only and seeded with a greeting. Requests carry
//! the last CONTEXT_WINDOW turns so the model remembers the recent
//! exchange without the payload growing unbounded.

/// Number of prior turns sent as conversation context.
pub const CONTEXT_WINDOW: usize = 10;

const GREETING: &str =
    "Hello! I'm your AI math assistant. Ask me to solve equations, explain concepts, or help with your calculations.";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single message in the conversation log.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
    /// Rendered in the error style; never sent upstream as context.
    pub is_error: bool,
}

/// A (role, text) pair included in the request payload.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Append-only conversation log.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLog {
    /// New log seeded with the assistant greeting.
    pub fn new() -> Self {
        let mut log = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        log.push(Role::Model, GREETING.to_string(), false);
        log
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a user message and return its id.
    pub fn push_user(&mut self, text: String) -> u64 {
        self.push(Role::User, text, false)
    }

    /// Append a model reply.
    pub fn push_model(&mut self, text: String) -> u64 {
        self.push(Role::Model, text, false)
    }

    /// Append a model-side error notice. Error messages are shown in the
    /// log but excluded from future request context.
    pub fn push_error(&mut self, text: String) -> u64 {
        self.push(Role::Model, text, true)
    }

    fn push(&mut self, role: Role, text: String, is_error: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            text,
            is_error,
        });
        id
    }

    /// The last CONTEXT_WINDOW non-error turns, oldest first.
    pub fn context_window(&self) -> Vec<Turn> {
        let turns: Vec<Turn> = self
            .messages
            .iter()
            .filter(|m| !m.is_error)
            .map(|m| Turn {
                role: m.role,
                text: m.text.clone(),
            })
            .collect();

        let start = turns.len().saturating_sub(CONTEXT_WINDOW);
        turns[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_log_has_greeting() {
        let log = ChatLog::new();
        assert_eq!(log.len(), 1);
        assert_eq!(log.messages()[0].role, Role::Model);
        assert!(log.messages()[0].text.contains("math assistant"));
        assert!(!log.messages()[0].is_error);
    }

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut log = ChatLog::new();
        let a = log.push_user("one".into());
        let b = log.push_model("two".into());
        assert!(b > a);
    }

    #[test]
    fn test_context_window_excludes_errors() {
        let mut log = ChatLog::new();
        log.push_user("what is 2+2?".into());
        log.push_error("Failed to connect to the AI assistant.".into());
        log.push_user("retry".into());

        let ctx = log.context_window();
        assert!(ctx.iter().all(|t| t.text != "Failed to connect to the AI assistant."));
        assert_eq!(ctx.len(), 3); // greeting + two user turns
    }

    #[test]
    fn test_context_window_caps_at_last_ten() {
        let mut log = ChatLog::new();
        for i in 0..20 {
            log.push_user(format!("q{}", i));
            log.push_model(format!("a{}", i));
        }

        let ctx = log.context_window();
        assert_eq!(ctx.len(), CONTEXT_WINDOW);
        // Oldest entry in the window is the most recent ten, in order
        assert_eq!(ctx[0].text, "q15");
        assert_eq!(ctx[CONTEXT_WINDOW - 1].text, "a19");
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Model.as_str(), "model");
    }
}
