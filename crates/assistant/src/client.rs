//! Gemini HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! One call per message: history is replayed in the request body, so the
//! service stays stateless.

use crate::chat::Turn;

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert mathematical assistant integrated into a scientific calculator app \"NeuralCalc\".
Your goal is to help users solve complex math problems, explain concepts, or convert units.

Rules:
1. If the user asks a math question, solve it step-by-step.
2. Use LaTeX formatting for complex equations if possible, but plain text is fine for simple ones.
3. Be concise. The user is on a calculator app.
4. If the user provides an equation that the calculator failed to solve, analyze why.
5. Format your response with clear headings or bullet points for readability.";

/// Fallback reply when the model returns no text.
const EMPTY_REPLY: &str = "I couldn't generate a response.";

/// Gemini API client (blocking).
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    model: String,
}

/// Error type for assistant operations.
#[derive(Debug)]
pub enum AssistantError {
    /// No API key configured
    MissingKey,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantError::MissingKey => {
                write!(f, "No API key configured — run `ncalc ai set-key` first")
            }
            AssistantError::Network(msg) => write!(f, "Network error: {}", msg),
            AssistantError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            AssistantError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for AssistantError {}

impl AssistantClient {
    /// Create a new client for the given endpoint, key and model.
    pub fn new(api_base: String, api_key: String, model: String) -> Result<Self, AssistantError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("ncalc/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base,
            api_key,
            model,
        })
    }

    /// Send a user message with prior conversation context.
    /// Returns the model's reply text.
    pub fn send_message(&self, message: &str, history: &[Turn]) -> Result<String, AssistantError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        let body = build_request_body(message, history);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssistantError::Http(status, body));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| AssistantError::Parse(e.to_string()))?;

        Ok(extract_reply(&json))
    }
}

/// Build the generateContent request body. History is replayed as
/// `contents`, followed by the new user message.
fn build_request_body(message: &str, history: &[Turn]) -> serde_json::Value {
    let mut contents: Vec<serde_json::Value> = history
        .iter()
        .map(|turn| {
            serde_json::json!({
                "role": turn.role.as_str(),
                "parts": [{ "text": turn.text }]
            })
        })
        .collect();

    contents.push(serde_json::json!({
        "role": "user",
        "parts": [{ "text": message }]
    }));

    serde_json::json!({
        "system_instruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "contents": contents
    })
}

/// Pull the reply text out of a generateContent response.
/// Multi-part candidates are joined; a textless response maps to a
/// canned fallback rather than an error.
fn extract_reply(json: &serde_json::Value) -> String {
    let parts = json["candidates"][0]["content"]["parts"].as_array();

    let text = match parts {
        Some(parts) => parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join(""),
        None => String::new(),
    };

    if text.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        text
    }
}
