//! Question request types and input validation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One validated prior turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Raw `/ask` body
///
/// Fields are kept loosely typed so that shape errors are reported through
/// [`ValidationError`] instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    #[serde(default)]
    pub question: Option<String>,

    /// Prior turns, `[{role, content}, ...]`
    #[serde(default = "default_history")]
    pub chat_history: Value,
}

fn default_history() -> Value {
    Value::Array(Vec::new())
}

impl AskRequest {
    /// Create a request with no history
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            chat_history: default_history(),
        }
    }

    /// Check the question and history shape
    pub fn validate(&self) -> Result<ValidatedQuestion, ValidationError> {
        let question = match self.question.as_deref() {
            Some(q) if !q.trim().is_empty() => q.to_string(),
            _ => return Err(ValidationError::MissingQuestion),
        };

        let history = validate_history(&self.chat_history)?;

        Ok(ValidatedQuestion { question, history })
    }
}

/// A question that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuestion {
    pub question: String,
    /// Accepted but not used for retrieval or generation yet
    pub history: Vec<ChatMessage>,
}

/// Input rejected before any model call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No question provided.")]
    MissingQuestion,

    #[error("Invalid chat history format.")]
    InvalidHistory,
}

fn validate_history(value: &Value) -> Result<Vec<ChatMessage>, ValidationError> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        _ => return Err(ValidationError::InvalidHistory),
    };

    entries
        .iter()
        .map(|entry| {
            let obj = entry.as_object().ok_or(ValidationError::InvalidHistory)?;
            let role = obj
                .get("role")
                .and_then(Value::as_str)
                .and_then(ChatRole::parse)
                .ok_or(ValidationError::InvalidHistory)?;
            let content = match obj.get("content") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => return Err(ValidationError::InvalidHistory),
            };
            Ok(ChatMessage { role, content })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> AskRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_request() {
        let req = request(json!({
            "question": "Which dealer sold the most?",
            "chat_history": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ]
        }));

        let validated = req.validate().unwrap();
        assert_eq!(validated.question, "Which dealer sold the most?");
        assert_eq!(validated.history.len(), 2);
        assert_eq!(validated.history[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_history_defaults_to_empty() {
        let req = request(json!({"question": "Stock in Pune?"}));
        assert!(req.validate().unwrap().history.is_empty());
    }

    #[test]
    fn test_missing_or_blank_question() {
        assert_eq!(
            request(json!({})).validate().unwrap_err(),
            ValidationError::MissingQuestion
        );
        assert_eq!(
            request(json!({"question": "   "})).validate().unwrap_err(),
            ValidationError::MissingQuestion
        );
    }

    #[test]
    fn test_invalid_history() {
        let cases = [
            json!({"question": "q", "chat_history": "nope"}),
            json!({"question": "q", "chat_history": [1]}),
            json!({"question": "q", "chat_history": [{"role": "user"}]}),
            json!({"question": "q", "chat_history": [{"content": "x"}]}),
            json!({"question": "q", "chat_history": [{"role": "system", "content": "x"}]}),
        ];

        for body in cases {
            assert_eq!(
                request(body.clone()).validate().unwrap_err(),
                ValidationError::InvalidHistory,
                "expected rejection for {body}"
            );
        }
    }
}
