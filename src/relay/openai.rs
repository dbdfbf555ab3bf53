use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ROLE_USER: &str = "user";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    RequestFailed(reqwest::Error),

    #[error("Error response from API ({status}): {body}")]
    ErrorResponse { status: u16, body: Box<str> },

    #[error("Response parsing failed: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("Response contained no choices")]
    NoChoices,
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Timeout => "timeout",
            ApiError::RequestFailed(_) => "request_failed",
            ApiError::ErrorResponse { .. } => "error_response",
            ApiError::ParseFailed(_) => "parse_failed",
            ApiError::NoChoices => "no_choices",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ErrorResponse { status, .. } => Some(*status),
            ApiError::RequestFailed(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::RequestFailed(err)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAIRequest {
    pub model: Box<str>,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAIMessage {
    pub role: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Caller-supplied keys, forwarded as received.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OpenAIMessage {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: ROLE_USER.into(),
            content: Some(content),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(Box<str>),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: Box<str> },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: Box<str>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    pub content: Box<str>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

/// Extracts `choices[0].message.content` from a chat-completions body.
pub fn parse_reply(response_text: &str) -> Result<Box<str>, ApiError> {
    let response: OpenAIResponse = serde_json::from_str(response_text)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(ApiError::NoChoices)
}

pub async fn openai_request(
    client: &reqwest::Client,
    infer_url: &str,
    api_key: &str,
    request: &OpenAIRequest,
    timeout: Duration,
) -> Result<Box<str>, ApiError> {
    let response = client
        .post(infer_url)
        .bearer_auth(api_key)
        .timeout(timeout)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::ErrorResponse {
            status: status.as_u16(),
            body: response_text.into(),
        });
    }

    parse_reply(&response_text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_first_choice_content() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "first" } },
                { "index": 1, "message": { "role": "assistant", "content": "second" } }
            ],
            "usage": { "total_tokens": 12 }
        });
        assert_eq!(&*parse_reply(&body.to_string()).unwrap(), "first");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let result = parse_reply(r#"{"choices": []}"#);
        assert!(matches!(result, Err(ApiError::NoChoices)));
    }

    #[test]
    fn missing_content_is_a_parse_error() {
        let result = parse_reply(r#"{"choices": [{"message": {"role": "assistant"}}]}"#);
        assert!(matches!(result, Err(ApiError::ParseFailed(_))));
    }

    #[test]
    fn non_json_is_a_parse_error() {
        assert!(matches!(parse_reply("<html>502</html>"), Err(ApiError::ParseFailed(_))));
    }

    #[test]
    fn error_kind_and_status_leave_out_the_body() {
        let error = ApiError::ErrorResponse {
            status: 401,
            body: "Invalid API Key".into(),
        };
        assert_eq!(error.kind(), "error_response");
        assert_eq!(error.status(), Some(401));
        assert_eq!(ApiError::Timeout.kind(), "timeout");
        assert_eq!(ApiError::NoChoices.status(), None);
    }

    #[test]
    fn serializes_vision_parts() {
        let parts = vec![
            ContentPart::Text { text: "What is this?".into() },
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: "https://example.com/cat.png".into() },
            },
        ];
        assert_eq!(
            serde_json::to_value(parts).unwrap(),
            json!([
                { "type": "text", "text": "What is this?" },
                { "type": "image_url", "image_url": { "url": "https://example.com/cat.png" } }
            ])
        );
    }

    #[test]
    fn omits_unset_sampling_parameters() {
        let request = OpenAIRequest {
            model: "m".into(),
            messages: vec![OpenAIMessage::user(MessageContent::Text("hi".into()))],
            temperature: None,
            max_tokens: None,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({ "model": "m", "messages": [{ "role": "user", "content": "hi" }] })
        );
    }
}
