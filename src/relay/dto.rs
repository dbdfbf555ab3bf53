use serde::{Deserialize, Serialize};

/// One turn of caller-supplied conversation history. Only `role` is required;
/// every other key (`content`, `name`, `tool_calls`, ...) is kept as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Box<str>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST /chat`. Which fields are present decides the request kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub message: Option<Box<str>>,
    #[serde(default)]
    pub image_url: Option<Box<str>>,
    #[serde(default)]
    pub image_base64: Option<Box<str>>,
}

/// Body of `POST /vision`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisionRequest {
    #[serde(default)]
    pub image_url: Option<Box<str>>,
    #[serde(default)]
    pub prompt: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: Box<str>,
}
