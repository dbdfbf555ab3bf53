pub mod dto;
pub mod openai;

use crate::{config::RelayConfig, service};
use dto::{ChatMessage, ChatRequest, ChatResponse, VisionRequest};
use openai::{ApiError, ContentPart, ImageUrl, MessageContent, OpenAIMessage, OpenAIRequest};

const NO_VALID_INPUT: &str = "No valid input provided";
const IMAGE_URL_REQUIRED: &str = "Image URL is required";

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(Box<str>),
    Base64(Box<str>),
}

impl ImageSource {
    /// The value for an `image_url` part. Bare base64 is wrapped in a data URI.
    pub fn into_url(self) -> Box<str> {
        match self {
            Self::Url(url) => url,
            Self::Base64(data) if data.starts_with("data:") => data,
            Self::Base64(data) => format!("data:image/jpeg;base64,{data}").into(),
        }
    }
}

/// A caller request after shape detection. Exactly one kind per request.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayRequest {
    Vision { prompt: Box<str>, image: ImageSource },
    Conversation(Vec<ChatMessage>),
    Single(Box<str>),
}

fn non_empty(value: Option<Box<str>>) -> Option<Box<str>> {
    value.filter(|v| !v.is_empty())
}

impl RelayRequest {
    /// Classifies a `/chat` body. Vision wins over `messages`, which wins over
    /// a lone `message`.
    pub fn from_chat(request: ChatRequest) -> service::Result<Self> {
        let ChatRequest {
            messages,
            message,
            image_url,
            image_base64,
        } = request;
        let message = non_empty(message);
        let image = non_empty(image_url)
            .map(ImageSource::Url)
            .or_else(|| non_empty(image_base64).map(ImageSource::Base64));

        match (message, image, messages) {
            (Some(prompt), Some(image), _) => Ok(Self::Vision { prompt, image }),
            (_, _, Some(messages)) if !messages.is_empty() => Ok(Self::Conversation(messages)),
            (Some(message), _, _) => Ok(Self::Single(message)),
            _ => Err(service::Error::InvalidRequest(NO_VALID_INPUT.into())),
        }
    }

    pub fn from_vision(request: VisionRequest, default_prompt: &str) -> service::Result<Self> {
        let image_url = non_empty(request.image_url)
            .ok_or_else(|| service::Error::InvalidRequest(IMAGE_URL_REQUIRED.into()))?;
        let prompt = non_empty(request.prompt).unwrap_or_else(|| default_prompt.into());
        Ok(Self::Vision {
            prompt,
            image: ImageSource::Url(image_url),
        })
    }

    pub fn is_vision(&self) -> bool {
        matches!(self, Self::Vision { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vision { .. } => "vision",
            Self::Conversation(_) => "conversation",
            Self::Single(_) => "single",
        }
    }

    pub fn into_payload(self, config: &RelayConfig) -> OpenAIRequest {
        let (model, messages) = match self {
            Self::Vision { prompt, image } => (
                config.vision_model.clone(),
                vec![OpenAIMessage::user(MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.into_url(),
                        },
                    },
                ]))],
            ),
            Self::Conversation(messages) => (
                config.text_model.clone(),
                messages
                    .into_iter()
                    .map(|ChatMessage { role, fields }| OpenAIMessage {
                        role,
                        content: None,
                        extra: fields,
                    })
                    .collect(),
            ),
            Self::Single(message) => (
                config.text_model.clone(),
                vec![OpenAIMessage::user(MessageContent::Text(message))],
            ),
        };

        OpenAIRequest {
            model,
            messages,
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
        }
    }
}

fn into_service_error(error: ApiError, vision: bool) -> service::Error {
    match error {
        ApiError::Timeout => service::Error::UpstreamTimeout { vision },
        error => service::Error::UpstreamFailure {
            vision,
            details: error.to_string().into(),
        },
    }
}

/// Forwards requests to the upstream chat-completions endpoint.
pub struct Relay {
    config: RelayConfig,
    client: reqwest::Client,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn chat(&self, request: ChatRequest) -> service::Result<ChatResponse> {
        self.relay(RelayRequest::from_chat(request)?).await
    }

    pub async fn vision(&self, request: VisionRequest) -> service::Result<ChatResponse> {
        let request = RelayRequest::from_vision(request, &self.config.default_vision_prompt)?;
        self.relay(request).await
    }

    /// Issues the single upstream call for `request`. Never retries.
    pub async fn relay(&self, request: RelayRequest) -> service::Result<ChatResponse> {
        let vision = request.is_vision();
        let kind = request.kind();
        let timeout = if vision {
            self.config.vision_timeout
        } else {
            self.config.chat_timeout
        };
        let payload = request.into_payload(&self.config);
        tracing::debug!(kind, model = %payload.model, "Relaying request upstream");

        match openai::openai_request(
            &self.client,
            &self.config.upstream_url,
            &self.config.api_key,
            &payload,
            timeout,
        )
        .await
        {
            Ok(content) => Ok(ChatResponse {
                reply: content.trim().into(),
            }),
            Err(error) => {
                tracing::warn!(kind, model = %payload.model, cause = error.kind(), status = error.status(), "Upstream call failed");
                Err(into_service_error(error, vision))
            }
        }
    }
}
