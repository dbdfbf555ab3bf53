use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(Box<str>),
    #[error("{} timeout", api_name(.vision))]
    UpstreamTimeout { vision: bool },
    #[error("{} failed: {details}", api_name(.vision))]
    UpstreamFailure { vision: bool, details: Box<str> },
}

pub type Result<T> = std::result::Result<T, Error>;

fn api_name(vision: &bool) -> &'static str {
    if *vision {
        "Upstream vision API"
    } else {
        "Upstream API"
    }
}

#[derive(Debug, Serialize)]
pub struct HttpErrorBody {
    pub error: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<str>>,
}

impl Error {
    pub fn to_body(&self) -> HttpErrorBody {
        match self {
            Error::InvalidRequest(message) => HttpErrorBody {
                error: message.clone(),
                details: None,
            },
            Error::UpstreamTimeout { vision } => HttpErrorBody {
                error: format!("{} timeout", api_name(vision)).into(),
                details: None,
            },
            Error::UpstreamFailure { vision, details } => HttpErrorBody {
                error: format!("{} failed", api_name(vision)).into(),
                details: Some(details.clone()),
            },
        }
    }
}

#[cfg(feature = "server-http2")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            Error::UpstreamTimeout { .. } => axum::http::StatusCode::GATEWAY_TIMEOUT,
            Error::UpstreamFailure { .. } => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, axum::Json(self.to_body())).into_response()
    }
}

#[cfg(feature = "server-http2")]
impl From<axum::extract::rejection::JsonRejection> for Error {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text().into())
    }
}
