use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum FireboltError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Unable to initialize Firebolt auth. Expected username and password or token, but received neither."
    )]
    AuthConfiguration,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Firebolt API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("missing `{0}` in Firebolt API response")]
    MissingField(&'static str),
}

impl FireboltError {
    /// Both engine selectors were supplied.
    pub fn engine_selector_conflict() -> Self {
        FireboltError::Configuration(
            "You have provided a value for both engine_name and engine_url. \
             Please provide either engine_name or engine_url, but not both."
                .to_string(),
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FireboltError::Configuration(_) | FireboltError::AuthConfiguration
        )
    }

    /// Turn a non-success API response into an `Api` error, keeping the
    /// server's message when the body carries one.
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        let message = match resp.text().await {
            Ok(body) => serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::into_message)
                .unwrap_or(body),
            Err(e) => e.to_string(),
        };
        FireboltError::Api { status, message }
    }
}

impl From<figment::Error> for FireboltError {
    fn from(e: figment::Error) -> Self {
        FireboltError::Configuration(e.to_string())
    }
}

/// Error payload returned by the Firebolt REST API.
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
    #[serde(flatten)]
    #[allow(dead_code)]
    extra: HashMap<String, Value>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
