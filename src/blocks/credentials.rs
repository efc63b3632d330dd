use super::{Block, FIREBOLT_LOGO_URL, FieldDoc};
use crate::error::FireboltError;
use crate::types::{Auth, SecretStr};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_ENDPOINT: &str = "api.app.firebolt.io";

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

/// Credentials for authenticating with Firebolt: a token, or the username
/// and password of a Firebolt user.
///
/// Nothing is checked at construction; missing material surfaces when a
/// connection is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireboltCredentials {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<SecretStr>,
    #[serde(default)]
    token: Option<SecretStr>,
    #[serde(default = "default_api_endpoint")]
    api_endpoint: String,
}

impl Default for FireboltCredentials {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            token: None,
            api_endpoint: default_api_endpoint(),
        }
    }
}

impl FireboltCredentials {
    pub fn new(
        username: Option<String>,
        password: Option<SecretStr>,
        token: Option<SecretStr>,
        api_endpoint: Option<String>,
    ) -> Self {
        Self {
            username,
            password,
            token,
            api_endpoint: api_endpoint.unwrap_or_else(default_api_endpoint),
        }
    }

    pub fn from_token(token: impl Into<SecretStr>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn from_username_password(
        username: impl Into<String>,
        password: impl Into<SecretStr>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn with_api_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&SecretStr> {
        self.password.as_ref()
    }

    pub fn token(&self) -> Option<&SecretStr> {
        self.token.as_ref()
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    /// Pick the auth strategy: a token wins over username/password, and
    /// an incomplete pair is never used. Empty values count as absent.
    pub fn auth(&self) -> Result<Auth, FireboltError> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(Auth::token(token.clone()));
        }
        let username = self.username.as_deref().filter(|u| !u.is_empty());
        let password = self.password.as_ref().filter(|p| !p.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => {
                Ok(Auth::username_password(username, password.clone()))
            }
            _ => Err(FireboltError::AuthConfiguration),
        }
    }
}

impl Block for FireboltCredentials {
    const BLOCK_TYPE_NAME: &'static str = "Firebolt Credentials";
    const LOGO_URL: &'static str = FIREBOLT_LOGO_URL;
    const DESCRIPTION: &'static str = "Store credentials for authenticating with Firebolt.";

    fn fields() -> &'static [FieldDoc] {
        &[
            FieldDoc {
                name: "username",
                title: "Username",
                description: "The email address associated with your Firebolt user.",
                secret: false,
                required: false,
            },
            FieldDoc {
                name: "password",
                title: "Password",
                description: "The password used for connecting to Firebolt.",
                secret: true,
                required: false,
            },
            FieldDoc {
                name: "token",
                title: "Token",
                description: "An access token used for connecting to Firebolt. \
                              Takes precedence over username and password.",
                secret: true,
                required: false,
            },
            FieldDoc {
                name: "api_endpoint",
                title: "API Endpoint",
                description: "The Firebolt API host to authenticate against.",
                secret: false,
                required: false,
            },
        ]
    }
}
