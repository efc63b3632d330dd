use super::secret::SecretStr;

/// Authentication material handed to the database client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Token { token: SecretStr },
    UsernamePassword { username: String, password: SecretStr },
}

impl Auth {
    pub fn token(token: impl Into<SecretStr>) -> Self {
        Self::Token {
            token: token.into(),
        }
    }

    pub fn username_password(username: impl Into<String>, password: impl Into<SecretStr>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Short label for logs.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::UsernamePassword { .. } => "username_password",
        }
    }
}
