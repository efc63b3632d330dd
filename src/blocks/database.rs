use super::credentials::FireboltCredentials;
use super::{Block, FIREBOLT_LOGO_URL, FieldDoc};
use crate::client::{Connect, ConnectParams, Connection, FireboltClient};
use crate::error::FireboltError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Rejects configurations that name both an engine and an engine URL.
///
/// Runs on raw input, before any defaulting.
pub fn validate_engine_selector<N, U>(
    engine_name: Option<N>,
    engine_url: Option<U>,
) -> Result<(), FireboltError> {
    if engine_name.is_some() && engine_url.is_some() {
        return Err(FireboltError::engine_selector_conflict());
    }
    Ok(())
}

/// Connects to a Firebolt database.
///
/// Provide either `engine_name` or `engine_url`; providing both is an error.
/// With neither, the default engine of the configured database is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFireboltDatabase")]
pub struct FireboltDatabase {
    credentials: FireboltCredentials,
    database: String,
    engine_name: Option<String>,
    engine_url: Option<String>,
    additional_parameters: HashMap<String, Value>,
}

/// Deserialization input. Fields stay untyped until the engine selectors
/// have been checked.
#[derive(Deserialize)]
struct RawFireboltDatabase {
    #[serde(default)]
    credentials: Option<Value>,
    #[serde(default)]
    database: Option<Value>,
    #[serde(default)]
    engine_name: Option<Value>,
    #[serde(default)]
    engine_url: Option<Value>,
    #[serde(default)]
    additional_parameters: Option<Value>,
}

fn required<T: DeserializeOwned>(
    value: Option<Value>,
    field: &'static str,
) -> Result<T, FireboltError> {
    let value = value
        .ok_or_else(|| FireboltError::Configuration(format!("`{field}` is required")))?;
    Ok(serde_json::from_value(value)?)
}

fn optional<T: DeserializeOwned>(value: Option<Value>) -> Result<Option<T>, FireboltError> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(FireboltError::from)
}

impl TryFrom<RawFireboltDatabase> for FireboltDatabase {
    type Error = FireboltError;

    fn try_from(raw: RawFireboltDatabase) -> Result<Self, Self::Error> {
        validate_engine_selector(raw.engine_name.as_ref(), raw.engine_url.as_ref())?;
        Self::new(
            required(raw.credentials, "credentials")?,
            required::<String>(raw.database, "database")?,
            optional(raw.engine_name)?,
            optional(raw.engine_url)?,
            optional(raw.additional_parameters)?,
        )
    }
}

impl FireboltDatabase {
    pub fn new(
        credentials: FireboltCredentials,
        database: impl Into<String>,
        engine_name: Option<String>,
        engine_url: Option<String>,
        additional_parameters: Option<HashMap<String, Value>>,
    ) -> Result<Self, FireboltError> {
        validate_engine_selector(engine_name.as_deref(), engine_url.as_deref())?;
        Ok(Self {
            credentials,
            database: database.into(),
            engine_name,
            engine_url,
            additional_parameters: additional_parameters.unwrap_or_default(),
        })
    }

    /// Database on its default engine with no extra parameters.
    pub fn with_default_engine(
        credentials: FireboltCredentials,
        database: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            database: database.into(),
            engine_name: None,
            engine_url: None,
            additional_parameters: HashMap::new(),
        }
    }

    pub fn credentials(&self) -> &FireboltCredentials {
        &self.credentials
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine_name.as_deref()
    }

    pub fn engine_url(&self) -> Option<&str> {
        self.engine_url.as_deref()
    }

    pub fn additional_parameters(&self) -> &HashMap<String, Value> {
        &self.additional_parameters
    }

    /// Creates and returns an authenticated connection for the configured
    /// database. Every call opens a new connection.
    pub async fn get_connection<C: Connect>(
        &self,
        connector: &C,
    ) -> Result<C::Connection, FireboltError> {
        let auth = self.credentials.auth()?;
        debug!(
            database = %self.database,
            auth = auth.method(),
            engine_name = ?self.engine_name,
            engine_url = ?self.engine_url,
            "opening Firebolt connection"
        );

        connector
            .connect(ConnectParams {
                database: &self.database,
                auth: &auth,
                engine_name: self.engine_name.as_deref(),
                engine_url: self.engine_url.as_deref(),
                api_endpoint: self.credentials.api_endpoint(),
                additional_parameters: &self.additional_parameters,
            })
            .await
    }

    /// `get_connection` through the bundled HTTP client.
    pub async fn get_default_connection(&self) -> Result<Connection, FireboltError> {
        let client = FireboltClient::new()?;
        self.get_connection(&client).await
    }
}

impl Block for FireboltDatabase {
    const BLOCK_TYPE_NAME: &'static str = "Firebolt Database";
    const LOGO_URL: &'static str = FIREBOLT_LOGO_URL;
    const DESCRIPTION: &'static str = "Connects to a Firebolt database.";

    fn fields() -> &'static [FieldDoc] {
        &[
            FieldDoc {
                name: "credentials",
                title: "Credentials",
                description: "Credentials to use to connect to the Firebolt database.",
                secret: false,
                required: true,
            },
            FieldDoc {
                name: "database",
                title: "Database Name",
                description: "The name of the database to connect to.",
                secret: false,
                required: true,
            },
            FieldDoc {
                name: "engine_name",
                title: "Engine Name",
                description: "Name of the engine to connect to. May not be used with \
                              engine_url. If neither engine_name nor engine_url is provided, \
                              the default engine for the configured database will be used.",
                secret: false,
                required: false,
            },
            FieldDoc {
                name: "engine_url",
                title: "Engine URL",
                description: "The engine endpoint to use. May not be used with engine_name. \
                              If neither engine_name nor engine_url is provided, the default \
                              engine for the configured database will be used.",
                secret: false,
                required: false,
            },
            FieldDoc {
                name: "additional_parameters",
                title: "Additional Parameters",
                description: "Additional configuration to pass to the Firebolt connection.",
                secret: false,
                required: false,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Auth;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct RecordedCall {
        database: String,
        auth: Auth,
        engine_name: Option<String>,
        engine_url: Option<String>,
        api_endpoint: String,
        additional_parameters: HashMap<String, Value>,
    }

    #[derive(Default)]
    struct RecordingConnector {
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl RecordingConnector {
        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Connect for RecordingConnector {
        type Connection = usize;

        async fn connect(&self, params: ConnectParams<'_>) -> Result<usize, FireboltError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                database: params.database.to_string(),
                auth: params.auth.clone(),
                engine_name: params.engine_name.map(str::to_string),
                engine_url: params.engine_url.map(str::to_string),
                api_endpoint: params.api_endpoint.to_string(),
                additional_parameters: params.additional_parameters.clone(),
            });
            Ok(calls.len())
        }
    }

    struct RejectingConnector;

    impl Connect for RejectingConnector {
        type Connection = ();

        async fn connect(&self, _params: ConnectParams<'_>) -> Result<(), FireboltError> {
            Err(FireboltError::Api {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: "bad credentials".to_string(),
            })
        }
    }

    fn token_credentials() -> FireboltCredentials {
        FireboltCredentials::from_token("abc123")
    }

    #[test]
    fn engine_selectors_are_mutually_exclusive() {
        let cases = [
            (Some("thomas"), None, true),
            (None, Some("http://firebolt.io/thomas"), true),
            (None, None, true),
            (Some("thomas"), Some("http://firebolt.io/thomas"), false),
        ];
        for (engine_name, engine_url, ok) in cases {
            let result = FireboltDatabase::new(
                token_credentials(),
                "prod",
                engine_name.map(str::to_string),
                engine_url.map(str::to_string),
                None,
            );
            assert_eq!(result.is_ok(), ok, "{engine_name:?} / {engine_url:?}");
            if let Err(e) = result {
                assert!(matches!(e, FireboltError::Configuration(_)));
            }
        }
    }

    #[test]
    fn deserialization_checks_engine_selectors() {
        let err = serde_json::from_value::<FireboltDatabase>(json!({
            "credentials": {"token": "abc123"},
            "database": "prod",
            "engine_name": "thomas",
            "engine_url": "http://firebolt.io/thomas",
        }))
        .unwrap_err();
        assert!(err.to_string().contains("engine_name and engine_url"));

        let db: FireboltDatabase = serde_json::from_value(json!({
            "credentials": {"username": "me@example.com", "password": "hunter2"},
            "database": "prod",
            "engine_url": "http://firebolt.io/thomas",
            "additional_parameters": null,
        }))
        .unwrap();
        assert_eq!(db.engine_url(), Some("http://firebolt.io/thomas"));
        assert!(db.additional_parameters().is_empty());
    }

    #[test]
    fn engine_conflict_is_reported_before_other_fields() {
        let cases = [
            json!({
                "credentials": {"token": "abc123"},
                "engine_name": "thomas",
                "engine_url": "http://firebolt.io/thomas",
            }),
            json!({
                "credentials": {"token": 5},
                "database": "prod",
                "engine_name": "thomas",
                "engine_url": "http://firebolt.io/thomas",
            }),
        ];
        for input in cases {
            let err = serde_json::from_value::<FireboltDatabase>(input).unwrap_err();
            assert!(
                err.to_string().contains("engine_name and engine_url"),
                "{err}"
            );
        }
    }

    #[test]
    fn database_is_required() {
        let result = serde_json::from_value::<FireboltDatabase>(json!({
            "credentials": {"token": "abc123"},
        }));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn token_credentials_are_delegated() {
        let connector = RecordingConnector::default();
        let db = FireboltDatabase::with_default_engine(token_credentials(), "prod");

        assert_eq!(db.get_connection(&connector).await.unwrap(), 1);
        assert_eq!(
            connector.calls(),
            vec![RecordedCall {
                database: "prod".to_string(),
                auth: Auth::token("abc123"),
                engine_name: None,
                engine_url: None,
                api_endpoint: "api.app.firebolt.io".to_string(),
                additional_parameters: HashMap::new(),
            }]
        );
    }

    #[tokio::test]
    async fn username_password_and_engine_name_are_delegated() {
        let connector = RecordingConnector::default();
        let db = FireboltDatabase::new(
            FireboltCredentials::from_username_password("me@example.com", "hunter2"),
            "prod",
            Some("thomas".to_string()),
            None,
            Some([("time_zone".to_string(), json!("UTC"))].into_iter().collect()),
        )
        .unwrap();

        db.get_connection(&connector).await.unwrap();
        let call = connector.calls().remove(0);
        match &call.auth {
            Auth::UsernamePassword { username, password } => {
                assert_eq!(username, "me@example.com");
                assert_eq!(password.reveal(), "hunter2");
            }
            other => panic!("unexpected auth: {other:?}"),
        }
        assert_eq!(call.engine_name.as_deref(), Some("thomas"));
        assert_eq!(call.engine_url, None);
        assert_eq!(call.additional_parameters["time_zone"], json!("UTC"));
    }

    #[tokio::test]
    async fn each_call_opens_a_new_connection() {
        let connector = RecordingConnector::default();
        let db = FireboltDatabase::with_default_engine(token_credentials(), "prod");

        assert_eq!(db.get_connection(&connector).await.unwrap(), 1);
        assert_eq!(db.get_connection(&connector).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_credentials_skip_the_external_call() {
        let connector = RecordingConnector::default();
        let creds = FireboltCredentials::new(Some("me@example.com".to_string()), None, None, None);
        let db = FireboltDatabase::with_default_engine(creds, "prod");

        let err = db.get_connection(&connector).await.unwrap_err();
        assert!(matches!(err, FireboltError::AuthConfiguration));
        assert!(connector.calls().is_empty());
    }

    #[tokio::test]
    async fn client_errors_propagate_unchanged() {
        let db = FireboltDatabase::with_default_engine(token_credentials(), "prod");
        let err = db.get_connection(&RejectingConnector).await.unwrap_err();
        match err {
            FireboltError::Api { status, message } => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
                assert_eq!(message, "bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
