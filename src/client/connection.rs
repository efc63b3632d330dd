use crate::error::FireboltError;
use crate::types::SecretStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

const OUTPUT_FORMAT: &str = "JSON_Compact";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Rows returned by one statement. Statements without a result set yield
/// an empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub meta: Vec<Column>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
    #[serde(default)]
    pub rows: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Value>,
}

/// An authenticated handle to one Firebolt engine and database.
#[derive(Debug, Clone)]
pub struct Connection {
    http: reqwest::Client,
    engine_url: Url,
    database: String,
    access_token: SecretStr,
    token_expiry: Option<DateTime<Utc>>,
    settings: Vec<(String, String)>,
}

impl Connection {
    pub(crate) fn new(
        http: reqwest::Client,
        engine_url: Url,
        database: impl Into<String>,
        access_token: SecretStr,
        token_expiry: Option<DateTime<Utc>>,
        additional_parameters: &HashMap<String, Value>,
    ) -> Self {
        Self {
            http,
            engine_url,
            database: database.into(),
            access_token,
            token_expiry,
            settings: settings_from_parameters(additional_parameters),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn engine_url(&self) -> &Url {
        &self.engine_url
    }

    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.token_expiry
    }

    pub fn is_token_expired(&self) -> bool {
        self.token_expiry.is_some_and(|expiry| expiry <= Utc::now())
    }

    /// Query-string settings sent with every statement.
    pub fn settings(&self) -> &[(String, String)] {
        &self.settings
    }

    /// Run one SQL statement on the engine.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult, FireboltError> {
        let mut url = self.engine_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("database", &self.database)
                .append_pair("output_format", OUTPUT_FORMAT);
            for (key, value) in &self.settings {
                query.append_pair(key, value);
            }
        }

        debug!(database = %self.database, engine_url = %self.engine_url, "executing statement");
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.access_token.reveal())
            .body(sql.to_string())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FireboltError::from_response(resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(QueryResult::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Scalar parameters become query-string settings; nested values are left
/// for callers that read `additional_parameters` themselves.
fn settings_from_parameters(parameters: &HashMap<String, Value>) -> Vec<(String, String)> {
    let mut settings: Vec<(String, String)> = parameters
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key.clone(), value))
        })
        .collect();
    settings.sort();
    settings
}
