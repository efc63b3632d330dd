use super::connection::Connection;
use super::endpoints::{FireboltEndpoints, base_url};
use super::{Connect, ConnectParams};
use crate::error::FireboltError;
use crate::types::{Auth, SecretStr};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tracing::{debug, info};

/// `Connect` implementation backed by the Firebolt REST API.
#[derive(Debug, Clone)]
pub struct FireboltClient {
    http: reqwest::Client,
}

impl FireboltClient {
    /// Create a client with a preconfigured HTTP client.
    pub fn new() -> Result<Self, FireboltError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("firebolt-blocks/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self { http })
    }

    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn access_token(
        &self,
        params: &ConnectParams<'_>,
        api: &url::Url,
    ) -> Result<(SecretStr, Option<DateTime<Utc>>), FireboltError> {
        match params.auth {
            Auth::Token { token } => Ok((token.clone(), None)),
            Auth::UsernamePassword { username, password } => {
                let login = FireboltEndpoints::login(&self.http, api, username, password).await?;
                let expiry = login
                    .expires_in
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|ttl| Utc::now().checked_add_signed(ttl));
                Ok((SecretStr::new(login.access_token), expiry))
            }
        }
    }
}

impl Connect for FireboltClient {
    type Connection = Connection;

    async fn connect(&self, params: ConnectParams<'_>) -> Result<Connection, FireboltError> {
        let api = base_url(params.api_endpoint)?;
        debug!(api = %api, auth = params.auth.method(), "authenticating with Firebolt");
        let (token, expiry) = self.access_token(&params, &api).await?;

        let engine_url = match (params.engine_url, params.engine_name) {
            (Some(engine_url), _) => engine_url.to_string(),
            (None, Some(engine_name)) => {
                FireboltEndpoints::engine_url_by_name(&self.http, &api, &token, engine_name)
                    .await?
            }
            (None, None) => {
                FireboltEndpoints::engine_url_by_database(&self.http, &api, &token, params.database)
                    .await?
            }
        };
        let engine_url = base_url(&engine_url)?;

        info!(
            database = %params.database,
            engine_url = %engine_url,
            "Firebolt connection established"
        );
        Ok(Connection::new(
            self.http.clone(),
            engine_url,
            params.database,
            token,
            expiry,
            params.additional_parameters,
        ))
    }
}
