use crate::error::FireboltError;
use crate::types::SecretStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

const LOGIN_PATH: &str = "auth/v1/login";
const ENGINE_URL_BY_DATABASE_PATH: &str = "core/v1/account/engines:getURLByDatabaseName";
const ENGINE_ID_BY_NAME_PATH: &str = "core/v1/account/engines:getIdByName";

/// Hosts are configured without a scheme; HTTPS is assumed unless one is given.
pub(crate) fn base_url(host: &str) -> Result<Url, FireboltError> {
    let host = host.trim().trim_end_matches('/');
    let url = if host.contains("://") {
        Url::parse(&format!("{host}/"))?
    } else {
        Url::parse(&format!("https://{host}/"))?
    };
    Ok(url)
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EngineUrlResponse {
    engine_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EngineIdResponse {
    engine_id: Option<EngineId>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EngineId {
    pub account_id: String,
    pub engine_id: String,
}

#[derive(Debug, Deserialize)]
struct EngineResponse {
    engine: Option<Engine>,
}

#[derive(Debug, Deserialize)]
struct Engine {
    endpoint: Option<String>,
}

/// Stateless Firebolt REST endpoints.
pub(crate) struct FireboltEndpoints;

impl FireboltEndpoints {
    /// Exchange a username and password for an access token.
    pub(crate) async fn login(
        http_client: &reqwest::Client,
        api: &Url,
        username: &str,
        password: &SecretStr,
    ) -> Result<LoginResponse, FireboltError> {
        let resp = http_client
            .post(api.join(LOGIN_PATH)?)
            .json(&LoginRequest {
                username,
                password: password.reveal(),
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FireboltError::from_response(resp).await);
        }
        let login: LoginResponse = resp.json().await?;
        info!(username = %username, "Firebolt login succeeded");
        Ok(login)
    }

    /// Endpoint of the default engine attached to `database`.
    pub(crate) async fn engine_url_by_database(
        http_client: &reqwest::Client,
        api: &Url,
        token: &SecretStr,
        database: &str,
    ) -> Result<String, FireboltError> {
        let mut url = api.join(ENGINE_URL_BY_DATABASE_PATH)?;
        url.query_pairs_mut().append_pair("database_name", database);
        let resp: EngineUrlResponse = Self::get_json(http_client, url, token).await?;
        let engine_url = resp
            .engine_url
            .ok_or(FireboltError::MissingField("engine_url"))?;
        debug!(database = %database, engine_url = %engine_url, "resolved default engine");
        Ok(engine_url)
    }

    /// Endpoint of the engine called `engine_name`.
    pub(crate) async fn engine_url_by_name(
        http_client: &reqwest::Client,
        api: &Url,
        token: &SecretStr,
        engine_name: &str,
    ) -> Result<String, FireboltError> {
        let mut url = api.join(ENGINE_ID_BY_NAME_PATH)?;
        url.query_pairs_mut().append_pair("engine_name", engine_name);
        let id = Self::get_json::<EngineIdResponse>(http_client, url, token)
            .await?
            .engine_id
            .ok_or(FireboltError::MissingField("engine_id"))?;

        let url = api.join(&format!(
            "core/v1/accounts/{}/engines/{}",
            id.account_id, id.engine_id
        ))?;
        let engine_url = Self::get_json::<EngineResponse>(http_client, url, token)
            .await?
            .engine
            .and_then(|e| e.endpoint)
            .ok_or(FireboltError::MissingField("engine.endpoint"))?;
        debug!(engine_name = %engine_name, engine_url = %engine_url, "resolved named engine");
        Ok(engine_url)
    }

    async fn get_json<T>(
        http_client: &reqwest::Client,
        url: Url,
        token: &SecretStr,
    ) -> Result<T, FireboltError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = http_client
            .get(url)
            .bearer_auth(token.reveal())
            .header("Accept", "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(FireboltError::from_response(resp).await);
        }
        Ok(resp.json().await?)
    }
}
