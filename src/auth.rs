use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::config::{EtlConfig, required};
use crate::error::EtlError;

pub const ENV_API_TOKEN: &str = "CSM_API_TOKEN";
pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

const AUTHORITY: &str = "https://login.microsoftonline.com";

pub trait TokenProvider {
    fn access_token(&self) -> Result<String, EtlError>;
}

#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String, EtlError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub struct ClientCredentials {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ClientCredentials {
    pub fn new(
        tenant_id: &str,
        client_id: String,
        client_secret: String,
        scope: String,
    ) -> Result<Self, EtlError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("csm-twingraph-etl/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| EtlError::InvalidConfig(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| EtlError::AuthHttp(err.to_string()))?;
        Ok(Self {
            client,
            token_url: format!("{AUTHORITY}/{tenant_id}/oauth2/v2.0/token"),
            client_id,
            client_secret,
            scope,
        })
    }
}

impl TokenProvider for ClientCredentials {
    fn access_token(&self) -> Result<String, EtlError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .map_err(|err| EtlError::AuthHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "token request failed".to_string());
            return Err(EtlError::AuthStatus { status, message });
        }
        let token: TokenResponse = response
            .json()
            .map_err(|err| EtlError::AuthHttp(err.to_string()))?;
        Ok(token.access_token)
    }
}

pub fn provider_from_env(config: &EtlConfig) -> Result<Box<dyn TokenProvider>, EtlError> {
    provider_from_lookup(|key| std::env::var(key).ok(), &config.api_scope)
}

pub fn provider_from_lookup<F>(lookup: F, scope: &str) -> Result<Box<dyn TokenProvider>, EtlError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Ok(token) = required(&lookup, ENV_API_TOKEN) {
        return Ok(Box::new(StaticToken::new(token)));
    }
    let tenant_id = required(&lookup, ENV_TENANT_ID)?;
    let client_id = required(&lookup, ENV_CLIENT_ID)?;
    let client_secret = required(&lookup, ENV_CLIENT_SECRET)?;
    Ok(Box::new(ClientCredentials::new(
        &tenant_id,
        client_id,
        client_secret,
        scope.to_string(),
    )?))
}
