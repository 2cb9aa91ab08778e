use reqwest::header::REFERER;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::*;
use crate::error::{AppendError, Result};

/// Authenticated context for one run. Dropped at the end of the run.
pub struct Session {
    client: reqwest::Client,
    token: String,
    /// The token is bound to this referer; every request using it must send it
    referer: String,
}

/// Error object the ArcGIS REST API returns with an HTTP 200.
#[derive(Debug, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self.message.as_deref().unwrap_or("unknown error");
        match self.code {
            Some(code) => write!(f, "{message} (code {code})")?,
            None => write!(f, "{message}")?,
        }
        if !self.details.is_empty() {
            write!(f, ": {}", self.details.join("; "))?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
    expires: Option<i64>,
    error: Option<ServiceError>,
}

impl Session {
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }
}

#[cfg(test)]
impl Session {
    pub fn for_tests(referer: &str) -> Self {
        Session {
            client: build_client(Duration::from_secs(2)).unwrap(),
            token: "test-token".to_string(),
            referer: referer.to_string(),
        }
    }
}

pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

pub async fn connect(
    client: reqwest::Client,
    portal_url: &str,
    username: &str,
    password: &str,
) -> Result<Session> {
    let portal_url = portal_url.trim_end_matches('/');
    let endpoint = format!("{portal_url}/sharing/rest/generateToken");
    let expiration = TOKEN_EXPIRATION_MINUTES.to_string();

    info!("Connecting to {portal_url} as {username}...");
    let response = client
        .post(&endpoint)
        .header(REFERER, portal_url)
        .form(&[
            ("username", username),
            ("password", password),
            ("client", "referer"),
            ("referer", portal_url),
            ("expiration", expiration.as_str()),
            ("f", "json"),
        ])
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| AppendError::connect(portal_url, e))?
        .json::<TokenResponse>()
        .await
        .map_err(|e| AppendError::connect(portal_url, format!("invalid token response: {e}")))?;

    let (token, expires) =
        token_from(response).map_err(|message| AppendError::connect(portal_url, message))?;

    info!("Connected to {portal_url}");
    if let Some(expires) = expires {
        debug!("Token expires at {expires} (epoch ms)");
    }
    Ok(Session {
        client,
        token,
        referer: portal_url.to_string(),
    })
}

fn token_from(response: TokenResponse) -> std::result::Result<(String, Option<i64>), String> {
    if let Some(err) = response.error {
        return Err(err.to_string());
    }
    match response.token {
        Some(token) if !token.is_empty() => Ok((token, response.expires)),
        _ => Err("no token in response".to_string()),
    }
}
