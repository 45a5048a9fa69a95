//! HTTP bindings for the genstudio API, built on [`reqwest`].
//!
//! Every authenticated call reads the bearer token from a
//! [`CredentialStore`]; a 401 from any endpoint clears it.

use std::sync::Arc;

use async_trait::async_trait;
use genstudio_core::credentials::Credentials;
use genstudio_core::generation::OVERLOAD_SENTINEL;
use genstudio_core::types::DbId;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::api::GenerationApi;
use crate::credentials::CredentialStore;
use crate::error::ClientError;
use crate::model::{GenerationRequest, GenerationResult};

/// Body of signup/login responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Identity attached to a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: DbId,
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    user: SessionUser,
}

/// Error envelope shared by all endpoints. Every field is optional so a
/// non-JSON body still maps to a status-based error.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for one genstudio server.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpClient {
    /// * `base_url` - Server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, credentials)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// Create an account and store the issued token.
    pub async fn signup(&self, credentials: &Credentials) -> Result<String, ClientError> {
        credentials.check()?;
        let response = self
            .client
            .post(self.url("/api/auth/signup"))
            .json(credentials)
            .send()
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(self.error_from(response).await);
        }
        self.store_token(response).await
    }

    /// Log in and store the issued token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ClientError> {
        credentials.check()?;
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(self.error_from(response).await);
        }
        self.store_token(response).await
    }

    /// Tell the server and drop the local token. The token is dropped even
    /// when the server cannot be reached.
    pub async fn logout(&self) -> Result<String, ClientError> {
        let result = self.client.post(self.url("/api/auth/logout")).send().await;
        self.credentials.clear().await;

        let response = result?;
        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }
        let body: MessageResponse = decode(response).await?;
        Ok(body.message)
    }

    /// Check the stored token with the server and return its owner.
    pub async fn verify(&self) -> Result<SessionUser, ClientError> {
        let token = self.bearer().await?;
        let response = self
            .client
            .get(self.url("/api/auth/verify"))
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(self.error_from(response).await);
        }
        let body: VerifyResponse = decode(response).await?;
        Ok(body.user)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn bearer(&self) -> Result<String, ClientError> {
        self.credentials
            .load()
            .await
            .ok_or_else(|| ClientError::Auth("Please login to continue".into()))
    }

    async fn store_token(&self, response: Response) -> Result<String, ClientError> {
        let body: TokenResponse = decode(response).await?;
        self.credentials.save(&body.token).await?;
        Ok(body.token)
    }

    /// Map a non-success response onto the client error taxonomy.
    async fn error_from(&self, response: Response) -> ClientError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body.message.or(body.error);

        match status {
            StatusCode::SERVICE_UNAVAILABLE if message.as_deref() == Some(OVERLOAD_SENTINEL) => {
                ClientError::Overloaded
            }
            StatusCode::BAD_REQUEST => {
                ClientError::Validation(message.unwrap_or_else(|| "Bad request".into()))
            }
            StatusCode::UNAUTHORIZED => {
                tracing::info!("Session rejected by server, clearing stored credential");
                self.credentials.clear().await;
                ClientError::Auth(
                    message.unwrap_or_else(|| "Session expired. Please login again.".into()),
                )
            }
            other => ClientError::Unexpected(match message {
                Some(msg) => format!("Server responded with {other}: {msg}"),
                None => format!("Server responded with {other}"),
            }),
        }
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Unexpected(format!("Malformed response: {e}")))
}

#[async_trait]
impl GenerationApi for HttpClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        let file = request.validate()?;
        let token = self.bearer().await?;

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ClientError::Validation(format!("Invalid file type: {e}")))?;
        let form = Form::new()
            .text("prompt", request.prompt.clone())
            .text("style", request.style.as_str())
            .part("file", part);

        let response = self
            .client
            .post(self.url("/api/generations/generate"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(self.error_from(response).await);
        }
        decode(response).await
    }

    async fn history(&self, limit: i64) -> Result<Vec<GenerationResult>, ClientError> {
        let token = self.bearer().await?;
        let response = self
            .client
            .get(self.url("/api/generations/getGenerate"))
            .query(&[("limit", limit)])
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(self.error_from(response).await);
        }
        decode(response).await
    }
}
