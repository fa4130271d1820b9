//! Authentication provider boundary.
//!
//! The service only consumes the provider's signatures; the hosted backend
//! (Supabase's GoTrue) stays a black box behind the [`AuthProvider`] trait.
//! The client is constructed once in the composition root and injected,
//! rather than living as a module-level singleton.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the credentials or the signup request.
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("auth provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<AuthUser>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;
}

/// GoTrue REST client.
pub struct SupabaseAuth {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    async fn token_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error_description"]
                .as_str()
                .or_else(|| body["msg"].as_str())
                .unwrap_or("authentication failed")
                .to_string();
            warn!("Auth provider rejected {} request: {}", path, status);
            return Err(AuthError::Rejected(message));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.token_request("token?grant_type=password", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.token_request("signup", email, password).await
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}
