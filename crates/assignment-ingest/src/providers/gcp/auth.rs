//! GCP authentication using a service account or a pre-issued token
//!
//! Handles OAuth2 token generation for the Vertex AI API.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use base64::Engine;
use ring::signature::RsaKeyPair;
use tokio::sync::RwLock;

use crate::config::{CredentialsConfig, ACCESS_TOKEN_ENV, CREDENTIALS_ENV};
use crate::error::{Error, Result};

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// GCP authentication manager
pub struct GcpAuth {
    /// Project ID
    project_id: String,
    source: TokenSource,
    /// Cached access token
    token: Arc<RwLock<Option<CachedToken>>>,
    http: reqwest::Client,
}

enum TokenSource {
    /// Token supplied by the caller, used as-is
    Static(String),
    ServiceAccount(ServiceAccount),
}

struct ServiceAccount {
    client_email: String,
    token_uri: String,
    key_pair: Arc<RsaKeyPair>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(serde::Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

impl GcpAuth {
    /// Build from injected credentials.
    ///
    /// A static access token wins over a key file. The key file is read and
    /// its private key parsed here, so a bad key fails construction rather
    /// than the first request.
    pub fn from_config(credentials: &CredentialsConfig, project_id: String) -> Result<Self> {
        if let Some(token) = credentials.access_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Self::from_access_token(token, project_id));
        }

        match &credentials.service_account_key_path {
            Some(path) => Self::from_service_account(path, project_id),
            None => Err(Error::Config(format!(
                "No GCP credentials configured: set {} or {}",
                CREDENTIALS_ENV, ACCESS_TOKEN_ENV
            ))),
        }
    }

    /// Use a pre-issued OAuth2 access token
    pub fn from_access_token(token: impl Into<String>, project_id: String) -> Self {
        Self {
            project_id,
            source: TokenSource::Static(token.into()),
            token: Arc::new(RwLock::new(None)),
            http: reqwest::Client::new(),
        }
    }

    /// Create from service account JSON key file
    pub fn from_service_account(key_path: impl AsRef<Path>, project_id: String) -> Result<Self> {
        let key_path = key_path.as_ref();
        let key_content = std::fs::read_to_string(key_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read service account key {}: {}",
                key_path.display(),
                e
            ))
        })?;

        let key: ServiceAccountKey = serde_json::from_str(&key_content)
            .map_err(|e| Error::Config(format!("Invalid service account key format: {}", e)))?;

        let private_key = key.private_key.replace("\\n", "\n");
        let der = pem::parse(&private_key)
            .map_err(|e| Error::Config(format!("Failed to parse private key PEM: {}", e)))?;
        let key_pair = RsaKeyPair::from_pkcs8(der.contents())
            .map_err(|e| Error::Config(format!("Failed to parse private key: {:?}", e)))?;

        tracing::debug!("Loaded service account {}", key.client_email);

        Ok(Self {
            project_id,
            source: TokenSource::ServiceAccount(ServiceAccount {
                client_email: key.client_email,
                token_uri: key.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
                key_pair: Arc::new(key_pair),
            }),
            token: Arc::new(RwLock::new(None)),
            http: reqwest::Client::new(),
        })
    }

    /// Get project ID
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Get a valid access token (refreshing if needed)
    pub async fn get_token(&self) -> Result<String> {
        let account = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount(account) => account,
        };

        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                // Token valid for at least 60 more seconds
                if cached.expires_at > Instant::now() + Duration::from_secs(60) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let (access_token, expires_in) = self.refresh_token(account).await?;

        {
            let mut token = self.token.write().await;
            *token = Some(CachedToken {
                access_token: access_token.clone(),
                expires_at: Instant::now() + Duration::from_secs(expires_in),
            });
        }

        Ok(access_token)
    }

    /// Exchange a signed JWT for an access token
    async fn refresh_token(&self, account: &ServiceAccount) -> Result<(String, u64)> {
        let jwt = sign_jwt(account)?;

        let response = self
            .http
            .post(&account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Config(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Config(format!(
                "Token exchange failed ({}): {}",
                status, body
            )));
        }

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
            #[serde(default)]
            expires_in: Option<u64>,
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Config(format!("Failed to parse token response: {}", e)))?;

        tracing::debug!("Refreshed access token for {}", account.client_email);

        // Tokens are issued for an hour unless the server says otherwise
        Ok((
            token_response.access_token,
            token_response.expires_in.unwrap_or(3600),
        ))
    }
}

/// Build an RS256-signed JWT assertion for the token endpoint
fn sign_jwt(account: &ServiceAccount) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::internal(format!("System clock before epoch: {}", e)))?
        .as_secs() as i64;

    let claims = serde_json::json!({
        "iss": account.client_email,
        "scope": CLOUD_PLATFORM_SCOPE,
        "aud": account.token_uri,
        "iat": now,
        "exp": now + 3600,
    });

    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"RS256","typ":"JWT"}"#.as_bytes());
    let payload = engine.encode(claims.to_string().as_bytes());
    let signing_input = format!("{}.{}", header, payload);

    let mut signature = vec![0u8; account.key_pair.public().modulus_len()];
    account
        .key_pair
        .sign(
            &ring::signature::RSA_PKCS1_SHA256,
            &ring::rand::SystemRandom::new(),
            signing_input.as_bytes(),
            &mut signature,
        )
        .map_err(|e| Error::Config(format!("Failed to sign JWT: {:?}", e)))?;

    Ok(format!("{}.{}", signing_input, engine.encode(&signature)))
}
