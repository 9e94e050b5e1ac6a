//! Optional HTTP Basic Authentication in front of the contest API.
//!
//! Draws rewrite the history file, so when `HOST_USERNAME` and
//! `HOST_PASSWORD` are both set only the host may call `/api`.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;

const REALM: &str = "Basic realm=\"Contest Picker\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCredentials {
    pub username: String,
    pub password: String,
}

/// `None` credentials leave the API open
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub credentials: Option<HostCredentials>,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Some(HostCredentials {
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    pub fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        match (read("HOST_USERNAME"), read("HOST_PASSWORD")) {
            (Some(username), Some(password)) => {
                tracing::info!("Host authentication enabled for '{}'", username);
                Self::new(username, password)
            }
            (None, None) => {
                tracing::warn!("Host authentication disabled, anyone can run draws");
                Self::default()
            }
            _ => {
                tracing::warn!(
                    "Only one of HOST_USERNAME/HOST_PASSWORD is set; host authentication disabled"
                );
                Self::default()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether the request headers carry the configured credentials
    pub fn authorizes(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.credentials else {
            return true;
        };
        basic_credentials(headers).is_some_and(|(username, password)| {
            same_bytes(username.as_bytes(), expected.username.as_bytes())
                & same_bytes(password.as_bytes(), expected.password.as_bytes())
        })
    }
}

/// Decode `Authorization: Basic <base64 user:pass>`
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Compare without short-circuiting on the first differing byte
fn same_bytes(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware guarding the host routes
pub async fn host_auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if auth_config.authorizes(request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!("Rejected unauthenticated request to {}", request.uri().path());
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        "Unauthorized",
    )
        .into_response()
}
