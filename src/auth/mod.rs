pub mod authorization;
pub mod jwks;
pub mod jwt;
pub mod middleware;

use crate::config::TokenSource;
use jwks::JwksCache;
use jwt::Claims;

/// Verifies bearer tokens for both HTTP requests and the real-time handshake.
#[derive(Clone)]
pub enum TokenVerifier {
    Jwks(JwksCache),
    Secret(String),
}

impl TokenVerifier {
    pub fn from_source(source: &TokenSource) -> Self {
        match source {
            TokenSource::Jwks { url, api_key } => Self::Jwks(JwksCache::new(url, api_key.as_deref())),
            TokenSource::Secret(secret) => Self::Secret(secret.clone()),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, String> {
        match self {
            Self::Jwks(cache) => cache.validate_token(token).await,
            Self::Secret(secret) => jwt::decode_with_secret(token, secret),
        }
    }
}
