use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::jwt::Claims;

#[derive(Clone)]
struct EcKey {
    x: String,
    y: String,
    algorithm: Algorithm,
}

/// EC public keys from the identity provider's JWKS endpoint, cached by `kid`.
#[derive(Clone)]
pub struct JwksCache {
    keys: Arc<Cache<String, EcKey>>,
    jwks_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl JwksCache {
    pub fn new(jwks_url: &str, api_key: Option<&str>) -> Self {
        let keys = Arc::new(
            Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(16)
                .build(),
        );

        Self {
            keys,
            jwks_url: jwks_url.to_string(),
            api_key: api_key.map(str::to_string),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_jwks(&self) -> Result<serde_json::Value, String> {
        debug!(url = %self.jwks_url, "fetching JWKS");

        let mut request = self.client.get(&self.jwks_url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch JWKS: HTTP {status}"));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| format!("Failed to parse JWKS JSON: {e}"))
    }

    async fn key_for(&self, kid: &str) -> Result<EcKey, String> {
        if let Some(cached) = self.keys.get(kid).await {
            return Ok(cached);
        }

        let jwks = self.fetch_jwks().await?;
        let entry = jwks["keys"]
            .as_array()
            .ok_or("No keys in JWKS")?
            .iter()
            .find(|k| k["kid"].as_str() == Some(kid))
            .ok_or(format!("Key with kid={kid} not found in JWKS"))?;

        let coordinate = |name: &str| {
            entry[name]
                .as_str()
                .map(str::to_string)
                .ok_or(format!("Missing '{name}' in JWK"))
        };

        let algorithm = match entry["alg"].as_str() {
            Some("ES384") => Algorithm::ES384,
            _ => Algorithm::ES256,
        };

        let key = EcKey {
            x: coordinate("x")?,
            y: coordinate("y")?,
            algorithm,
        };

        self.keys.insert(kid.to_string(), key.clone()).await;
        Ok(key)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, String> {
        let header = decode_header(token).map_err(|e| format!("Failed to decode header: {e}"))?;
        let kid = header.kid.ok_or("No 'kid' in token header")?;

        let key = self.key_for(&kid).await?;
        let decoding_key = DecodingKey::from_ec_components(&key.x, &key.y)
            .map_err(|e| format!("Failed to create decoding key: {e}"))?;

        let mut validation = Validation::new(key.algorithm);
        validation.validate_aud = false;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Token validation failed: {e}"))
    }
}
