//! Bearer token verification
//!
//! Two verifiers run in order: an ID-token verifier that validates RS256
//! signatures against the provider's JWKS document, and an access-token
//! verifier that falls back to the provider's userinfo endpoint for opaque
//! tokens. JWKS keys are cached with a TTL so rotation does not require a
//! restart.

use crate::auth::models::VerifiedProfile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clipshare_core::{AppError, Config};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A strategy for turning a bearer token into a verified profile.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Short name used in logs when this verifier accepts or rejects a token.
    fn name(&self) -> &'static str;

    async fn verify(&self, token: &str) -> Result<VerifiedProfile, AppError>;
}

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    #[serde(rename = "alg")]
    pub algorithm: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>,
    #[serde(rename = "e")]
    pub exponent: Option<String>,
}

/// Cached public key with expiration
#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

/// Claims we care about from an OpenID Connect ID token.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies RS256 ID tokens against a JWKS endpoint with key caching.
pub struct IdTokenVerifier {
    jwks_url: String,
    audience: String,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    cache_ttl_seconds: i64,
}

impl IdTokenVerifier {
    pub fn new(jwks_url: String, audience: String, cache_ttl_seconds: Option<i64>) -> Self {
        Self {
            jwks_url,
            audience,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_seconds: cache_ttl_seconds.unwrap_or(3600),
        }
    }

    /// Fetch JWKS from the configured URL
    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = reqwest::get(&self.jwks_url)
            .await
            .map_err(|e| AppError::Unauthenticated(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthenticated(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| AppError::Unauthenticated(format!("Failed to parse JWKS: {}", e)))?;

        Ok(jwks)
    }

    /// Convert JWK to DecodingKey
    fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
        if jwk.key_type != "RSA" {
            return Err(AppError::Unauthenticated(format!(
                "Unsupported key type: {}",
                jwk.key_type
            )));
        }
        let n = jwk
            .modulus
            .as_ref()
            .ok_or_else(|| AppError::Unauthenticated("RSA key missing modulus".to_string()))?;
        let e = jwk
            .exponent
            .as_ref()
            .ok_or_else(|| AppError::Unauthenticated("RSA key missing exponent".to_string()))?;

        // jsonwebtoken handles the base64url decoding of the components
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AppError::Unauthenticated(format!("Failed to create RSA key: {}", e)))
    }

    /// Get decoding key for a given key ID, with caching
    async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        let cache_key = kid.unwrap_or("default").to_string();

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&cache_key) {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.key.clone());
                }
            }
        }

        // Cache miss or expired - fetch fresh JWKS
        let jwks = self.fetch_jwks().await?;

        let jwk = if let Some(kid) = kid {
            jwks.keys
                .iter()
                .find(|k| k.key_id.as_ref().map(|k| k == kid).unwrap_or(false))
                .ok_or_else(|| {
                    AppError::Unauthenticated(format!("Key ID {} not found in JWKS", kid))
                })?
        } else {
            jwks.keys
                .first()
                .ok_or_else(|| AppError::Unauthenticated("No keys found in JWKS".to_string()))?
        };

        let decoding_key = Self::jwk_to_decoding_key(jwk)?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                cache_key,
                CachedKey {
                    key: decoding_key.clone(),
                    expires_at: Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds),
                },
            );
        }

        Ok(decoding_key)
    }
}

#[async_trait]
impl TokenVerifier for IdTokenVerifier {
    fn name(&self) -> &'static str {
        "id_token"
    }

    async fn verify(&self, token: &str) -> Result<VerifiedProfile, AppError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AppError::Unauthenticated(format!("Invalid token header: {}", e)))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Unauthenticated(format!(
                "Unsupported algorithm: {:?}",
                header.alg
            )));
        }

        let decoding_key = self.get_decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_audience(&[self.audience.as_str()]);

        let token_data =
            decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
                tracing::debug!("ID token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthenticated("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                        AppError::Unauthenticated("Token audience mismatch".to_string())
                    }
                    _ => AppError::Unauthenticated(format!("Invalid or expired token: {}", e)),
                }
            })?;

        let claims = token_data.claims;
        if !claims.email_verified {
            return Err(AppError::Unauthenticated(
                "Email address is not verified".to_string(),
            ));
        }

        Ok(VerifiedProfile {
            email: claims.email.to_lowercase(),
            name: claims.name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies opaque access tokens by introspecting them against the
/// provider's userinfo endpoint.
pub struct AccessTokenVerifier {
    userinfo_url: String,
    client: reqwest::Client,
}

impl AccessTokenVerifier {
    pub fn new(userinfo_url: String) -> Self {
        Self {
            userinfo_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TokenVerifier for AccessTokenVerifier {
    fn name(&self) -> &'static str {
        "access_token"
    }

    async fn verify(&self, token: &str) -> Result<VerifiedProfile, AppError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                AppError::Unauthenticated(format!("Userinfo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Unauthenticated(format!(
                "Userinfo endpoint rejected token: {}",
                response.status()
            )));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| AppError::Unauthenticated(format!("Invalid userinfo response: {}", e)))?;

        Ok(VerifiedProfile {
            email: info.email.to_lowercase(),
            name: info.name,
        })
    }
}

/// Runs verifiers in order and accepts the first success. Only when every
/// verifier has rejected the token does the request fail.
pub struct VerifierChain {
    verifiers: Vec<Arc<dyn TokenVerifier>>,
}

impl VerifierChain {
    pub fn new(verifiers: Vec<Arc<dyn TokenVerifier>>) -> Self {
        Self { verifiers }
    }

    /// Standard chain: ID token first, userinfo introspection as fallback.
    pub fn for_config(config: &Config) -> Self {
        Self::new(vec![
            Arc::new(IdTokenVerifier::new(
                config.jwks_url.clone(),
                config.oauth_client_id.clone(),
                Some(config.jwks_cache_ttl_secs as i64),
            )),
            Arc::new(AccessTokenVerifier::new(config.userinfo_url.clone())),
        ])
    }

    pub async fn verify(&self, token: &str) -> Result<VerifiedProfile, AppError> {
        let mut last_error = None;
        for verifier in &self.verifiers {
            match verifier.verify(token).await {
                Ok(profile) => {
                    tracing::debug!(
                        verifier = verifier.name(),
                        email = %profile.email,
                        "Token verified"
                    );
                    return Ok(profile);
                }
                Err(e) => {
                    tracing::debug!(verifier = verifier.name(), error = %e, "Verifier rejected token");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| AppError::Unauthenticated("No token verifiers configured".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVerifier {
        result: Result<VerifiedProfile, ()>,
    }

    #[async_trait]
    impl TokenVerifier for FixedVerifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn verify(&self, _token: &str) -> Result<VerifiedProfile, AppError> {
            match &self.result {
                Ok(profile) => Ok(profile.clone()),
                Err(()) => Err(AppError::Unauthenticated("rejected".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_second_verifier() {
        let chain = VerifierChain::new(vec![
            Arc::new(FixedVerifier { result: Err(()) }),
            Arc::new(FixedVerifier {
                result: Ok(VerifiedProfile {
                    email: "user@example.com".to_string(),
                    name: None,
                }),
            }),
        ]);
        let profile = chain.verify("token").await.expect("fallback should accept");
        assert_eq!(profile.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_chain_reports_failure_when_all_reject() {
        let chain = VerifierChain::new(vec![
            Arc::new(FixedVerifier { result: Err(()) }),
            Arc::new(FixedVerifier { result: Err(()) }),
        ]);
        let err = chain.verify("token").await.expect_err("should reject");
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_jwk_requires_rsa_components() {
        let jwk = Jwk {
            key_type: "RSA".to_string(),
            key_id: Some("kid1".to_string()),
            key_use: None,
            algorithm: None,
            modulus: None,
            exponent: None,
        };
        assert!(IdTokenVerifier::jwk_to_decoding_key(&jwk).is_err());
    }
}
