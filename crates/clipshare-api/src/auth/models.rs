use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use clipshare_core::principal::Principal;

/// Profile established by a successful token verification.
///
/// Carries whatever identity attributes the upstream provider returned;
/// only the email participates in authorization.
#[derive(Debug, Clone)]
pub struct VerifiedProfile {
    pub email: String,
    pub name: Option<String>,
}

/// Principal context established by the auth middleware and stored in
/// request extensions. The partition key is derived once here so every
/// handler sees the same value.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    pub principal: Principal,
    pub partition_key: String,
}

impl PrincipalContext {
    pub fn new(email: String) -> Self {
        let principal = Principal::new(email);
        let partition_key = principal.partition_key();
        Self {
            principal,
            partition_key,
        }
    }
}

// Implement FromRequestParts for PrincipalContext to work with Multipart.
// Extension cannot be used with Multipart, so we extract directly from
// request parts.
impl<S> FromRequestParts<S> for PrincipalContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<PrincipalContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing principal context".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_PRINCIPAL_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Check authentication token".to_string()),
                    }),
                )
            })
    }
}
