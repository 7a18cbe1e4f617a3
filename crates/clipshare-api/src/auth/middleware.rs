use crate::auth::models::PrincipalContext;
use crate::auth::policy::AccessPolicy;
use crate::auth::verifier::VerifierChain;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clipshare_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<VerifierChain>,
    pub policy: AccessPolicy,
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthenticated(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    if !auth_header.starts_with("Bearer ") {
        return HttpAppError(AppError::Unauthenticated(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    }

    let token = &auth_header[7..]; // Remove "Bearer " prefix

    let profile = match auth_state.verifier.verify(token).await {
        Ok(profile) => profile,
        Err(e) => return HttpAppError(e).into_response(),
    };

    if let Err(e) = auth_state.policy.authorize(&profile.email) {
        return HttpAppError(e).into_response();
    }

    let context = PrincipalContext::new(profile.email);
    tracing::debug!(
        email = %context.principal.email,
        partition_key = %context.partition_key,
        "Request authenticated"
    );
    request.extensions_mut().insert(context);
    next.run(request).await
}
