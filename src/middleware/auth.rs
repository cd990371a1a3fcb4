use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller extracted from the request token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Resolves the caller through the configured auth provider and injects
/// [`AuthUser`] into the request extensions
pub async fn jwt_auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match state.auth.current_user_id(request.headers()).await {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
            ApiError::from(e).into_response()
        }
    }
}
