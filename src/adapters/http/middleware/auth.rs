//! Bearer-token middleware for the tool server.
//!
//! When a token is configured every request must carry
//! `Authorization: Bearer <token>`; anything else gets a `401` with a small
//! JSON body. Without a configured token requests pass through untouched.
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//!
//! let auth = AuthState::new(Some(Secret::new("s3cret".into())));
//! let app = Router::new()
//!     .route("/tools", get(list_tools))
//!     .layer(middleware::from_fn_with_state(auth, auth_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};

/// Expected bearer token, if any.
#[derive(Clone, Default)]
pub struct AuthState {
    token: Option<Arc<Secret<String>>>,
}

impl AuthState {
    /// A blank token is treated as "no authentication".
    pub fn new(token: Option<Secret<String>>) -> Self {
        Self {
            token: token
                .filter(|t| !t.expose_secret().trim().is_empty())
                .map(Arc::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    fn accepts(&self, presented: Option<&str>) -> Result<(), AuthRejection> {
        let Some(expected) = &self.token else {
            return Ok(());
        };
        match presented {
            None => Err(AuthRejection::MissingToken),
            Some(token) if token == expected.expose_secret().as_str() => Ok(()),
            Some(_) => Err(AuthRejection::InvalidToken),
        }
    }
}

/// Rejects requests whose bearer token does not match the configured one.
pub async fn auth_middleware(State(auth): State<AuthState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    match auth.accepts(presented) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = rejection.message(),
                "Rejected unauthenticated request"
            );
            rejection.into_response()
        }
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
}

impl AuthRejection {
    fn message(&self) -> &'static str {
        match self {
            AuthRejection::MissingToken => "Authentication required",
            AuthRejection::InvalidToken => "Invalid token",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": self.message(),
                "code": "AUTH_ERROR"
            })),
        )
            .into_response()
    }
}
