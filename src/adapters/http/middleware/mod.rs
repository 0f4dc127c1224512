//! HTTP middleware for axum.
//!
//! - `auth` - static bearer-token check

pub mod auth;

pub use auth::{auth_middleware, AuthRejection, AuthState};
