//! Authentication boundary
//!
//! Every pipeline entry point first resolves the current authenticated user.
//! Absence of a valid session is a terminal error for that operation,
//! surfaced to the client as a login prompt (401) and never retried
//! server-side.

use crate::core::error::AppError;
use async_trait::async_trait;
use axum::http::HeaderMap;
use std::collections::HashMap;
use uuid::Uuid;

/// The authenticated caller of an operation.
///
/// All persisted rows are scoped by this id; no sharing and no cross-user
/// visibility exist anywhere in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the authenticated user from request headers
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AppError>;
}

/// Bearer-token provider backed by a static token → user map.
///
/// The map is loaded from configuration at startup; there is no token
/// issuance flow in this service.
pub struct TokenAuthProvider {
    tokens: HashMap<String, Uuid>,
}

impl TokenAuthProvider {
    pub fn new(tokens: HashMap<String, Uuid>) -> Self {
        Self { tokens }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Uuid)>) -> Self {
        Self {
            tokens: pairs.into_iter().collect(),
        }
    }

    fn bearer_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(axum::http::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AppError> {
        let token = Self::bearer_token(headers)
            .ok_or_else(|| AppError::unauthorized("authentication required"))?;

        self.tokens
            .get(token)
            .map(|user_id| AuthContext { user_id: *user_id })
            .ok_or_else(|| AppError::unauthorized("invalid or expired session"))
    }
}

/// Development provider: every request is the same user.
pub struct SingleUserProvider {
    user_id: Uuid,
}

impl SingleUserProvider {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl Default for SingleUserProvider {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

#[async_trait]
impl AuthProvider for SingleUserProvider {
    async fn authenticate(&self, _headers: &HeaderMap) -> Result<AuthContext, AppError> {
        Ok(AuthContext {
            user_id: self.user_id,
        })
    }
}
