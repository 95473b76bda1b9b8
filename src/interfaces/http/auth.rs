use std::collections::HashMap;

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::api::{ApiMessage, AppState};
use crate::domain::user::{Role, UserId};
use crate::infrastructure::seed::Seed;

/// Authenticated caller identity, produced by the boundary middleware and
/// passed explicitly into core operations. Handlers never reach into
/// ambient request state for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthContext {
    /// Capability check at the boundary; core operations trust the result.
    pub fn require(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// Shortcut for routes that act on the approval queue.
    pub fn require_staff(&self) -> Result<(), AuthError> {
        if self.role.can_process_transactions() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("access denied: insufficient role")]
    Forbidden,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(ApiMessage::failure(self.to_string()))).into_response()
    }
}

/// Maps bearer tokens to caller identities. Token issuance (login, expiry,
/// refresh) is an external service; this port only resolves already-issued
/// tokens.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError>;
}

/// Fixed token table, loaded from the seed file. Suitable for tests and
/// single-node deployments fronted by a real identity provider.
#[derive(Debug, Default)]
pub struct StaticTokenAuthorizer {
    tokens: HashMap<String, AuthContext>,
}

impl StaticTokenAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, context: AuthContext) {
        self.tokens.insert(token.into(), context);
    }

    pub fn from_seed(seed: &Seed) -> Self {
        let mut authorizer = Self::new();
        for entry in &seed.users {
            if let Some(token) = &entry.api_token {
                authorizer.insert(
                    token.clone(),
                    AuthContext {
                        user_id: entry.user.id,
                        role: entry.user.role,
                    },
                );
            }
        }
        authorizer
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Capability-check middleware applied to every `/api` route. Resolves the
/// bearer token through the injected [`Authorizer`] and stashes the
/// resulting [`AuthContext`] as a request extension for handlers to extract.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return AuthError::MissingToken.into_response();
    };
    match state.authorizer.authenticate(token).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejected unauthenticated request");
            e.into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.remove(header::AUTHORIZATION);
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_require_role() {
        let staff = AuthContext {
            user_id: 2,
            role: Role::Staff,
        };
        assert!(staff.require(&[Role::Staff, Role::Admin]).is_ok());
        assert_eq!(
            staff.require(&[Role::Admin]).unwrap_err(),
            AuthError::Forbidden
        );

        let customer = AuthContext {
            user_id: 1,
            role: Role::Customer,
        };
        assert!(staff.require_staff().is_ok());
        assert_eq!(customer.require_staff().unwrap_err(), AuthError::Forbidden);
    }

    #[tokio::test]
    async fn test_static_authorizer_lookup() {
        let mut authorizer = StaticTokenAuthorizer::new();
        authorizer.insert(
            "tok",
            AuthContext {
                user_id: 1,
                role: Role::Customer,
            },
        );

        let context = authorizer.authenticate("tok").await.unwrap();
        assert_eq!(context.user_id, 1);
        assert_eq!(
            authorizer.authenticate("nope").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
