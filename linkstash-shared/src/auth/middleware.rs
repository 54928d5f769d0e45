/// Authentication middleware types
///
/// Protected routes see authentication as one capability: resolve the
/// request's `Authorization: Bearer <token>` header to a user id, or reject
/// with 401. The API crate installs a middleware layer that performs the
/// resolution and inserts an [`AuthContext`] into request extensions;
/// handlers extract it with Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use linkstash_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authentication context added to request extensions
///
/// Present on every request that passed the auth layer. Every query a handler
/// issues is scoped by this user id; that is the whole tenant-isolation
/// story.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication failures
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Resolves a raw `Authorization` header value to an [`AuthContext`]
///
/// This is the single identity-resolution routine behind the auth layer.
///
/// # Errors
///
/// - `MissingCredentials` if the header is absent
/// - `InvalidFormat` if it isn't a Bearer token
/// - `InvalidToken` if signature/expiry/issuer validation fails
pub fn resolve_bearer(header: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext::from_jwt(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_resolve_bearer_valid_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let ctx = resolve_bearer(Some(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(ctx.user_id, user_id);
    }

    #[test]
    fn test_resolve_bearer_missing_header() {
        match resolve_bearer(None, SECRET) {
            Err(AuthError::MissingCredentials) => {}
            other => panic!("Expected MissingCredentials, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_bearer_not_bearer() {
        match resolve_bearer(Some("Basic dXNlcjpwYXNz"), SECRET) {
            Err(AuthError::InvalidFormat(_)) => {}
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_bearer_refresh_token_rejected() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Refresh);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            resolve_bearer(Some(&format!("Bearer {}", token)), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
