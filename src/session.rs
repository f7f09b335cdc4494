use axum::{
    http::StatusCode,
    middleware::Next,
    response::{Response, IntoResponse},
    extract::{Request, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use std::convert::Infallible;
use std::env;

/// Role required for the admin surface.
pub const ADMIN_ROLE: &str = "Admin";

/// Claims as issued by the external session provider. This service only
/// decodes tokens, it never issues them.
#[derive(Deserialize)]
#[allow(dead_code)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

/// What the rest of the service sees of a session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub roles: Vec<String>,
}

/// Extractor for an optional session. Never rejects: a request without a
/// usable bearer token is simply anonymous.
pub struct OptionalSession(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .and_then(decode_session);

        Ok(OptionalSession(session))
    }
}

pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}

fn decode_session(token: &str) -> Option<SessionUser> {
    let secret = match env::var("JWT_SECRET") {
        Ok(s) => s,
        Err(_) => {
            eprintln!("JWT_SECRET not set, treating request as anonymous");
            return None;
        }
    };

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(SessionUser {
            email: data.claims.email,
            display_name: data.claims.name,
            roles: data.claims.roles,
        }),
        Err(e) => {
            eprintln!("Session token rejected: {}", e);
            None
        }
    }
}

/// Middleware guarding the admin surface: requires a valid session token
/// carrying the Admin role.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, impl IntoResponse> {
    let auth_header = req.headers().get("authorization").and_then(|v| v.to_str().ok());

    let token = match auth_header.and_then(bearer_token) {
        Some(t) => t,
        None => {
            return Err((StatusCode::UNAUTHORIZED, "missing token"));
        }
    };

    let secret = env::var("JWT_SECRET").expect("JWT_SECRET is not set");

    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("JWT decode error: {}", e);
            return Err((StatusCode::UNAUTHORIZED, "invalid token"));
        }
    };

    if !token_data.claims.roles.iter().any(|r| r == ADMIN_ROLE) {
        return Err((StatusCode::FORBIDDEN, "admin role required"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_claims_roles_default_to_empty() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "email": "manager@example.com",
            "name": "Pat Manager",
            "exp": 2000000000,
            "iat": 1700000000
        }))
        .unwrap();

        assert!(claims.roles.is_empty());
        assert_eq!(claims.email.as_deref(), Some("manager@example.com"));
    }

    #[test]
    fn test_claims_with_roles() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "roles": ["Admin", "Employee"],
            "exp": 2000000000,
            "iat": 1700000000
        }))
        .unwrap();

        assert_eq!(claims.roles, vec!["Admin", "Employee"]);
        assert!(claims.email.is_none());
    }
}
