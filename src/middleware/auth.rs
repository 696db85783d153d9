use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub sub: String,
    pub name: Option<String>,
}

impl AuthUser {
    /// Human-readable name for the user, falling back to the subject id.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.sub.clone())
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            name: claims.name,
        }
    }
}

/// JWT authentication middleware that validates bearer tokens and injects
/// the user context into the request.
///
/// Every failure kind produces a 401. Missing credentials get their own
/// message; all other kinds collapse to a fixed "Invalid token". The
/// specific reason is only logged server-side.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&headers).map_err(|err| {
        tracing::warn!("request authentication failed: {}", err);
        match err {
            AuthError::MissingCredentials => {
                ApiError::unauthorized("Authorization header is missing")
            }
            _ => ApiError::unauthorized("Invalid token"),
        }
    })?;

    // Convert claims to AuthUser and inject into request
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Run the full authentication sequence against the request headers:
/// extract the bearer token, verify signature and expiry, then apply the
/// secondary claim checks.
fn authenticate(headers: &HeaderMap) -> Result<Claims, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = auth::verify_token(token)?;
    auth::validate_claims(&claims)?;
    Ok(claims)
}

/// Extract the raw bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("header value is not valid ASCII"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader("missing Bearer prefix"))?;

    if token.trim().is_empty() {
        return Err(AuthError::MalformedHeader("empty token"));
    }

    Ok(token)
}
