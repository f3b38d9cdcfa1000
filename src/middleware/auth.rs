use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum::async_trait;

use crate::access::Actor;
use crate::auth::validate_jwt;
use crate::error::ApiError;

/// Authenticated caller, inserted into request extensions by `jwt_auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub Actor);

impl AuthUser {
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

/// JWT authentication middleware that validates tokens and extracts the actor
pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let token = match extract_jwt_from_headers(&headers) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    let claims = match validate_jwt(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            return ApiError::unauthorized(e.to_string()).into_response();
        }
    };

    request.extensions_mut().insert(AuthUser(claims.into_actor()));
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("JWT authentication required"))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_tokens_only() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }
}
