//! Request extractors
//!
//! `AuthUser` runs full token validation and hands the resulting identity to
//! the handler. `BearerToken` only reads the header, for routes that must
//! accept tokens validation would reject (logout).

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use quill_core::{AuthError, AuthenticatedUser, ClientInfo};
use quill_shared::constants::MAX_USER_AGENT_LENGTH;
use quill_shared::utils::parse_bearer;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_IP_LENGTH: usize = 45;

fn bearer_from_headers(headers: &HeaderMap) -> Result<String, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_string)
        .ok_or(AuthError::TokenMissing)
}

/// Raw bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_from_headers(&parts.headers)?))
    }
}

/// A caller whose bearer token passed validation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: AuthenticatedUser,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from_headers(&parts.headers)?;
        let identity = state.manager.validate_token(&token).await?;
        Ok(Self { identity, token })
    }
}

/// Client metadata recorded with a new session.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub ClientInfo);

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect::<String>());

        let ip_address = forwarded_ip(&parts.headers)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .map(|ip| ip.chars().take(MAX_IP_LENGTH).collect::<String>());

        Ok(Self(ClientInfo {
            user_agent,
            ip_address,
        }))
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };
    forwarded.or_else(real_ip).map(str::to_string)
}

/// JSON body that must also pass its `validator` rules.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_missing_or_malformed() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_from_headers(&headers), Err(AuthError::TokenMissing)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(bearer_from_headers(&headers), Err(AuthError::TokenMissing)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_from_headers(&headers).unwrap(), "abc.def");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));
        assert_eq!(bearer_from_headers(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_forwarded_ip_prefers_first_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(forwarded_ip(&headers), None);

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(forwarded_ip(&headers).as_deref(), Some("10.0.0.9"));

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(forwarded_ip(&headers).as_deref(), Some("203.0.113.7"));
    }
}
