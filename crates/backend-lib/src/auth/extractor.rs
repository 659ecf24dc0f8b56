//! Request extractors for the caller's identity and address.
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};
use uuid::Uuid;

use crate::error::AppError;
use crate::{metrics, AppState};

/// The account named by a valid bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::MissingToken)?;

        let subject = state.auth.verify_token(token).map_err(|e| {
            metrics::record(metrics::TOKEN_REJECTED);
            tracing::debug!(reason = %e, "bearer token rejected");
            AppError::Auth(e)
        })?;

        // Tokens are only ever issued for account ids
        let user_id = Uuid::parse_str(&subject).map_err(|_| {
            metrics::record(metrics::TOKEN_REJECTED);
            AppError::Auth(super::AuthError::MalformedToken)
        })?;

        Ok(AuthUser(user_id))
    }
}

/// Client address used to key the limiters.
///
/// The socket peer by default. With `server.trust_forwarded_headers` the
/// proxy-set `X-Real-IP`, then the first `X-Forwarded-For` hop, win over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    pub fn from_parts(parts: &Parts, trust_forwarded_headers: bool) -> Self {
        let from_header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        let forwarded = if trust_forwarded_headers {
            from_header("x-real-ip").or_else(|| from_header("x-forwarded-for"))
        } else {
            None
        };

        let ip = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        });
        ClientIp(ip)
    }
}

impl<S> FromRequestParts<Arc<AppState<S>>> for ClientIp
where
    S: Send + Sync + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp::from_parts(
            parts,
            state.settings.server.trust_forwarded_headers,
        ))
    }
}
