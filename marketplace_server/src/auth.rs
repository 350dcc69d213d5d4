//! Bearer token handling.
//!
//! Access tokens are HS256 JWTs carrying the caller's user id and role. The server only verifies them. Issuing
//! happens in the external credential service, or with `marketplace_server issue-token` for operators.
use actix_web::{dev::Payload, http::header::HeaderValue, FromRequest, HttpMessage, HttpRequest};
use chrono::Duration;
use futures::future::{ready, Ready};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    Token,
    UntrustedToken,
};
use log::*;
use marketplace_engine::db_types::{Role, UserId};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: UserId,
    pub role: Role,
}

impl JwtClaims {
    pub fn new<S: Into<UserId>>(sub: S, role: Role) -> Self {
        Self { sub: sub.into(), role }
    }
}

/// Handlers take `JwtClaims` as an argument to get the authenticated caller. The JWT middleware must have run on the
/// route, otherwise extraction fails with a 401.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
            warn!("🔐 Route handler expected JWT claims, but none were attached to the request");
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

pub struct TokenIssuer {
    key: Hs256Key,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()), lifetime: config.token_lifetime }
    }

    /// Signs an access token for `claims`, valid for the configured lifetime.
    pub fn issue_token(&self, claims: JwtClaims) -> Result<String, AuthError> {
        let header = Header::empty().with_token_type("JWT");
        let claims = Claims::new(claims).set_duration_and_issuance(&TimeOptions::default(), self.lifetime);
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }
}

pub struct TokenValidator {
    key: Hs256Key,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token: Token<JwtClaims> =
            Hs256.validator(&self.key).validate(&untrusted).map_err(|e| AuthError::ValidationError(e.to_string()))?;
        token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        let (_, claims) = token.into_parts();
        trace!("🔐 Access token validated for {}", claims.custom.sub);
        Ok(claims.custom)
    }

    /// Validates the token in an `Authorization: Bearer <token>` header value.
    pub fn validate_header(&self, header: Option<&HeaderValue>) -> Result<JwtClaims, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;
        let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))?;
        self.validate(token)
    }
}
