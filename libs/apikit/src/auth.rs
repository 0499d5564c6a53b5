//! Bearer-token authentication: HS256 signing/verification and the axum
//! extractor that turns a valid token into an [`Identity`].
//!
//! Tokens are stateless; there is no session store. Every request is
//! verified against signature, expiry, issuer, and audience.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

use crate::problem::{forbidden, unauthorized, ProblemResponse};

/// Account roles carried in access tokens. Exactly one per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Role {
    Admin,
    Cliente,
    Cuidador,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Cliente => "Cliente",
            Role::Cuidador => "Cuidador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRole;

impl fmt::Display for InvalidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unrecognized role")
    }
}

impl std::error::Error for InvalidRole {}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Cliente" => Ok(Role::Cliente),
            "Cuidador" => Ok(Role::Cuidador),
            _ => Err(InvalidRole),
        }
    }
}

/// Token settings shared by the signer and the verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    #[serde(default = "default_secret")]
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access token lifetime.
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,
}

fn default_secret() -> String {
    // Development fallback; production deployments override it via config.
    "petcare-dev-secret-change-me-0123456789".to_string()
}

fn default_issuer() -> String {
    "petcare-auth".to_string()
}

fn default_audience() -> String {
    "petcare-api".to_string()
}

fn default_ttl() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            issuer: default_issuer(),
            audience: default_audience(),
            ttl: default_ttl(),
        }
    }
}

/// Claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, rendered as a string.
    pub sub: String,
    /// Tenant the account belongs to.
    pub tenant: String,
    pub role: Role,
    pub name: String,
    /// Whether the account has a second factor enabled.
    #[serde(default)]
    pub mfa: bool,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid bearer token")]
    InvalidToken,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// A freshly signed token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs access tokens. Lives in the auth module's service.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    issuer: String,
    audience: String,
    ttl: chrono::Duration,
}

impl TokenSigner {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: chrono::Duration::from_std(cfg.ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(24)),
        }
    }

    pub fn issue(
        &self,
        user_id: i64,
        tenant: &str,
        role: Role,
        name: &str,
        mfa: bool,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            tenant: tenant.to_string(),
            role,
            name: name.to_string(),
            mfa,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token =
            encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)?;
        Ok(IssuedToken { token, expires_at })
    }
}

/// Verifies access tokens. Installed app-wide as a request extension so the
/// [`Identity`] extractor can reach it.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&cfg.issuer]);
        validation.set_audience(&[&cfg.audience]);
        validation.leeway = 30;
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
        }
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims)
    }
}

/// Extract the raw bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The verified caller of a request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub tenant: String,
    pub role: Role,
    pub name: String,
    pub mfa: bool,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Handler-side role gate producing a 403 problem on mismatch.
    pub fn require_role(&self, role: Role) -> Result<(), ProblemResponse> {
        if self.role == role {
            Ok(())
        } else {
            Err(forbidden(format!("requires role {role}")))
        }
    }

    pub fn require_admin(&self) -> Result<(), ProblemResponse> {
        self.require_role(Role::Admin)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let verifier = parts
            .extensions
            .get::<TokenVerifier>()
            .cloned()
            .ok_or_else(|| unauthorized("token verification is not configured"))?;

        let token =
            bearer_token(&parts.headers).ok_or_else(|| unauthorized("missing bearer token"))?;

        let claims = verifier
            .decode(token)
            .map_err(|_| unauthorized("invalid or expired token"))?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| unauthorized("invalid subject claim"))?;

        Ok(Identity {
            user_id,
            tenant: claims.tenant,
            role: claims.role,
            name: claims.name,
            mfa: claims.mfa,
        })
    }
}
