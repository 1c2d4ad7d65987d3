use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must be a Bearer token")]
    NotBearer,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("access token required")]
    NotAccess,
}

/// Verification half of the identity provider's HS256 keys.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    /// Resolves the user id from an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = header
            .ok_or(AuthError::MissingHeader)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::NotBearer)?;
        let claims = self.verify(token.trim())?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::NotAccess);
        }
        Ok(claims.sub)
    }
}

/// Authenticated caller; every engine operation is scoped to this user.
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        JwtKeys::from_ref(state)
            .authenticate(header)
            .map(AuthUser)
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))
    }
}

/// Issues tokens the way the identity provider does.
#[cfg(test)]
pub fn sign(config: &crate::config::JwtConfig, user_id: Uuid, kind: TokenKind) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    let now = OffsetDateTime::now_utc();
    let exp = now + Duration::minutes(5);
    let claims = Claims {
        sub: user_id,
        iat: now.unix_timestamp() as usize,
        exp: exp.unix_timestamp() as usize,
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
        kind,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .expect("sign test token")
}
