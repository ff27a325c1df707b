pub mod password;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{UserRecord, UserSummary};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &UserRecord, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid session token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// An authenticated identity attested by a valid session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: UserSummary,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user: UserSummary {
                id: claims.sub,
                name: claims.name,
                email: claims.email,
            },
            issued_at: timestamp(claims.iat),
            expires_at: timestamp(claims.exp),
        }
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Issues and validates HS256 session tokens
#[derive(Clone)]
pub struct SessionAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl SessionAuthority {
    pub fn new(security: &SecurityConfig) -> Result<Self, SessionError> {
        if security.jwt_secret.is_empty() {
            return Err(SessionError::InvalidSecret);
        }

        let secret = security.jwt_secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: Duration::hours(security.jwt_expiry_hours as i64),
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Sign a fresh token for `user`, returning it with the session it attests
    pub fn issue(&self, user: &UserRecord) -> Result<(String, Session), SessionError> {
        self.sign(Claims::new(user, self.lifetime))
    }

    fn sign(&self, claims: Claims) -> Result<(String, Session), SessionError> {
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;
        Ok((token, Session::from(claims)))
    }

    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

        Ok(Session::from(token_data.claims))
    }
}
