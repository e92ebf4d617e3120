use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::models::auth_model::TokenPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User public id.
    pub sub: Uuid,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
    pub token_type: TokenKind,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// Issues and checks HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtUtils {
    pub fn new(secret: &str, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.jwt_secret, cfg.jwt_expiration_minutes, cfg.jwt_refresh_days)
    }

    fn generate(&self, user_id: Uuid, kind: TokenKind) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
            token_type: kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    pub fn generate_pair(&self, user_id: Uuid) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let (access_token, access) = self.generate(user_id, TokenKind::Access)?;
        let (refresh_token, refresh) = self.generate(user_id, TokenKind::Refresh)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_at: access.expires_at(),
            refresh_expires_at: refresh.expires_at(),
        })
    }

    /// Decodes a token and checks that it is of the expected kind.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        if data.claims.token_type != expected {
            return Err(ErrorKind::InvalidToken.into());
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_round_trips_with_kinds() {
        let jwt = JwtUtils::new("unit-test-secret", 15, 7);
        let user = Uuid::now_v7();
        let pair = jwt.generate_pair(user).unwrap();

        let access = jwt.validate(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.sub, user);
        assert!(pair.refresh_expires_at > pair.access_expires_at);

        assert!(jwt.validate(&pair.access_token, TokenKind::Refresh).is_err());
        assert!(jwt.validate(&pair.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn rejects_foreign_secret() {
        let ours = JwtUtils::new("secret-a", 15, 7);
        let theirs = JwtUtils::new("secret-b", 15, 7);
        let pair = theirs.generate_pair(Uuid::now_v7()).unwrap();
        let err = ours.validate(&pair.access_token, TokenKind::Access).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let jwt = JwtUtils::new("secret", -5, 7);
        let pair = jwt.generate_pair(Uuid::now_v7()).unwrap();
        let err = jwt.validate(&pair.access_token, TokenKind::Access).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }
}
