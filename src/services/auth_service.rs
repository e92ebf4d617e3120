use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use sea_orm::*;

use crate::entities::{token_blacklist, user, user::Role};
use crate::models::auth_model::{
    AuthResponse, ChangePasswordRequest, CurrentUser, LoginRequest, RegisterRequest, TokenPair,
};
use crate::models::user_model::UserResponse;
use crate::repositories::user_repository::{NewUser, UserRepository};
use crate::utils::app_error::{is_unique_violation, AppError, AppResult};
use crate::utils::jwt_utils::{Claims, JwtUtils, TokenKind};
use crate::utils::text_utils::non_blank;

pub struct AuthService;

impl AuthService {
    pub async fn register(
        db: &DatabaseConnection,
        jwt: &JwtUtils,
        default_role: Role,
        payload: RegisterRequest,
    ) -> AppResult<AuthResponse> {
        let username = payload.username.trim().to_string();
        let email = payload.email.trim().to_lowercase();

        let duplicates = UserRepository::find_duplicates(db, &username, &email).await?;
        if !duplicates.is_empty() {
            return Err(Self::duplicate_error(&duplicates, &username, &email));
        }

        let password_hash = Self::hash_password(&payload.password)
            .map_err(|_| AppError::internal("Failed to hash password"))?;

        let user = UserRepository::create(
            db,
            NewUser {
                username: username.clone(),
                email: email.clone(),
                password_hash,
                role: default_role,
                first_name: non_blank(payload.first_name),
                last_name: non_blank(payload.last_name),
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("AUTH_DUPLICATE", "Username or email already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        let tokens = Self::issue_tokens(jwt, &user)?;
        tracing::info!("Registered user {} as {}", user.public_id, user.role);

        Ok(AuthResponse {
            user: UserResponse::from(&user),
            tokens,
        })
    }

    pub async fn login(db: &DatabaseConnection, jwt: &JwtUtils, payload: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::unauthorized("AUTH_FAILED", "Invalid email or password");

        let user = UserRepository::find_by_email(db, &payload.email)
            .await?
            .ok_or_else(invalid)?;

        let is_valid = Self::verify_password(&payload.password, &user.password_hash)
            .map_err(|_| AppError::internal("Password verification failed"))?;
        if !is_valid {
            tracing::warn!("Failed login for user {}", user.public_id);
            return Err(invalid());
        }

        if !user.is_active {
            return Err(AppError::unauthorized("ACCOUNT_DISABLED", "This account has been deactivated"));
        }

        UserRepository::touch_last_login(db, user.id).await?;
        let tokens = Self::issue_tokens(jwt, &user)?;

        Ok(AuthResponse {
            user: UserResponse::from(&user),
            tokens,
        })
    }

    /// Exchanges a refresh token for a new pair. The old refresh token is
    /// revoked so each one can be used once.
    pub async fn refresh(db: &DatabaseConnection, jwt: &JwtUtils, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = jwt
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|e| Self::token_error(e.kind()))?;

        if Self::is_revoked(db, &claims.jti).await? {
            return Err(AppError::unauthorized("TOKEN_REVOKED", "Refresh token has been revoked"));
        }

        let user = UserRepository::find_by_public_id(db, claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("USER_NOT_FOUND", "User no longer exists"))?;
        if !user.is_active {
            return Err(AppError::unauthorized("ACCOUNT_DISABLED", "This account has been deactivated"));
        }

        Self::revoke(db, &claims, Some(user.id)).await?;
        Self::issue_tokens(jwt, &user)
    }

    /// Revokes the access token of the current request and, when given,
    /// the refresh token issued alongside it.
    pub async fn logout(
        db: &DatabaseConnection,
        jwt: &JwtUtils,
        actor: &CurrentUser,
        refresh_token: Option<&str>,
    ) -> AppResult<()> {
        if let Some(session) = &actor.session {
            Self::blacklist(db, &session.jti, TokenKind::Access, session.expires_at, Some(actor.id)).await?;
        }

        if let Some(token) = refresh_token.filter(|t| !t.trim().is_empty()) {
            let claims = jwt
                .validate(token, TokenKind::Refresh)
                .map_err(|e| Self::token_error(e.kind()))?;
            if claims.sub != actor.public_id {
                return Err(AppError::validation("TOKEN_MISMATCH", "Refresh token belongs to another user"));
            }
            Self::revoke(db, &claims, Some(actor.id)).await?;
        }

        tracing::info!("User {} logged out", actor.public_id);
        Ok(())
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        actor: &CurrentUser,
        payload: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = user::Entity::find_by_id(actor.id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

        let is_valid = Self::verify_password(&payload.old_password, &user.password_hash)
            .map_err(|_| AppError::internal("Password verification failed"))?;
        if !is_valid {
            return Err(AppError::validation("INVALID_OLD_PASSWORD", "Old password is incorrect"));
        }

        let password_hash = Self::hash_password(&payload.new_password)
            .map_err(|_| AppError::internal("Failed to hash password"))?;

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(())
    }

    pub async fn is_revoked<C: ConnectionTrait>(db: &C, jti: &str) -> AppResult<bool> {
        let found = token_blacklist::Entity::find()
            .filter(token_blacklist::Column::Jti.eq(jti))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Drops blacklist rows for tokens that have expired on their own.
    pub async fn purge_expired_tokens(db: &DatabaseConnection) -> AppResult<u64> {
        let res = token_blacklist::Entity::delete_many()
            .filter(token_blacklist::Column::ExpiresAt.lt(Utc::now()))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn revoke(db: &DatabaseConnection, claims: &Claims, user_id: Option<i64>) -> AppResult<()> {
        Self::blacklist(db, &claims.jti, claims.token_type, claims.expires_at(), user_id).await
    }

    async fn blacklist(
        db: &DatabaseConnection,
        jti: &str,
        kind: TokenKind,
        expires_at: chrono::DateTime<Utc>,
        user_id: Option<i64>,
    ) -> AppResult<()> {
        match token_blacklist::revocation(jti, kind, user_id, expires_at).insert(db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::unauthorized(
                "TOKEN_REVOKED",
                "Token has already been revoked",
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn issue_tokens(jwt: &JwtUtils, user: &user::Model) -> AppResult<TokenPair> {
        jwt.generate_pair(user.public_id)
            .map_err(|_| AppError::internal("Token generation failed"))
    }

    pub fn token_error(kind: &ErrorKind) -> AppError {
        let (code, message) = match kind {
            ErrorKind::ExpiredSignature => ("TOKEN_EXPIRED", "Token has expired"),
            ErrorKind::InvalidSignature => ("TOKEN_BAD_SIGNATURE", "Invalid token signature"),
            ErrorKind::InvalidToken => ("TOKEN_INVALID", "Token is invalid"),
            _ => ("AUTH_FAILED", "Authentication failed"),
        };
        AppError::unauthorized(code, message)
    }

    fn duplicate_error(duplicates: &[user::Model], username: &str, email: &str) -> AppError {
        let username_taken = duplicates.iter().any(|u| u.username == username);
        let email_taken = duplicates.iter().any(|u| u.email == email);
        let (code, msg) = match (username_taken, email_taken) {
            (true, true) => ("AUTH_DUPLICATE", "Username and email already exist"),
            (true, false) => ("AUTH_DUPLICATE_USERNAME", "Username already exists"),
            _ => ("AUTH_DUPLICATE_EMAIL", "Email already exists"),
        };
        AppError::Conflict(code, msg.to_string())
    }

    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = AuthService::hash_password("correct horse").unwrap();
        assert!(AuthService::verify_password("correct horse", &hash).unwrap());
        assert!(!AuthService::verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn token_errors_have_stable_codes() {
        assert_eq!(AuthService::token_error(&ErrorKind::ExpiredSignature).code(), "TOKEN_EXPIRED");
        assert_eq!(AuthService::token_error(&ErrorKind::InvalidToken).code(), "TOKEN_INVALID");
    }
}
