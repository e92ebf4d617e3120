use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::user::{self, Role};
use crate::models::user_model::UserResponse;

#[derive(Deserialize, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = true))]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(custom(function = "crate::utils::validator_utils::validate_username"))]
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub password_confirm: String,

    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

fn passwords_match(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req.password == req.password_confirm {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Passwords do not match".into());
        Err(err)
    }
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    pub refresh_token: String,
}

#[derive(Deserialize, Validate, Default)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize, Validate)]
#[validate(schema(function = "new_passwords_match", skip_on_field_errors = true))]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    pub old_password: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,

    #[serde(default)]
    pub new_password_confirm: String,
}

fn new_passwords_match(req: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if req.new_password == req.new_password_confirm {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("New passwords do not match".into());
        Err(err)
    }
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

/// The access token a request was authenticated with.
#[derive(Debug, Clone)]
pub struct AccessSession {
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Authenticated caller, inserted into request extensions by the auth
/// middleware and passed explicitly into every service call.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub public_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub session: Option<AccessSession>,
}

impl From<&user::Model> for CurrentUser {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            public_id: user.public_id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            session: None,
        }
    }
}

/// Optional caller on endpoints that also serve anonymous visitors.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<CurrentUser>);

impl Viewer {
    pub fn user(&self) -> Option<&CurrentUser> {
        self.0.as_ref()
    }
}
