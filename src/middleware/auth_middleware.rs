use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AppState;
use crate::models::auth_model::{AccessSession, CurrentUser, Viewer};
use crate::repositories::user_repository::UserRepository;
use crate::services::auth_service::AuthService;
use crate::utils::app_error::AppError;
use crate::utils::jwt_utils::TokenKind;

/// Rejects the request unless it carries a valid, unrevoked access token
/// for an active account.
pub async fn require_auth(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let token = match bearer_token(req.headers()) {
        Ok(Some(token)) => token,
        Ok(None) => {
            return AppError::unauthorized("AUTH_MISSING", "Authorization header is missing").into_response();
        }
        Err(e) => return e.into_response(),
    };

    match authenticate(&state, &token).await {
        Ok(user) => {
            req.extensions_mut().insert(Viewer(Some(user.clone())));
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Resolves the caller when a token is present. A missing header means an
/// anonymous visitor; a bad token is still rejected.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let viewer = match bearer_token(req.headers()) {
        Ok(None) => Viewer(None),
        Ok(Some(token)) => match authenticate(&state, &token).await {
            Ok(user) => {
                req.extensions_mut().insert(user.clone());
                Viewer(Some(user))
            }
            Err(e) => return e.into_response(),
        },
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(viewer);
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::unauthorized("AUTH_INVALID_FORMAT", "Invalid Authorization header format"))?;
    match raw.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(AppError::unauthorized(
            "AUTH_INVALID_SCHEME",
            "Invalid token format. Missing 'Bearer ' prefix",
        )),
    }
}

async fn authenticate(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state
        .jwt
        .validate(token, TokenKind::Access)
        .map_err(|e| AuthService::token_error(e.kind()))?;

    if AuthService::is_revoked(&state.db, &claims.jti).await? {
        return Err(AppError::unauthorized("TOKEN_REVOKED", "This session has been logged out"));
    }

    let user = UserRepository::find_by_public_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("AUTH_FAILED", "Account no longer exists"))?;
    if !user.is_active {
        tracing::warn!("Rejected token for disabled account {}", user.public_id);
        return Err(AppError::unauthorized("ACCOUNT_DISABLED", "This account has been disabled"));
    }

    let mut current = CurrentUser::from(&user);
    current.session = Some(AccessSession {
        expires_at: claims.expires_at(),
        jti: claims.jti,
    });
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
        assert_eq!(bearer_token(&headers("Bearer abc.def")).unwrap().as_deref(), Some("abc.def"));

        let err = bearer_token(&headers("Basic xyz")).unwrap_err();
        assert_eq!(err.code(), "AUTH_INVALID_SCHEME");
        let err = bearer_token(&headers("Bearer   ")).unwrap_err();
        assert_eq!(err.code(), "AUTH_INVALID_SCHEME");
    }
}
