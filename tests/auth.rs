mod common;

use tsuzuri::entities::user::Role;
use tsuzuri::models::auth_model::{
    AccessSession, ChangePasswordRequest, CurrentUser, LoginRequest, RegisterRequest,
};
use tsuzuri::repositories::user_repository::UserRepository;
use tsuzuri::services::auth_service::AuthService;
use tsuzuri::services::user_service::UserService;
use tsuzuri::utils::jwt_utils::TokenKind;

use common::setup;

fn registration(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
        password_confirm: "correct horse battery".to_string(),
        first_name: Some("Ada".into()),
        last_name: None,
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_then_login() -> anyhow::Result<()> {
    let app = setup().await?;
    let registered = AuthService::register(&app.db, &app.jwt, Role::Editor, registration("ada", "Ada@Example.com")).await?;
    assert_eq!(registered.user.email, "ada@example.com");
    assert_eq!(registered.user.role, Role::Editor);
    assert_eq!(registered.tokens.token_type, "Bearer");

    let err = AuthService::register(&app.db, &app.jwt, Role::Editor, registration("ada", "other@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_DUPLICATE_USERNAME");
    assert_eq!(err.status_code().as_u16(), 409);

    let err = AuthService::login(&app.db, &app.jwt, login("ada@example.com", "wrong password"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_FAILED");

    let session = AuthService::login(&app.db, &app.jwt, login("ada@example.com", "correct horse battery")).await?;
    assert!(session.user.last_login_at.is_none());
    let stored = UserRepository::find_by_email(&app.db, "ada@example.com").await?.expect("user exists");
    assert!(stored.last_login_at.is_some());
    Ok(())
}

#[tokio::test]
async fn refresh_tokens_are_single_use() -> anyhow::Result<()> {
    let app = setup().await?;
    let registered = AuthService::register(&app.db, &app.jwt, Role::Reader, registration("bob", "bob@example.com")).await?;
    let old = registered.tokens.refresh_token;

    let err = AuthService::refresh(&app.db, &app.jwt, &registered.tokens.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.status_code().as_u16(), 401);

    let fresh = AuthService::refresh(&app.db, &app.jwt, &old).await?;
    assert_ne!(fresh.refresh_token, old);

    let err = AuthService::refresh(&app.db, &app.jwt, &old).await.unwrap_err();
    assert_eq!(err.code(), "TOKEN_REVOKED");
    Ok(())
}

#[tokio::test]
async fn logout_revokes_both_tokens() -> anyhow::Result<()> {
    let app = setup().await?;
    let registered = AuthService::register(&app.db, &app.jwt, Role::Reader, registration("cy", "cy@example.com")).await?;
    let access = app.jwt.validate(&registered.tokens.access_token, TokenKind::Access)?;

    let user = UserRepository::find_by_email(&app.db, "cy@example.com").await?.expect("user exists");
    let mut actor = CurrentUser::from(&user);
    actor.session = Some(AccessSession {
        jti: access.jti.clone(),
        expires_at: access.expires_at(),
    });

    AuthService::logout(&app.db, &app.jwt, &actor, Some(&registered.tokens.refresh_token)).await?;
    assert!(AuthService::is_revoked(&app.db, &access.jti).await?);

    let err = AuthService::refresh(&app.db, &app.jwt, &registered.tokens.refresh_token)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TOKEN_REVOKED");
    Ok(())
}

#[tokio::test]
async fn deactivated_accounts_cannot_sign_in() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = app.user("admin", Role::Admin).await?;
    let registered = AuthService::register(&app.db, &app.jwt, Role::Reader, registration("dee", "dee@example.com")).await?;

    let err = UserService::toggle_active(&app.db, &app.policy, &admin, admin.public_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CANNOT_DEACTIVATE_SELF");

    let toggled = UserService::toggle_active(&app.db, &app.policy, &admin, registered.user.id).await?;
    assert!(!toggled.is_active);

    let err = AuthService::login(&app.db, &app.jwt, login("dee@example.com", "correct horse battery"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ACCOUNT_DISABLED");

    let err = UserService::get_public_user(&app.db, "dee").await.unwrap_err();
    assert_eq!(err.code(), "USER_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn password_change_requires_the_old_one() -> anyhow::Result<()> {
    let app = setup().await?;
    AuthService::register(&app.db, &app.jwt, Role::Reader, registration("eve", "eve@example.com")).await?;
    let user = UserRepository::find_by_email(&app.db, "eve@example.com").await?.expect("user exists");
    let actor = CurrentUser::from(&user);

    let err = AuthService::change_password(
        &app.db,
        &actor,
        ChangePasswordRequest {
            old_password: "not it".into(),
            new_password: "brand new secret".into(),
            new_password_confirm: "brand new secret".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_OLD_PASSWORD");

    AuthService::change_password(
        &app.db,
        &actor,
        ChangePasswordRequest {
            old_password: "correct horse battery".into(),
            new_password: "brand new secret".into(),
            new_password_confirm: "brand new secret".into(),
        },
    )
    .await?;
    AuthService::login(&app.db, &app.jwt, login("eve@example.com", "brand new secret")).await?;
    Ok(())
}
