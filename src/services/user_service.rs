use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::article::{self, ArticleStatus};
use crate::entities::{comment, user};
use crate::models::auth_model::CurrentUser;
use crate::models::user_model::{
    full_name, ChangeRoleRequest, PublicUserResponse, UpdateProfileRequest, UserFilterParams, UserResponse,
};
use crate::repositories::user_repository::UserRepository;
use crate::utils::api_response::{page_window, Paginated, PaginationMeta};
use crate::utils::app_error::{AppError, AppResult};
use crate::utils::text_utils::non_blank;

pub struct UserService;

impl UserService {
    pub async fn get_profile(db: &DatabaseConnection, actor: &CurrentUser) -> AppResult<UserResponse> {
        let user = Self::load(db, actor.public_id).await?;
        Ok(UserResponse::from(&user))
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        actor: &CurrentUser,
        payload: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = Self::load(db, actor.public_id).await?;
        if let Some(username) = payload.username.as_deref().map(str::trim) {
            if username != user.username && UserRepository::username_taken(db, username, user.id).await? {
                return Err(AppError::Conflict("USERNAME_TAKEN", "Username is already taken".to_string()));
            }
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(v) = payload.username {
            active.username = Set(v.trim().to_string());
        }

        // Present-but-blank clears the field.
        if let Some(v) = payload.first_name {
            active.first_name = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.last_name {
            active.last_name = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.bio {
            active.bio = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.avatar {
            active.avatar = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.website {
            active.website = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.twitter {
            active.twitter = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.github {
            active.github = Set(non_blank(Some(v)));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(UserResponse::from(&updated))
    }

    /// Active users with their published article and approved comment counts.
    pub async fn list_public_users(
        db: &DatabaseConnection,
        params: UserFilterParams,
    ) -> AppResult<Paginated<PublicUserResponse>> {
        let (page, limit) = page_window(params.page, params.limit);
        let mut query = user::Entity::find().filter(user::Column::IsActive.eq(true));
        if let Some(role) = params.role {
            query = query.filter(user::Column::Role.eq(role));
        }
        if let Some(search) = non_blank(params.search) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Username.contains(&search))
                    .add(user::Column::FirstName.contains(&search))
                    .add(user::Column::LastName.contains(&search)),
            );
        }
        let paginator = query.order_by_asc(user::Column::Username).paginate(db, limit);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page - 1).await?;

        let mut items = Vec::with_capacity(users.len());
        for u in users {
            items.push(Self::public_profile(db, u).await?);
        }

        Ok(Paginated {
            items,
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    pub async fn get_public_user(db: &DatabaseConnection, username: &str) -> AppResult<PublicUserResponse> {
        let user = UserRepository::find_by_username(db, username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;
        Self::public_profile(db, user).await
    }

    pub async fn admin_list_users(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        params: UserFilterParams,
    ) -> AppResult<Paginated<UserResponse>> {
        policy.authorize(actor, Action::Manage, &Resource::User)?;

        let (page, limit) = page_window(params.page, params.limit);
        let mut query = user::Entity::find();
        if let Some(role) = params.role {
            query = query.filter(user::Column::Role.eq(role));
        }
        if let Some(active) = params.is_active {
            query = query.filter(user::Column::IsActive.eq(active));
        }
        if let Some(search) = non_blank(params.search) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Username.contains(&search))
                    .add(user::Column::Email.contains(&search)),
            );
        }

        let paginator = query.order_by_desc(user::Column::CreatedAt).paginate(db, limit);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page - 1).await?;

        Ok(Paginated {
            items: users.iter().map(UserResponse::from).collect(),
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    pub async fn toggle_active(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        target: Uuid,
    ) -> AppResult<UserResponse> {
        policy.authorize(actor, Action::Manage, &Resource::User)?;
        let user = Self::load(db, target).await?;
        if user.id == actor.id {
            return Err(AppError::validation("CANNOT_DEACTIVATE_SELF", "You cannot deactivate your own account"));
        }

        let next = !user.is_active;
        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(next);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        tracing::info!("User {} set is_active={} by {}", updated.public_id, next, actor.public_id);
        Ok(UserResponse::from(&updated))
    }

    pub async fn change_role(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        target: Uuid,
        payload: ChangeRoleRequest,
    ) -> AppResult<UserResponse> {
        policy.authorize(actor, Action::Manage, &Resource::User)?;
        let user = Self::load(db, target).await?;
        if user.id == actor.id && payload.role != user.role {
            return Err(AppError::validation("CANNOT_CHANGE_OWN_ROLE", "You cannot change your own role"));
        }

        let mut active: user::ActiveModel = user.into();
        active.role = Set(payload.role);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        tracing::info!("User {} role set to {} by {}", updated.public_id, updated.role, actor.public_id);
        Ok(UserResponse::from(&updated))
    }

    async fn load(db: &DatabaseConnection, public_id: Uuid) -> AppResult<user::Model> {
        UserRepository::find_by_public_id(db, public_id)
            .await?
            .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))
    }

    async fn public_profile(db: &DatabaseConnection, user: user::Model) -> AppResult<PublicUserResponse> {
        let published_article_count = article::Entity::find()
            .filter(article::Column::AuthorId.eq(user.id))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .count(db)
            .await?;
        let approved_comment_count = comment::Entity::find()
            .filter(comment::Column::AuthorId.eq(user.id))
            .filter(comment::Column::IsApproved.eq(true))
            .count(db)
            .await?;

        Ok(PublicUserResponse {
            id: user.public_id,
            full_name: full_name(&user),
            username: user.username,
            role: user.role,
            bio: user.bio,
            avatar: user.avatar,
            website: user.website,
            twitter: user.twitter,
            github: user.github,
            published_article_count,
            approved_comment_count,
            created_at: user.created_at,
        })
    }
}
