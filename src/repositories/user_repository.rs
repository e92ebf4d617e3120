use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::entities::user::{self, Entity as User, Role};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await
    }

    pub async fn find_by_public_id<C: ConnectionTrait>(db: &C, public_id: Uuid) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::PublicId.eq(public_id))
            .one(db)
            .await
    }

    pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
    }

    /// Whether another account already uses `username`.
    pub async fn username_taken<C: ConnectionTrait>(db: &C, username: &str, except: i64) -> Result<bool, DbErr> {
        let found = User::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Id.ne(except))
            .count(db)
            .await?;
        Ok(found > 0)
    }

    /// Existing accounts clashing on username or email.
    pub async fn find_duplicates<C: ConnectionTrait>(
        db: &C,
        username: &str,
        email: &str,
    ) -> Result<Vec<user::Model>, DbErr> {
        User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(email))
                    .add(user::Column::Username.eq(username)),
            )
            .all(db)
            .await
    }

    pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: Vec<i64>) -> Result<HashMap<i64, user::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = User::find().filter(user::Column::Id.is_in(ids)).all(db).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser) -> Result<user::Model, DbErr> {
        let now = Utc::now();
        user::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            role: Set(new.role),
            is_active: Set(true),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            bio: Set(None),
            avatar: Set(None),
            website: Set(None),
            twitter: Set(None),
            github: Set(None),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    pub async fn touch_last_login<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<(), DbErr> {
        User::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
