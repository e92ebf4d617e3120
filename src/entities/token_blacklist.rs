use chrono::Utc;
use sea_orm::{entity::prelude::*, Set};

use crate::utils::jwt_utils::TokenKind;

/// A revoked JWT, identified by its `jti` claim. Rows are kept until the
/// token would have expired anyway.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "token_blacklist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub jti: String,
    /// `access` or `refresh`.
    pub token_kind: String,
    pub user_id: Option<i64>,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn revocation(jti: &str, kind: TokenKind, user_id: Option<i64>, expires_at: DateTimeUtc) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::now_v7()),
        jti: Set(jti.to_string()),
        token_kind: Set(kind.as_str().to_string()),
        user_id: Set(user_id),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now()),
    }
}
