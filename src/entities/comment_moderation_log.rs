use sea_orm::{entity::prelude::*, sea_query::StringLen};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "marked_spam")]
    MarkedSpam,
    #[sea_orm(string_value = "deleted")]
    Deleted,
    #[sea_orm(string_value = "edited")]
    Edited,
    #[sea_orm(string_value = "report_resolved")]
    ReportResolved,
}

/// Audit trail of moderator actions. `comment_id` is nulled when the
/// comment is removed; `comment_public_id` keeps the reference readable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comment_moderation_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub comment_id: Option<i64>,
    pub comment_public_id: Uuid,
    pub moderator_id: i64,
    pub action: ModerationAction,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comment::Entity",
        from = "Column::CommentId",
        to = "super::comment::Column::Id",
        on_delete = "SetNull"
    )]
    Comment,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ModeratorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Moderator,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Moderator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
