use sea_orm::entity::prelude::*;

/// One counted view. Unique per (article, visitor_key), where the key
/// combines the user and the ip; anonymous viewers are keyed by ip alone.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "article_views")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub article_id: i64,
    pub user_id: Option<i64>,
    pub ip_address: String,
    pub visitor_key: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id",
        on_delete = "Cascade"
    )]
    Article,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// `<user id>@<ip>` for signed-in viewers, `anon@<ip>` otherwise.
pub fn visitor_key(user_id: Option<i64>, ip: &str) -> String {
    match user_id {
        Some(id) => format!("{}@{}", id, ip),
        None => format!("anon@{}", ip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_and_signed_in_keys_differ() {
        assert_eq!(visitor_key(None, "10.0.0.1"), "anon@10.0.0.1");
        assert_eq!(visitor_key(Some(7), "10.0.0.1"), "7@10.0.0.1");
    }
}
