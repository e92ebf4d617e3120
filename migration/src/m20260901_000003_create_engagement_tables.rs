use sea_orm_migration::prelude::*;

use crate::common::{created_at, pk_column};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Likes, one per (article, user)
        manager
            .create_table(
                Table::create()
                    .table(ArticleLikes::Table)
                    .if_not_exists()
                    .col(pk_column(manager, ArticleLikes::Id))
                    .col(ColumnDef::new(ArticleLikes::ArticleId).big_integer().not_null())
                    .col(ColumnDef::new(ArticleLikes::UserId).big_integer().not_null())
                    .col(created_at(ArticleLikes::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_likes_article_id")
                            .from(ArticleLikes::Table, ArticleLikes::ArticleId)
                            .to(Articles::Table, Articles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_likes_user_id")
                            .from(ArticleLikes::Table, ArticleLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_article_likes_article_user")
                    .table(ArticleLikes::Table)
                    .col(ArticleLikes::ArticleId)
                    .col(ArticleLikes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 2. Views, anonymous viewers have no user_id
        manager
            .create_table(
                Table::create()
                    .table(ArticleViews::Table)
                    .if_not_exists()
                    .col(pk_column(manager, ArticleViews::Id))
                    .col(ColumnDef::new(ArticleViews::ArticleId).big_integer().not_null())
                    .col(ColumnDef::new(ArticleViews::UserId).big_integer().null())
                    .col(ColumnDef::new(ArticleViews::IpAddress).string_len(45).not_null())
                    .col(ColumnDef::new(ArticleViews::VisitorKey).string_len(80).not_null())
                    .col(ColumnDef::new(ArticleViews::UserAgent).text().null())
                    .col(created_at(ArticleViews::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_views_article_id")
                            .from(ArticleViews::Table, ArticleViews::ArticleId)
                            .to(Articles::Table, Articles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_views_user_id")
                            .from(ArticleViews::Table, ArticleViews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_views_article_created")
                    .table(ArticleViews::Table)
                    .col(ArticleViews::ArticleId)
                    .col(ArticleViews::CreatedAt)
                    .to_owned(),
            )
            .await?;
        // user_id is nullable, so uniqueness is enforced on the derived key
        manager
            .create_index(
                Index::create()
                    .name("uq_article_views_article_visitor")
                    .table(ArticleViews::Table)
                    .col(ArticleViews::ArticleId)
                    .col(ArticleViews::VisitorKey)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_article_views_article_ip")
                    .table(ArticleViews::Table)
                    .col(ArticleViews::ArticleId)
                    .col(ArticleViews::IpAddress)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArticleViews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArticleLikes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum ArticleLikes {
    Table,
    Id,
    ArticleId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum ArticleViews {
    Table,
    Id,
    ArticleId,
    UserId,
    IpAddress,
    VisitorKey,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum Articles {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
