use sea_orm_migration::prelude::*;

use crate::common::{created_at, pk_column};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Tags
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(pk_column(manager, Tags::Id))
                    .col(ColumnDef::new(Tags::PublicId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Tags::Name).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Tags::Slug).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Tags::Description).text().null())
                    .col(ColumnDef::new(Tags::Color).string_len(7).not_null().default("#007bff"))
                    .col(ColumnDef::new(Tags::IsActive).boolean().not_null().default(true))
                    .col(created_at(Tags::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // 2. Articles
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(pk_column(manager, Articles::Id))
                    .col(ColumnDef::new(Articles::PublicId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Articles::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Articles::Slug).string_len(200).not_null().unique_key())
                    .col(ColumnDef::new(Articles::Excerpt).text().null())
                    .col(ColumnDef::new(Articles::Content).text().not_null())
                    .col(ColumnDef::new(Articles::Status).string_len(10).not_null().default("draft"))
                    .col(ColumnDef::new(Articles::MetaTitle).string_len(60).null())
                    .col(ColumnDef::new(Articles::MetaDescription).string_len(160).null())
                    .col(ColumnDef::new(Articles::OgTitle).string_len(60).null())
                    .col(ColumnDef::new(Articles::OgDescription).string_len(160).null())
                    .col(ColumnDef::new(Articles::OgImage).string().null())
                    .col(ColumnDef::new(Articles::FeaturedImage).string().null())
                    .col(ColumnDef::new(Articles::FeaturedImageAlt).string_len(200).null())
                    .col(ColumnDef::new(Articles::ViewCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Articles::LikeCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Articles::ShareCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Articles::AllowComments).boolean().not_null().default(true))
                    .col(ColumnDef::new(Articles::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Articles::IsPinned).boolean().not_null().default(false))
                    .col(ColumnDef::new(Articles::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Articles::PublishedAt).timestamp_with_time_zone().null())
                    .col(created_at(Articles::CreatedAt))
                    .col(created_at(Articles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_articles_author_id")
                            .from(Articles::Table, Articles::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_articles_status_published_at")
                    .table(Articles::Table)
                    .col(Articles::Status)
                    .col(Articles::PublishedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_articles_author_status")
                    .table(Articles::Table)
                    .col(Articles::AuthorId)
                    .col(Articles::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_articles_featured_status")
                    .table(Articles::Table)
                    .col(Articles::IsFeatured)
                    .col(Articles::Status)
                    .to_owned(),
            )
            .await?;

        // 3. Article <-> Tag pivot
        manager
            .create_table(
                Table::create()
                    .table(ArticleTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ArticleTags::ArticleId).big_integer().not_null())
                    .col(ColumnDef::new(ArticleTags::TagId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ArticleTags::ArticleId)
                            .col(ArticleTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_tags_article_id")
                            .from(ArticleTags::Table, ArticleTags::ArticleId)
                            .to(Articles::Table, Articles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_tags_tag_id")
                            .from(ArticleTags::Table, ArticleTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArticleTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    PublicId,
    Name,
    Slug,
    Description,
    Color,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Articles {
    Table,
    Id,
    PublicId,
    Title,
    Slug,
    Excerpt,
    Content,
    Status,
    MetaTitle,
    MetaDescription,
    OgTitle,
    OgDescription,
    OgImage,
    FeaturedImage,
    FeaturedImageAlt,
    ViewCount,
    LikeCount,
    ShareCount,
    AllowComments,
    IsFeatured,
    IsPinned,
    AuthorId,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ArticleTags {
    Table,
    ArticleId,
    TagId,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
