use sea_orm_migration::prelude::*;

use crate::common::{created_at, pk_column};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Comments, replies cascade with their parent
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_column(manager, Comments::Id))
                    .col(ColumnDef::new(Comments::PublicId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Comments::ArticleId).big_integer().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Comments::ParentId).big_integer().null())
                    .col(ColumnDef::new(Comments::Depth).integer().not_null().default(0))
                    .col(ColumnDef::new(Comments::Content).text().not_null())
                    .col(ColumnDef::new(Comments::IsApproved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Comments::IsSpam).boolean().not_null().default(false))
                    .col(ColumnDef::new(Comments::IsEdited).boolean().not_null().default(false))
                    .col(ColumnDef::new(Comments::LikeCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Comments::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(Comments::UserAgent).text().null())
                    .col(created_at(Comments::CreatedAt))
                    .col(created_at(Comments::UpdatedAt))
                    .col(ColumnDef::new(Comments::EditedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_article_id")
                            .from(Comments::Table, Comments::ArticleId)
                            .to(Articles::Table, Articles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_author_id")
                            .from(Comments::Table, Comments::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_parent_id")
                            .from(Comments::Table, Comments::ParentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_article_approved_created")
                    .table(Comments::Table)
                    .col(Comments::ArticleId)
                    .col(Comments::IsApproved)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_comments_parent_approved")
                    .table(Comments::Table)
                    .col(Comments::ParentId)
                    .col(Comments::IsApproved)
                    .to_owned(),
            )
            .await?;

        // 2. Comment likes
        manager
            .create_table(
                Table::create()
                    .table(CommentLikes::Table)
                    .if_not_exists()
                    .col(pk_column(manager, CommentLikes::Id))
                    .col(ColumnDef::new(CommentLikes::CommentId).big_integer().not_null())
                    .col(ColumnDef::new(CommentLikes::UserId).big_integer().not_null())
                    .col(created_at(CommentLikes::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_likes_comment_id")
                            .from(CommentLikes::Table, CommentLikes::CommentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_likes_user_id")
                            .from(CommentLikes::Table, CommentLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_comment_likes_comment_user")
                    .table(CommentLikes::Table)
                    .col(CommentLikes::CommentId)
                    .col(CommentLikes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 3. Reports, one per (comment, reporter)
        manager
            .create_table(
                Table::create()
                    .table(CommentReports::Table)
                    .if_not_exists()
                    .col(pk_column(manager, CommentReports::Id))
                    .col(ColumnDef::new(CommentReports::PublicId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(CommentReports::CommentId).big_integer().not_null())
                    .col(ColumnDef::new(CommentReports::ReporterId).big_integer().not_null())
                    .col(ColumnDef::new(CommentReports::Reason).string_len(20).not_null())
                    .col(ColumnDef::new(CommentReports::Description).text().null())
                    .col(ColumnDef::new(CommentReports::IsResolved).boolean().not_null().default(false))
                    .col(ColumnDef::new(CommentReports::ResolvedById).big_integer().null())
                    .col(ColumnDef::new(CommentReports::ResolvedAt).timestamp_with_time_zone().null())
                    .col(created_at(CommentReports::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_reports_comment_id")
                            .from(CommentReports::Table, CommentReports::CommentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_reports_reporter_id")
                            .from(CommentReports::Table, CommentReports::ReporterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_reports_resolved_by_id")
                            .from(CommentReports::Table, CommentReports::ResolvedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_comment_reports_comment_reporter")
                    .table(CommentReports::Table)
                    .col(CommentReports::CommentId)
                    .col(CommentReports::ReporterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 4. Moderation log. Entries outlive the comment they describe.
        manager
            .create_table(
                Table::create()
                    .table(CommentModerationLogs::Table)
                    .if_not_exists()
                    .col(pk_column(manager, CommentModerationLogs::Id))
                    .col(ColumnDef::new(CommentModerationLogs::CommentId).big_integer().null())
                    .col(ColumnDef::new(CommentModerationLogs::CommentPublicId).uuid().not_null())
                    .col(ColumnDef::new(CommentModerationLogs::ModeratorId).big_integer().not_null())
                    .col(ColumnDef::new(CommentModerationLogs::Action).string_len(20).not_null())
                    .col(ColumnDef::new(CommentModerationLogs::Reason).text().null())
                    .col(created_at(CommentModerationLogs::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_moderation_logs_comment_id")
                            .from(CommentModerationLogs::Table, CommentModerationLogs::CommentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_moderation_logs_moderator_id")
                            .from(CommentModerationLogs::Table, CommentModerationLogs::ModeratorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommentModerationLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommentReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommentLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    PublicId,
    ArticleId,
    AuthorId,
    ParentId,
    Depth,
    Content,
    IsApproved,
    IsSpam,
    IsEdited,
    LikeCount,
    IpAddress,
    UserAgent,
    CreatedAt,
    UpdatedAt,
    EditedAt,
}

#[derive(Iden)]
enum CommentLikes {
    Table,
    Id,
    CommentId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum CommentReports {
    Table,
    Id,
    PublicId,
    CommentId,
    ReporterId,
    Reason,
    Description,
    IsResolved,
    ResolvedById,
    ResolvedAt,
    CreatedAt,
}

#[derive(Iden)]
enum CommentModerationLogs {
    Table,
    Id,
    CommentId,
    CommentPublicId,
    ModeratorId,
    Action,
    Reason,
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
