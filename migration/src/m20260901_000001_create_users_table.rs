use sea_orm_migration::prelude::*;

use crate::common::{created_at, pk_column};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_column(manager, Users::Id))
                    .col(ColumnDef::new(Users::PublicId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(10).not_null().default("editor"))
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::FirstName).string_len(150).null())
                    .col(ColumnDef::new(Users::LastName).string_len(150).null())
                    .col(ColumnDef::new(Users::Bio).text().null())
                    .col(ColumnDef::new(Users::Avatar).string().null())
                    .col(ColumnDef::new(Users::Website).string().null())
                    .col(ColumnDef::new(Users::Twitter).string_len(50).null())
                    .col(ColumnDef::new(Users::Github).string_len(50).null())
                    .col(ColumnDef::new(Users::LastLoginAt).timestamp_with_time_zone().null())
                    .col(created_at(Users::CreatedAt))
                    .col(created_at(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // Revoked token ids, kept until the token would have expired anyway
        manager
            .create_table(
                Table::create()
                    .table(TokenBlacklist::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TokenBlacklist::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TokenBlacklist::Jti).string().not_null().unique_key())
                    .col(ColumnDef::new(TokenBlacklist::TokenKind).string_len(10).not_null())
                    .col(ColumnDef::new(TokenBlacklist::UserId).big_integer().null())
                    .col(ColumnDef::new(TokenBlacklist::ExpiresAt).timestamp_with_time_zone().not_null())
                    .col(created_at(TokenBlacklist::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_token_blacklist_user_id")
                            .from(TokenBlacklist::Table, TokenBlacklist::UserId)
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
            .drop_table(Table::drop().table(TokenBlacklist::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    PublicId,
    Username,
    Email,
    PasswordHash,
    Role,
    IsActive,
    FirstName,
    LastName,
    Bio,
    Avatar,
    Website,
    Twitter,
    Github,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TokenBlacklist {
    Table,
    Id,
    Jti,
    TokenKind,
    UserId,
    ExpiresAt,
    CreatedAt,
}
