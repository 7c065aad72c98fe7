// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // `url` is the natural key: one article row per URL
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Articles::Url)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Articles::Id).string().not_null())
                    .col(ColumnDef::new(Articles::Source).string().not_null())
                    .col(ColumnDef::new(Articles::Category).string().not_null())
                    .col(
                        ColumnDef::new(Articles::Priority)
                            .string()
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(Articles::Title).text().null())
                    .col(ColumnDef::new(Articles::Content).text().null())
                    .col(
                        ColumnDef::new(Articles::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Articles::ErrorMessage).text().null())
                    .col(ColumnDef::new(Articles::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Articles::ScrapedAt).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_articles_status")
                    .table(Articles::Table)
                    .col(Articles::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_articles_created_at")
                    .table(Articles::Table)
                    .col(Articles::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Url,
    Id,
    Source,
    Category,
    Priority,
    Title,
    Content,
    Status,
    ErrorMessage,
    CreatedAt,
    ScrapedAt,
}
