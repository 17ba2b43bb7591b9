//! Migration to create the content, tag and content_tag tables.
//!
//! Content rows are soft-deleted through `deleted_at`; tags are shared by
//! name and linked to content through the `content_tag` join table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Content::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Content::Title).string().not_null())
                    .col(ColumnDef::new(Content::Description).text())
                    .col(ColumnDef::new(Content::Language).string())
                    .col(ColumnDef::new(Content::DurationSeconds).integer())
                    .col(ColumnDef::new(Content::PublishedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Content::ContentType).string().not_null())
                    .col(ColumnDef::new(Content::Url).string())
                    .col(ColumnDef::new(Content::PlatformName).string())
                    .col(
                        ColumnDef::new(Content::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Content::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Content::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Listing pages walk created_at descending
        manager
            .create_index(
                Index::create()
                    .name("idx_content_created_at")
                    .table(Content::Table)
                    .col(Content::CreatedAt)
                    .col(Content::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_deleted_at")
                    .table(Content::Table)
                    .col(Content::DeletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tag::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tag::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ContentTag::ContentId).string().not_null())
                    .col(ColumnDef::new(ContentTag::TagId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ContentTag::ContentId)
                            .col(ContentTag::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_tag_content")
                            .from(ContentTag::Table, ContentTag::ContentId)
                            .to(Content::Table, Content::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_tag_tag")
                            .from(ContentTag::Table, ContentTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_content_tag_tag_id")
                    .table(ContentTag::Table)
                    .col(ContentTag::TagId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentTag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Content {
    Table,
    Id,
    Title,
    Description,
    Language,
    DurationSeconds,
    PublishedAt,
    ContentType,
    Url,
    PlatformName,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Tag {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum ContentTag {
    Table,
    ContentId,
    TagId,
}
