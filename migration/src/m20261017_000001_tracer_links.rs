//! tracer_links 表迁移
//!
//! 两个独立的唯一约束：
//! - (job_id, source_path, destination_url_hash)：同一位置同一目标只发一次 token
//! - token：公开 token 全局唯一，永不复用

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TracerLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TracerLinks::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TracerLinks::Token).string_len(64).not_null())
                    .col(ColumnDef::new(TracerLinks::JobId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(TracerLinks::SourcePath)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerLinks::SourceLabel)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TracerLinks::DestinationUrl).text().not_null())
                    .col(
                        ColumnDef::new(TracerLinks::DestinationUrlHash)
                            .char_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerLinks::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TracerLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerLinks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_tracer_links_token")
                    .table(TracerLinks::Table)
                    .col(TracerLinks::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_tracer_links_job_path_dest")
                    .table(TracerLinks::Table)
                    .col(TracerLinks::JobId)
                    .col(TracerLinks::SourcePath)
                    .col(TracerLinks::DestinationUrlHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 单个职位的链接列表
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracer_links_job_id")
                    .table(TracerLinks::Table)
                    .col(TracerLinks::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tracer_links_job_id").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_tracer_links_job_path_dest")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("uq_tracer_links_token").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TracerLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TracerLinks {
    #[sea_orm(iden = "tracer_links")]
    Table,
    Id,
    Token,
    JobId,
    SourcePath,
    SourceLabel,
    DestinationUrl,
    DestinationUrlHash,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
