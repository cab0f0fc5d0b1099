//! tracer_click_events 表迁移
//!
//! 每次成功的重定向写入一行。只保存分类结果和哈希：
//! - ip_hash：泛化后的 IP 前缀（/24 或 /64）的哈希
//! - unique_fingerprint_hash：按天轮换的去重指纹

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TracerClickEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TracerClickEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::TracerLinkId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::ClickedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::RequestId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::IsLikelyBot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::DeviceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::UaFamily)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::OsFamily)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TracerClickEvents::ReferrerHost)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(TracerClickEvents::IpHash).char_len(64).null())
                    .col(
                        ColumnDef::new(TracerClickEvents::UniqueFingerprintHash)
                            .char_len(64)
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracer_click_events_link")
                            .from(TracerClickEvents::Table, TracerClickEvents::TracerLinkId)
                            .to(TracerLinks::Table, TracerLinks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // 全局时间范围查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracer_click_events_clicked_at")
                    .table(TracerClickEvents::Table)
                    .col(TracerClickEvents::ClickedAt)
                    .to_owned(),
            )
            .await?;

        // 单链接时间序列查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracer_click_events_link_time")
                    .table(TracerClickEvents::Table)
                    .col(TracerClickEvents::TracerLinkId)
                    .col(TracerClickEvents::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracer_click_events_link_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracer_click_events_clicked_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TracerClickEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TracerClickEvents {
    #[sea_orm(iden = "tracer_click_events")]
    Table,
    Id,
    TracerLinkId,
    ClickedAt,
    RequestId,
    IsLikelyBot,
    DeviceType,
    UaFamily,
    OsFamily,
    ReferrerHost,
    IpHash,
    UniqueFingerprintHash,
}

#[derive(DeriveIden)]
enum TracerLinks {
    #[sea_orm(iden = "tracer_links")]
    Table,
    Id,
}
