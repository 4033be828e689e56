use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_short_urls::ShortUrl;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户链接列表与批量删除都按 user_id 过滤
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_urls_user_id")
                    .table(ShortUrl::Table)
                    .col(ShortUrl::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_short_urls_user_id")
                    .table(ShortUrl::Table)
                    .to_owned(),
            )
            .await
    }
}
