use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 short_urls 表
        manager
            .create_table(
                Table::create()
                    .table(ShortUrl::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortUrl::ShortCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortUrl::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(ShortUrl::UserId)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ShortUrl::CorrelationId).string().null())
                    .col(
                        ColumnDef::new(ShortUrl::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ShortUrl::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // original_url 唯一，重复插入由数据库拒绝
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_urls_original_url")
                    .table(ShortUrl::Table)
                    .col(ShortUrl::OriginalUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_short_urls_original_url")
                    .table(ShortUrl::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ShortUrl::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ShortUrl {
    #[sea_orm(iden = "short_urls")]
    Table,
    ShortCode,
    OriginalUrl,
    UserId,
    CorrelationId,
    IsDeleted,
    CreatedAt,
}
