use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OneTimeTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OneTimeTokens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OneTimeTokens::Email).string().not_null())
                    .col(ColumnDef::new(OneTimeTokens::Code).string().not_null())
                    .col(ColumnDef::new(OneTimeTokens::Purpose).string().not_null())
                    .col(
                        ColumnDef::new(OneTimeTokens::ReferenceCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OneTimeTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OneTimeTokens::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OneTimeTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OneTimeTokens::Table)
                    .col(OneTimeTokens::Email)
                    .col(OneTimeTokens::Purpose)
                    .name("idx_one_time_tokens_email_purpose")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OneTimeTokens::Table)
                    .col(OneTimeTokens::ReferenceCode)
                    .name("idx_one_time_tokens_reference_code")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OneTimeTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OneTimeTokens {
    Table,
    Id,
    Email,
    Code,
    Purpose,
    ReferenceCode,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}
