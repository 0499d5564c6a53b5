use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cards::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Cards::CardHolder).string().not_null())
                    .col(
                        ColumnDef::new(Cards::EncryptedNumber)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Cards::MaskedNumber).string().not_null())
                    .col(ColumnDef::new(Cards::Expires).string().not_null())
                    .col(
                        ColumnDef::new(Cards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cards_user")
                    .table(Cards::Table)
                    .col(Cards::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cards {
    Table,
    Id,
    UserId,
    CardHolder,
    EncryptedNumber,
    MaskedNumber,
    Expires,
    CreatedAt,
}
