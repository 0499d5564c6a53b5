use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ratings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ratings::BookingId).big_integer().not_null())
                    .col(ColumnDef::new(Ratings::ClientId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Ratings::CaregiverId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Ratings::Score).small_integer().not_null())
                    .col(ColumnDef::new(Ratings::Comment).text().null())
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per booking is a hard database rule, not a service
        // convention; the caregiver index backs listing and averaging.
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_booking")
                    .table(Ratings::Table)
                    .col(Ratings::BookingId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_caregiver")
                    .table(Ratings::Table)
                    .col(Ratings::CaregiverId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    BookingId,
    ClientId,
    CaregiverId,
    Score,
    Comment,
    CreatedAt,
}
