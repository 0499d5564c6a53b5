use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::ClientId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bookings::CaregiverId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::ServiceType).string().not_null())
                    .col(ColumnDef::new(Bookings::Notes).text().null())
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(ColumnDef::new(Bookings::IsPaid).boolean().not_null())
                    .col(ColumnDef::new(Bookings::IsRated).boolean().not_null())
                    .col(ColumnDef::new(Bookings::PaymentMethod).string().null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Both participants page through their own bookings; admins and
        // the status machine filter by state and window.
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_client")
                    .table(Bookings::Table)
                    .col(Bookings::ClientId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_caregiver")
                    .table(Bookings::Table)
                    .col(Bookings::CaregiverId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_start_at")
                    .table(Bookings::Table)
                    .col(Bookings::StartAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_created_at")
                    .table(Bookings::Table)
                    .col(Bookings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    ClientId,
    CaregiverId,
    StartAt,
    EndAt,
    ServiceType,
    Notes,
    Status,
    IsPaid,
    IsRated,
    PaymentMethod,
    CreatedAt,
    UpdatedAt,
}
