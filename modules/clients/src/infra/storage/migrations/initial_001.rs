use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientProfiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClientProfiles::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ClientProfiles::DocumentId).string().not_null())
                    .col(
                        ColumnDef::new(ClientProfiles::EmergencyPhone)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientProfiles::DocumentVerified)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientProfiles::VerifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(ClientProfiles::Status).string().not_null())
                    .col(
                        ColumnDef::new(ClientProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness among active rows is enforced in the service; these
        // indexes back the frequent lookups.
        manager
            .create_index(
                Index::create()
                    .name("idx_client_profiles_user")
                    .table(ClientProfiles::Table)
                    .col(ClientProfiles::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_client_profiles_document")
                    .table(ClientProfiles::Table)
                    .col(ClientProfiles::DocumentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_client_profiles_status")
                    .table(ClientProfiles::Table)
                    .col(ClientProfiles::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientProfiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClientProfiles {
    Table,
    Id,
    UserId,
    DocumentId,
    EmergencyPhone,
    DocumentVerified,
    VerifiedAt,
    Status,
    CreatedAt,
    UpdatedAt,
}
