use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaregiverProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaregiverProfiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::DocumentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::EmergencyPhone)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CaregiverProfiles::Bio).text().not_null())
                    .col(
                        ColumnDef::new(CaregiverProfiles::Experience)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::ServiceHours)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::HourlyRate)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::AvgRating)
                            .decimal_len(4, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::DocumentVerified)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::VerifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(CaregiverProfiles::Status).string().not_null())
                    .col(
                        ColumnDef::new(CaregiverProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaregiverProfiles::UpdatedAt)
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
                    .name("idx_caregiver_profiles_user")
                    .table(CaregiverProfiles::Table)
                    .col(CaregiverProfiles::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_caregiver_profiles_document")
                    .table(CaregiverProfiles::Table)
                    .col(CaregiverProfiles::DocumentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_caregiver_profiles_status")
                    .table(CaregiverProfiles::Table)
                    .col(CaregiverProfiles::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CaregiverProfiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CaregiverProfiles {
    Table,
    Id,
    UserId,
    DocumentId,
    EmergencyPhone,
    Bio,
    Experience,
    ServiceHours,
    HourlyRate,
    AvgRating,
    DocumentVerified,
    VerifiedAt,
    Status,
    CreatedAt,
    UpdatedAt,
}
