use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000001_create_users_and_ledger::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(pk_uuid(Activities::Id))
                    .col(uuid(Activities::InstructorId))
                    .col(string(Activities::Title))
                    .col(string(Activities::Category))
                    .col(
                        integer(Activities::CreditsRequired)
                            .check(Expr::col(Activities::CreditsRequired).gte(0)),
                    )
                    .col(
                        integer(Activities::MaxCapacity)
                            .check(Expr::col(Activities::MaxCapacity).gte(0)),
                    )
                    .col(timestamp_with_time_zone(Activities::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_instructor_id")
                            .from(Activities::Table, Activities::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activities_instructor_id")
                    .table(Activities::Table)
                    .col(Activities::InstructorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassInstances::Table)
                    .if_not_exists()
                    .col(pk_uuid(ClassInstances::Id))
                    .col(uuid(ClassInstances::ActivityId))
                    .col(timestamp_with_time_zone(ClassInstances::StartsAt))
                    .col(timestamp_with_time_zone(ClassInstances::EndsAt))
                    .col(string_null(ClassInstances::Location))
                    .col(integer_null(ClassInstances::CapacityOverride))
                    .col(timestamp_with_time_zone(ClassInstances::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_instances_activity_id")
                            .from(ClassInstances::Table, ClassInstances::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_instances_activity_id")
                    .table(ClassInstances::Table)
                    .col(ClassInstances::ActivityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassInstances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    InstructorId,
    Title,
    Category,
    CreditsRequired,
    MaxCapacity,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum ClassInstances {
    Table,
    Id,
    ActivityId,
    StartsAt,
    EndsAt,
    Location,
    CapacityOverride,
    CreatedAt,
}
