use sea_orm_migration::{prelude::*, schema::*};

use crate::{
    m20250301_000001_create_users_and_ledger::Users,
    m20250301_000002_create_activities_and_classes::ClassInstances,
};

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
                    .col(pk_uuid(Bookings::Id))
                    .col(uuid(Bookings::UserId))
                    .col(uuid(Bookings::ClassInstanceId))
                    .col(string_len(Bookings::Status, 16))
                    .col(integer(Bookings::CreditsUsed))
                    .col(string_len(Bookings::Source, 16).default("direct"))
                    .col(uuid_null(Bookings::InvitationId))
                    .col(timestamp_with_time_zone(Bookings::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_user_id")
                            .from(Bookings::Table, Bookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_class_instance_id")
                            .from(Bookings::Table, Bookings::ClassInstanceId)
                            .to(ClassInstances::Table, ClassInstances::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_class_status")
                    .table(Bookings::Table)
                    .col(Bookings::ClassInstanceId)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;

        // At most one active booking per (user, class). Partial index syntax is
        // shared by Postgres and SQLite.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_active_user_class
                ON bookings (user_id, class_instance_id)
                WHERE status <> 'cancelled';
                "#,
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
    UserId,
    ClassInstanceId,
    Status,
    CreditsUsed,
    Source,
    InvitationId,
    CreatedAt,
}
