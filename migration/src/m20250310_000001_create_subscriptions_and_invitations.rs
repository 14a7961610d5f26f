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
                    .table(InstructorSubscriptions::Table)
                    .if_not_exists()
                    .col(pk_uuid(InstructorSubscriptions::Id))
                    .col(uuid(InstructorSubscriptions::InstructorId))
                    .col(uuid(InstructorSubscriptions::CustomerId))
                    .col(boolean(InstructorSubscriptions::IsActive).default(true))
                    .col(timestamp_with_time_zone(InstructorSubscriptions::SubscribedAt))
                    .col(timestamp_with_time_zone_null(
                        InstructorSubscriptions::UnsubscribedAt,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_instructor_subscriptions_instructor_id")
                            .from(
                                InstructorSubscriptions::Table,
                                InstructorSubscriptions::InstructorId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_instructor_subscriptions_customer_id")
                            .from(
                                InstructorSubscriptions::Table,
                                InstructorSubscriptions::CustomerId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per pair; re-subscribing reactivates it
        manager
            .create_index(
                Index::create()
                    .name("idx_instructor_subscriptions_pair")
                    .table(InstructorSubscriptions::Table)
                    .col(InstructorSubscriptions::InstructorId)
                    .col(InstructorSubscriptions::CustomerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassInvitations::Table)
                    .if_not_exists()
                    .col(pk_uuid(ClassInvitations::Id))
                    .col(uuid(ClassInvitations::InstructorId))
                    .col(uuid(ClassInvitations::CustomerId))
                    .col(uuid(ClassInvitations::ClassInstanceId))
                    .col(string_len(ClassInvitations::Status, 16).default("pending"))
                    .col(text_null(ClassInvitations::Message))
                    .col(timestamp_with_time_zone(ClassInvitations::ExpiresAt))
                    .col(timestamp_with_time_zone_null(ClassInvitations::RespondedAt))
                    .col(timestamp_with_time_zone(ClassInvitations::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_invitations_instructor_id")
                            .from(ClassInvitations::Table, ClassInvitations::InstructorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_invitations_customer_id")
                            .from(ClassInvitations::Table, ClassInvitations::CustomerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_invitations_class_instance_id")
                            .from(ClassInvitations::Table, ClassInvitations::ClassInstanceId)
                            .to(ClassInstances::Table, ClassInstances::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_invitations_customer_class")
                    .table(ClassInvitations::Table)
                    .col(ClassInvitations::CustomerId)
                    .col(ClassInvitations::ClassInstanceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassInvitations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InstructorSubscriptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InstructorSubscriptions {
    Table,
    Id,
    InstructorId,
    CustomerId,
    IsActive,
    SubscribedAt,
    UnsubscribedAt,
}

#[derive(DeriveIden)]
enum ClassInvitations {
    Table,
    Id,
    InstructorId,
    CustomerId,
    ClassInstanceId,
    Status,
    Message,
    ExpiresAt,
    RespondedAt,
    CreatedAt,
}
