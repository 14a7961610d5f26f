use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table (FIRST - other tables reference this)
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string(Users::Name))
                    .col(string_null(Users::Email).unique_key())
                    .col(string_len(Users::Role, 16).default("customer"))
                    .col(
                        integer(Users::CreditBalance)
                            .default(0)
                            .check(Expr::col(Users::CreditBalance).gte(0)),
                    )
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // Append-only credit ledger
        manager
            .create_table(
                Table::create()
                    .table(CreditTransactions::Table)
                    .if_not_exists()
                    .col(pk_uuid(CreditTransactions::Id))
                    .col(uuid(CreditTransactions::UserId))
                    .col(integer(CreditTransactions::Amount))
                    .col(string_len(CreditTransactions::Kind, 16))
                    .col(string(CreditTransactions::Description))
                    .col(integer(CreditTransactions::BalanceAfter))
                    .col(string_null(CreditTransactions::Reference).unique_key())
                    .col(timestamp_with_time_zone(CreditTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_transactions_user_id")
                            .from(CreditTransactions::Table, CreditTransactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credit_transactions_user_id")
                    .table(CreditTransactions::Table)
                    .col(CreditTransactions::UserId)
                    .col(CreditTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    CreditBalance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CreditTransactions {
    Table,
    Id,
    UserId,
    Amount,
    Kind,
    Description,
    BalanceAfter,
    Reference,
    CreatedAt,
}
