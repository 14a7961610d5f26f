pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_and_ledger;
mod m20250301_000002_create_activities_and_classes;
mod m20250302_000001_create_bookings;
mod m20250310_000001_create_subscriptions_and_invitations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_and_ledger::Migration),
            Box::new(m20250301_000002_create_activities_and_classes::Migration),
            Box::new(m20250302_000001_create_bookings::Migration),
            Box::new(m20250310_000001_create_subscriptions_and_invitations::Migration),
        ]
    }
}
