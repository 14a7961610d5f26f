use entity::{activities, class_instances, sea_orm_active_enums::{TransactionKind, UserRole}, users};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use studiobook::{
    config::{
        AuthConfig, Config, DatabaseConfig, InvitationConfig, LoggingConfig, RateLimitSettings,
        RedisConfig, ServerConfig,
    },
    services::LedgerService,
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Fresh migrated database. One pooled connection keeps the in-memory
/// database alive and shared by every query in the test.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, name: &str, role: UserRole) -> users::Model {
    let now = OffsetDateTime::now_utc();
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(Some(format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()))),
        role: Set(role),
        credit_balance: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

/// A customer whose starting balance is recorded in the ledger
pub async fn create_customer(db: &DatabaseConnection, name: &str, credits: i32) -> users::Model {
    let user = create_user(db, name, UserRole::Customer).await;
    if credits > 0 {
        LedgerService::new(db.clone())
            .adjust_balance(user.id, credits, TransactionKind::Purchase, "Opening balance")
            .await
            .expect("Failed to seed balance");
    }
    user
}

pub async fn create_instructor(db: &DatabaseConnection, name: &str) -> users::Model {
    create_user(db, name, UserRole::Instructor).await
}

pub async fn create_activity(
    db: &DatabaseConnection,
    instructor_id: Uuid,
    credits_required: i32,
    max_capacity: i32,
) -> activities::Model {
    activities::ActiveModel {
        id: Set(Uuid::new_v4()),
        instructor_id: Set(instructor_id),
        title: Set("Morning Vinyasa".to_string()),
        category: Set("yoga".to_string()),
        credits_required: Set(credits_required),
        max_capacity: Set(max_capacity),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(db)
    .await
    .expect("Failed to insert activity")
}

pub async fn create_class(
    db: &DatabaseConnection,
    activity_id: Uuid,
    capacity_override: Option<i32>,
) -> class_instances::Model {
    let starts_at = OffsetDateTime::now_utc() + Duration::days(3);
    class_instances::ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_id: Set(activity_id),
        starts_at: Set(starts_at),
        ends_at: Set(starts_at + Duration::hours(1)),
        location: Set(Some("Studio A".to_string())),
        capacity_override: Set(capacity_override),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(db)
    .await
    .expect("Failed to insert class")
}

/// Instructor plus one class they teach
pub async fn create_instructor_class(
    db: &DatabaseConnection,
    credits_required: i32,
    max_capacity: i32,
) -> (users::Model, activities::Model, class_instances::Model) {
    let instructor = create_instructor(db, "Ines").await;
    let activity = create_activity(db, instructor.id, credits_required, max_capacity).await;
    let class = create_class(db, activity.id, None).await;
    (instructor, activity, class)
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
            run_migrations: true,
        },
        redis: RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-key-with-minimum-32-characters-required".to_string(),
            access_token_expiration_minutes: 15,
        },
        invitations: InvitationConfig::default(),
        // Router tests run without a Redis server
        rate_limit: RateLimitSettings {
            enabled: false,
            ..RateLimitSettings::default()
        },
        logging: LoggingConfig::default(),
    }
}
