use crate::{
    config::Config,
    services::{
        AttendeeService, BookingService, InvitationService, JWTService, LedgerService,
        PurchaseService, SubscriptionService,
    },
};
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: Arc<redis::Client>,
    pub jwt_service: Arc<JWTService>,
    pub ledger_service: Arc<LedgerService>,
    pub booking_service: Arc<BookingService>,
    pub invitation_service: Arc<InvitationService>,
    pub subscription_service: Arc<SubscriptionService>,
    pub purchase_service: Arc<PurchaseService>,
    pub attendee_service: Arc<AttendeeService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Connect to database
        let mut options = ConnectOptions::new(config.database.url.clone());
        if let Some(max) = config.database.max_connections {
            options.max_connections(max);
        }
        options.sqlx_logging(false);
        let db = sea_orm::Database::connect(options).await?;

        Self::with_db(db, config)
    }

    /// Build the state around an existing connection (used by tests)
    pub fn with_db(db: DatabaseConnection, config: Config) -> Result<Self, anyhow::Error> {
        // Opening the client does not connect; connections are made per use
        let redis = Arc::new(redis::Client::open(config.redis.url.as_str())?);

        let jwt_service = Arc::new(JWTService::new(Arc::new(config.auth.clone())));
        let ledger_service = Arc::new(LedgerService::new(db.clone()));
        let booking_service = Arc::new(BookingService::new(db.clone()));
        let invitation_service = Arc::new(InvitationService::new(
            db.clone(),
            config.invitations.expiry_days,
        ));
        let subscription_service = Arc::new(SubscriptionService::new(db.clone()));
        let purchase_service = Arc::new(PurchaseService::new(db.clone()));
        let attendee_service = Arc::new(AttendeeService::new(db.clone()));

        Ok(Self {
            db,
            redis,
            jwt_service,
            ledger_service,
            booking_service,
            invitation_service,
            subscription_service,
            purchase_service,
            attendee_service,
            config: Arc::new(config),
        })
    }
}
