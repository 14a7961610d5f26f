// Service modules
pub mod attendee_service;
pub mod booking_service;
pub mod capacity;
pub mod invitation_service;
pub mod jwt_service;
pub mod ledger_service;
pub mod purchase_service;
pub mod subscription_service;

pub use attendee_service::AttendeeService;
pub use booking_service::{BookingOrigin, BookingReceipt, BookingService};
pub use invitation_service::{InvitationOutcome, InvitationService};
pub use jwt_service::JWTService;
pub use ledger_service::{LedgerAudit, LedgerEntry, LedgerService};
pub use purchase_service::{PurchaseReceipt, PurchaseService};
pub use subscription_service::SubscriptionService;
