// Request/Response models
pub mod attendees;
pub mod bookings;
pub mod common;
pub mod credits;
pub mod invitations;
pub mod subscriptions;
