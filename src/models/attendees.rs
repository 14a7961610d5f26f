use serde::Serialize;
use uuid::Uuid;

/// How an attendee got onto the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeSource {
    Booking,
    Invitation,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub user_id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub source: AttendeeSource,
    pub credits_used: i32,
}
