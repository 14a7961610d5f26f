use entity::{
    activities, bookings, class_instances,
    sea_orm_active_enums::{BookingSource, BookingStatus},
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    pub id: Uuid,
    pub class_id: Uuid,
    pub status: BookingStatus,
    pub credits_used: i32,
    pub source: BookingSource,
    pub invitation_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

impl From<bookings::Model> for BookingData {
    fn from(booking: bookings::Model) -> Self {
        Self {
            id: booking.id,
            class_id: booking.class_instance_id,
            status: booking.status,
            credits_used: booking.credits_used,
            source: booking.source,
            invitation_id: booking.invitation_id,
            created_at: booking.created_at,
        }
    }
}

/// Response for a committed booking
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookData {
    pub booking: BookingData,
    pub balance: i32,
}

/// A booking together with the class it is for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    #[serde(flatten)]
    pub booking: BookingData,
    pub activity_title: String,
    pub category: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: time::OffsetDateTime,
    pub location: Option<String>,
}

impl BookingSummary {
    pub fn new(
        booking: bookings::Model,
        class: &class_instances::Model,
        activity: &activities::Model,
    ) -> Self {
        Self {
            booking: booking.into(),
            activity_title: activity.title.clone(),
            category: activity.category.clone(),
            starts_at: class.starts_at,
            ends_at: class.ends_at,
            location: class.location.clone(),
        }
    }
}
