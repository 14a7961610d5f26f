use entity::instructor_subscriptions;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionData {
    pub instructor_id: Uuid,
    pub customer_id: Uuid,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub subscribed_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub unsubscribed_at: Option<time::OffsetDateTime>,
}

impl From<instructor_subscriptions::Model> for SubscriptionData {
    fn from(sub: instructor_subscriptions::Model) -> Self {
        Self {
            instructor_id: sub.instructor_id,
            customer_id: sub.customer_id,
            is_active: sub.is_active,
            subscribed_at: sub.subscribed_at,
            unsubscribed_at: sub.unsubscribed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusData {
    pub instructor_id: Uuid,
    pub subscribed: bool,
}

/// An active subscriber as seen by the instructor
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub customer_id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub subscribed_at: time::OffsetDateTime,
}
