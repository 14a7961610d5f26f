//! Capacity tracking for class instances.
//!
//! Occupancy is always counted from the authoritative booking rows; there is
//! no cached counter that could drift under concurrent writers. Every helper
//! is generic over the connection so the booking commit can run it inside
//! its own transaction.

use crate::error::{ApiError, Result};
use entity::{activities, bookings, class_instances, sea_orm_active_enums::BookingStatus};
use sea_orm::{entity::*, query::*, ConnectionTrait, PaginatorTrait};
use uuid::Uuid;

/// A class instance together with the activity it schedules
#[derive(Debug, Clone)]
pub struct ClassContext {
    pub class: class_instances::Model,
    pub activity: activities::Model,
}

impl ClassContext {
    pub fn effective_capacity(&self) -> i32 {
        effective_capacity(&self.class, &self.activity)
    }

    pub fn credits_required(&self) -> i32 {
        self.activity.credits_required
    }

    pub fn instructor_id(&self) -> Uuid {
        self.activity.instructor_id
    }
}

/// Class override if present, else the activity's maximum
pub fn effective_capacity(class: &class_instances::Model, activity: &activities::Model) -> i32 {
    class.capacity_override.unwrap_or(activity.max_capacity)
}

/// Seats still open given a confirmed count; never negative
pub fn seats_left(confirmed: u64, capacity: i32) -> u64 {
    u64::try_from(capacity.max(0))
        .unwrap_or(0)
        .saturating_sub(confirmed)
}

/// Load a class and its activity, optionally taking `FOR UPDATE` on the class
/// row. The class row is the per-class serialization point for booking
/// commits; callers that lock it must do so before locking any user row.
pub async fn load_class<C: ConnectionTrait>(
    conn: &C,
    class_id: Uuid,
    lock: bool,
) -> Result<ClassContext> {
    let mut query = class_instances::Entity::find_by_id(class_id);
    if lock {
        query = query.lock_exclusive();
    }

    let class = query
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Class {} not found", class_id)))?;

    let activity = activities::Entity::find_by_id(class.activity_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Activity {} for class {} not found",
                class.activity_id, class_id
            ))
        })?;

    Ok(ClassContext { class, activity })
}

/// Number of CONFIRMED bookings for a class (waiting list and cancelled excluded)
pub async fn confirmed_count<C: ConnectionTrait>(conn: &C, class_id: Uuid) -> Result<u64> {
    let count = bookings::Entity::find()
        .filter(bookings::Column::ClassInstanceId.eq(class_id))
        .filter(bookings::Column::Status.eq(BookingStatus::Confirmed))
        .count(conn)
        .await?;

    Ok(count)
}

pub async fn has_room<C: ConnectionTrait>(conn: &C, ctx: &ClassContext) -> Result<bool> {
    let confirmed = confirmed_count(conn, ctx.class.id).await?;
    Ok(seats_left(confirmed, ctx.effective_capacity()) > 0)
}
