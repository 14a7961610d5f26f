use crate::{
    error::{ApiError, Result},
    models::attendees::{Attendee, AttendeeSource},
    services::capacity,
};
use entity::{
    bookings, class_invitations,
    sea_orm_active_enums::{BookingSource, BookingStatus, InvitationStatus, UserRole},
    users,
};
use sea_orm::{entity::*, query::*, DatabaseConnection};
use std::collections::{HashMap, HashSet};
use tracing::instrument;
use uuid::Uuid;

/// Class roster for instructors and admins
#[derive(Clone)]
pub struct AttendeeService {
    db: DatabaseConnection,
}

impl AttendeeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Everyone holding a seat in a class: confirmed bookings plus accepted
    /// invitations, one entry per user
    #[instrument(skip(self))]
    pub async fn list_attendees(
        &self,
        requester_id: Uuid,
        requester_role: UserRole,
        class_id: Uuid,
    ) -> Result<Vec<Attendee>> {
        let ctx = capacity::load_class(&self.db, class_id, false).await?;

        match requester_role {
            UserRole::Admin => {}
            UserRole::Instructor if ctx.instructor_id() == requester_id => {}
            UserRole::Instructor => return Err(ApiError::NotOwner(class_id)),
            UserRole::Customer => {
                return Err(ApiError::Forbidden(
                    "Only the class instructor can view attendees".to_string(),
                ))
            }
        }

        let booked = bookings::Entity::find()
            .filter(bookings::Column::ClassInstanceId.eq(class_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Confirmed))
            .order_by_asc(bookings::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        let invited = class_invitations::Entity::find()
            .filter(class_invitations::Column::ClassInstanceId.eq(class_id))
            .filter(class_invitations::Column::Status.eq(InvitationStatus::Accepted))
            .order_by_asc(class_invitations::Column::RespondedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        let users: HashMap<Uuid, users::Model> = booked
            .iter()
            .filter_map(|(_, user)| user.clone())
            .chain(invited.iter().filter_map(|(_, user)| user.clone()))
            .map(|u| (u.id, u))
            .collect();

        let bookings: Vec<bookings::Model> = booked.into_iter().map(|(b, _)| b).collect();
        let invitations: Vec<class_invitations::Model> =
            invited.into_iter().map(|(i, _)| i).collect();

        Ok(merge_roster(
            &bookings,
            &invitations,
            &users,
            ctx.credits_required(),
        ))
    }
}

/// Union of booking and invitation rows deduplicated by user; a booking row
/// wins over an invitation for the same user
pub fn merge_roster(
    bookings: &[bookings::Model],
    invitations: &[class_invitations::Model],
    users: &HashMap<Uuid, users::Model>,
    credits_required: i32,
) -> Vec<Attendee> {
    let mut seen = HashSet::new();
    let mut roster = Vec::with_capacity(bookings.len() + invitations.len());

    let from_bookings = bookings.iter().map(|b| {
        let source = match b.source {
            BookingSource::Direct => AttendeeSource::Booking,
            BookingSource::Invitation => AttendeeSource::Invitation,
        };
        (b.user_id, source, b.credits_used)
    });
    let from_invitations = invitations
        .iter()
        .map(|i| (i.customer_id, AttendeeSource::Invitation, credits_required));

    for (user_id, source, credits_used) in from_bookings.chain(from_invitations) {
        if !seen.insert(user_id) {
            continue;
        }
        let Some(user) = users.get(&user_id) else {
            continue;
        };
        roster.push(Attendee {
            user_id,
            name: user.name.clone(),
            contact: user.email.clone(),
            source,
            credits_used,
        });
    }

    roster
}
