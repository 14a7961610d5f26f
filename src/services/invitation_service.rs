//! Instructor-to-customer class invitations.
//!
//! An invitation moves PENDING -> ACCEPTED | DECLINED | EXPIRED exactly once.
//! Accepting books the seat through the same commit primitive as a direct
//! booking, inside the transaction that flips the invitation, so either
//! both happen or neither does.

use crate::{
    error::{is_unique_violation, ApiError, Result},
    models::invitations::InvitationDecision,
    services::{
        booking_service::{BookingOrigin, BookingReceipt, BookingService},
        capacity,
        subscription_service::is_active_subscription,
    },
};
use entity::{class_invitations, sea_orm_active_enums::InvitationStatus};
use sea_orm::{
    entity::*, query::*, DatabaseConnection, DatabaseTransaction,
    TransactionTrait,
};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Result of a customer's answer
#[derive(Debug, Clone)]
pub struct InvitationOutcome {
    pub invitation: class_invitations::Model,
    pub booking: Option<BookingReceipt>,
}

#[derive(Clone)]
pub struct InvitationService {
    db: DatabaseConnection,
    bookings: BookingService,
    expiry: Duration,
}

impl InvitationService {
    pub fn new(db: DatabaseConnection, expiry_days: i64) -> Self {
        let bookings = BookingService::new(db.clone());
        Self {
            db,
            bookings,
            expiry: Duration::days(expiry_days),
        }
    }

    /// Invite a subscribed customer to one of the instructor's classes
    #[instrument(skip(self, message))]
    pub async fn create_invitation(
        &self,
        instructor_id: Uuid,
        customer_id: Uuid,
        class_id: Uuid,
        message: Option<String>,
    ) -> Result<class_invitations::Model> {
        let ctx = capacity::load_class(&self.db, class_id, false).await?;

        if !is_active_subscription(&self.db, instructor_id, customer_id).await? {
            return Err(ApiError::NotSubscribed);
        }

        if ctx.instructor_id() != instructor_id {
            return Err(ApiError::NotOwner(class_id));
        }

        let now = OffsetDateTime::now_utc();

        let existing = class_invitations::Entity::find()
            .filter(class_invitations::Column::CustomerId.eq(customer_id))
            .filter(class_invitations::Column::ClassInstanceId.eq(class_id))
            .one(&self.db)
            .await?;

        if let Some(existing) = existing {
            return Err(self.reject_existing(existing, now).await?);
        }

        let invitation = class_invitations::ActiveModel {
            id: Set(Uuid::new_v4()),
            instructor_id: Set(instructor_id),
            customer_id: Set(customer_id),
            class_instance_id: Set(class_id),
            status: Set(InvitationStatus::Pending),
            message: Set(message.or_else(|| Some(default_message(&ctx.activity.title)))),
            expires_at: Set(now + self.expiry),
            responded_at: Set(None),
            created_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::DuplicatePending
            } else {
                ApiError::Database(e)
            }
        })?;

        info!(
            invitation_id = %invitation.id,
            instructor_id = %instructor_id,
            customer_id = %customer_id,
            class_id = %class_id,
            "Invitation created"
        );

        Ok(invitation)
    }

    /// Pick the rejection for an invitation that already exists for the pair
    async fn reject_existing(
        &self,
        existing: class_invitations::Model,
        now: OffsetDateTime,
    ) -> Result<ApiError> {
        match existing.status {
            InvitationStatus::Pending if now <= existing.expires_at => {
                Ok(ApiError::DuplicatePending)
            }
            InvitationStatus::Pending => {
                // Overdue: record the expiry before reporting it
                let mut active: class_invitations::ActiveModel = existing.into();
                active.status = Set(InvitationStatus::Expired);
                active.update(&self.db).await?;
                Ok(ApiError::AlreadyResponded(
                    status_label(InvitationStatus::Expired).to_string(),
                ))
            }
            status => Ok(ApiError::AlreadyResponded(status_label(status).to_string())),
        }
    }

    /// Apply a customer's decision to a pending invitation
    #[instrument(skip(self))]
    pub async fn respond(
        &self,
        customer_id: Uuid,
        invitation_id: Uuid,
        decision: InvitationDecision,
    ) -> Result<InvitationOutcome> {
        let txn = self.db.begin().await?;

        let outcome = match self
            .respond_in_txn(&txn, customer_id, invitation_id, decision)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        match outcome {
            Responded::Expired(expires_at) => {
                txn.commit().await?;
                warn!(
                    invitation_id = %invitation_id,
                    customer_id = %customer_id,
                    "Invitation answered after expiry"
                );
                Err(ApiError::Expired(expires_at))
            }
            Responded::Done(outcome) => {
                txn.commit().await?;
                info!(
                    invitation_id = %invitation_id,
                    customer_id = %customer_id,
                    status = ?outcome.invitation.status,
                    booking_id = ?outcome.booking.as_ref().map(|b| b.booking.id),
                    "Invitation answered"
                );
                Ok(outcome)
            }
        }
    }

    async fn respond_in_txn(
        &self,
        txn: &DatabaseTransaction,
        customer_id: Uuid,
        invitation_id: Uuid,
        decision: InvitationDecision,
    ) -> Result<Responded> {
        let invitation = class_invitations::Entity::find_by_id(invitation_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Invitation {} not found", invitation_id))
            })?;

        if invitation.customer_id != customer_id {
            return Err(ApiError::Forbidden(
                "Invitation belongs to another customer".to_string(),
            ));
        }

        if invitation.status != InvitationStatus::Pending {
            return Err(ApiError::AlreadyResponded(
                status_label(invitation.status).to_string(),
            ));
        }

        let now = OffsetDateTime::now_utc();

        if now > invitation.expires_at {
            let expires_at = invitation.expires_at;
            let mut active: class_invitations::ActiveModel = invitation.into();
            active.status = Set(InvitationStatus::Expired);
            active.update(txn).await?;
            return Ok(Responded::Expired(expires_at));
        }

        let booking = match decision {
            InvitationDecision::Declined => None,
            InvitationDecision::Accepted => Some(
                self.bookings
                    .commit_booking_in_txn(
                        txn,
                        customer_id,
                        invitation.class_instance_id,
                        BookingOrigin::Invitation(invitation.id),
                    )
                    .await?,
            ),
        };

        let status = match decision {
            InvitationDecision::Accepted => InvitationStatus::Accepted,
            InvitationDecision::Declined => InvitationStatus::Declined,
        };

        let mut active: class_invitations::ActiveModel = invitation.into();
        active.status = Set(status);
        active.responded_at = Set(Some(now));
        let invitation = active.update(txn).await?;

        Ok(Responded::Done(InvitationOutcome {
            invitation,
            booking,
        }))
    }

    /// A customer's invitations, newest first. Overdue pending rows are
    /// reported as expired without being rewritten.
    #[instrument(skip(self))]
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<class_invitations::Model>> {
        let now = OffsetDateTime::now_utc();

        let invitations = class_invitations::Entity::find()
            .filter(class_invitations::Column::CustomerId.eq(customer_id))
            .order_by_desc(class_invitations::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|mut invitation| {
                invitation.status = effective_status(&invitation, now);
                invitation
            })
            .collect();

        Ok(invitations)
    }

    /// Invitations the instructor sent for one of their classes
    #[instrument(skip(self))]
    pub async fn list_for_class(
        &self,
        instructor_id: Uuid,
        class_id: Uuid,
    ) -> Result<Vec<class_invitations::Model>> {
        let ctx = capacity::load_class(&self.db, class_id, false).await?;
        if ctx.instructor_id() != instructor_id {
            return Err(ApiError::NotOwner(class_id));
        }

        let now = OffsetDateTime::now_utc();

        let invitations = class_invitations::Entity::find()
            .filter(class_invitations::Column::ClassInstanceId.eq(class_id))
            .order_by_desc(class_invitations::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|mut invitation| {
                invitation.status = effective_status(&invitation, now);
                invitation
            })
            .collect();

        Ok(invitations)
    }
}

enum Responded {
    Done(InvitationOutcome),
    Expired(OffsetDateTime),
}

/// Status as a reader should see it at `now`
pub fn effective_status(invitation: &class_invitations::Model, now: OffsetDateTime) -> InvitationStatus {
    match invitation.status {
        InvitationStatus::Pending if now > invitation.expires_at => InvitationStatus::Expired,
        status => status,
    }
}

fn default_message(title: &str) -> String {
    format!("You're invited to join {}!", title)
}

fn status_label(status: InvitationStatus) -> &'static str {
    match status {
        InvitationStatus::Pending => "pending",
        InvitationStatus::Accepted => "accepted",
        InvitationStatus::Declined => "declined",
        InvitationStatus::Expired => "expired",
    }
}
