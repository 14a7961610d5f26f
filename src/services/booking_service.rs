use crate::{
    error::{is_unique_violation, ApiError, Result},
    models::bookings::BookingSummary,
    services::{
        capacity::{self, ClassContext},
        ledger_service::{find_user, lock_user, LedgerService},
    },
};
use entity::{
    activities, bookings, class_instances,
    sea_orm_active_enums::{BookingSource, BookingStatus, TransactionKind},
    users,
};
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

/// Where a booking request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOrigin {
    Direct,
    Invitation(Uuid),
}

impl BookingOrigin {
    fn source(self) -> BookingSource {
        match self {
            BookingOrigin::Direct => BookingSource::Direct,
            BookingOrigin::Invitation(_) => BookingSource::Invitation,
        }
    }

    fn invitation_id(self) -> Option<Uuid> {
        match self {
            BookingOrigin::Direct => None,
            BookingOrigin::Invitation(id) => Some(id),
        }
    }
}

/// A committed booking and the balance left after paying for it
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking: bookings::Model,
    pub balance: i32,
}

#[derive(Clone)]
pub struct BookingService {
    db: DatabaseConnection,
    ledger: LedgerService,
}

impl BookingService {
    pub fn new(db: DatabaseConnection) -> Self {
        let ledger = LedgerService::new(db.clone());
        Self { db, ledger }
    }

    /// Book a seat in a class for a customer.
    ///
    /// Runs a cheap rejection pass first, then the authoritative commit in a
    /// single transaction that re-checks everything under row locks.
    #[instrument(skip(self))]
    pub async fn book(&self, user_id: Uuid, class_id: Uuid) -> Result<BookingReceipt> {
        let ctx = capacity::load_class(&self.db, class_id, false).await?;
        let user = find_user(&self.db, user_id).await?;
        check_bookable(&self.db, &user, &ctx).await?;

        let txn = self.db.begin().await?;

        let receipt = match self
            .commit_booking_in_txn(&txn, user_id, class_id, BookingOrigin::Direct)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        txn.commit().await?;

        info!(
            user_id = %user_id,
            class_id = %class_id,
            booking_id = %receipt.booking.id,
            credits_used = receipt.booking.credits_used,
            balance = receipt.balance,
            "Booking confirmed"
        );

        Ok(receipt)
    }

    /// Commit a confirmed booking within an existing transaction.
    ///
    /// Lock order is class row, then user row. Duplicate, capacity and
    /// balance checks are repeated under those locks, then the booking row
    /// and the matching debit are written. The caller owns commit/rollback.
    #[instrument(skip(self, txn))]
    pub async fn commit_booking_in_txn(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        class_id: Uuid,
        origin: BookingOrigin,
    ) -> Result<BookingReceipt> {
        let ctx = capacity::load_class(txn, class_id, true).await?;
        let user = lock_user(txn, user_id).await?;

        check_bookable(txn, &user, &ctx).await?;

        let credits = ctx.credits_required();
        let now = time::OffsetDateTime::now_utc();

        let booking = bookings::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            class_instance_id: Set(class_id),
            status: Set(BookingStatus::Confirmed),
            credits_used: Set(credits),
            source: Set(origin.source()),
            invitation_id: Set(origin.invitation_id()),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::DuplicateBooking
            } else {
                ApiError::Database(e)
            }
        })?;

        // Free classes still get a zero-amount row
        let description = format!("Booked: {}", ctx.activity.title);
        let entry = self
            .ledger
            .adjust_balance_in_txn(
                txn,
                user_id,
                -credits,
                TransactionKind::Booking,
                &description,
                None,
            )
            .await?;

        Ok(BookingReceipt {
            booking,
            balance: entry.balance,
        })
    }

    /// A user's bookings with class details, soonest class first
    #[instrument(skip(self))]
    pub async fn list_bookings(&self, user_id: Uuid) -> Result<Vec<BookingSummary>> {
        find_user(&self.db, user_id).await?;

        let rows = bookings::Entity::find()
            .filter(bookings::Column::UserId.eq(user_id))
            .find_also_related(class_instances::Entity)
            .all(&self.db)
            .await?;

        let activity_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, class)| class.as_ref().map(|c| c.activity_id))
            .collect();

        let activities: HashMap<Uuid, activities::Model> = activities::Entity::find()
            .filter(activities::Column::Id.is_in(activity_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut summaries = Vec::with_capacity(rows.len());
        for (booking, class) in rows {
            let class = class.ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Booking {} references a missing class",
                    booking.id
                ))
            })?;
            let activity = activities.get(&class.activity_id).ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Class {} references a missing activity",
                    class.id
                ))
            })?;
            summaries.push(BookingSummary::new(booking, &class, activity));
        }

        summaries.sort_by_key(|s| s.starts_at);
        Ok(summaries)
    }
}

/// The user's non-cancelled booking for a class, if any
pub(crate) async fn find_active_booking<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    class_id: Uuid,
) -> Result<Option<bookings::Model>> {
    let booking = bookings::Entity::find()
        .filter(bookings::Column::UserId.eq(user_id))
        .filter(bookings::Column::ClassInstanceId.eq(class_id))
        .filter(bookings::Column::Status.ne(BookingStatus::Cancelled))
        .one(conn)
        .await?;

    Ok(booking)
}

/// Rejections in the order a customer sees them: duplicate, full, funds
async fn check_bookable<C: ConnectionTrait>(
    conn: &C,
    user: &users::Model,
    ctx: &ClassContext,
) -> Result<()> {
    if find_active_booking(conn, user.id, ctx.class.id)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateBooking);
    }

    if !capacity::has_room(conn, ctx).await? {
        return Err(ApiError::ClassFull {
            capacity: ctx.effective_capacity(),
        });
    }

    let required = ctx.credits_required();
    if user.credit_balance < required {
        return Err(ApiError::InsufficientFunds {
            required,
            available: user.credit_balance,
        });
    }

    Ok(())
}
