use crate::{
    error::{ApiError, Result},
    models::subscriptions::Subscriber,
    services::ledger_service::find_user,
};
use anyhow::anyhow;
use entity::{instructor_subscriptions, sea_orm_active_enums::UserRole, users};
use sea_orm::{
    entity::*, query::*, sea_query::OnConflict, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

/// Customer follows of instructors. Rows are soft-toggled, never deleted.
#[derive(Clone)]
pub struct SubscriptionService {
    db: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Subscribe a customer to an instructor; repeating it is a no-op
    #[instrument(skip(self))]
    pub async fn subscribe(
        &self,
        instructor_id: Uuid,
        customer_id: Uuid,
    ) -> Result<instructor_subscriptions::Model> {
        if instructor_id == customer_id {
            return Err(ApiError::BadRequest(
                "Cannot subscribe to yourself".to_string(),
            ));
        }

        let instructor = find_user(&self.db, instructor_id).await?;
        if instructor.role != UserRole::Instructor {
            return Err(ApiError::NotFound(format!(
                "Instructor {} not found",
                instructor_id
            )));
        }
        find_user(&self.db, customer_id).await?;

        let txn = self.db.begin().await?;

        let subscription = match self.upsert_in_txn(&txn, instructor_id, customer_id).await {
            Ok(subscription) => subscription,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        txn.commit().await?;

        info!(
            instructor_id = %instructor_id,
            customer_id = %customer_id,
            "Customer subscribed to instructor"
        );

        Ok(subscription)
    }

    async fn upsert_in_txn(
        &self,
        txn: &DatabaseTransaction,
        instructor_id: Uuid,
        customer_id: Uuid,
    ) -> Result<instructor_subscriptions::Model> {
        let now = time::OffsetDateTime::now_utc();

        let existing = instructor_subscriptions::Entity::find()
            .filter(instructor_subscriptions::Column::InstructorId.eq(instructor_id))
            .filter(instructor_subscriptions::Column::CustomerId.eq(customer_id))
            .lock_exclusive()
            .one(txn)
            .await?;

        if let Some(existing) = existing {
            if existing.is_active {
                return Ok(existing);
            }

            let mut active: instructor_subscriptions::ActiveModel = existing.into();
            active.is_active = Set(true);
            active.subscribed_at = Set(now);
            active.unsubscribed_at = Set(None);
            return Ok(active.update(txn).await?);
        }

        let new_subscription = instructor_subscriptions::ActiveModel {
            id: Set(Uuid::new_v4()),
            instructor_id: Set(instructor_id),
            customer_id: Set(customer_id),
            is_active: Set(true),
            subscribed_at: Set(now),
            unsubscribed_at: Set(None),
        };

        // A concurrent subscribe may have inserted the pair first
        instructor_subscriptions::Entity::insert(new_subscription)
            .on_conflict(
                OnConflict::columns([
                    instructor_subscriptions::Column::InstructorId,
                    instructor_subscriptions::Column::CustomerId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        find_subscription(txn, instructor_id, customer_id)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow!(
                    "Failed to read subscription after insert for {} -> {}",
                    customer_id,
                    instructor_id
                ))
            })
    }

    #[instrument(skip(self))]
    pub async fn unsubscribe(
        &self,
        instructor_id: Uuid,
        customer_id: Uuid,
    ) -> Result<instructor_subscriptions::Model> {
        let existing = find_subscription(&self.db, instructor_id, customer_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "No subscription to instructor {}",
                    instructor_id
                ))
            })?;

        if !existing.is_active {
            return Ok(existing);
        }

        let mut active: instructor_subscriptions::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.unsubscribed_at = Set(Some(time::OffsetDateTime::now_utc()));
        let updated = active.update(&self.db).await?;

        info!(
            instructor_id = %instructor_id,
            customer_id = %customer_id,
            "Customer unsubscribed from instructor"
        );

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn is_subscribed(&self, instructor_id: Uuid, customer_id: Uuid) -> Result<bool> {
        is_active_subscription(&self.db, instructor_id, customer_id).await
    }

    /// Active subscribers of an instructor, most recent first
    #[instrument(skip(self))]
    pub async fn list_subscribers(&self, instructor_id: Uuid) -> Result<Vec<Subscriber>> {
        let rows = instructor_subscriptions::Entity::find()
            .filter(instructor_subscriptions::Column::InstructorId.eq(instructor_id))
            .filter(instructor_subscriptions::Column::IsActive.eq(true))
            .order_by_desc(instructor_subscriptions::Column::SubscribedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        let subscribers = rows
            .into_iter()
            .filter_map(|(subscription, customer)| {
                customer.map(|customer| Subscriber {
                    customer_id: customer.id,
                    name: customer.name,
                    contact: customer.email,
                    subscribed_at: subscription.subscribed_at,
                })
            })
            .collect();

        Ok(subscribers)
    }
}

async fn find_subscription<C: ConnectionTrait>(
    conn: &C,
    instructor_id: Uuid,
    customer_id: Uuid,
) -> Result<Option<instructor_subscriptions::Model>> {
    let subscription = instructor_subscriptions::Entity::find()
        .filter(instructor_subscriptions::Column::InstructorId.eq(instructor_id))
        .filter(instructor_subscriptions::Column::CustomerId.eq(customer_id))
        .one(conn)
        .await?;

    Ok(subscription)
}

/// True only for an active (not soft-deleted) subscription row
pub(crate) async fn is_active_subscription<C: ConnectionTrait>(
    conn: &C,
    instructor_id: Uuid,
    customer_id: Uuid,
) -> Result<bool> {
    Ok(find_subscription(conn, instructor_id, customer_id)
        .await?
        .map(|s| s.is_active)
        .unwrap_or(false))
}
