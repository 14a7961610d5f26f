use crate::{
    error::{is_unique_violation, ApiError, Result},
    models::credits::CreditPackage,
    services::ledger_service::{LedgerEntry, LedgerService},
};
use entity::{credit_transactions, sea_orm_active_enums::TransactionKind};
use sea_orm::{entity::*, query::*, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

/// A completed package purchase
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub package: &'static CreditPackage,
    pub transaction: credit_transactions::Model,
    pub balance: i32,
}

/// Sells catalog packages; supply is unlimited so only the buyer's row is touched
#[derive(Clone)]
pub struct PurchaseService {
    db: DatabaseConnection,
    ledger: LedgerService,
}

impl PurchaseService {
    pub fn new(db: DatabaseConnection) -> Self {
        let ledger = LedgerService::new(db.clone());
        Self { db, ledger }
    }

    pub fn catalog(&self) -> &'static [CreditPackage] {
        CreditPackage::catalog()
    }

    /// Credit a user with a package's credits.
    ///
    /// With an idempotency key the ledger row is tagged with a unique
    /// reference, so replaying the same key credits nothing and fails with
    /// `Conflict`.
    #[instrument(skip(self))]
    pub async fn purchase(
        &self,
        user_id: Uuid,
        package_id: &str,
        idempotency_key: Option<&str>,
    ) -> Result<PurchaseReceipt> {
        let package = CreditPackage::find(package_id)
            .ok_or_else(|| ApiError::UnknownPackage(package_id.to_string()))?;

        let reference = idempotency_key.map(|key| purchase_reference(user_id, key));

        let txn = self.db.begin().await?;

        let entry = match self
            .credit_package_in_txn(&txn, user_id, package, reference.as_deref())
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        if let Err(e) = txn.commit().await {
            // A racing replay committed the same reference first
            if is_unique_violation(&e) {
                return Err(already_processed(idempotency_key.unwrap_or_default(), None));
            }
            return Err(e.into());
        }

        info!(
            user_id = %user_id,
            package_id = package.id,
            credits = package.credits,
            balance = entry.balance,
            "Credit package purchased"
        );

        Ok(PurchaseReceipt {
            package,
            transaction: entry.transaction,
            balance: entry.balance,
        })
    }

    async fn credit_package_in_txn(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        package: &CreditPackage,
        reference: Option<&str>,
    ) -> Result<LedgerEntry> {
        if let Some(reference) = reference {
            let existing = credit_transactions::Entity::find()
                .filter(credit_transactions::Column::Reference.eq(reference))
                .one(txn)
                .await?;

            if let Some(existing) = existing {
                return Err(already_processed(
                    reference_key(reference),
                    Some(existing.created_at),
                ));
            }
        }

        let description = format!("Purchased: {}", package.name);

        self.ledger
            .adjust_balance_in_txn(
                txn,
                user_id,
                package.credits,
                TransactionKind::Purchase,
                &description,
                reference,
            )
            .await
            .map_err(|e| match e {
                ApiError::Database(db_err) if is_unique_violation(&db_err) => {
                    already_processed(reference.map(reference_key).unwrap_or_default(), None)
                }
                other => other,
            })
    }
}

/// Ledger reference for an idempotent purchase, scoped per user
pub fn purchase_reference(user_id: Uuid, idempotency_key: &str) -> String {
    format!("purchase:{}:{}", user_id, idempotency_key)
}

fn reference_key(reference: &str) -> &str {
    reference.splitn(3, ':').nth(2).unwrap_or(reference)
}

fn already_processed(key: &str, at: Option<time::OffsetDateTime>) -> ApiError {
    match at {
        Some(at) => ApiError::Conflict(format!("Purchase {} already processed at {}", key, at)),
        None => ApiError::Conflict(format!("Purchase {} already processed", key)),
    }
}
