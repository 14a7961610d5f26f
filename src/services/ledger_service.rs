use crate::error::{ApiError, Result};
use entity::{credit_transactions, sea_orm_active_enums::TransactionKind, users};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

/// Result of one committed balance adjustment
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub transaction: credit_transactions::Model,
    pub balance: i32,
}

/// Recomputed balance-ledger invariant for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAudit {
    pub balance: i32,
    pub ledger_sum: i64,
    pub transaction_count: usize,
}

impl LedgerAudit {
    pub fn is_consistent(&self) -> bool {
        i64::from(self.balance) == self.ledger_sum
    }
}

/// Owner of user credit balances and the append-only transaction log.
///
/// Balances only ever move through [`LedgerService::adjust_balance_in_txn`],
/// which updates the balance and appends the matching transaction row in the
/// caller's database transaction.
#[derive(Clone)]
pub struct LedgerService {
    db: DatabaseConnection,
}

impl LedgerService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_balance(&self, user_id: Uuid) -> Result<i32> {
        let user = find_user(&self.db, user_id).await?;
        Ok(user.credit_balance)
    }

    /// Adjust a balance in its own transaction
    #[instrument(skip(self))]
    pub async fn adjust_balance(
        &self,
        user_id: Uuid,
        delta: i32,
        kind: TransactionKind,
        description: &str,
    ) -> Result<LedgerEntry> {
        let txn = self.db.begin().await?;

        let entry = match self
            .adjust_balance_in_txn(&txn, user_id, delta, kind, description, None)
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                txn.rollback().await?;
                return Err(e);
            }
        };

        txn.commit().await?;

        info!(
            user_id = %user_id,
            delta,
            kind = ?kind,
            balance = entry.balance,
            "Adjusted credit balance"
        );

        Ok(entry)
    }

    /// Adjust a balance within an existing transaction.
    ///
    /// The balance update is a single conditional statement guarded by
    /// `credit_balance >= -delta`, so a debit can never drive the balance
    /// negative even if the caller's earlier reads are stale. Exactly one
    /// transaction row with `amount == delta` is appended on success, zero
    /// amounts included.
    #[instrument(skip(self, txn))]
    pub async fn adjust_balance_in_txn(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        delta: i32,
        kind: TransactionKind,
        description: &str,
        reference: Option<&str>,
    ) -> Result<LedgerEntry> {
        let user = lock_user(txn, user_id).await?;
        let now = time::OffsetDateTime::now_utc();

        let mut update = users::Entity::update_many()
            .col_expr(
                users::Column::CreditBalance,
                Expr::col(users::Column::CreditBalance).add(delta),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user_id));

        if delta < 0 {
            update = update.filter(users::Column::CreditBalance.gte(-delta));
        }

        let result = update.exec(txn).await?;
        if result.rows_affected == 0 {
            return Err(ApiError::InsufficientFunds {
                required: -delta,
                available: user.credit_balance,
            });
        }

        let balance = find_user(txn, user_id).await?.credit_balance;

        let transaction = credit_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(delta),
            kind: Set(kind),
            description: Set(description.to_string()),
            balance_after: Set(balance),
            reference: Set(reference.map(|r| r.to_string())),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        Ok(LedgerEntry {
            transaction,
            balance,
        })
    }

    /// All ledger rows for a user, newest first
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<credit_transactions::Model>> {
        find_user(&self.db, user_id).await?;

        let transactions = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id))
            .order_by_desc(credit_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(transactions)
    }

    /// Recompute `balance == sum(amounts)` for a user inside one snapshot
    #[instrument(skip(self))]
    pub async fn audit_balance(&self, user_id: Uuid) -> Result<LedgerAudit> {
        let txn = self.db.begin().await?;

        let user = find_user(&txn, user_id).await?;
        let transactions = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id))
            .all(&txn)
            .await?;

        txn.commit().await?;

        let ledger_sum: i64 = transactions.iter().map(|t| i64::from(t.amount)).sum();

        Ok(LedgerAudit {
            balance: user.credit_balance,
            ledger_sum,
            transaction_count: transactions.len(),
        })
    }
}

/// Load a user or fail with `NotFound`
pub(crate) async fn find_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
}

/// Load a user with a row lock (`FOR UPDATE`) held until the transaction ends
pub(crate) async fn lock_user(txn: &DatabaseTransaction, user_id: Uuid) -> Result<users::Model> {
    users::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
}
