use crate::common::*;
use entity::{credit_transactions, sea_orm_active_enums::TransactionKind};
use sea_orm::{ActiveModelTrait, Set};
use studiobook::{error::is_unique_violation, services::LedgerService, ApiError};
use time::OffsetDateTime;
use uuid::Uuid;

#[tokio::test]
async fn test_adjustments_keep_balance_equal_to_ledger_sum() {
    let db = setup_db().await;
    let customer = create_customer(&db, "Ana", 0).await;
    let ledger = LedgerService::new(db.clone());

    ledger
        .adjust_balance(customer.id, 7, TransactionKind::Purchase, "Pack")
        .await
        .unwrap();
    let entry = ledger
        .adjust_balance(customer.id, -3, TransactionKind::Booking, "Class")
        .await
        .unwrap();
    assert_eq!(entry.balance, 4);
    assert_eq!(entry.transaction.balance_after, 4);

    let audit = ledger.audit_balance(customer.id).await.unwrap();
    assert_eq!(audit.balance, 4);
    assert_eq!(audit.ledger_sum, 4);
    assert_eq!(audit.transaction_count, 2);

    let history = ledger.list_transactions(customer.id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_overdraft_is_rejected_without_writes() {
    let db = setup_db().await;
    let customer = create_customer(&db, "Ana", 2).await;
    let ledger = LedgerService::new(db.clone());

    let result = ledger
        .adjust_balance(customer.id, -3, TransactionKind::Booking, "Class")
        .await;
    assert!(matches!(
        result,
        Err(ApiError::InsufficientFunds {
            required: 3,
            available: 2
        })
    ));

    assert_eq!(ledger.get_balance(customer.id).await.unwrap(), 2);
    assert_eq!(ledger.list_transactions(customer.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_adjustment_appends_a_row() {
    let db = setup_db().await;
    let customer = create_customer(&db, "Ana", 2).await;
    let ledger = LedgerService::new(db.clone());

    let entry = ledger
        .adjust_balance(customer.id, 0, TransactionKind::Booking, "Free class")
        .await
        .unwrap();
    assert_eq!(entry.balance, 2);
    assert_eq!(entry.transaction.amount, 0);
    assert_eq!(entry.transaction.balance_after, 2);

    let audit = ledger.audit_balance(customer.id).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.transaction_count, 2);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let db = setup_db().await;
    let ledger = LedgerService::new(db.clone());

    assert!(matches!(
        ledger.get_balance(Uuid::new_v4()).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        ledger
            .adjust_balance(Uuid::new_v4(), 5, TransactionKind::Purchase, "Pack")
            .await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_reused_reference_is_reported_as_unique_violation() {
    let db = setup_db().await;
    let customer = create_customer(&db, "Ana", 0).await;

    let row = |reference: &str| credit_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(customer.id),
        amount: Set(0),
        kind: Set(TransactionKind::Purchase),
        description: Set("Replay".to_string()),
        balance_after: Set(0),
        reference: Set(Some(reference.to_string())),
        created_at: Set(OffsetDateTime::now_utc()),
    };

    row("order-1").insert(&db).await.unwrap();
    let err = row("order-1").insert(&db).await.unwrap_err();
    assert!(is_unique_violation(&err), "{err}");
}
