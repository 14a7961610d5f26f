use axum::{extract::State, Json};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, AppJson, Result},
    middleware::UserIdentity,
    models::{
        common::SuccessResponse,
        credits::{
            BalanceData, CreditPackage, LedgerAuditData, PurchaseData, PurchaseRequest,
            TransactionRecord,
        },
    },
};

/// GET /api/v1/credits/balance
#[instrument(skip(state))]
pub async fn get_balance(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<SuccessResponse<BalanceData>>> {
    let balance = state.ledger_service.get_balance(identity.user_id).await?;

    Ok(Json(SuccessResponse::new(BalanceData { balance })))
}

/// GET /api/v1/credits/transactions
///
/// Newest first.
#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<SuccessResponse<Vec<TransactionRecord>>>> {
    let transactions = state
        .ledger_service
        .list_transactions(identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(
        transactions.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/v1/credits/audit
#[instrument(skip(state))]
pub async fn audit_balance(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<SuccessResponse<LedgerAuditData>>> {
    let audit = state.ledger_service.audit_balance(identity.user_id).await?;

    Ok(Json(SuccessResponse::new(LedgerAuditData {
        balance: audit.balance,
        ledger_sum: audit.ledger_sum,
        transaction_count: audit.transaction_count,
        consistent: audit.is_consistent(),
    })))
}

/// GET /api/v1/credits/packages
pub async fn list_packages(
    State(state): State<AppState>,
) -> Json<SuccessResponse<&'static [CreditPackage]>> {
    Json(SuccessResponse::new(state.purchase_service.catalog()))
}

/// POST /api/v1/credits/purchase
///
/// Request body:
/// ```json
/// { "packageId": "pack-10", "idempotencyKey": "order-8812" }
/// ```
#[instrument(skip(state, request))]
pub async fn purchase_credits(
    State(state): State<AppState>,
    identity: UserIdentity,
    AppJson(request): AppJson<PurchaseRequest>,
) -> Result<Json<SuccessResponse<PurchaseData>>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let receipt = state
        .purchase_service
        .purchase(
            identity.user_id,
            &request.package_id,
            request.idempotency_key.as_deref(),
        )
        .await?;

    Ok(Json(SuccessResponse::new(PurchaseData {
        package_id: receipt.package.id.to_string(),
        credits_added: receipt.package.credits,
        balance: receipt.balance,
        transaction_id: receipt.transaction.id,
    })))
}
