use entity::{credit_transactions, sea_orm_active_enums::TransactionKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A purchasable credit bundle. The catalog is fixed and supply is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i32,
    pub price_cents: i64,
    pub validity_days: u32,
}

pub const CREDIT_PACKAGES: &[CreditPackage] = &[
    CreditPackage {
        id: "drop-in",
        name: "Drop-in Credit",
        credits: 1,
        price_cents: 1_500,
        validity_days: 30,
    },
    CreditPackage {
        id: "pack-5",
        name: "5 Credit Pack",
        credits: 5,
        price_cents: 6_500,
        validity_days: 90,
    },
    CreditPackage {
        id: "pack-10",
        name: "10 Credit Pack",
        credits: 10,
        price_cents: 12_000,
        validity_days: 180,
    },
    CreditPackage {
        id: "pack-20",
        name: "20 Credit Pack",
        credits: 20,
        price_cents: 22_000,
        validity_days: 365,
    },
];

impl CreditPackage {
    /// Look up a catalog entry by its id
    pub fn find(package_id: &str) -> Option<&'static CreditPackage> {
        CREDIT_PACKAGES.iter().find(|p| p.id == package_id)
    }

    pub fn catalog() -> &'static [CreditPackage] {
        CREDIT_PACKAGES
    }
}

/// Request to buy a credit package
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[validate(length(min = 1, max = 64))]
    pub package_id: String,

    /// Client-chosen key; replays with the same key credit nothing
    #[validate(length(min = 1, max = 128))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseData {
    pub package_id: String,
    pub credits_added: i32,
    pub balance: i32,
    pub transaction_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    pub balance: i32,
}

/// One row of the credit ledger
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    pub amount: i32,
    pub kind: TransactionKind,
    pub description: String,
    pub balance_after: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

impl From<credit_transactions::Model> for TransactionRecord {
    fn from(tx: credit_transactions::Model) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            kind: tx.kind,
            description: tx.description,
            balance_after: tx.balance_after,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAuditData {
    pub balance: i32,
    pub ledger_sum: i64,
    pub transaction_count: usize,
    pub consistent: bool,
}
