//! Wallet transaction entity - One immutable row in the append-only ledger.
//!
//! Rows are only ever inserted and read, never updated or deleted by this
//! crate. `reference_code` is unique across the whole table regardless of
//! agent; the database constraint is the authoritative uniqueness check, the
//! client-side lookup is advisory only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    /// Unique identifier for the transaction, assigned by the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the agent this ledger entry belongs to
    pub agent_id: i64,
    /// Kind of ledger movement this row records
    pub tx_type: TransactionType,
    /// Transaction amount at currency scale, always non-negative;
    /// the sign of its effect is derived from `tx_type`
    pub amount: f64,
    /// Human-readable description of the transaction
    pub description: String,
    /// Globally unique payment reference, quotable to external providers
    #[sea_orm(unique)]
    pub reference_code: String,
    /// Lifecycle status; only `approved` rows count toward the balance
    pub status: TransactionStatus,
    /// Optional notes left by the approving admin
    pub admin_notes: Option<String>,
    /// Correlation kind, e.g. `"data_order"` for purchase deductions
    pub source_type: Option<String>,
    /// Correlation id within `source_type`
    pub source_id: Option<String>,
    /// When the transaction was created
    pub created_at: DateTimeUtc,
}

/// Kind of ledger movement
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TransactionType {
    /// Agent-requested wallet top-up (requires admin approval)
    #[sea_orm(string_value = "topup")]
    Topup,
    /// Wallet charge for a purchase
    #[sea_orm(string_value = "deduction")]
    Deduction,
    /// Money returned to the wallet
    #[sea_orm(string_value = "refund")]
    Refund,
    /// Commission credited to the wallet
    #[sea_orm(string_value = "commission_deposit")]
    CommissionDeposit,
    /// Wallet debit for a commission payout
    #[sea_orm(string_value = "withdrawal_deduction")]
    WithdrawalDeduction,
    /// Admin-issued reversal of an earlier credit
    #[sea_orm(string_value = "admin_reversal")]
    AdminReversal,
    /// Admin-issued manual credit correction
    #[sea_orm(string_value = "admin_adjustment")]
    AdminAdjustment,
}

/// Transaction lifecycle status
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TransactionStatus {
    /// Awaiting admin approval; excluded from the balance
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Counted toward the balance
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Declined by an admin; excluded from the balance
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Defines relationships between `WalletTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one agent
    #[sea_orm(
        belongs_to = "super::agent::Entity",
        from = "Column::AgentId",
        to = "super::agent::Column::Id"
    )]
    Agent,
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
