//! Data order entity - A placed bundle purchase.
//!
//! Wallet-paid orders are inserted as `processing` only after their deduction
//! has been appended to the ledger; manually-paid orders are inserted as
//! `pending` and reconciled by an admin process outside this crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Data order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "data_orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the agent who placed the order
    pub agent_id: i64,
    /// ID of the purchased bundle
    pub bundle_id: i64,
    /// Recipient phone number, normalized to its last 10 digits
    pub recipient_phone: String,
    /// How the order was paid for
    pub payment_method: PaymentMethod,
    /// Payment reference quoted to the agent; for wallet payments this is
    /// also the reference of the correlated deduction transaction
    pub payment_reference: String,
    /// Price charged at currency scale
    pub amount: f64,
    /// Fulfilment status of the order
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// How an order was paid for
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentMethod {
    /// Paid outside the system (e.g., mobile money transfer), only recorded here
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Paid by deducting the agent's wallet
    #[sea_orm(string_value = "wallet")]
    Wallet,
}

/// Fulfilment status of an order
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum OrderStatus {
    /// Awaiting manual payment confirmation by an admin
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid from the wallet, awaiting delivery
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Bundle delivered
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Defines relationships between `DataOrder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one agent
    #[sea_orm(
        belongs_to = "super::agent::Entity",
        from = "Column::AgentId",
        to = "super::agent::Column::Id"
    )]
    Agent,
    /// Each order is for one bundle
    #[sea_orm(
        belongs_to = "super::data_bundle::Entity",
        from = "Column::BundleId",
        to = "super::data_bundle::Column::Id"
    )]
    DataBundle,
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl Related<super::data_bundle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataBundle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
