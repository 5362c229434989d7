//! Agent entity - Represents a reselling agent's account snapshot.
//!
//! The balance fields (`wallet_balance`, `total_commissions`, `total_paid_out`)
//! are denormalized counters maintained outside this crate. They serve as the
//! secondary balance tier only; the wallet transaction ledger remains the
//! ground truth.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Agent database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agents")]
pub struct Model {
    /// Unique identifier for the agent
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the agent
    pub name: String,
    /// Contact phone number of the agent (not the order recipient)
    pub phone: String,
    /// Denormalized wallet balance snapshot
    pub wallet_balance: f64,
    /// Lifetime commissions earned
    pub total_commissions: f64,
    /// Lifetime commissions already paid out
    pub total_paid_out: f64,
}

/// Defines relationships between Agent and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One agent has many wallet transactions
    #[sea_orm(has_many = "super::wallet_transaction::Entity")]
    WalletTransactions,
    /// One agent has many data orders
    #[sea_orm(has_many = "super::data_order::Entity")]
    DataOrders,
}

impl Related<super::wallet_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletTransactions.def()
    }
}

impl Related<super::data_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
