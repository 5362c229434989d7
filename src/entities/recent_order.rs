//! Recent order entity - Lightweight log of purchase attempts, used only for
//! duplicate detection. Entries older than the cooldown window are logically
//! expired; they are never deleted by this crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recent order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recent_orders")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Bundle the attempt was for
    pub bundle_id: i64,
    /// Recipient phone number, normalized to its last 10 digits
    pub recipient_phone: String,
    /// Payment method of the attempt
    pub payment_method: super::data_order::PaymentMethod,
    /// When the attempt succeeded
    pub created_at: DateTimeUtc,
}

/// `RecentOrder` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
