//! Data bundle entity - A purchasable data package from a network provider.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Data bundle database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "data_bundles")]
pub struct Model {
    /// Unique identifier for the bundle
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Network provider name (e.g., "MTN", "Telecel")
    pub provider: String,
    /// Bundle size in gigabytes
    pub size_gb: f64,
    /// Selling price at currency scale
    pub price: f64,
    /// Commission fraction earned by the agent on a sale
    pub commission_rate: f64,
    /// Whether the bundle is currently offered for sale
    pub is_active: bool,
}

/// Defines relationships between `DataBundle` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One bundle has many orders
    #[sea_orm(has_many = "super::data_order::Entity")]
    DataOrders,
}

impl Related<super::data_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Display label used in prompts and duplicate warnings,
    /// e.g. `"MTN 5GB"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}GB", self.provider, self.size_gb)
    }
}
