//! Checkout draft entity - Stores key-value pairs for in-flight checkouts.
//! Each agent has at most one draft row, keyed by `draft_key`; the value is
//! the JSON-serialized draft snapshot. The row survives reloads and crashes
//! and is removed only when the order is finalized or explicitly cancelled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Checkout draft database model - stores key-value draft snapshots
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "checkout_drafts")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Draft key (e.g., `"checkout_draft:42"`)
    #[sea_orm(unique)]
    pub draft_key: String,
    /// Draft snapshot stored as a JSON string
    pub value: String,
    /// When this draft was last modified
    pub updated_at: DateTime,
}

/// `CheckoutDraft` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
