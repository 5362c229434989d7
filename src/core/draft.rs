//! Checkout draft persistence.
//!
//! Between "reference generated" and "order confirmed" the purchase exists
//! only in memory; a reload or crash would lose it and tempt the agent to
//! resubmit - possibly quoting a brand-new reference to a payment provider
//! that already received the old one. The draft store persists the full
//! in-flight snapshot keyed per agent, restores it on next load, and is
//! cleared only on terminal success or explicit cancellation.

use crate::{
    entities::{
        checkout_draft,
        data_bundle,
        data_order::PaymentMethod,
    },
    errors::Result,
};
use sea_orm::{ConnectionTrait, Set, prelude::*};
use tracing::debug;

/// The exact order record that will be inserted at confirmation time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderPayload {
    /// Agent placing the order
    pub agent_id: i64,
    /// Bundle being purchased
    pub bundle_id: i64,
    /// Normalized recipient phone
    pub recipient_phone: String,
    /// Chosen payment method
    pub payment_method: PaymentMethod,
    /// Payment reference quoted to the agent
    pub payment_reference: String,
    /// Price at currency scale
    pub amount: f64,
}

/// The recoverable snapshot of an in-flight checkout.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CheckoutDraft {
    /// The selected bundle at the time of submission
    pub bundle: data_bundle::Model,
    /// Normalized recipient phone
    pub recipient_phone: String,
    /// Chosen payment method
    pub payment_method: PaymentMethod,
    /// The already-generated reference code; never regenerated on resume
    pub reference_code: String,
    /// The exact record the confirmation step will insert
    pub order_payload: OrderPayload,
}

fn draft_key(agent_id: i64) -> String {
    format!("checkout_draft:{agent_id}")
}

/// Persists the draft for an agent, replacing any previous draft.
pub async fn save_draft<C>(db: &C, agent_id: i64, draft: &CheckoutDraft) -> Result<()>
where
    C: ConnectionTrait,
{
    let key = draft_key(agent_id);
    let value = serde_json::to_string(draft)?;
    let now = chrono::Utc::now().naive_utc();

    let existing = checkout_draft::Entity::find()
        .filter(checkout_draft::Column::DraftKey.eq(key.as_str()))
        .one(db)
        .await?;

    if let Some(row) = existing {
        let mut active_model: checkout_draft::ActiveModel = row.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_row = checkout_draft::ActiveModel {
            draft_key: Set(key),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_row.insert(db).await?;
    }

    debug!(agent_id, "checkout draft saved");
    Ok(())
}

/// Loads the persisted draft for an agent, if any.
pub async fn load_draft<C>(db: &C, agent_id: i64) -> Result<Option<CheckoutDraft>>
where
    C: ConnectionTrait,
{
    let row = checkout_draft::Entity::find()
        .filter(checkout_draft::Column::DraftKey.eq(draft_key(agent_id)))
        .one(db)
        .await?;

    match row {
        Some(row) => Ok(Some(serde_json::from_str(&row.value)?)),
        None => Ok(None),
    }
}

/// Removes the persisted draft for an agent. A no-op when none exists.
pub async fn clear_draft<C>(db: &C, agent_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    checkout_draft::Entity::delete_many()
        .filter(checkout_draft::Column::DraftKey.eq(draft_key(agent_id)))
        .exec(db)
        .await?;

    debug!(agent_id, "checkout draft cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn sample_draft(agent_id: i64, bundle: data_bundle::Model, reference: &str) -> CheckoutDraft {
        let payload = OrderPayload {
            agent_id,
            bundle_id: bundle.id,
            recipient_phone: "0241234567".to_string(),
            payment_method: PaymentMethod::Manual,
            payment_reference: reference.to_string(),
            amount: bundle.price,
        };
        CheckoutDraft {
            recipient_phone: "0241234567".to_string(),
            payment_method: PaymentMethod::Manual,
            reference_code: reference.to_string(),
            order_payload: payload,
            bundle,
        }
    }

    #[tokio::test]
    async fn test_load_without_save_is_none() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(load_draft(&db, 1).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() -> Result<()> {
        let db = setup_test_db().await?;
        let bundle = create_test_bundle(&db, "MTN", 5.0, 30.0).await?;
        let draft = sample_draft(1, bundle, "ROUND001");

        save_draft(&db, 1, &draft).await?;
        let loaded = load_draft(&db, 1).await?.unwrap();
        assert_eq!(loaded, draft);

        Ok(())
    }

    #[tokio::test]
    async fn test_save_replaces_previous_draft() -> Result<()> {
        let db = setup_test_db().await?;
        let bundle = create_test_bundle(&db, "MTN", 5.0, 30.0).await?;

        let first = sample_draft(1, bundle.clone(), "FIRST001");
        save_draft(&db, 1, &first).await?;

        let second = sample_draft(1, bundle, "SECOND01");
        save_draft(&db, 1, &second).await?;

        let loaded = load_draft(&db, 1).await?.unwrap();
        assert_eq!(loaded.reference_code, "SECOND01");

        // Only one row exists for the agent
        let count = checkout_draft::Entity::find().count(&db).await?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_removes_draft() -> Result<()> {
        let db = setup_test_db().await?;
        let bundle = create_test_bundle(&db, "MTN", 5.0, 30.0).await?;
        let draft = sample_draft(1, bundle, "CLEAR001");

        save_draft(&db, 1, &draft).await?;
        clear_draft(&db, 1).await?;
        assert!(load_draft(&db, 1).await?.is_none());

        // Clearing again is a no-op, not an error
        clear_draft(&db, 1).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_drafts_are_scoped_per_agent() -> Result<()> {
        let db = setup_test_db().await?;
        let bundle = create_test_bundle(&db, "MTN", 5.0, 30.0).await?;

        let draft = sample_draft(1, bundle, "SCOPE001");
        save_draft(&db, 1, &draft).await?;

        assert!(load_draft(&db, 2).await?.is_none());
        clear_draft(&db, 2).await?;
        assert!(load_draft(&db, 1).await?.is_some());

        Ok(())
    }
}
