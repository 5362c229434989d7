//! Duplicate submission detection.
//!
//! Catches the common client mistake of double-tapping submit or resubmitting
//! after a slow network response: an attempted purchase is a duplicate if a
//! recent successful attempt exists for the same bundle, same normalized
//! recipient phone, and same payment method within the cooldown window. The
//! check runs strictly before any ledger or order mutation. This is not
//! server-side business policy - the store enforces nothing here.

use crate::{
    core::phone::normalize_phone,
    entities::{RecentOrder, data_order::PaymentMethod, recent_order},
    errors::Result,
};
use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Default cooldown before an identical purchase is accepted again
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 10;

/// A blocked duplicate attempt, with the remaining wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMatch {
    /// Display name of the bundle from the earlier attempt
    pub bundle_name: String,
    /// Remaining minutes before an identical attempt is allowed (rounded up)
    pub minutes_until_allowed: i64,
}

/// Checks an order attempt against the recent-order log using the default
/// cooldown window.
pub async fn check_duplicate(
    db: &DatabaseConnection,
    bundle_id: i64,
    recipient_phone: &str,
    payment_method: PaymentMethod,
    bundle_name: &str,
) -> Result<Option<DuplicateMatch>> {
    check_duplicate_with_cooldown(
        db,
        bundle_id,
        recipient_phone,
        payment_method,
        bundle_name,
        DEFAULT_COOLDOWN_MINUTES,
    )
    .await
}

/// Checks an order attempt against the recent-order log.
///
/// The recipient phone is normalized before comparison so formatting variance
/// cannot defeat matching. Returns `Some` with the remaining wait when a
/// matching attempt exists inside the window; entries at or beyond the window
/// are logically expired and ignored.
pub async fn check_duplicate_with_cooldown(
    db: &DatabaseConnection,
    bundle_id: i64,
    recipient_phone: &str,
    payment_method: PaymentMethod,
    bundle_name: &str,
    cooldown_minutes: i64,
) -> Result<Option<DuplicateMatch>> {
    let normalized = normalize_phone(recipient_phone);
    let now = Utc::now();
    let cutoff = now - Duration::minutes(cooldown_minutes);

    let recent = RecentOrder::find()
        .filter(recent_order::Column::BundleId.eq(bundle_id))
        .filter(recent_order::Column::RecipientPhone.eq(normalized))
        .filter(recent_order::Column::PaymentMethod.eq(payment_method))
        .filter(recent_order::Column::CreatedAt.gt(cutoff))
        .order_by_desc(recent_order::Column::CreatedAt)
        .one(db)
        .await?;

    Ok(recent.map(|record| {
        let allowed_at = record.created_at + Duration::minutes(cooldown_minutes);
        let remaining_secs = (allowed_at - now).num_seconds().max(0);
        DuplicateMatch {
            bundle_name: bundle_name.to_string(),
            // Round up so "7 minutes 30 seconds left" reads as 8 minutes
            minutes_until_allowed: (remaining_secs + 59) / 60,
        }
    }))
}

/// Appends a recent-order record after a fully successful placement.
///
/// Generic over the connection so the append can ride the same store
/// transaction as the order insert.
pub async fn record_order_attempt<C>(
    db: &C,
    bundle_id: i64,
    recipient_phone: &str,
    payment_method: PaymentMethod,
) -> Result<recent_order::Model>
where
    C: ConnectionTrait,
{
    let record = recent_order::ActiveModel {
        bundle_id: Set(bundle_id),
        recipient_phone: Set(normalize_phone(recipient_phone)),
        payment_method: Set(payment_method),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    record.insert(db).await.map_err(Into::into)
}
