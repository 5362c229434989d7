//! Ledger append operations - Handles all wallet transaction writes.
//!
//! The ledger is append-only: this module inserts and reads rows, never
//! updates or deletes them. Every insert goes through a single path that
//! validates the amount and maps a reference-code unique violation from the
//! store into the same collision error the advisory validation produces, so
//! callers see one error shape regardless of which check caught it.

use crate::{
    core::reference::{self, ReferenceCheck},
    entities::{
        WalletTransaction, wallet_transaction,
        wallet_transaction::{TransactionStatus, TransactionType},
    },
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, SqlErr, prelude::*};
use tracing::info;

/// Retrieves all wallet transactions for an agent, newest first.
///
/// Used for wallet history display; includes pending and rejected rows since
/// agents need to see their unapproved top-up requests.
pub async fn list_transactions(
    db: &DatabaseConnection,
    agent_id: i64,
) -> Result<Vec<wallet_transaction::Model>> {
    WalletTransaction::find()
        .filter(wallet_transaction::Column::AgentId.eq(agent_id))
        .order_by_desc(wallet_transaction::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Submits a wallet top-up request with an agent-supplied reference code.
///
/// The reference is re-validated synchronously here, at submit time - not
/// just on keystroke - to close the race between "last keystroke validated"
/// and "insert happens seconds later". The transaction is inserted as
/// `pending`; an admin approves it out of band before it counts toward the
/// balance.
pub async fn request_topup(
    db: &DatabaseConnection,
    agent_id: i64,
    amount: f64,
    reference_code: &str,
    description: Option<String>,
) -> Result<wallet_transaction::Model> {
    match reference::validate_reference_code(db, reference_code).await? {
        ReferenceCheck::Valid => {}
        ReferenceCheck::TooShort { suggestion } => {
            return Err(Error::ReferenceTooShort {
                code: reference_code.to_string(),
                suggestion,
            });
        }
        ReferenceCheck::InUse { suggestion } => {
            return Err(Error::ReferenceInUse {
                code: reference_code.to_string(),
                suggestion,
            });
        }
    }

    let description =
        description.unwrap_or_else(|| format!("Wallet top-up request of {amount:.2}"));

    let topup = append_transaction(
        db,
        agent_id,
        TransactionType::Topup,
        amount,
        description,
        reference_code.to_string(),
        TransactionStatus::Pending,
        None,
    )
    .await?;

    info!(agent_id, reference = %topup.reference_code, amount, "top-up requested");
    Ok(topup)
}

/// Appends one row to the ledger. This is the single insert path for all
/// transaction kinds.
///
/// A unique-constraint violation on the reference code is authoritative proof
/// of collision - even when advisory validation passed moments earlier - and
/// is mapped to [`Error::ReferenceInUse`] with a fresh suggestion.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn append_transaction<C>(
    db: &C,
    agent_id: i64,
    tx_type: TransactionType,
    amount: f64,
    description: String,
    reference_code: String,
    status: TransactionStatus,
    source: Option<(String, String)>,
) -> Result<wallet_transaction::Model>
where
    C: ConnectionTrait,
{
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let (source_type, source_id) = match source {
        Some((kind, id)) => (Some(kind), Some(id)),
        None => (None, None),
    };

    let transaction = wallet_transaction::ActiveModel {
        agent_id: Set(agent_id),
        tx_type: Set(tx_type),
        amount: Set(amount),
        description: Set(description),
        reference_code: Set(reference_code.clone()),
        status: Set(status),
        admin_notes: Set(None),
        source_type: Set(source_type),
        source_id: Set(source_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    transaction.insert(db).await.map_err(|e| {
        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            Error::ReferenceInUse {
                code: reference_code,
                suggestion: reference::generate_reference_code(),
            }
        } else {
            Error::Database(e)
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_request_topup_creates_pending_transaction() -> Result<()> {
        let (db, agent) = setup_with_agent().await?;

        let topup = request_topup(&db, agent.id, 200.0, "MYREF001", None).await?;

        assert_eq!(topup.agent_id, agent.id);
        assert_eq!(topup.tx_type, TransactionType::Topup);
        assert_eq!(topup.amount, 200.0);
        assert_eq!(topup.reference_code, "MYREF001");
        assert_eq!(topup.status, TransactionStatus::Pending);
        assert!(topup.description.contains("200.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_request_topup_rejects_short_reference() -> Result<()> {
        let (db, agent) = setup_with_agent().await?;

        let result = request_topup(&db, agent.id, 50.0, "ABC", None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ReferenceTooShort { .. }
        ));

        // Nothing was inserted
        let transactions = list_transactions(&db, agent.id).await?;
        assert!(transactions.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_request_topup_rejects_used_reference() -> Result<()> {
        let (db, agent) = setup_with_agent().await?;
        request_topup(&db, agent.id, 50.0, "SAMECODE", None).await?;

        let result = request_topup(&db, agent.id, 75.0, "SAMECODE", None).await;
        match result.unwrap_err() {
            Error::ReferenceInUse { code, suggestion } => {
                assert_eq!(code, "SAMECODE");
                assert!(suggestion.len() >= crate::core::reference::MIN_REFERENCE_LENGTH);
            }
            other => panic!("expected ReferenceInUse, got {other:?}"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_request_topup_rejects_invalid_amounts() -> Result<()> {
        let (db, agent) = setup_with_agent().await?;

        for amount in [0.0, -25.0, f64::NAN, f64::INFINITY] {
            let result = request_topup(&db, agent.id, amount, "GOODREF1", None).await;
            assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_store_level_collision_maps_to_reference_in_use() -> Result<()> {
        let (db, agent) = setup_with_agent().await?;

        // Bypass the advisory check and hit the unique constraint directly,
        // simulating the race where both submissions validated as free
        append_transaction(
            &db,
            agent.id,
            TransactionType::Topup,
            10.0,
            "first".to_string(),
            "RACE0001".to_string(),
            TransactionStatus::Pending,
            None,
        )
        .await?;

        let result = append_transaction(
            &db,
            agent.id,
            TransactionType::Topup,
            20.0,
            "second".to_string(),
            "RACE0001".to_string(),
            TransactionStatus::Pending,
            None,
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::ReferenceInUse { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first() -> Result<()> {
        let (db, agent) = setup_with_agent().await?;

        let first = create_test_topup(&db, agent.id, 10.0, "ORDER001").await?;
        let second = create_test_topup(&db, agent.id, 20.0, "ORDER002").await?;

        let transactions = list_transactions(&db, agent.id).await?;
        assert_eq!(transactions.len(), 2);
        assert!(transactions[0].created_at >= transactions[1].created_at);
        assert_eq!(transactions[1].id, first.id);
        assert_eq!(transactions[0].id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_scoped_to_agent() -> Result<()> {
        let db = setup_test_db().await?;
        let agent_a = create_test_agent(&db, "Ama").await?;
        let agent_b = create_test_agent(&db, "Kojo").await?;

        create_test_topup(&db, agent_a.id, 10.0, "AGENTA01").await?;
        create_test_topup(&db, agent_b.id, 20.0, "AGENTB01").await?;

        let for_a = list_transactions(&db, agent_a.id).await?;
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].reference_code, "AGENTA01");

        Ok(())
    }
}
