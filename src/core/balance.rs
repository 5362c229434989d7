//! Balance reconciliation - Derives an agent's spendable balance.
//!
//! The balance must stay visible even when any single data path is degraded,
//! so resolution walks three tiers of decreasing precision: the external
//! commission aggregator, the agent's denormalized snapshot row, and finally
//! a replay of the raw transaction ledger. Each tier is strictly more
//! expensive and more ground-truth than the last; the ledger replay is the
//! formal definition of what "balance" means and is exposed on its own so it
//! can be tested and reused directly. Resolution never fails the caller -
//! total degradation yields a zero balance with an explicit marker instead of
//! an error.

use crate::{
    entities::{
        Agent, WalletTransaction, wallet_transaction,
        wallet_transaction::{TransactionStatus, TransactionType},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, prelude::*};
use tracing::{error, warn};

/// External commission/ledger aggregation service - the primary balance tier.
///
/// Implemented by the hosting application; this crate only consumes it and
/// treats any error as a cue to fall through to the next tier.
#[async_trait]
pub trait CommissionAggregator: Send + Sync {
    /// Returns the pre-computed approved spendable balance for an agent.
    async fn approved_balance(&self, agent_id: i64) -> Result<f64>;
}

/// Which tier produced a spendable balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSource {
    /// Primary: the external aggregation service
    Aggregator,
    /// Secondary: the agent's denormalized snapshot row
    AgentSnapshot,
    /// Tertiary: replay of the raw transaction ledger
    LedgerReplay,
    /// All tiers failed; the amount is a placeholder zero
    Unavailable,
}

/// A resolved spendable balance together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendableBalance {
    /// The spendable amount at currency scale
    pub amount: f64,
    /// The tier that produced the amount
    pub source: BalanceSource,
}

impl SpendableBalance {
    /// True when every tier failed and the amount is a best-effort zero.
    /// Callers should surface a degraded-balance warning, not a hard error.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.source, BalanceSource::Unavailable)
    }
}

/// Resolves the spendable balance for an agent, trying each tier in order and
/// absorbing individual tier failures.
///
/// This function never returns an error; when every tier fails the result is
/// zero with [`BalanceSource::Unavailable`] set.
pub async fn get_spendable_balance(
    db: &DatabaseConnection,
    aggregator: Option<&dyn CommissionAggregator>,
    agent_id: i64,
) -> SpendableBalance {
    if let Some(aggregator) = aggregator {
        match aggregator.approved_balance(agent_id).await {
            Ok(amount) => {
                return SpendableBalance {
                    amount,
                    source: BalanceSource::Aggregator,
                };
            }
            Err(e) => warn!(agent_id, error = %e, "aggregator balance tier failed"),
        }
    }

    match snapshot_balance(db, agent_id).await {
        Ok(amount) => {
            return SpendableBalance {
                amount,
                source: BalanceSource::AgentSnapshot,
            };
        }
        Err(e) => warn!(agent_id, error = %e, "snapshot balance tier failed"),
    }

    match replay_ledger_balance(db, agent_id).await {
        Ok(amount) => SpendableBalance {
            amount,
            source: BalanceSource::LedgerReplay,
        },
        Err(e) => {
            error!(agent_id, error = %e, "all balance tiers failed, reporting zero");
            SpendableBalance {
                amount: 0.0,
                source: BalanceSource::Unavailable,
            }
        }
    }
}

/// Secondary tier: the agent's denormalized snapshot row.
///
/// Spendable = `wallet_balance` plus unpaid commissions, where unpaid
/// commissions are floored at zero so an over-paid-out agent cannot see a
/// negative commission pool eat into their wallet.
pub async fn snapshot_balance(db: &DatabaseConnection, agent_id: i64) -> Result<f64> {
    let agent = Agent::find_by_id(agent_id)
        .one(db)
        .await?
        .ok_or(Error::AgentNotFound { id: agent_id })?;

    let available_commissions = (agent.total_commissions - agent.total_paid_out).max(0.0);
    Ok(agent.wallet_balance + available_commissions)
}

/// Tertiary tier: fold the agent's raw transaction ledger.
///
/// Only `approved` transactions contribute. Top-ups, refunds, commission
/// deposits, and admin adjustments credit; deductions, withdrawal deductions,
/// and admin reversals debit. The result is floored at zero.
///
/// Generic over the connection so the same fold can run inside a store
/// transaction, where it doubles as the authoritative pre-charge check.
pub async fn replay_ledger_balance<C>(db: &C, agent_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let transactions = WalletTransaction::find()
        .filter(wallet_transaction::Column::AgentId.eq(agent_id))
        .all(db)
        .await?;

    let mut balance = 0.0;
    for tx in &transactions {
        if tx.status != TransactionStatus::Approved {
            continue;
        }
        match tx.tx_type {
            TransactionType::Topup
            | TransactionType::Refund
            | TransactionType::CommissionDeposit
            | TransactionType::AdminAdjustment => balance += tx.amount,
            TransactionType::Deduction
            | TransactionType::WithdrawalDeduction
            | TransactionType::AdminReversal => balance -= tx.amount,
        }
    }

    Ok(balance.max(0.0))
}
