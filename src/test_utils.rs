//! Shared test utilities for `AgentWallet`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::ledger,
    entities::{
        agent, data_bundle,
        wallet_transaction::{self, TransactionStatus, TransactionType},
    },
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test agent with zeroed balance counters.
pub async fn create_test_agent(db: &DatabaseConnection, name: &str) -> Result<agent::Model> {
    create_custom_agent(db, name, 0.0, 0.0, 0.0).await
}

/// Creates a test agent with custom snapshot counters.
/// Use this when a test needs specific secondary-tier balance inputs.
pub async fn create_custom_agent(
    db: &DatabaseConnection,
    name: &str,
    wallet_balance: f64,
    total_commissions: f64,
    total_paid_out: f64,
) -> Result<agent::Model> {
    let model = agent::ActiveModel {
        name: Set(name.to_string()),
        phone: Set("0200000000".to_string()),
        wallet_balance: Set(wallet_balance),
        total_commissions: Set(total_commissions),
        total_paid_out: Set(total_paid_out),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates an active test bundle.
pub async fn create_test_bundle(
    db: &DatabaseConnection,
    provider: &str,
    size_gb: f64,
    price: f64,
) -> Result<data_bundle::Model> {
    let model = data_bundle::ActiveModel {
        provider: Set(provider.to_string()),
        size_gb: Set(size_gb),
        price: Set(price),
        commission_rate: Set(0.05),
        is_active: Set(true),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Appends an approved top-up with the given reference code.
pub async fn create_test_topup(
    db: &DatabaseConnection,
    agent_id: i64,
    amount: f64,
    reference_code: &str,
) -> Result<wallet_transaction::Model> {
    create_custom_transaction(
        db,
        agent_id,
        TransactionType::Topup,
        amount,
        TransactionStatus::Approved,
        reference_code,
    )
    .await
}

/// Appends a ledger row with custom type and status.
/// Use this to lay out specific ledger histories for balance tests.
pub async fn create_custom_transaction(
    db: &DatabaseConnection,
    agent_id: i64,
    tx_type: TransactionType,
    amount: f64,
    status: TransactionStatus,
    reference_code: &str,
) -> Result<wallet_transaction::Model> {
    ledger::append_transaction(
        db,
        agent_id,
        tx_type,
        amount,
        "Test transaction".to_string(),
        reference_code.to_string(),
        status,
        None,
    )
    .await
}

/// Sets up a complete test environment with an agent.
/// Returns (db, agent) for common test scenarios.
pub async fn setup_with_agent() -> Result<(DatabaseConnection, agent::Model)> {
    let db = setup_test_db().await?;
    let agent = create_test_agent(&db, "Test Agent").await?;
    Ok((db, agent))
}

/// Sets up an agent whose snapshot row and ledger both show the given funds
/// (one approved top-up). Returns (db, agent) for purchase-flow tests.
pub async fn setup_with_funded_agent(amount: f64) -> Result<(DatabaseConnection, agent::Model)> {
    let db = setup_test_db().await?;
    let agent = create_custom_agent(&db, "Test Agent", amount, 0.0, 0.0).await?;
    create_test_topup(&db, agent.id, amount, "FUNDING1").await?;
    Ok((db, agent))
}
