//! Database configuration module for `AgentWallet`.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. Table creation uses `Schema::create_table_from_entity` so the
//! schema - including the unique constraint on wallet transaction reference
//! codes - is generated from the entity definitions without manual SQL.

use crate::entities::{
    Agent, CheckoutDraft, DataBundle, DataOrder, RecentOrder, WalletTransaction,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/agent_wallet.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from entity definitions.
///
/// Creates tables for agents, data bundles, wallet transactions, data orders,
/// recent orders, and checkout drafts.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let agent_table = schema.create_table_from_entity(Agent);
    let bundle_table = schema.create_table_from_entity(DataBundle);
    let transaction_table = schema.create_table_from_entity(WalletTransaction);
    let order_table = schema.create_table_from_entity(DataOrder);
    let recent_order_table = schema.create_table_from_entity(RecentOrder);
    let draft_table = schema.create_table_from_entity(CheckoutDraft);

    db.execute(builder.build(&agent_table)).await?;
    db.execute(builder.build(&bundle_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&order_table)).await?;
    db.execute(builder.build(&recent_order_table)).await?;
    db.execute(builder.build(&draft_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        agent::Model as AgentModel, data_bundle::Model as DataBundleModel,
        data_order::Model as DataOrderModel, recent_order::Model as RecentOrderModel,
        wallet_transaction::Model as WalletTransactionModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<AgentModel> = Agent::find().limit(1).all(&db).await?;
        let _: Vec<DataBundleModel> = DataBundle::find().limit(1).all(&db).await?;
        let _: Vec<WalletTransactionModel> = WalletTransaction::find().limit(1).all(&db).await?;
        let _: Vec<DataOrderModel> = DataOrder::find().limit(1).all(&db).await?;
        let _: Vec<RecentOrderModel> = RecentOrder::find().limit(1).all(&db).await?;
        let _: Vec<crate::entities::checkout_draft::Model> =
            CheckoutDraft::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_reference_code_unique_constraint() -> Result<()> {
        use crate::entities::wallet_transaction::{
            ActiveModel, TransactionStatus, TransactionType,
        };
        use sea_orm::{ActiveModelTrait, Set};

        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let now = chrono::Utc::now();
        let first = ActiveModel {
            agent_id: Set(1),
            tx_type: Set(TransactionType::Topup),
            amount: Set(10.0),
            description: Set("first".to_string()),
            reference_code: Set("UNIQ1234".to_string()),
            status: Set(TransactionStatus::Pending),
            admin_notes: Set(None),
            source_type: Set(None),
            source_id: Set(None),
            created_at: Set(now),
            ..Default::default()
        };
        first.insert(&db).await?;

        let second = ActiveModel {
            agent_id: Set(2),
            tx_type: Set(TransactionType::Topup),
            amount: Set(20.0),
            description: Set("second".to_string()),
            reference_code: Set("UNIQ1234".to_string()),
            status: Set(TransactionStatus::Pending),
            admin_notes: Set(None),
            source_type: Set(None),
            source_id: Set(None),
            created_at: Set(now),
            ..Default::default()
        };
        let result = second.insert(&db).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err().sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));

        Ok(())
    }
}
