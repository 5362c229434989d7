//! Data bundle catalog loading from bundles.toml
//!
//! This module provides functionality to load the initial bundle catalog from
//! a TOML configuration file. The bundles defined in bundles.toml are used to
//! seed the database on first run or when bundles are missing.

use crate::entities::{DataBundle, data_bundle};
use crate::errors::{Error, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire bundles.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of bundle configurations to seed
    pub bundles: Vec<BundleConfig>,
}

/// Configuration for a single data bundle
#[derive(Debug, Deserialize, Clone)]
pub struct BundleConfig {
    /// Network provider name (e.g., "MTN")
    pub provider: String,
    /// Bundle size in gigabytes
    pub size_gb: f64,
    /// Selling price
    pub price: f64,
    /// Commission fraction earned on a sale
    pub commission_rate: f64,
}

/// Loads the bundle catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read bundle catalog: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse bundles.toml: {e}"),
    })
}

/// Loads the bundle catalog from the default location (./bundles.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("bundles.toml")
}

/// Seeds the bundle catalog into the database, inserting only bundles that do
/// not already exist (matched on provider + size). Existing rows are left
/// untouched so admin price edits survive restarts.
pub async fn seed_bundles(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut inserted = 0;

    for bundle in &config.bundles {
        let existing = DataBundle::find()
            .filter(data_bundle::Column::Provider.eq(bundle.provider.as_str()))
            .filter(data_bundle::Column::SizeGb.eq(bundle.size_gb))
            .one(db)
            .await?;

        if existing.is_none() {
            let model = data_bundle::ActiveModel {
                provider: Set(bundle.provider.clone()),
                size_gb: Set(bundle.size_gb),
                price: Set(bundle.price),
                commission_rate: Set(bundle.commission_rate),
                is_active: Set(true),
                ..Default::default()
            };
            model.insert(db).await?;
            inserted += 1;
        }
    }

    if inserted > 0 {
        info!(inserted, "seeded data bundle catalog");
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_parse_bundle_config() {
        let toml_str = r#"
            [[bundles]]
            provider = "MTN"
            size_gb = 5.0
            price = 30.0
            commission_rate = 0.05

            [[bundles]]
            provider = "Telecel"
            size_gb = 10.0
            price = 55.0
            commission_rate = 0.04
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bundles.len(), 2);
        assert_eq!(config.bundles[0].provider, "MTN");
        assert_eq!(config.bundles[0].size_gb, 5.0);
        assert_eq!(config.bundles[0].price, 30.0);

        assert_eq!(config.bundles[1].provider, "Telecel");
        assert_eq!(config.bundles[1].commission_rate, 0.04);
    }

    #[tokio::test]
    async fn test_seed_bundles_inserts_missing_only() -> Result<()> {
        let db = setup_test_db().await?;

        let config = Config {
            bundles: vec![
                BundleConfig {
                    provider: "MTN".to_string(),
                    size_gb: 5.0,
                    price: 30.0,
                    commission_rate: 0.05,
                },
                BundleConfig {
                    provider: "MTN".to_string(),
                    size_gb: 10.0,
                    price: 55.0,
                    commission_rate: 0.05,
                },
            ],
        };

        // First seed inserts both
        let inserted = seed_bundles(&db, &config).await?;
        assert_eq!(inserted, 2);

        // Second seed is a no-op
        let inserted_again = seed_bundles(&db, &config).await?;
        assert_eq!(inserted_again, 0);

        let all = DataBundle::find().all(&db).await?;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|b| b.is_active));

        Ok(())
    }
}
