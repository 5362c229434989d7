//! Payment reference allocation and validation.
//!
//! Reference codes are human-quotable tokens that correlate an external
//! payment with a ledger transaction. They must be unique across the entire
//! ledger regardless of agent. The lookup here is advisory only - the
//! database unique constraint is the source of truth, and a collision at
//! insert time is handled even when this pre-check passed. A lookup that
//! fails for any reason other than "not found" is reported as unable to
//! validate rather than treated as proof the code is free.

use crate::{
    entities::{WalletTransaction, wallet_transaction},
    errors::{Error, Result},
};
use rand::Rng;
use sea_orm::{ConnectionTrait, prelude::*};

/// Minimum accepted length for a reference code
pub const MIN_REFERENCE_LENGTH: usize = 7;

/// Length of generated reference codes
pub const GENERATED_REFERENCE_LENGTH: usize = 8;

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Outcome of validating a reference code against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceCheck {
    /// The code satisfies the length rule and is not present in the ledger
    Valid,
    /// The code is below the minimum length; a generated replacement is offered
    TooShort {
        /// Freshly generated candidate satisfying all rules
        suggestion: String,
    },
    /// The code already exists in the ledger; a generated replacement is offered
    InUse {
        /// Freshly generated candidate satisfying all rules
        suggestion: String,
    },
}

/// Generates an uppercase alphanumeric reference code.
///
/// Collision probability is accepted as negligible and is not verified here;
/// the database unique constraint catches the residual case at insert time.
#[must_use]
pub fn generate_reference_code() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_REFERENCE_LENGTH)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect()
}

/// Validates a reference code: length rule first, then a case-sensitive
/// exact-match lookup against the ledger.
///
/// A store error during the lookup fails closed as
/// [`Error::ReferenceUnavailable`] - an ambiguous lookup result must never be
/// treated as "code is free".
pub async fn validate_reference_code<C>(db: &C, code: &str) -> Result<ReferenceCheck>
where
    C: ConnectionTrait,
{
    if code.len() < MIN_REFERENCE_LENGTH {
        return Ok(ReferenceCheck::TooShort {
            suggestion: generate_reference_code(),
        });
    }

    let existing = WalletTransaction::find()
        .filter(wallet_transaction::Column::ReferenceCode.eq(code))
        .one(db)
        .await
        .map_err(Error::ReferenceUnavailable)?;

    Ok(match existing {
        Some(_) => ReferenceCheck::InUse {
            suggestion: generate_reference_code(),
        },
        None => ReferenceCheck::Valid,
    })
}
