//! Unified error type for the gift registry.
//!
//! Domain failures (validation, authorization, not-found, insufficiency) get their own
//! variants so callers can map them precisely. Integral-gift conflicts are not errors;
//! they come back as [`crate::core::reservation::ClaimOutcome::Conflict`].

use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Actor {actor} is not allowed to manage event {event_id}")]
    NotAuthorized { actor: Uuid, event_id: Uuid },

    #[error("Invalid gift details: {reason}")]
    InvalidGiftDetails { reason: String },

    #[error("Invalid total value {value}: must be greater than zero")]
    InvalidTotalValue { value: Decimal },

    #[error("Invalid quota count {count}: a fractional gift needs at least two quotas")]
    InvalidQuotaCount { count: u32 },

    #[error("Invalid quantity {quantity} for gift {gift_id}")]
    InvalidQuantity { gift_id: Uuid, quantity: u32 },

    #[error("A claim must contain at least one gift")]
    EmptyClaim,

    #[error("Gift {gift_id} appears more than once in the claim")]
    DuplicateGift { gift_id: Uuid },

    #[error("A claim cannot span more than one event")]
    CrossEventClaim,

    #[error("Unknown gift(s): {gift_ids:?}")]
    UnknownGift { gift_ids: Vec<Uuid> },

    #[error("Gift not found: {gift_id}")]
    GiftNotFound { gift_id: Uuid },

    #[error("Selection not found: {selection_id}")]
    SelectionNotFound { selection_id: Uuid },

    #[error("Access key not recognised")]
    AccessKeyNotFound,

    #[error("Gift {gift_id} has only {available} quota(s) available, {requested} requested")]
    InsufficientQuotas {
        gift_id: Uuid,
        requested: u32,
        available: u32,
    },

    #[error("Gift {gift_id} has claimed portions and cannot be deleted")]
    GiftHasClaims { gift_id: Uuid },

    #[error("Timed out waiting for a row lock: {message}")]
    LockTimeout { message: String },
}

impl Error {
    /// Whether the whole operation can safely be resubmitted.
    ///
    /// Claims are idempotent at the row level: a retry of an already-committed claim
    /// observes the rows as taken instead of claiming them twice.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LockTimeout { .. }
                | Self::Database(DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
        )
    }

    /// Reclassifies a database error raised inside a locking transaction; every other
    /// variant passes through unchanged.
    #[must_use]
    pub(crate) fn into_locking(self) -> Self {
        match self {
            Self::Database(err) => Self::from_locking(err),
            other => other,
        }
    }

    /// Converts a database error raised inside a locking transaction, recognising
    /// lock-wait timeouts (`PostgreSQL` `55P03`) and `SQLite` busy/locked failures.
    pub(crate) fn from_locking(err: DbErr) -> Self {
        let message = err.to_string();
        let lowered = message.to_lowercase();
        if lowered.contains("lock timeout")
            || lowered.contains("55p03")
            || lowered.contains("database is locked")
            || lowered.contains("database is busy")
        {
            Self::LockTimeout { message }
        } else {
            Self::Database(err)
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
