//! Reservation engine settings loaded from environment variables.

use crate::errors::{Error, Result};
use std::time::Duration;

const LOCK_TIMEOUT_VAR: &str = "CLAIM_LOCK_TIMEOUT_MS";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Settings applied to every claim, release and delete transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationSettings {
    /// How long a transaction may wait for a competing transaction's row locks
    pub lock_timeout: Duration,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl ReservationSettings {
    /// Reads `CLAIM_LOCK_TIMEOUT_MS`, falling back to the default when it is unset.
    pub fn from_env() -> Result<Self> {
        std::env::var(LOCK_TIMEOUT_VAR)
            .ok()
            .map_or_else(|| Ok(Self::default()), |raw| Self::parse(&raw))
    }

    fn parse(raw: &str) -> Result<Self> {
        let millis: u64 = raw.trim().parse().map_err(|e| Error::Config {
            message: format!("{LOCK_TIMEOUT_VAR} must be a number of milliseconds: {e}"),
        })?;
        if millis == 0 {
            return Err(Error::Config {
                message: format!("{LOCK_TIMEOUT_VAR} must be greater than zero"),
            });
        }
        Ok(Self {
            lock_timeout: Duration::from_millis(millis),
        })
    }
}
