//! Who changed something, and when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Audit stamp carried by every mutating command.
///
/// Time is passed in rather than read from the clock so domain logic stays
/// deterministic in tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub actor: UserId,
    pub at: DateTime<Utc>,
}

impl Stamp {
    pub fn new(actor: UserId, at: DateTime<Utc>) -> Self {
        Self { actor, at }
    }

    /// Stamp for `actor` at the current wall-clock time.
    pub fn now(actor: UserId) -> Self {
        Self::new(actor, Utc::now())
    }
}
