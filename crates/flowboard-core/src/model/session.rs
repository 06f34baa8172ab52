// ── Session domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The logged-in user. Absent means logged out; there is no expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque, non-empty name chosen at login.
    pub identity: String,
    pub started_at: DateTime<Utc>,
}
