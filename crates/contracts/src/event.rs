//! Appointment status event model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One appointment-status observation awaiting announcement.
///
/// Produced upstream by the slot checker and immutable from the
/// dispatcher's point of view. `id` is stable and used for logging
/// and correlation only, never for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentEvent {
    /// Stable correlation identifier.
    pub id: String,

    /// Observed slot status.
    pub status: SlotStatus,

    /// Application center display name.
    #[serde(default)]
    pub center_name: Option<String>,

    /// Country code of the center.
    #[serde(default)]
    pub country_code: Option<String>,

    /// Destination mission code.
    #[serde(default)]
    pub mission_code: Option<String>,

    /// Appointment category, e.g. "Normal" or "Premium".
    #[serde(default)]
    pub category: Option<String>,

    /// Visa type description.
    #[serde(default)]
    pub visa_type: Option<String>,

    /// Last date the booking site reported as available.
    #[serde(default)]
    pub last_available_date: Option<String>,

    /// How many times the checker has seen this observation.
    #[serde(default)]
    pub check_count: u64,

    /// When the checker last confirmed this observation.
    pub last_checked_at: DateTime<Utc>,
}

/// Slot status as reported by the booking site.
///
/// The site occasionally reports states outside the known set; those
/// pass through literally as `Other` so the announcement still shows
/// what was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlotStatus {
    Open,
    Closed,
    Other(String),
}

impl SlotStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for SlotStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::Other(raw),
        }
    }
}

impl From<SlotStatus> for String {
    fn from(status: SlotStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
