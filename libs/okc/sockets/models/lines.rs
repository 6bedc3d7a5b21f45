//! Payloads of the line socket events.
//!
//! `rawData` itself is deliberately not modeled — it is a large,
//! line-specific reporting structure that updates every second and belongs
//! to the schema layer; the socket hands it over as plain JSON.

use serde::{Deserialize, Serialize};

/// `authRoles` event: the authorized user's roles and permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthRoles {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// A priority incident carried by `rawIncidents`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(rename = "incId", default)]
    pub inc_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Aggregate incident counters carried by `rawIncidents` for new/old
/// buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentStat {
    #[serde(rename = "minutesSinceChange", default)]
    pub minutes_since_change: i64,
    #[serde(default)]
    pub mobile: u32,
    #[serde(default)]
    pub office: u32,
    #[serde(default)]
    pub other: u32,
}

/// `rawIncidents` event: priority incidents in full, new/old as statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIncidents {
    #[serde(default)]
    pub priority: Vec<Incident>,
    #[serde(default)]
    pub new: Vec<IncidentStat>,
    #[serde(default)]
    pub old: Vec<IncidentStat>,
}

impl RawIncidents {
    /// Total incident entries across all buckets.
    pub fn total(&self) -> usize {
        self.priority.len() + self.new.len() + self.old.len()
    }
}
