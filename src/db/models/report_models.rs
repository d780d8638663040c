use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incident report handling status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Filed,
    InProgress,
    Resolved,
}

text_enum!(ReportStatus {
    Filed => "filed" | "lapor",
    InProgress => "in_progress" | "ditanggapi",
    Resolved => "resolved" | "selesai",
});

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Filed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

text_enum!(Priority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Incident report filed by an officer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct IncidentReport {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reporter_name: String,
    pub reporter_email: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: BigDecimal,
    pub longitude: BigDecimal,
    pub location_note: String,
    pub detail: String,
    pub photo: String,
    pub status: ReportStatus,
    pub priority: Priority,
}

/// Report payload as received from an officer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReport {
    #[serde(deserialize_with = "super::text_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "super::text_or_number")]
    pub longitude: String,
    #[serde(default)]
    pub location_note: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    /// Accepted from clients but never applied on create
    #[serde(default)]
    pub status: Option<String>,
    /// Accepted from clients but never applied on create
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportReview {
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
}
