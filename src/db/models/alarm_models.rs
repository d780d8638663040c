use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlarmCategory {
    Theft,
    Fire,
    NaturalDisaster,
    Disturbance,
    MedicalEmergency,
    /// Requires a description
    Other,
}

text_enum!(AlarmCategory {
    Theft => "theft" | "maling",
    Fire => "fire" | "kebakaran",
    NaturalDisaster => "natural_disaster" | "bencana",
    Disturbance => "disturbance" | "keributan",
    MedicalEmergency => "medical_emergency" | "medis",
    Other => "other" | "lainnya",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlarmStatus {
    Active,
    Handled,
    FalseAlarm,
}

text_enum!(AlarmStatus {
    Active => "active",
    Handled => "handled",
    FalseAlarm => "false_alarm",
});

impl Default for AlarmStatus {
    fn default() -> Self {
        AlarmStatus::Active
    }
}

/// Emergency alarm raised by an officer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct EmergencyAlarm {
    pub id: Uuid,
    pub officer_id: Uuid,
    pub officer_name: String,
    pub officer_email: String,
    pub timestamp: DateTime<Utc>,
    pub category: AlarmCategory,
    pub description: Option<String>,
    pub latitude: BigDecimal,
    pub longitude: BigDecimal,
    pub status: AlarmStatus,
    /// Set together with `resolved_by` whenever status leaves `Active`
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
}

/// Alarm payload as received from an officer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAlarm {
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "super::text_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "super::text_or_number")]
    pub longitude: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmStatusUpdate {
    pub status: String,
}
