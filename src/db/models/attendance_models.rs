use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Admin judgment on a check-in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Default on submission
    Present,
    /// Check-in cancelled by an admin
    Absent,
    /// Location judged invalid
    OutOfArea,
}

text_enum!(ValidationStatus {
    Present => "present" | "hadir",
    Absent => "absent" | "tidak_hadir",
    OutOfArea => "out_of_area" | "diluar_lokasi",
});

impl Default for ValidationStatus {
    fn default() -> Self {
        ValidationStatus::Present
    }
}

/// One officer's daily check-in
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub officer_id: Uuid,
    pub officer_name: String,
    pub officer_email: String,
    pub timestamp: DateTime<Utc>,
    /// Calendar day of `timestamp` in the configured offset
    pub local_date: NaiveDate,
    pub latitude: BigDecimal,
    pub longitude: BigDecimal,
    pub location_note: String,
    pub note: String,
    pub selfie_photo: String,
    pub status: ValidationStatus,
}

/// Check-in payload as received from an officer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAttendance {
    #[serde(deserialize_with = "super::text_or_number")]
    pub latitude: String,
    #[serde(deserialize_with = "super::text_or_number")]
    pub longitude: String,
    #[serde(default)]
    pub location_note: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Media reference of the stored selfie
    #[serde(default)]
    pub selfie_photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStatusUpdate {
    pub status: String,
}
