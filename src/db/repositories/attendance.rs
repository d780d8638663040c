use crate::db::models::attendance_models::{AttendanceRecord, ValidationStatus};
use crate::db::repositories::{AttendanceFilter, AttendanceStore};
use crate::error::Error;
use crate::security::policy::OwnerScope;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const ATTENDANCE_SELECT: &str = r#"
    SELECT a.id, a.officer_id,
           COALESCE(NULLIF(TRIM(CONCAT(u.first_name, ' ', u.last_name)), ''), u.email) AS officer_name,
           u.email AS officer_email,
           a.timestamp, a.local_date, a.latitude, a.longitude,
           a.location_note, a.note, a.selfie_photo, a.status
    FROM attendance_records a
    JOIN accounts u ON u.id = a.officer_id
"#;

/// Attendance repository
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: Arc<PgPool>,
}

impl AttendanceRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for AttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> Result<AttendanceRecord> {
        sqlx::query(
            r#"
            INSERT INTO attendance_records (
                id, officer_id, timestamp, local_date, latitude, longitude,
                location_note, note, selfie_photo, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id)
        .bind(record.officer_id)
        .bind(record.timestamp)
        .bind(record.local_date)
        .bind(&record.latitude)
        .bind(&record.longitude)
        .bind(&record.location_note)
        .bind(&record.note)
        .bind(&record.selfie_photo)
        .bind(record.status)
        .execute(&*self.pool)
        .await
        .map_err(|e| match &e {
            // attendance_one_per_day
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateSubmission(
                "Attendance for today has already been submitted".to_string(),
            ),
            _ => Error::Database(format!("Failed to create attendance record: {}", e)),
        })?;

        self.get_by_id(&record.id)
            .await?
            .ok_or_else(|| Error::Database("Inserted attendance record vanished".to_string()).into())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<AttendanceRecord>> {
        let sql = format!("{} WHERE a.id = $1", ATTENDANCE_SELECT);
        let result = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get attendance record: {}", e)))?;

        Ok(result)
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        let owner = match filter.scope {
            OwnerScope::Nothing => return Ok(Vec::new()),
            OwnerScope::All => None,
            OwnerScope::Owner(id) => Some(id),
        };

        let sql = format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR a.officer_id = $1)
              AND ($2::date IS NULL OR a.local_date = $2)
              AND ($3::text IS NULL OR a.status = $3)
            ORDER BY a.timestamp DESC
            LIMIT $4 OFFSET $5
            "#,
            ATTENDANCE_SELECT
        );

        debug!("Listing attendance with {:?}", filter);

        let result = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(owner)
            .bind(filter.local_date)
            .bind(filter.status)
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list attendance records: {}", e)))?;

        Ok(result)
    }

    async fn update_status(&self, id: &Uuid, status: ValidationStatus) -> Result<Option<AttendanceRecord>> {
        let updated = sqlx::query("UPDATE attendance_records SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to update attendance status: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn count_officers_on(&self, date: NaiveDate, status: Option<ValidationStatus>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT a.officer_id)
            FROM attendance_records a
            JOIN accounts u ON u.id = a.officer_id
            WHERE a.local_date = $1
              AND u.role = 'officer'
              AND ($2::text IS NULL OR a.status = $2)
            "#,
        )
        .bind(date)
        .bind(status)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to count attendance: {}", e)))?;

        Ok(count)
    }
}
