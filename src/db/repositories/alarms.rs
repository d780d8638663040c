use crate::db::models::alarm_models::{AlarmStatus, EmergencyAlarm};
use crate::db::repositories::{AlarmFilter, AlarmStore};
use crate::error::Error;
use crate::security::policy::OwnerScope;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const ALARM_SELECT: &str = r#"
    SELECT e.id, e.officer_id,
           COALESCE(NULLIF(TRIM(CONCAT(u.first_name, ' ', u.last_name)), ''), u.email) AS officer_name,
           u.email AS officer_email,
           e.timestamp, e.category, e.description, e.latitude, e.longitude,
           e.status, e.resolved_at, e.resolved_by
    FROM emergency_alarms e
    JOIN accounts u ON u.id = e.officer_id
"#;

/// Emergency alarms repository
#[derive(Clone)]
pub struct AlarmsRepository {
    pool: Arc<PgPool>,
}

impl AlarmsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlarmStore for AlarmsRepository {
    async fn insert(&self, alarm: &EmergencyAlarm) -> Result<EmergencyAlarm> {
        sqlx::query(
            r#"
            INSERT INTO emergency_alarms (
                id, officer_id, timestamp, category, description, latitude, longitude,
                status, resolved_at, resolved_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(alarm.id)
        .bind(alarm.officer_id)
        .bind(alarm.timestamp)
        .bind(alarm.category)
        .bind(&alarm.description)
        .bind(&alarm.latitude)
        .bind(&alarm.longitude)
        .bind(alarm.status)
        .bind(alarm.resolved_at)
        .bind(alarm.resolved_by)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to create emergency alarm: {}", e)))?;

        self.get_by_id(&alarm.id)
            .await?
            .ok_or_else(|| Error::Database("Inserted emergency alarm vanished".to_string()).into())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<EmergencyAlarm>> {
        let sql = format!("{} WHERE e.id = $1", ALARM_SELECT);
        let result = sqlx::query_as::<_, EmergencyAlarm>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get emergency alarm: {}", e)))?;

        Ok(result)
    }

    async fn list(&self, filter: &AlarmFilter) -> Result<Vec<EmergencyAlarm>> {
        let owner = match filter.scope {
            OwnerScope::Nothing => return Ok(Vec::new()),
            OwnerScope::All => None,
            OwnerScope::Owner(id) => Some(id),
        };
        let (start, end) = filter.period.unzip();

        let sql = format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR e.officer_id = $1)
              AND ($2::timestamptz IS NULL OR e.timestamp >= $2)
              AND ($3::timestamptz IS NULL OR e.timestamp < $3)
              AND ($4::text IS NULL OR e.status = $4)
            ORDER BY e.timestamp DESC
            LIMIT $5 OFFSET $6
            "#,
            ALARM_SELECT
        );

        let result = sqlx::query_as::<_, EmergencyAlarm>(&sql)
            .bind(owner)
            .bind(start)
            .bind(end)
            .bind(filter.status)
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list emergency alarms: {}", e)))?;

        Ok(result)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: AlarmStatus,
        resolved_at: Option<DateTime<Utc>>,
        resolved_by: Option<Uuid>,
    ) -> Result<Option<EmergencyAlarm>> {
        let updated = sqlx::query(
            r#"
            UPDATE emergency_alarms
            SET status = $1, resolved_at = $2, resolved_by = $3
            WHERE id = $4
            "#,
        )
        .bind(status)
        .bind(resolved_at)
        .bind(resolved_by)
        .bind(id)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to update emergency alarm: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }
}
