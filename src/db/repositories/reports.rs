use crate::db::models::report_models::{IncidentReport, Priority, ReportStatus};
use crate::db::repositories::{ReportFilter, ReportStore};
use crate::error::Error;
use crate::security::policy::OwnerScope;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const REPORT_SELECT: &str = r#"
    SELECT r.id, r.reporter_id,
           COALESCE(NULLIF(TRIM(CONCAT(u.first_name, ' ', u.last_name)), ''), u.email) AS reporter_name,
           u.email AS reporter_email,
           r.timestamp, r.latitude, r.longitude, r.location_note, r.detail, r.photo,
           r.status, r.priority
    FROM incident_reports r
    JOIN accounts u ON u.id = r.reporter_id
"#;

/// Incident reports repository
#[derive(Clone)]
pub struct ReportsRepository {
    pool: Arc<PgPool>,
}

impl ReportsRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for ReportsRepository {
    async fn insert(&self, report: &IncidentReport) -> Result<IncidentReport> {
        sqlx::query(
            r#"
            INSERT INTO incident_reports (
                id, reporter_id, timestamp, latitude, longitude, location_note,
                detail, photo, status, priority
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(report.id)
        .bind(report.reporter_id)
        .bind(report.timestamp)
        .bind(&report.latitude)
        .bind(&report.longitude)
        .bind(&report.location_note)
        .bind(&report.detail)
        .bind(&report.photo)
        .bind(report.status)
        .bind(report.priority)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to create incident report: {}", e)))?;

        self.get_by_id(&report.id)
            .await?
            .ok_or_else(|| Error::Database("Inserted incident report vanished".to_string()).into())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<IncidentReport>> {
        let sql = format!("{} WHERE r.id = $1", REPORT_SELECT);
        let result = sqlx::query_as::<_, IncidentReport>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get incident report: {}", e)))?;

        Ok(result)
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<IncidentReport>> {
        let owner = match filter.scope {
            OwnerScope::Nothing => return Ok(Vec::new()),
            OwnerScope::All => None,
            OwnerScope::Owner(id) => Some(id),
        };
        let (start, end) = filter.period.unzip();

        let sql = format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR r.reporter_id = $1)
              AND ($2::timestamptz IS NULL OR r.timestamp >= $2)
              AND ($3::timestamptz IS NULL OR r.timestamp < $3)
              AND ($4::text IS NULL OR r.status = $4)
            ORDER BY r.timestamp DESC
            LIMIT $5 OFFSET $6
            "#,
            REPORT_SELECT
        );

        let result = sqlx::query_as::<_, IncidentReport>(&sql)
            .bind(owner)
            .bind(start)
            .bind(end)
            .bind(filter.status)
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to list incident reports: {}", e)))?;

        Ok(result)
    }

    async fn update_review(
        &self,
        id: &Uuid,
        status: ReportStatus,
        priority: Priority,
    ) -> Result<Option<IncidentReport>> {
        let updated = sqlx::query("UPDATE incident_reports SET status = $1, priority = $2 WHERE id = $3")
            .bind(status)
            .bind(priority)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to update incident report: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM incident_reports WHERE timestamp >= $1 AND timestamp < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to count incident reports: {}", e)))?;

        Ok(count)
    }
}
