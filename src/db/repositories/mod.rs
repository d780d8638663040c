use crate::db::models::account_models::{Account, Role};
use crate::db::models::alarm_models::{AlarmStatus, EmergencyAlarm};
use crate::db::models::attendance_models::{AttendanceRecord, ValidationStatus};
use crate::db::models::report_models::{IncidentReport, Priority, ReportStatus};
use crate::security::policy::OwnerScope;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub mod accounts;
pub mod alarms;
pub mod attendance;
pub mod memory;
pub mod reports;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Limit/offset window; `limit = None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    pub fn unbounded() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    pub fn first(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    /// Clamp client-supplied paging parameters
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: Some(limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Apply the window to an already ordered iterator
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let items = items.skip(self.offset as usize);
        match self.limit {
            Some(limit) => items.take(limit as usize).collect(),
            None => items.collect(),
        }
    }
}

/// Raw list parameters from a query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub date: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AttendanceFilter {
    pub scope: OwnerScope,
    pub local_date: Option<NaiveDate>,
    pub status: Option<ValidationStatus>,
    pub page: Page,
}

#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub scope: OwnerScope,
    /// UTC half-open range `[start, end)`
    pub period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub status: Option<ReportStatus>,
    pub page: Page,
}

#[derive(Debug, Clone)]
pub struct AlarmFilter {
    pub scope: OwnerScope,
    pub period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub status: Option<AlarmStatus>,
    pub page: Page,
}

/// Account persistence
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert; an existing email fails with `AlreadyExists`
    async fn create(&self, account: &Account) -> Result<Account>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Account>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn update(&self, account: &Account) -> Result<Account>;
    async fn update_last_login(&self, id: &Uuid) -> Result<()>;
    /// Accounts holding `role`, ordered by email
    async fn get_by_role(&self, role: Role) -> Result<Vec<Account>>;
    async fn count_by_role(&self, role: Role) -> Result<i64>;
}

/// Attendance persistence
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Insert; a second record for the same officer and local date fails with
    /// `DuplicateSubmission` and leaves the store unchanged
    async fn insert(&self, record: &AttendanceRecord) -> Result<AttendanceRecord>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<AttendanceRecord>>;
    /// Newest first
    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>>;
    async fn update_status(&self, id: &Uuid, status: ValidationStatus) -> Result<Option<AttendanceRecord>>;
    /// Distinct officer-role accounts with a record on `date`, optionally
    /// restricted to one validation status
    async fn count_officers_on(&self, date: NaiveDate, status: Option<ValidationStatus>) -> Result<i64>;
}

/// Incident report persistence
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: &IncidentReport) -> Result<IncidentReport>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<IncidentReport>>;
    /// Newest first
    async fn list(&self, filter: &ReportFilter) -> Result<Vec<IncidentReport>>;
    async fn update_review(
        &self,
        id: &Uuid,
        status: ReportStatus,
        priority: Priority,
    ) -> Result<Option<IncidentReport>>;
    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64>;
}

/// Emergency alarm persistence
#[async_trait]
pub trait AlarmStore: Send + Sync {
    async fn insert(&self, alarm: &EmergencyAlarm) -> Result<EmergencyAlarm>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<EmergencyAlarm>>;
    /// Newest first
    async fn list(&self, filter: &AlarmFilter) -> Result<Vec<EmergencyAlarm>>;
    /// Status and resolution fields are written in one statement
    async fn update_status(
        &self,
        id: &Uuid,
        status: AlarmStatus,
        resolved_at: Option<DateTime<Utc>>,
        resolved_by: Option<Uuid>,
    ) -> Result<Option<EmergencyAlarm>>;
}

/// The full set of stores the services run against
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub reports: Arc<dyn ReportStore>,
    pub alarms: Arc<dyn AlarmStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            accounts: Arc::new(accounts::AccountsRepository::new(pool.clone())),
            attendance: Arc::new(attendance::AttendanceRepository::new(pool.clone())),
            reports: Arc::new(reports::ReportsRepository::new(pool.clone())),
            alarms: Arc::new(alarms::AlarmsRepository::new(pool)),
        }
    }

    /// Process-local stores
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            accounts: store.clone(),
            attendance: store.clone(),
            reports: store.clone(),
            alarms: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_are_clamped() {
        assert_eq!(Page::from_params(None, None), Page::first(DEFAULT_PAGE_SIZE));
        assert_eq!(Page::from_params(Some(10_000), Some(-3)), Page::first(MAX_PAGE_SIZE));
        assert_eq!(Page::from_params(Some(0), Some(4)).limit, Some(1));
    }

    #[test]
    fn page_applies_offset_then_limit() {
        let page = Page {
            limit: Some(2),
            offset: 1,
        };
        assert_eq!(page.apply(1..=5), vec![2, 3]);
        assert_eq!(Page::unbounded().apply(1..=3), vec![1, 2, 3]);
    }
}
