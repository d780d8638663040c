//! Daily aggregates for the admin dashboard.
//!
//! Two distinct "present" metrics live here. Coverage counts officers with
//! any attendance record on the date; the dashboard's `present_today` counts
//! only records still validated as `Present`.

use crate::db::models::account_models::{Account, Role};
use crate::db::models::attendance_models::{AttendanceRecord, ValidationStatus};
use crate::db::models::report_models::{IncidentReport, ReportStatus};
use crate::db::repositories::{
    AccountStore, AttendanceFilter, AttendanceStore, Page, ReportFilter, ReportStore, Stores,
};
use crate::security::policy::{self, Action, Actor, OwnerScope, RecordKind};
use crate::services::calendar::Calendar;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const DASHBOARD_LIST_SIZE: i64 = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OfficerCoverage {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub has_attendance_on_date: bool,
    /// Newest record on the date, whatever its validation status
    pub last_attendance: Option<AttendanceRecord>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyCoverage {
    pub report_date: NaiveDate,
    pub total_officers: i64,
    pub present: i64,
    pub absent: i64,
    pub officers: Vec<OfficerCoverage>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub report_date: NaiveDate,
    pub total_officers: i64,
    pub present_today: i64,
    pub absent_today: i64,
    pub new_reports_today: i64,
    pub recent_attendance: Vec<AttendanceRecord>,
    pub open_reports: Vec<IncidentReport>,
}

#[derive(Clone)]
pub struct CoverageService {
    accounts: Arc<dyn AccountStore>,
    attendance: Arc<dyn AttendanceStore>,
    reports: Arc<dyn ReportStore>,
    calendar: Calendar,
}

impl CoverageService {
    pub fn new(stores: &Stores, calendar: Calendar) -> Self {
        Self {
            accounts: stores.accounts.clone(),
            attendance: stores.attendance.clone(),
            reports: stores.reports.clone(),
            calendar,
        }
    }

    /// Admin view of which officers checked in on `target_date`
    /// (`YYYY-MM-DD`, default today)
    pub async fn daily_coverage(&self, actor: &Actor, target_date: Option<&str>) -> Result<DailyCoverage> {
        policy::require(actor, Action::ViewAggregates, RecordKind::Attendance, None)?;
        let date = self.calendar.resolve_date(target_date)?;

        self.compute_daily_coverage(date).await
    }

    pub async fn compute_daily_coverage(&self, date: NaiveDate) -> Result<DailyCoverage> {
        let officers = self.accounts.get_by_role(Role::Officer).await?;
        let records = self
            .attendance
            .list(&AttendanceFilter {
                scope: OwnerScope::All,
                local_date: Some(date),
                status: None,
                page: Page::unbounded(),
            })
            .await?;

        let latest = latest_attendance(&records);
        let officers: Vec<OfficerCoverage> = officers
            .iter()
            .map(|officer| coverage_row(officer, latest.get(&officer.id).copied()))
            .collect();

        let total_officers = officers.len() as i64;
        let present = officers.iter().filter(|o| o.has_attendance_on_date).count() as i64;

        debug!("Coverage for {}: {}/{}", date, present, total_officers);

        Ok(DailyCoverage {
            report_date: date,
            total_officers,
            present,
            absent: total_officers - present,
            officers,
        })
    }

    /// Today's headline numbers plus the latest activity
    pub async fn dashboard_summary(&self, actor: &Actor) -> Result<DashboardSummary> {
        policy::require(actor, Action::ViewAggregates, RecordKind::Attendance, None)?;

        let today = self.calendar.today();
        let (start, end) = self.calendar.day_bounds(today);

        let total_officers = self.accounts.count_by_role(Role::Officer).await?;
        let present_today = self
            .attendance
            .count_officers_on(today, Some(ValidationStatus::Present))
            .await?;
        let new_reports_today = self.reports.count_between(start, end).await?;

        let recent_attendance = self
            .attendance
            .list(&AttendanceFilter {
                scope: OwnerScope::All,
                local_date: None,
                status: None,
                page: Page::first(DASHBOARD_LIST_SIZE),
            })
            .await?;
        let open_reports = self
            .reports
            .list(&ReportFilter {
                scope: OwnerScope::All,
                period: None,
                status: Some(ReportStatus::Filed),
                page: Page::first(DASHBOARD_LIST_SIZE),
            })
            .await?;

        Ok(DashboardSummary {
            report_date: today,
            total_officers,
            present_today,
            absent_today: total_officers - present_today,
            new_reports_today,
            recent_attendance,
            open_reports,
        })
    }
}

fn latest_attendance(records: &[AttendanceRecord]) -> HashMap<Uuid, &AttendanceRecord> {
    let mut latest: HashMap<Uuid, &AttendanceRecord> = HashMap::new();
    for record in records {
        latest
            .entry(record.officer_id)
            .and_modify(|seen| {
                if record.timestamp > seen.timestamp {
                    *seen = record;
                }
            })
            .or_insert(record);
    }
    latest
}

fn coverage_row(officer: &Account, last_attendance: Option<&AttendanceRecord>) -> OfficerCoverage {
    OfficerCoverage {
        id: officer.id,
        first_name: officer.first_name.clone(),
        last_name: officer.last_name.clone(),
        full_name: officer.full_name(),
        email: officer.email.clone(),
        phone_number: officer.phone_number.clone(),
        has_attendance_on_date: last_attendance.is_some(),
        last_attendance: last_attendance.cloned(),
    }
}
