//! Process-local store used by the `memory` backend and by tests.
//!
//! Mirrors the Postgres repositories: names are joined from the accounts
//! table at read time, and the one-attendance-per-day check and insert run
//! under a single write lock.

use crate::db::models::account_models::{Account, Role};
use crate::db::models::alarm_models::{AlarmStatus, EmergencyAlarm};
use crate::db::models::attendance_models::{AttendanceRecord, ValidationStatus};
use crate::db::models::report_models::{IncidentReport, Priority, ReportStatus};
use crate::db::repositories::{
    AccountStore, AlarmFilter, AlarmStore, AttendanceFilter, AttendanceStore, ReportFilter,
    ReportStore,
};
use crate::error::Error;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    attendance: Vec<AttendanceRecord>,
    reports: Vec<IncidentReport>,
    alarms: Vec<EmergencyAlarm>,
}

impl State {
    fn owner(&self, id: &Uuid) -> Result<&Account> {
        self.accounts
            .get(id)
            .ok_or_else(|| Error::Database(format!("Unknown account {}", id)).into())
    }

    fn label(&self, id: &Uuid) -> (String, String) {
        self.accounts
            .get(id)
            .map(|account| (account.full_name(), account.email.clone()))
            .unwrap_or_default()
    }

    fn attendance_view(&self, record: &AttendanceRecord) -> AttendanceRecord {
        let (officer_name, officer_email) = self.label(&record.officer_id);
        AttendanceRecord {
            officer_name,
            officer_email,
            ..record.clone()
        }
    }

    fn report_view(&self, report: &IncidentReport) -> IncidentReport {
        let (reporter_name, reporter_email) = self.label(&report.reporter_id);
        IncidentReport {
            reporter_name,
            reporter_email,
            ..report.clone()
        }
    }

    fn alarm_view(&self, alarm: &EmergencyAlarm) -> EmergencyAlarm {
        let (officer_name, officer_email) = self.label(&alarm.officer_id);
        EmergencyAlarm {
            officer_name,
            officer_email,
            ..alarm.clone()
        }
    }
}

fn within(period: &Option<(DateTime<Utc>, DateTime<Utc>)>, timestamp: &DateTime<Utc>) -> bool {
    period.map_or(true, |(start, end)| *timestamp >= start && *timestamp < end)
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create(&self, account: &Account) -> Result<Account> {
        let mut state = self.state.write().await;
        if state.accounts.values().any(|existing| existing.email == account.email) {
            return Err(Error::AlreadyExists("Email already registered".to_string()).into());
        }
        state.accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Account>> {
        Ok(self.state.read().await.accounts.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|account| account.email == email).cloned())
    }

    async fn update(&self, account: &Account) -> Result<Account> {
        let mut state = self.state.write().await;
        let stored = state
            .accounts
            .get_mut(&account.id)
            .ok_or_else(|| Error::NotFound("Account not found".to_string()))?;

        stored.first_name = account.first_name.clone();
        stored.last_name = account.last_name.clone();
        stored.phone_number = account.phone_number.clone();
        stored.profile_picture = account.profile_picture.clone();
        stored.password_hash = account.password_hash.clone();
        stored.role = account.role;
        stored.active = account.active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn update_last_login(&self, id: &Uuid) -> Result<()> {
        if let Some(account) = self.state.write().await.accounts.get_mut(id) {
            account.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_by_role(&self, role: Role) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|account| account.role == role)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }

    async fn count_by_role(&self, role: Role) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.accounts.values().filter(|account| account.role == role).count() as i64)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert(&self, record: &AttendanceRecord) -> Result<AttendanceRecord> {
        let mut state = self.state.write().await;
        state.owner(&record.officer_id)?;

        let taken = state.attendance.iter().any(|existing| {
            existing.officer_id == record.officer_id && existing.local_date == record.local_date
        });
        if taken {
            return Err(Error::DuplicateSubmission(
                "Attendance for today has already been submitted".to_string(),
            )
            .into());
        }

        state.attendance.push(record.clone());
        Ok(state.attendance_view(record))
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<AttendanceRecord>> {
        let state = self.state.read().await;
        Ok(state
            .attendance
            .iter()
            .find(|record| record.id == *id)
            .map(|record| state.attendance_view(record)))
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>> {
        let state = self.state.read().await;
        let mut matches: Vec<&AttendanceRecord> = state
            .attendance
            .iter()
            .filter(|record| filter.scope.permits(&record.officer_id))
            .filter(|record| filter.local_date.map_or(true, |date| record.local_date == date))
            .filter(|record| filter.status.map_or(true, |status| record.status == status))
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(filter
            .page
            .apply(matches.into_iter().map(|record| state.attendance_view(record))))
    }

    async fn update_status(&self, id: &Uuid, status: ValidationStatus) -> Result<Option<AttendanceRecord>> {
        let mut state = self.state.write().await;
        let updated = match state.attendance.iter_mut().find(|record| record.id == *id) {
            Some(record) => {
                record.status = status;
                record.clone()
            }
            None => return Ok(None),
        };
        Ok(Some(state.attendance_view(&updated)))
    }

    async fn count_officers_on(&self, date: NaiveDate, status: Option<ValidationStatus>) -> Result<i64> {
        let state = self.state.read().await;
        let officers: HashSet<Uuid> = state
            .attendance
            .iter()
            .filter(|record| record.local_date == date)
            .filter(|record| status.map_or(true, |status| record.status == status))
            .filter(|record| {
                state
                    .accounts
                    .get(&record.officer_id)
                    .map_or(false, |account| account.role == Role::Officer)
            })
            .map(|record| record.officer_id)
            .collect();
        Ok(officers.len() as i64)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert(&self, report: &IncidentReport) -> Result<IncidentReport> {
        let mut state = self.state.write().await;
        state.owner(&report.reporter_id)?;
        state.reports.push(report.clone());
        Ok(state.report_view(report))
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<IncidentReport>> {
        let state = self.state.read().await;
        Ok(state
            .reports
            .iter()
            .find(|report| report.id == *id)
            .map(|report| state.report_view(report)))
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<IncidentReport>> {
        let state = self.state.read().await;
        let mut matches: Vec<&IncidentReport> = state
            .reports
            .iter()
            .filter(|report| filter.scope.permits(&report.reporter_id))
            .filter(|report| within(&filter.period, &report.timestamp))
            .filter(|report| filter.status.map_or(true, |status| report.status == status))
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(filter
            .page
            .apply(matches.into_iter().map(|report| state.report_view(report))))
    }

    async fn update_review(
        &self,
        id: &Uuid,
        status: ReportStatus,
        priority: Priority,
    ) -> Result<Option<IncidentReport>> {
        let mut state = self.state.write().await;
        let updated = match state.reports.iter_mut().find(|report| report.id == *id) {
            Some(report) => {
                report.status = status;
                report.priority = priority;
                report.clone()
            }
            None => return Ok(None),
        };
        Ok(Some(state.report_view(&updated)))
    }

    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let state = self.state.read().await;
        let period = Some((start, end));
        Ok(state
            .reports
            .iter()
            .filter(|report| within(&period, &report.timestamp))
            .count() as i64)
    }
}

#[async_trait]
impl AlarmStore for MemoryStore {
    async fn insert(&self, alarm: &EmergencyAlarm) -> Result<EmergencyAlarm> {
        let mut state = self.state.write().await;
        state.owner(&alarm.officer_id)?;
        state.alarms.push(alarm.clone());
        Ok(state.alarm_view(alarm))
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<EmergencyAlarm>> {
        let state = self.state.read().await;
        Ok(state
            .alarms
            .iter()
            .find(|alarm| alarm.id == *id)
            .map(|alarm| state.alarm_view(alarm)))
    }

    async fn list(&self, filter: &AlarmFilter) -> Result<Vec<EmergencyAlarm>> {
        let state = self.state.read().await;
        let mut matches: Vec<&EmergencyAlarm> = state
            .alarms
            .iter()
            .filter(|alarm| filter.scope.permits(&alarm.officer_id))
            .filter(|alarm| within(&filter.period, &alarm.timestamp))
            .filter(|alarm| filter.status.map_or(true, |status| alarm.status == status))
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(filter
            .page
            .apply(matches.into_iter().map(|alarm| state.alarm_view(alarm))))
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: AlarmStatus,
        resolved_at: Option<DateTime<Utc>>,
        resolved_by: Option<Uuid>,
    ) -> Result<Option<EmergencyAlarm>> {
        let mut state = self.state.write().await;
        let updated = match state.alarms.iter_mut().find(|alarm| alarm.id == *id) {
            Some(alarm) => {
                alarm.status = status;
                alarm.resolved_at = resolved_at;
                alarm.resolved_by = resolved_by;
                alarm.clone()
            }
            None => return Ok(None),
        };
        Ok(Some(state.alarm_view(&updated)))
    }
}
