//! Shared fixtures for unit tests.

use crate::config::SecurityConfig;
use crate::db::models::account_models::{Account, Role};
use crate::db::models::alarm_models::NewAlarm;
use crate::db::models::attendance_models::NewAttendance;
use crate::db::models::report_models::NewReport;
use crate::db::repositories::{AccountStore, Stores};
use crate::security::auth::AuthService;
use crate::security::password;
use crate::security::policy::Actor;
use crate::services::calendar::{Calendar, Clock};
use crate::services::{AlarmService, AttendanceService, CoverageService, ReportService};
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

fn parse_instant(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid RFC 3339 instant")
        .with_timezone(&Utc)
}

impl FixedClock {
    pub fn at(rfc3339: &str) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(parse_instant(rfc3339)),
        })
    }

    pub fn set(&self, rfc3339: &str) {
        *self.now.lock().unwrap() = parse_instant(rfc3339);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn security_config() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: "test-secret".to_string(),
        password_hash_cost: 4,
        ..SecurityConfig::default()
    }
}

/// UTC+7 calendar over a controllable clock
pub fn calendar(clock: Arc<FixedClock>) -> Calendar {
    Calendar::new(FixedOffset::east_opt(7 * 3600).unwrap(), clock)
}

pub fn attendance_payload() -> NewAttendance {
    NewAttendance {
        latitude: "-6.200000".to_string(),
        longitude: "106.816666".to_string(),
        location_note: Some("Main gate".to_string()),
        note: None,
        selfie_photo: Some("attendance_photos/selfie.jpg".to_string()),
    }
}

pub fn report_payload() -> NewReport {
    NewReport {
        latitude: "-6.2".to_string(),
        longitude: "106.8".to_string(),
        location_note: Some("Parking lot".to_string()),
        detail: Some("Broken fence on the north side".to_string()),
        photo: Some("report_photos/fence.jpg".to_string()),
        status: None,
        priority: None,
    }
}

pub fn alarm_payload(category: &str) -> NewAlarm {
    NewAlarm {
        category: category.to_string(),
        description: None,
        latitude: "-6.21".to_string(),
        longitude: "106.82".to_string(),
    }
}

/// In-memory stores seeded with one account per role plus a second officer.
///
/// The clock starts at 2024-05-01 08:00 local time (UTC+7).
pub struct Fixture {
    pub stores: Stores,
    pub clock: Arc<FixedClock>,
    pub calendar: Calendar,
    pub auth: AuthService,
    pub admin: Actor,
    pub officer: Actor,
    pub other_officer: Actor,
    pub unassigned: Actor,
}

impl Fixture {
    pub const PASSWORD: &'static str = "rahasia123";

    pub async fn new() -> Self {
        let stores = Stores::memory();
        let clock = FixedClock::at("2024-05-01T01:00:00Z");
        let calendar = calendar(clock.clone());
        let config = security_config();
        let auth = AuthService::new(stores.accounts.clone(), &config);

        let hash = password::hash_password(Self::PASSWORD, &config).unwrap();
        let seed = |email: &str, first: &str, role: Role| {
            let mut account = Account::new(email, hash.clone(), role);
            account.first_name = first.to_string();
            account
        };
        let accounts = [
            seed("admin@patrol.id", "Admin", Role::Admin),
            seed("budi@patrol.id", "Budi", Role::Officer),
            seed("sari@patrol.id", "Sari", Role::Officer),
            seed("tamu@patrol.id", "Tamu", Role::Unassigned),
        ];
        for account in &accounts {
            stores.accounts.create(account).await.unwrap();
        }
        let [admin, officer, other_officer, unassigned] = accounts.map(|a| Actor::from(&a));

        Self {
            stores,
            clock,
            calendar,
            auth,
            admin,
            officer,
            other_officer,
            unassigned,
        }
    }

    pub fn attendance(&self) -> AttendanceService {
        AttendanceService::new(self.stores.attendance.clone(), self.calendar.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.stores.reports.clone(), self.calendar.clone())
    }

    pub fn alarms(&self) -> AlarmService {
        AlarmService::new(self.stores.alarms.clone(), self.calendar.clone())
    }

    pub fn coverage(&self) -> CoverageService {
        CoverageService::new(&self.stores, self.calendar.clone())
    }
}
