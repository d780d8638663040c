use crate::db::models::attendance_models::{AttendanceRecord, NewAttendance, ValidationStatus};
use crate::db::models::{bounded_text, parse_choice, parse_coordinates};
use crate::db::repositories::{AttendanceFilter, AttendanceStore, ListParams, Page};
use crate::error::{domain_error, Error};
use crate::security::policy::{self, Action, Actor, RecordKind};
use crate::services::calendar::Calendar;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const LOCATION_NOTE_MAX_CHARS: usize = 255;

/// Daily check-ins: one per officer per local calendar day
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    calendar: Calendar,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn AttendanceStore>, calendar: Calendar) -> Self {
        Self { store, calendar }
    }

    /// Record today's attendance for the calling officer.
    ///
    /// Timestamp and local date come from the server clock; a second
    /// submission on the same local date fails with `DuplicateSubmission`.
    pub async fn submit(&self, actor: &Actor, payload: &NewAttendance) -> Result<AttendanceRecord> {
        policy::require(actor, Action::Create, RecordKind::Attendance, Some(actor.id))?;

        let (latitude, longitude) = parse_coordinates(&payload.latitude, &payload.longitude)?;
        let location_note = bounded_text(
            "location_note",
            payload.location_note.as_deref(),
            LOCATION_NOTE_MAX_CHARS,
        )?;
        let selfie_photo = payload
            .selfie_photo
            .as_deref()
            .map(str::trim)
            .filter(|photo| !photo.is_empty())
            .ok_or_else(|| Error::invalid("selfie_photo", "A selfie photo is required"))?;

        let now = self.calendar.now();
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            officer_id: actor.id,
            officer_name: actor.name.clone(),
            officer_email: actor.email.clone(),
            timestamp: now,
            local_date: self.calendar.local_date(now),
            latitude,
            longitude,
            location_note,
            note: payload.note.as_deref().unwrap_or_default().trim().to_string(),
            selfie_photo: selfie_photo.to_string(),
            status: ValidationStatus::Present,
        };

        let stored = self.store.insert(&record).await.map_err(|e| {
            if let Some(Error::DuplicateSubmission(_)) = domain_error(&e) {
                warn!(
                    "Duplicate attendance from {} on {}",
                    actor.email, record.local_date
                );
            }
            e
        })?;

        info!("Attendance recorded for {} on {}", actor.email, stored.local_date);

        Ok(stored)
    }

    /// Records visible to the caller, newest first
    pub async fn list(&self, actor: &Actor, params: &ListParams) -> Result<Vec<AttendanceRecord>> {
        policy::require(actor, Action::List, RecordKind::Attendance, None)?;

        let filter = AttendanceFilter {
            scope: policy::list_scope(actor),
            local_date: self.calendar.filter_date(params.date.as_deref())?,
            status: params
                .status
                .as_deref()
                .map(|raw| parse_choice::<ValidationStatus>("status", raw))
                .transpose()?,
            page: Page::from_params(params.limit, params.offset),
        };

        self.store.list(&filter).await
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<AttendanceRecord> {
        let record = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::Attendance))?;
        policy::require_visible(actor, RecordKind::Attendance, record.officer_id)?;

        Ok(record)
    }

    /// Admin review of the validation status
    pub async fn set_status(&self, actor: &Actor, id: &Uuid, status: &str) -> Result<AttendanceRecord> {
        policy::require(actor, Action::Review, RecordKind::Attendance, None)?;
        let status: ValidationStatus = parse_choice("status", status)?;

        let updated = self
            .store
            .update_status(id, status)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::Attendance))?;

        info!(
            "Attendance {} marked {} by {}",
            updated.id, updated.status, actor.email
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{attendance_payload, Fixture};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn second_submission_same_day_is_rejected() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();

        let first = service.submit(&fx.officer, &attendance_payload()).await?;
        assert_eq!(first.status, ValidationStatus::Present);
        assert_eq!(first.officer_id, fx.officer.id);
        assert_eq!(first.timestamp, fx.calendar.now());

        fx.clock.set("2024-05-01T09:00:00Z");
        let err = service.submit(&fx.officer, &attendance_payload()).await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::DuplicateSubmission(_))));

        let mine = service.list(&fx.officer, &ListParams::default()).await?;
        assert_eq!(mine, vec![first]);
        Ok(())
    }

    #[tokio::test]
    async fn local_midnight_starts_a_new_day() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();

        // 23:59:59 and 00:00:01 in UTC+7
        fx.clock.set("2024-05-01T16:59:59Z");
        let late = service.submit(&fx.officer, &attendance_payload()).await?;
        fx.clock.set("2024-05-01T17:00:01Z");
        let early = service.submit(&fx.officer, &attendance_payload()).await?;

        assert_eq!(late.local_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(early.local_date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        Ok(())
    }

    #[tokio::test]
    async fn only_officers_submit() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();

        for actor in [&fx.admin, &fx.unassigned] {
            let err = service.submit(actor, &attendance_payload()).await.unwrap_err();
            assert!(matches!(domain_error(&err), Some(Error::Forbidden(_))));
        }
        assert!(service.list(&fx.admin, &ListParams::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_payload_names_the_field() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();

        let mut payload = attendance_payload();
        payload.latitude = "91.5".to_string();
        let err = service.submit(&fx.officer, &payload).await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("latitude"));

        let mut payload = attendance_payload();
        payload.selfie_photo = Some("  ".to_string());
        let err = service.submit(&fx.officer, &payload).await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("selfie_photo"));

        let mut payload = attendance_payload();
        payload.location_note = Some("x".repeat(256));
        let err = service.submit(&fx.officer, &payload).await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("location_note"));

        assert!(service.list(&fx.admin, &ListParams::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn listings_are_scoped_to_the_caller() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();

        service.submit(&fx.officer, &attendance_payload()).await?;
        fx.clock.set("2024-05-01T03:00:01Z");
        service.submit(&fx.other_officer, &attendance_payload()).await?;

        let mine = service.list(&fx.officer, &ListParams::default()).await?;
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|record| record.officer_id == fx.officer.id));

        assert!(service.list(&fx.unassigned, &ListParams::default()).await?.is_empty());

        let all = service.list(&fx.admin, &ListParams::default()).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].officer_id, fx.other_officer.id);

        let other_day = ListParams {
            date: Some("2024-04-30".to_string()),
            ..ListParams::default()
        };
        assert!(service.list(&fx.admin, &other_day).await?.is_empty());

        let bad_date = ListParams {
            date: Some("2024-13-40".to_string()),
            ..ListParams::default()
        };
        let err = service.list(&fx.admin, &bad_date).await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("date"));
        Ok(())
    }

    #[tokio::test]
    async fn foreign_records_read_as_missing() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();
        let record = service.submit(&fx.officer, &attendance_payload()).await?;

        let hidden = service.get(&fx.other_officer, &record.id).await.unwrap_err();
        let missing = service.get(&fx.other_officer, &Uuid::new_v4()).await.unwrap_err();
        assert_eq!(domain_error(&hidden), domain_error(&missing));
        assert!(matches!(domain_error(&hidden), Some(Error::NotFound(_))));

        assert_eq!(service.get(&fx.officer, &record.id).await?, record);
        assert_eq!(service.get(&fx.admin, &record.id).await?, record);
        Ok(())
    }

    #[tokio::test]
    async fn review_is_admin_only() -> Result<()> {
        let fx = Fixture::new().await;
        let service = fx.attendance();
        let record = service.submit(&fx.officer, &attendance_payload()).await?;

        let err = service.set_status(&fx.officer, &record.id, "absent").await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::Forbidden(_))));
        assert_eq!(service.get(&fx.admin, &record.id).await?.status, ValidationStatus::Present);

        let err = service.set_status(&fx.admin, &record.id, "late").await.unwrap_err();
        assert_eq!(domain_error(&err).and_then(Error::field), Some("status"));

        let err = service.set_status(&fx.admin, &Uuid::new_v4(), "absent").await.unwrap_err();
        assert!(matches!(domain_error(&err), Some(Error::NotFound(_))));

        let updated = service.set_status(&fx.admin, &record.id, "diluar_lokasi").await?;
        assert_eq!(updated.status, ValidationStatus::OutOfArea);
        assert_eq!(updated.timestamp, record.timestamp);
        Ok(())
    }
}
