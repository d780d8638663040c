use crate::db::models::report_models::{IncidentReport, NewReport, Priority, ReportStatus};
use crate::db::models::{bounded_text, parse_choice, parse_coordinates};
use crate::db::repositories::{ListParams, Page, ReportFilter, ReportStore};
use crate::error::Error;
use crate::security::policy::{self, Action, Actor, RecordKind};
use crate::services::calendar::Calendar;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const LOCATION_NOTE_MAX_CHARS: usize = 255;

/// Incident reports filed by officers and triaged by admins
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    calendar: Calendar,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, calendar: Calendar) -> Self {
        Self { store, calendar }
    }

    /// File a new report. Status and priority always start at `Filed`/`Medium`.
    pub async fn submit(&self, actor: &Actor, payload: &NewReport) -> Result<IncidentReport> {
        policy::require(actor, Action::Create, RecordKind::IncidentReport, Some(actor.id))?;

        let (latitude, longitude) = parse_coordinates(&payload.latitude, &payload.longitude)?;
        let location_note = bounded_text(
            "location_note",
            payload.location_note.as_deref(),
            LOCATION_NOTE_MAX_CHARS,
        )?;
        let detail = payload.detail.as_deref().unwrap_or_default().trim();
        if detail.is_empty() {
            return Err(Error::invalid("detail", "Describe what happened").into());
        }
        let photo = payload
            .photo
            .as_deref()
            .map(str::trim)
            .filter(|photo| !photo.is_empty())
            .ok_or_else(|| Error::invalid("photo", "A photo is required"))?;

        if payload.status.is_some() || payload.priority.is_some() {
            debug!("Ignoring client-supplied status/priority from {}", actor.email);
        }

        let report = IncidentReport {
            id: Uuid::new_v4(),
            reporter_id: actor.id,
            reporter_name: actor.name.clone(),
            reporter_email: actor.email.clone(),
            timestamp: self.calendar.now(),
            latitude,
            longitude,
            location_note,
            detail: detail.to_string(),
            photo: photo.to_string(),
            status: ReportStatus::Filed,
            priority: Priority::Medium,
        };

        let stored = self.store.insert(&report).await?;

        info!("Incident report {} filed by {}", stored.id, actor.email);

        Ok(stored)
    }

    /// Reports visible to the caller, newest first
    pub async fn list(&self, actor: &Actor, params: &ListParams) -> Result<Vec<IncidentReport>> {
        policy::require(actor, Action::List, RecordKind::IncidentReport, None)?;

        let filter = ReportFilter {
            scope: policy::list_scope(actor),
            period: self
                .calendar
                .filter_date(params.date.as_deref())?
                .map(|date| self.calendar.day_bounds(date)),
            status: params
                .status
                .as_deref()
                .map(|raw| parse_choice::<ReportStatus>("status", raw))
                .transpose()?,
            page: Page::from_params(params.limit, params.offset),
        };

        self.store.list(&filter).await
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<IncidentReport> {
        let report = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::IncidentReport))?;
        policy::require_visible(actor, RecordKind::IncidentReport, report.reporter_id)?;

        Ok(report)
    }

    /// Admin triage; priority is kept when not supplied
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: &Uuid,
        status: &str,
        priority: Option<&str>,
    ) -> Result<IncidentReport> {
        policy::require(actor, Action::Review, RecordKind::IncidentReport, None)?;
        let status: ReportStatus = parse_choice("status", status)?;
        let priority = priority
            .map(|raw| parse_choice::<Priority>("priority", raw))
            .transpose()?;

        let current = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::IncidentReport))?;

        let updated = self
            .store
            .update_review(id, status, priority.unwrap_or(current.priority))
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::IncidentReport))?;

        info!(
            "Incident report {} set to {}/{} by {}",
            updated.id, updated.status, updated.priority, actor.email
        );

        Ok(updated)
    }
}
