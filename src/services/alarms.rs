use crate::db::models::alarm_models::{AlarmCategory, AlarmStatus, EmergencyAlarm, NewAlarm};
use crate::db::models::{parse_choice, parse_coordinates};
use crate::db::repositories::{AlarmFilter, AlarmStore, ListParams, Page};
use crate::error::Error;
use crate::security::policy::{self, Action, Actor, RecordKind};
use crate::services::calendar::Calendar;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Emergency alarms raised in the field
#[derive(Clone)]
pub struct AlarmService {
    store: Arc<dyn AlarmStore>,
    calendar: Calendar,
}

impl AlarmService {
    pub fn new(store: Arc<dyn AlarmStore>, calendar: Calendar) -> Self {
        Self { store, calendar }
    }

    /// Raise an alarm. `Other` needs a description.
    pub async fn trigger(&self, actor: &Actor, payload: &NewAlarm) -> Result<EmergencyAlarm> {
        policy::require(actor, Action::Create, RecordKind::EmergencyAlarm, Some(actor.id))?;

        let category: AlarmCategory = parse_choice("category", &payload.category)?;
        let (latitude, longitude) = parse_coordinates(&payload.latitude, &payload.longitude)?;
        let description = payload
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        if category == AlarmCategory::Other && description.is_none() {
            return Err(Error::invalid("description", "Describe the emergency").into());
        }

        let alarm = EmergencyAlarm {
            id: Uuid::new_v4(),
            officer_id: actor.id,
            officer_name: actor.name.clone(),
            officer_email: actor.email.clone(),
            timestamp: self.calendar.now(),
            category,
            description,
            latitude,
            longitude,
            status: AlarmStatus::Active,
            resolved_at: None,
            resolved_by: None,
        };

        let stored = self.store.insert(&alarm).await?;

        warn!(
            "Emergency alarm {} ({}) raised by {}",
            stored.id, stored.category, actor.email
        );

        Ok(stored)
    }

    /// Alarms visible to the caller, newest first
    pub async fn list(&self, actor: &Actor, params: &ListParams) -> Result<Vec<EmergencyAlarm>> {
        policy::require(actor, Action::List, RecordKind::EmergencyAlarm, None)?;

        let filter = AlarmFilter {
            scope: policy::list_scope(actor),
            period: self
                .calendar
                .filter_date(params.date.as_deref())?
                .map(|date| self.calendar.day_bounds(date)),
            status: params
                .status
                .as_deref()
                .map(|raw| parse_choice::<AlarmStatus>("status", raw))
                .transpose()?,
            page: Page::from_params(params.limit, params.offset),
        };

        self.store.list(&filter).await
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<EmergencyAlarm> {
        let alarm = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::EmergencyAlarm))?;
        policy::require_visible(actor, RecordKind::EmergencyAlarm, alarm.officer_id)?;

        Ok(alarm)
    }

    /// Admin status change.
    ///
    /// Leaving `Active` stamps who resolved it and when; returning to
    /// `Active` clears both. Repeating the current status changes nothing.
    pub async fn set_status(&self, actor: &Actor, id: &Uuid, status: &str) -> Result<EmergencyAlarm> {
        policy::require(actor, Action::Review, RecordKind::EmergencyAlarm, None)?;
        let status: AlarmStatus = parse_choice("status", status)?;

        let current = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::EmergencyAlarm))?;
        if current.status == status {
            return Ok(current);
        }

        let (resolved_at, resolved_by) = match status {
            AlarmStatus::Active => (None, None),
            _ => (Some(self.calendar.now()), Some(actor.id)),
        };

        let updated = self
            .store
            .update_status(id, status, resolved_at, resolved_by)
            .await?
            .ok_or_else(|| policy::not_found(RecordKind::EmergencyAlarm))?;

        info!(
            "Emergency alarm {} set to {} by {}",
            updated.id, updated.status, actor.email
        );

        Ok(updated)
    }
}
