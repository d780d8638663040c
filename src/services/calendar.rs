use crate::config::TimeConfig;
use crate::error::Error;
use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Server-side calendar in the configured offset.
///
/// Client-supplied times never reach this type; "today" always comes from
/// the clock.
#[derive(Clone)]
pub struct Calendar {
    offset: FixedOffset,
    clock: Arc<dyn Clock>,
}

impl Calendar {
    pub fn new(offset: FixedOffset, clock: Arc<dyn Clock>) -> Self {
        Self { offset, clock }
    }

    pub fn from_config(config: &TimeConfig) -> Result<Self> {
        Ok(Self::new(config.offset()?, Arc::new(SystemClock)))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }

    /// Calendar day an instant falls on locally
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// UTC half-open range `[start, end)` covering one local day
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc_midnight = local_midnight - Duration::seconds(self.offset.local_minus_utc() as i64);
        let start = Utc.from_utc_datetime(&utc_midnight);
        (start, start + Duration::days(1))
    }

    /// Parse an optional `YYYY-MM-DD` date, defaulting to today
    pub fn resolve_date(&self, raw: Option<&str>) -> Result<NaiveDate> {
        match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Ok(parse_date(raw)?),
            None => Ok(self.today()),
        }
    }

    /// Parse an optional filter date without defaulting
    pub fn filter_date(&self, raw: Option<&str>) -> Result<Option<NaiveDate>> {
        match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Ok(Some(parse_date(raw)?)),
            None => Ok(None),
        }
    }
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| Error::invalid("date", format!("{:?} is not a valid YYYY-MM-DD date", raw)))
}
