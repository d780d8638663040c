pub mod alarms;
pub mod attendance;
pub mod calendar;
pub mod coverage;
pub mod reports;

pub use alarms::AlarmService;
pub use attendance::AttendanceService;
pub use calendar::{Calendar, Clock, SystemClock};
pub use coverage::CoverageService;
pub use reports::ReportService;
