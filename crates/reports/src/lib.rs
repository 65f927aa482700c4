//! Supplier-facing reports: the expired products log with its filters and CSV
//! export, plus the harvest calendar.
//!
//! Everything here is a pure function over an in-memory log.

pub mod csv;
pub mod expired;
pub mod fixtures;
pub mod harvest;

pub use self::csv::{ReportError, export_csv};
pub use expired::{
    CycleCadence, DisposalAction, ExpiredEntry, ExpiredFilter, ExpiredReport, Facets, PeriodFilter,
    ReportOutcome, facets, report,
};
pub use harvest::{CalendarMark, HarvestActivity, HarvestPhase, MonthSchedule, harvest_calendar};
