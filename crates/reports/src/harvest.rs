//! Harvest calendar: which crops are planted or harvested in each month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestPhase {
    Preparation,
    Planting,
    Harvest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestActivity {
    pub id: u64,
    pub product: String,
    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub estimated_kg: f64,
    pub phase: HarvestPhase,
}

/// An activity shown under a month, with what happens in that month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMark {
    pub activity_id: u64,
    pub product: String,
    pub planting: bool,
    pub harvest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSchedule {
    /// 1 = January.
    pub month: u32,
    pub activities: Vec<CalendarMark>,
}

/// Twelve months, January first. Only the month is compared, so a schedule
/// spanning years folds onto one calendar.
pub fn harvest_calendar(activities: &[HarvestActivity]) -> Vec<MonthSchedule> {
    (1..=12)
        .map(|month| MonthSchedule {
            month,
            activities: activities
                .iter()
                .filter_map(|a| {
                    let planting = a.planting_date.month() == month;
                    let harvest = a.harvest_date.month() == month;
                    (planting || harvest).then(|| CalendarMark {
                        activity_id: a.id,
                        product: a.product.clone(),
                        planting,
                        harvest,
                    })
                })
                .collect(),
        })
        .collect()
}
