//! Expired products report.
//!
//! Suppliers record what left their stock because it expired and what they
//! did with it. The report narrows that log along four independent
//! dimensions (period, cycle cadence, product, action) and totals what is
//! left. Filters combine with logical AND, so their order never matters.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use feira_core::Money;

/// How often the cycle that held the product closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleCadence {
    Weekly,
    Biweekly,
    Monthly,
}

impl CycleCadence {
    pub const ALL: [CycleCadence; 3] = [Self::Weekly, Self::Biweekly, Self::Monthly];

    /// Label printed in exported reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Weekly => "Semanal",
            Self::Biweekly => "Quinzenal",
            Self::Monthly => "Mensal",
        }
    }
}

/// What the supplier did with the expired stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisposalAction {
    RemovedFromStock,
    Discarded,
    Donated,
    Composted,
}

impl DisposalAction {
    pub const ALL: [DisposalAction; 4] = [
        Self::RemovedFromStock,
        Self::Discarded,
        Self::Donated,
        Self::Composted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::RemovedFromStock => "Retirado do estoque",
            Self::Discarded => "Descartado",
            Self::Donated => "Doado",
            Self::Composted => "Compostagem",
        }
    }
}

/// One line of the expired products log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiredEntry {
    pub id: u64,
    pub product: String,
    pub quantity: f64,
    /// Free-form, e.g. `kg`, `unidades`, `maços`.
    pub unit: String,
    pub expiry_date: NaiveDate,
    pub cadence: CycleCadence,
    /// Human label of the cycle, e.g. `Semana 3 - Janeiro`.
    pub cycle_ref: String,
    pub action: DisposalAction,
    pub reason: String,
    pub supplier: String,
    pub original_value: Money,
}

/// Which expiry dates a report covers, relative to `today`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeriodFilter {
    /// Same calendar month and year as `today`.
    #[default]
    CurrentCycle,
    /// Expired at most `months` months before `today`. Later dates, including
    /// future ones, are kept as well.
    LastCycles { months: u32 },
    /// Inclusive range. A missing bound leaves that side open.
    Custom {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl PeriodFilter {
    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            Self::CurrentCycle => date.month() == today.month() && date.year() == today.year(),
            Self::LastCycles { months } => today
                .checked_sub_months(Months::new(months))
                .is_none_or(|start| date >= start),
            Self::Custom { from, to } => {
                from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
            }
        }
    }
}

/// Report filters. `None` means "all" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpiredFilter {
    #[serde(default)]
    pub period: PeriodFilter,
    pub cadence: Option<CycleCadence>,
    /// Exact product name.
    pub product: Option<String>,
    pub action: Option<DisposalAction>,
}

impl ExpiredFilter {
    /// A filter that keeps every entry.
    pub fn everything() -> Self {
        Self {
            period: PeriodFilter::Custom { from: None, to: None },
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &ExpiredEntry, today: NaiveDate) -> bool {
        self.period.matches(entry.expiry_date, today)
            && self.cadence.is_none_or(|c| entry.cadence == c)
            && self.product.as_deref().is_none_or(|p| entry.product == p)
            && self.action.is_none_or(|a| entry.action == a)
    }
}

/// Why a report is (or is not) empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    /// The log itself is empty.
    NoData,
    /// The log has entries but the filters excluded all of them.
    NoMatches,
    Matches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiredReport {
    pub entries: Vec<ExpiredEntry>,
    pub total_quantity: f64,
    pub total_lost_value: Money,
    pub outcome: ReportOutcome,
}

/// Filter `log` and total the survivors. Entries keep their log order.
pub fn report(log: &[ExpiredEntry], filter: &ExpiredFilter, today: NaiveDate) -> ExpiredReport {
    let entries: Vec<ExpiredEntry> = log
        .iter()
        .filter(|e| filter.matches(e, today))
        .cloned()
        .collect();

    let outcome = if log.is_empty() {
        ReportOutcome::NoData
    } else if entries.is_empty() {
        ReportOutcome::NoMatches
    } else {
        ReportOutcome::Matches
    };

    tracing::debug!(
        logged = log.len(),
        matched = entries.len(),
        ?outcome,
        "expired products report"
    );

    ExpiredReport {
        total_quantity: entries.iter().map(|e| e.quantity).sum(),
        total_lost_value: entries.iter().map(|e| e.original_value).sum(),
        entries,
        outcome,
    }
}

/// Distinct values present in the log, in first-seen order. Used to build
/// the filter options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub cadences: Vec<CycleCadence>,
    pub products: Vec<String>,
    pub actions: Vec<DisposalAction>,
}

pub fn facets(log: &[ExpiredEntry]) -> Facets {
    let mut out = Facets::default();
    for e in log {
        if !out.cadences.contains(&e.cadence) {
            out.cadences.push(e.cadence);
        }
        if !out.products.contains(&e.product) {
            out.products.push(e.product.clone());
        }
        if !out.actions.contains(&e.action) {
            out.actions.push(e.action);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_expired_log;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn names(r: &ExpiredReport) -> Vec<&str> {
        r.entries.iter().map(|e| e.product.as_str()).collect()
    }

    #[test]
    fn current_cycle_keeps_same_month_and_year() {
        let log = sample_expired_log();
        let filter = ExpiredFilter::default();

        let january = report(&log, &filter, date(2024, 1, 20));
        assert_eq!(january.entries.len(), 4);
        assert_eq!(january.outcome, ReportOutcome::Matches);

        let next_year = report(&log, &filter, date(2025, 1, 20));
        assert!(next_year.entries.is_empty());
        assert_eq!(next_year.outcome, ReportOutcome::NoMatches);
    }

    #[test]
    fn last_cycles_has_no_upper_bound() {
        let log = sample_expired_log();
        let filter = ExpiredFilter {
            period: PeriodFilter::LastCycles { months: 3 },
            ..ExpiredFilter::default()
        };
        assert_eq!(report(&log, &filter, date(2024, 4, 8)).entries.len(), 4);
        assert!(report(&log, &filter, date(2024, 4, 16)).entries.len() < 4);
        // Entries dated after `today` still count.
        assert_eq!(report(&log, &filter, date(2023, 12, 1)).entries.len(), 4);
    }

    #[test]
    fn custom_range_is_inclusive_and_open_ended() {
        let log = sample_expired_log();
        let between = ExpiredFilter {
            period: PeriodFilter::Custom {
                from: Some(date(2024, 1, 10)),
                to: Some(date(2024, 1, 12)),
            },
            ..ExpiredFilter::default()
        };
        let r = report(&log, &between, date(2030, 1, 1));
        assert_eq!(names(&r), vec!["Alface Hidropônica", "Cenoura Baby"]);

        let from_only = ExpiredFilter {
            period: PeriodFilter::Custom { from: Some(date(2024, 1, 12)), to: None },
            ..ExpiredFilter::default()
        };
        let r = report(&log, &from_only, date(2030, 1, 1));
        assert_eq!(names(&r), vec!["Tomate Orgânico", "Alface Hidropônica"]);
    }

    #[test]
    fn dimensions_combine_with_and_and_totals_follow() {
        let log = sample_expired_log();
        let filter = ExpiredFilter {
            cadence: Some(CycleCadence::Weekly),
            action: Some(DisposalAction::RemovedFromStock),
            ..ExpiredFilter::everything()
        };
        let r = report(&log, &filter, date(2024, 1, 20));
        assert_eq!(names(&r), vec!["Tomate Orgânico"]);
        assert_eq!(r.total_quantity, 12.0);
        assert_eq!(r.total_lost_value, Money::from_cents(5400));
    }

    #[test]
    fn unfiltered_totals_cover_the_whole_log() {
        let log = sample_expired_log();
        let r = report(&log, &ExpiredFilter::everything(), date(2024, 1, 20));
        assert_eq!(r.total_quantity, 40.0);
        assert_eq!(r.total_lost_value, Money::from_cents(5400 + 2240 + 3100 + 4200));
    }

    #[test]
    fn empty_log_is_no_data() {
        let r = report(&[], &ExpiredFilter::everything(), date(2024, 1, 20));
        assert_eq!(r.outcome, ReportOutcome::NoData);
        assert_eq!(r.total_lost_value, Money::ZERO);
    }

    #[test]
    fn product_filter_is_exact() {
        let log = sample_expired_log();
        let filter = ExpiredFilter {
            product: Some("Tomate".into()),
            ..ExpiredFilter::everything()
        };
        assert_eq!(report(&log, &filter, date(2024, 1, 20)).outcome, ReportOutcome::NoMatches);
    }

    #[test]
    fn facets_are_distinct_in_first_seen_order() {
        let f = facets(&sample_expired_log());
        assert_eq!(f.cadences, vec![CycleCadence::Weekly, CycleCadence::Biweekly]);
        assert_eq!(f.products.len(), 4);
        assert_eq!(f.actions, DisposalAction::ALL.to_vec());
    }

    #[test]
    fn period_filter_wire_format() {
        let json = serde_json::to_value(PeriodFilter::LastCycles { months: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "last_cycles", "months": 3}));
    }

    fn entry_strategy() -> impl Strategy<Value = ExpiredEntry> {
        (
            0usize..3,
            0usize..3,
            0usize..4,
            0i64..400,
            0u32..50,
            0u64..10_000,
        )
            .prop_map(|(product, cadence, action, day, qty, cents)| ExpiredEntry {
                id: cents,
                product: ["Tomate", "Alface", "Cenoura"][product].to_string(),
                quantity: f64::from(qty),
                unit: "kg".into(),
                expiry_date: date(2024, 1, 1) + chrono::Duration::days(day),
                cadence: CycleCadence::ALL[cadence],
                cycle_ref: "Semana 1".into(),
                action: DisposalAction::ALL[action],
                reason: "Vencimento".into(),
                supplier: "João Silva".into(),
                original_value: Money::from_cents(cents),
            })
    }

    fn single_dimension(filter: &ExpiredFilter, dim: usize) -> ExpiredFilter {
        let all = ExpiredFilter::everything();
        match dim {
            0 => ExpiredFilter { period: filter.period, ..all },
            1 => ExpiredFilter { cadence: filter.cadence, ..all },
            2 => ExpiredFilter { product: filter.product.clone(), ..all },
            _ => ExpiredFilter { action: filter.action, ..all },
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn narrowing_one_dimension_at_a_time_is_order_independent(
            log in prop::collection::vec(entry_strategy(), 0..30),
            order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
            months in 0u32..12,
            cadence in prop::option::of(0usize..3),
            action in prop::option::of(0usize..4),
            product in prop::option::of(0usize..3),
        ) {
            let today = date(2024, 9, 1);
            let filter = ExpiredFilter {
                period: PeriodFilter::LastCycles { months },
                cadence: cadence.map(|i| CycleCadence::ALL[i]),
                product: product.map(|i| ["Tomate", "Alface", "Cenoura"][i].to_string()),
                action: action.map(|i| DisposalAction::ALL[i]),
            };

            let combined = report(&log, &filter, today);

            let mut narrowed = log.clone();
            for dim in order {
                narrowed = report(&narrowed, &single_dimension(&filter, dim), today).entries;
            }

            prop_assert_eq!(&combined.entries, &narrowed);
            prop_assert!(combined.entries.iter().all(|e| filter.matches(e, today)));
        }
    }
}
