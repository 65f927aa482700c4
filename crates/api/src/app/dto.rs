use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use feira_catalog::{ConversionFactor, ReferenceProductId, Unit};
use feira_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, Money, Stamp, SupplierId};
use feira_cycles::{Certification, Cycle, CycleId, OfferId, OfferStatus, ProductInCycle};
use feira_reports::{
    CycleCadence, DisposalAction, ExpiredFilter, ExpiredReport, Facets, PeriodFilter,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OpenCycleRequest {
    pub supplier_id: SupplierId,
    /// Client-chosen id; a new one is generated when absent.
    pub cycle_id: Option<CycleId>,
}

/// Draft offer as edited by the supplier. Prices are in centavos.
#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    /// Existing offer to revise; a new offer is created when absent.
    pub id: Option<OfferId>,
    pub reference_product_id: ReferenceProductId,
    pub name: String,
    pub unit: Unit,
    /// Defaults to the unit's conversion factor.
    pub conversion_factor: Option<f64>,
    pub price_per_unit: Option<Money>,
    pub expiry_date: Option<NaiveDate>,
    pub available_quantity: Option<f64>,
    #[serde(default)]
    pub certification: Certification,
    pub description: Option<String>,
    /// Cycle version the editor last saw.
    pub expected_version: Option<u64>,
}

impl SaveDraftRequest {
    pub fn into_offer(self, stamp: Stamp) -> DomainResult<(ProductInCycle, ExpectedVersion)> {
        let conversion_factor = match self.conversion_factor {
            Some(ratio) => ConversionFactor::new(ratio)?,
            None => self.unit.default_conversion_factor(),
        };
        let offer = ProductInCycle {
            id: self.id.unwrap_or_default(),
            reference_product_id: self.reference_product_id,
            name: self.name,
            unit: self.unit,
            conversion_factor,
            price_per_unit: self.price_per_unit,
            expiry_date: self.expiry_date,
            available_quantity: self.available_quantity,
            status: OfferStatus::Draft,
            certification: self.certification,
            description: self.description,
            last_updated: stamp.at,
            updated_by: stamp.actor,
        };
        Ok((offer, ExpectedVersion::from(self.expected_version)))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReuseRequest {
    pub previous_cycle_id: CycleId,
    /// Insert the drafts into the target cycle instead of only returning them.
    #[serde(default)]
    pub merge: bool,
}

#[derive(Debug, Deserialize)]
pub struct NextCycleRequest {
    pub next_cycle_id: Option<CycleId>,
    #[serde(default = "default_true")]
    pub seed: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarketsQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Query string of the expired products report.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiredQuery {
    /// `current`, `last` or `custom`. Defaults to `custom` when `from`/`to`
    /// are given and `current` otherwise.
    pub period: Option<String>,
    pub months: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub cycle: Option<CycleCadence>,
    pub product: Option<String>,
    pub action: Option<DisposalAction>,
    /// Reference date for relative periods; today when absent.
    pub as_of: Option<NaiveDate>,
}

pub const DEFAULT_LAST_MONTHS: u32 = 3;

impl ExpiredQuery {
    pub fn filter(&self) -> DomainResult<ExpiredFilter> {
        let custom = PeriodFilter::Custom { from: self.from, to: self.to };
        let period = match self.period.as_deref().map(str::trim) {
            None | Some("") if self.from.is_some() || self.to.is_some() => custom,
            None | Some("") | Some("current") => PeriodFilter::CurrentCycle,
            Some("last") => PeriodFilter::LastCycles {
                months: self.months.unwrap_or(DEFAULT_LAST_MONTHS),
            },
            Some("custom") => custom,
            Some(other) => {
                return Err(DomainError::validation(format!(
                    "period must be one of current, last, custom (got {other})"
                )));
            }
        };

        Ok(ExpiredFilter {
            period,
            cadence: self.cycle,
            product: self
                .product
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            action: self.action,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CycleResponse {
    pub id: CycleId,
    pub supplier_id: Option<SupplierId>,
    pub version: u64,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub seeded_from: Option<CycleId>,
    pub next_cycle: Option<CycleId>,
    pub approved_count: usize,
    pub offers: Vec<ProductInCycle>,
}

impl From<&Cycle> for CycleResponse {
    fn from(cycle: &Cycle) -> Self {
        Self {
            id: cycle.id_typed(),
            supplier_id: cycle.supplier_id(),
            version: cycle.version(),
            published: cycle.is_published(),
            published_at: cycle.published_at(),
            seeded_from: cycle.seeded_from(),
            next_cycle: cycle.next_cycle(),
            approved_count: cycle.approved_count(),
            offers: cycle.offers().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReuseResponse {
    pub drafts: Vec<ProductInCycle>,
    pub merged: usize,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub cycle_id: CycleId,
    pub published: usize,
}

#[derive(Debug, Serialize)]
pub struct OfferLocation {
    pub cycle_id: CycleId,
    pub offer: ProductInCycle,
}

#[derive(Debug, Serialize)]
pub struct ExpiredReportResponse {
    #[serde(flatten)]
    pub report: ExpiredReport,
    pub facets: Facets,
}
