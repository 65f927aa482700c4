use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use feira_catalog::{ConversionFactor, OfferTemplate, ReferenceProductId, Unit};
use feira_core::{DomainError, DomainResult, Entity, Money, Stamp, UserId, aggregate_id};

aggregate_id!(
    /// Identifier of a supplier's offer inside a cycle.
    OfferId
);

/// Offer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Draft,
    Approved,
    Rejected,
}

impl OfferStatus {
    /// The only place offer transitions are decided.
    ///
    /// Allowed: draft → approved, draft → rejected, approved → draft (revision),
    /// rejected → draft (resubmission). Everything else, including
    /// rejected → approved and self-transitions, is refused.
    pub fn can_transition_to(self, next: OfferStatus) -> bool {
        use OfferStatus::*;
        matches!(
            (self, next),
            (Draft, Approved) | (Draft, Rejected) | (Approved, Draft) | (Rejected, Draft)
        )
    }

    pub fn transition(self, next: OfferStatus) -> DomainResult<OfferStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::invalid_state(format!(
                "offer cannot move from {self} to {next}"
            )))
        }
    }

    /// Whether the offer may be deleted from its cycle.
    pub fn is_removable(self) -> bool {
        !matches!(self, OfferStatus::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::Approved => "approved",
            OfferStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OfferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(OfferStatus::Draft),
            "approved" => Ok(OfferStatus::Approved),
            "rejected" => Ok(OfferStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "status must be one of: draft, approved, rejected (got {other:?})"
            ))),
        }
    }
}

/// Certification flags shown to buyers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub certified_organic: bool,
    pub family_farming: bool,
}

/// A supplier's offer of a reference product in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInCycle {
    pub id: OfferId,
    pub reference_product_id: ReferenceProductId,
    pub name: String,
    pub unit: Unit,
    pub conversion_factor: ConversionFactor,
    pub price_per_unit: Option<Money>,
    pub expiry_date: Option<NaiveDate>,
    pub available_quantity: Option<f64>,
    pub status: OfferStatus,
    #[serde(default)]
    pub certification: Certification,
    #[serde(default)]
    pub description: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub updated_by: UserId,
}

impl Entity for ProductInCycle {
    type Id = OfferId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ProductInCycle {
    /// New draft built from a catalog template. Expiry must be entered by the
    /// supplier.
    pub fn from_template(template: &OfferTemplate, stamp: Stamp) -> Self {
        Self {
            id: OfferId::new(),
            reference_product_id: template.reference_product_id,
            name: template.name.clone(),
            unit: template.unit,
            conversion_factor: template.conversion_factor,
            price_per_unit: Some(template.price_per_unit),
            expiry_date: None,
            available_quantity: None,
            status: OfferStatus::Draft,
            certification: Certification::default(),
            description: None,
            last_updated: stamp.at,
            updated_by: stamp.actor,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("offer name cannot be empty"));
        }
        if let Some(qty) = self.available_quantity {
            if !qty.is_finite() || qty < 0.0 {
                return Err(DomainError::validation(format!(
                    "available quantity must be >= 0 (got {qty})"
                )));
            }
        }
        Ok(())
    }

    /// Copy for a new cycle: fresh id, draft, expiry cleared, price kept as a
    /// default.
    pub fn reuse_as_draft(&self, stamp: Stamp) -> Self {
        Self {
            id: OfferId::new(),
            status: OfferStatus::Draft,
            expiry_date: None,
            last_updated: stamp.at,
            updated_by: stamp.actor,
            ..self.clone()
        }
    }

    /// Equal apart from who touched it last and when.
    pub fn same_content(&self, other: &ProductInCycle) -> bool {
        self.clone().stamped(Stamp::new(other.updated_by, other.last_updated)) == *other
    }

    pub(crate) fn stamped(mut self, stamp: Stamp) -> Self {
        self.last_updated = stamp.at;
        self.updated_by = stamp.actor;
        self
    }
}

/// Clone every offer as a fresh draft, regardless of its source status.
pub fn reuse_offers<'a, I>(offers: I, stamp: Stamp) -> Vec<ProductInCycle>
where
    I: IntoIterator<Item = &'a ProductInCycle>,
{
    offers.into_iter().map(|o| o.reuse_as_draft(stamp)).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    pub fn stamp() -> Stamp {
        Stamp::new(UserId::new(), Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap())
    }

    pub fn offer(name: &str, cents: u64, status: OfferStatus) -> ProductInCycle {
        let s = stamp();
        ProductInCycle {
            id: OfferId::new(),
            reference_product_id: ReferenceProductId::new(),
            name: name.to_string(),
            unit: Unit::Kg,
            conversion_factor: Unit::Kg.default_conversion_factor(),
            price_per_unit: Some(Money::from_cents(cents)),
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 20),
            available_quantity: Some(10.0),
            status,
            certification: Certification {
                certified_organic: true,
                family_farming: false,
            },
            description: None,
            last_updated: s.at,
            updated_by: s.actor,
        }
    }
}
