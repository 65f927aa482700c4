use serde::{Deserialize, Serialize};

use feira_core::{DomainError, DomainResult, Entity, Money, aggregate_id};

use crate::unit::{ConversionFactor, Unit};

aggregate_id!(
    /// Identifier of a catalog entry.
    ReferenceProductId
);

/// Catalog fact registered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceProduct {
    pub id: ReferenceProductId,
    pub name: String,
    pub category: String,
    pub unit: Unit,
    pub reference_price: Money,
    pub active: bool,
}

impl Entity for ReferenceProduct {
    type Id = ReferenceProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration payload for a reference product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReferenceProduct {
    pub name: String,
    pub category: String,
    pub unit: Unit,
    pub reference_price: Money,
}

impl NewReferenceProduct {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        Ok(())
    }
}

/// Prefilled offer fields taken from a reference product ("use as base").
///
/// Price is only a default; the supplier reviews price and expiry for the
/// cycle before saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferTemplate {
    pub reference_product_id: ReferenceProductId,
    pub name: String,
    pub category: String,
    pub unit: Unit,
    pub conversion_factor: ConversionFactor,
    pub price_per_unit: Money,
}

impl From<&ReferenceProduct> for OfferTemplate {
    fn from(product: &ReferenceProduct) -> Self {
        Self {
            reference_product_id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            unit: product.unit,
            conversion_factor: product.unit.default_conversion_factor(),
            price_per_unit: product.reference_price,
        }
    }
}
