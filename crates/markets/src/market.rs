use serde::{Deserialize, Deserializer, Serialize};

use feira_catalog::ReferenceProductId;
use feira_core::{DomainError, DomainResult, Entity, UserId, aggregate_id};

aggregate_id!(
    /// Identifier of a local market.
    MarketId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Active,
    Inactive,
}

/// How a market sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Basket,
    DirectSale,
    Lot,
}

impl MarketType {
    /// Administrative fees only apply to basket and lot markets.
    pub fn charges_fee(self) -> bool {
        matches!(self, MarketType::Basket | MarketType::Lot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub name: String,
    pub status: MarketStatus,
    pub market_type: MarketType,
    pub delivery_points: Vec<String>,
    pub products: Vec<ReferenceProductId>,
    /// Whole percent, `None` for direct-sale markets.
    pub administrative_fee: Option<u8>,
    pub administrator_id: UserId,
}

impl Entity for Market {
    type Id = MarketId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Market {
    pub fn total_products(&self) -> usize {
        self.products.len()
    }

    /// Case-insensitive substring match on the name or any delivery point.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .delivery_points
                .iter()
                .any(|p| p.to_lowercase().contains(&needle))
    }
}

/// Creation payload. Every field is optional so missing input surfaces as a
/// validation error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMarket {
    #[serde(default)]
    pub name: String,
    pub market_type: Option<MarketType>,
    pub administrator_id: Option<UserId>,
    #[serde(default)]
    pub delivery_points: Vec<String>,
    #[serde(default)]
    pub products: Vec<ReferenceProductId>,
    pub administrative_fee: Option<u8>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPatch {
    pub name: Option<String>,
    pub status: Option<MarketStatus>,
    pub market_type: Option<MarketType>,
    pub administrator_id: Option<UserId>,
    pub delivery_points: Option<Vec<String>>,
    pub products: Option<Vec<ReferenceProductId>>,
    /// Absent leaves the fee unchanged; an explicit `null` clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub administrative_fee: Option<Option<u8>>,
}

/// Maps a field that is present in the payload, `null` included, to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trimmed, non-empty delivery points in their original order.
pub(crate) fn clean_delivery_points(points: &[String]) -> Vec<String> {
    points
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deduplicated product ids, first occurrence wins.
pub(crate) fn dedup_products(products: &[ReferenceProductId]) -> Vec<ReferenceProductId> {
    let mut out: Vec<ReferenceProductId> = Vec::with_capacity(products.len());
    for p in products {
        if !out.contains(p) {
            out.push(*p);
        }
    }
    out
}

/// Fee kept for basket/lot markets, dropped for direct sale.
pub(crate) fn effective_fee(market_type: MarketType, fee: Option<u8>) -> DomainResult<Option<u8>> {
    match fee {
        Some(f) if f > 100 => Err(DomainError::validation(format!(
            "administrative fee must be a percentage between 0 and 100 (got {f})"
        ))),
        Some(f) if market_type.charges_fee() => Ok(Some(f)),
        _ => Ok(None),
    }
}
