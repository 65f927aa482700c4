use std::sync::{PoisonError, RwLock};

use feira_core::{DomainError, DomainResult, position_of};

use crate::market::{
    Market, MarketId, MarketPatch, MarketStatus, NewMarket, clean_delivery_points, dedup_products,
    effective_fee,
};

/// Market registry used by administrators.
#[derive(Debug, Default)]
pub struct MarketCatalogService {
    markets: RwLock<Vec<Market>>,
}

impl MarketCatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_market(&self, new: NewMarket) -> DomainResult<Market> {
        let delivery_points = clean_delivery_points(&new.delivery_points);

        let mut missing = Vec::new();
        if new.name.trim().is_empty() {
            missing.push("name");
        }
        if new.market_type.is_none() {
            missing.push("market_type");
        }
        if new.administrator_id.is_none() {
            missing.push("administrator_id");
        }
        if delivery_points.is_empty() {
            missing.push("delivery_points");
        }

        let (Some(market_type), Some(administrator_id)) = (new.market_type, new.administrator_id)
        else {
            return Err(missing_fields(&missing));
        };
        if !missing.is_empty() {
            return Err(missing_fields(&missing));
        }

        let market = Market {
            id: MarketId::new(),
            name: new.name.trim().to_string(),
            status: MarketStatus::Active,
            market_type,
            delivery_points,
            products: dedup_products(&new.products),
            administrative_fee: effective_fee(market_type, new.administrative_fee)?,
            administrator_id,
        };

        let mut markets = self.markets.write().unwrap_or_else(PoisonError::into_inner);
        markets.push(market.clone());
        tracing::info!(market_id = %market.id, name = %market.name, "market created");
        Ok(market)
    }

    /// Merge `patch` into an existing market. The merged market is validated
    /// as a whole before it replaces the stored one.
    pub fn update_market(&self, id: &MarketId, patch: MarketPatch) -> DomainResult<Market> {
        let mut markets = self.markets.write().unwrap_or_else(PoisonError::into_inner);
        let idx = position_of(&markets, id)
            .ok_or_else(|| DomainError::not_found(format!("market {id}")))?;

        let mut merged = markets[idx].clone();
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(missing_fields(&["name"]));
            }
            merged.name = name.trim().to_string();
        }
        if let Some(status) = patch.status {
            merged.status = status;
        }
        if let Some(market_type) = patch.market_type {
            merged.market_type = market_type;
        }
        if let Some(admin) = patch.administrator_id {
            merged.administrator_id = admin;
        }
        if let Some(points) = patch.delivery_points {
            let points = clean_delivery_points(&points);
            if points.is_empty() {
                return Err(missing_fields(&["delivery_points"]));
            }
            merged.delivery_points = points;
        }
        if let Some(products) = patch.products {
            merged.products = dedup_products(&products);
        }
        let fee = patch.administrative_fee.unwrap_or(merged.administrative_fee);
        merged.administrative_fee = effective_fee(merged.market_type, fee)?;

        markets[idx] = merged.clone();
        tracing::info!(market_id = %id, "market updated");
        Ok(merged)
    }

    pub fn set_status(&self, id: &MarketId, status: MarketStatus) -> DomainResult<Market> {
        self.update_market(
            id,
            MarketPatch {
                status: Some(status),
                ..MarketPatch::default()
            },
        )
    }

    pub fn get(&self, id: &MarketId) -> Option<Market> {
        let markets = self.markets.read().unwrap_or_else(PoisonError::into_inner);
        position_of(&markets, id).map(|i| markets[i].clone())
    }

    pub fn list(&self) -> Vec<Market> {
        self.markets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn active(&self) -> Vec<Market> {
        self.filtered(|m| m.status == MarketStatus::Active)
    }

    /// Markets whose name or a delivery point contains `query`, in insertion order.
    pub fn search(&self, query: &str) -> Vec<Market> {
        let hits = self.filtered(|m| m.matches(query));
        tracing::debug!(query, hits = hits.len(), "market search");
        hits
    }

    fn filtered(&self, pred: impl Fn(&Market) -> bool) -> Vec<Market> {
        let markets = self.markets.read().unwrap_or_else(PoisonError::into_inner);
        markets.iter().filter(|m| pred(m)).cloned().collect()
    }
}

fn missing_fields(fields: &[&str]) -> DomainError {
    DomainError::validation(format!("missing required fields: {}", fields.join(", ")))
}
