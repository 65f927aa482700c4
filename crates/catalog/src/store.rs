//! In-memory catalog store.

use std::sync::{PoisonError, RwLock};

use feira_core::{DomainError, DomainResult, position_of};

use crate::reference::{NewReferenceProduct, OfferTemplate, ReferenceProduct, ReferenceProductId};

/// Owns the reference products. Callers only ever receive clones.
#[derive(Debug, Default)]
pub struct CatalogStore {
    products: RwLock<Vec<ReferenceProduct>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, active reference product.
    pub fn register(&self, new: NewReferenceProduct) -> DomainResult<ReferenceProduct> {
        new.validate()?;

        let product = ReferenceProduct {
            id: ReferenceProductId::new(),
            name: new.name.trim().to_string(),
            category: new.category.trim().to_string(),
            unit: new.unit,
            reference_price: new.reference_price,
            active: true,
        };

        let mut products = self.products.write().unwrap_or_else(PoisonError::into_inner);
        products.push(product.clone());
        tracing::info!(product_id = %product.id, name = %product.name, "reference product registered");
        Ok(product)
    }

    pub fn get(&self, id: &ReferenceProductId) -> Option<ReferenceProduct> {
        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        position_of(&products, id).map(|i| products[i].clone())
    }

    /// All products, active or not, in registration order.
    pub fn list(&self) -> Vec<ReferenceProduct> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Active products whose name contains `term` (case-insensitive), optionally
    /// restricted to one category.
    pub fn search(&self, term: &str, category: Option<&str>) -> Vec<ReferenceProduct> {
        let needle = term.trim().to_lowercase();
        let category = category.map(|c| c.trim().to_lowercase());
        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        products
            .iter()
            .filter(|p| p.active)
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .filter(|p| {
                category
                    .as_deref()
                    .is_none_or(|c| p.category.to_lowercase() == c)
            })
            .cloned()
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let products = self.products.read().unwrap_or_else(PoisonError::into_inner);
        let mut seen: Vec<String> = Vec::new();
        for p in products.iter() {
            if !seen.contains(&p.category) {
                seen.push(p.category.clone());
            }
        }
        seen
    }

    /// Prefill an offer from an active reference product.
    pub fn offer_template(&self, id: &ReferenceProductId) -> DomainResult<OfferTemplate> {
        let product = self
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("reference product {id}")))?;
        if !product.active {
            return Err(DomainError::invalid_state(format!(
                "reference product {id} is inactive"
            )));
        }
        Ok(OfferTemplate::from(&product))
    }

    pub fn deactivate(&self, id: &ReferenceProductId) -> DomainResult<ReferenceProduct> {
        let mut products = self.products.write().unwrap_or_else(PoisonError::into_inner);
        let idx = position_of(&products, id)
            .ok_or_else(|| DomainError::not_found(format!("reference product {id}")))?;
        products[idx].active = false;
        tracing::info!(product_id = %id, "reference product deactivated");
        Ok(products[idx].clone())
    }
}
