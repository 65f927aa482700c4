//! Service wiring shared by every route.

use std::sync::Arc;

use feira_catalog::{CatalogStore, NewReferenceProduct, ReferenceProduct, Unit};
use feira_core::{DomainResult, Money, UserId};
use feira_cycles::{CycleLifecycleService, CycleStore};
use feira_markets::{MarketCatalogService, MarketType, NewMarket};
use feira_reports::{ExpiredEntry, HarvestActivity, fixtures};

use crate::config::ApiConfig;

/// Everything handlers need, shared as `Extension<Arc<AppServices>>`.
#[derive(Debug)]
pub struct AppServices {
    pub catalog: Arc<CatalogStore>,
    pub cycles: Arc<CycleStore>,
    pub lifecycle: CycleLifecycleService,
    pub markets: MarketCatalogService,
    /// Read-only expired products log backing the report routes.
    pub expired_log: Vec<ExpiredEntry>,
    pub harvest_schedule: Vec<HarvestActivity>,
}

impl AppServices {
    pub fn empty() -> Self {
        let cycles = Arc::new(CycleStore::new());
        let catalog = Arc::new(CatalogStore::new());
        Self {
            lifecycle: CycleLifecycleService::new(Arc::clone(&cycles), Arc::clone(&catalog)),
            catalog,
            cycles,
            markets: MarketCatalogService::new(),
            expired_log: Vec::new(),
            harvest_schedule: Vec::new(),
        }
    }
}

pub fn build_services(config: &ApiConfig) -> AppServices {
    let mut services = AppServices::empty();
    if config.seed_fixtures {
        match seed(&mut services) {
            Ok(()) => tracing::info!(
                reference_products = services.catalog.list().len(),
                markets = services.markets.list().len(),
                expired_entries = services.expired_log.len(),
                "fixtures loaded"
            ),
            Err(err) => tracing::warn!(error = %err, "fixtures only partially loaded"),
        }
    }
    services
}

fn seed(services: &mut AppServices) -> DomainResult<()> {
    services.expired_log = fixtures::sample_expired_log();
    services.harvest_schedule = fixtures::sample_harvest_schedule();

    let catalog = [
        ("Tomate Orgânico", "Hortaliças", Unit::Kg, 850),
        ("Alface Hidropônica", "Hortaliças", Unit::Unit, 350),
        ("Cenoura Baby", "Hortaliças", Unit::Kg, 620),
        ("Rúcula Orgânica", "Hortaliças", Unit::Unit, 280),
        ("Banana Prata", "Frutas", Unit::Dozen, 700),
        ("Ovos Caipira", "Ovos", Unit::Dozen, 1200),
    ];
    let mut registered: Vec<ReferenceProduct> = Vec::with_capacity(catalog.len());
    for (name, category, unit, cents) in catalog {
        registered.push(services.catalog.register(NewReferenceProduct {
            name: name.into(),
            category: category.into(),
            unit,
            reference_price: Money::from_cents(cents),
        })?);
    }

    let administrator = UserId::new();
    let markets = [
        ("Mercado Central", MarketType::Basket, &["Centro", "Zona Norte"][..], Some(5)),
        ("Mercado da Vila", MarketType::DirectSale, &["Vila Nova"][..], None),
        ("Supermercado Local", MarketType::DirectSale, &["Bairro Alto"][..], None),
        ("Feira Orgânica", MarketType::Basket, &["Centro", "Praça da Matriz"][..], Some(8)),
    ];
    for (name, market_type, points, fee) in markets {
        services.markets.create_market(NewMarket {
            name: name.into(),
            market_type: Some(market_type),
            administrator_id: Some(administrator),
            delivery_points: points.iter().map(|p| p.to_string()).collect(),
            products: registered.iter().map(|p| p.id).collect(),
            administrative_fee: fee,
        })?;
    }

    Ok(())
}
