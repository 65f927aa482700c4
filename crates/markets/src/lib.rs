//! Local markets, their delivery points and offered products.

pub mod market;
pub mod service;

pub use market::{Market, MarketId, MarketPatch, MarketStatus, MarketType, NewMarket};
pub use service::MarketCatalogService;
