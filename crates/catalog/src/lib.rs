//! Reference product catalog.
//!
//! Administrators register reference products; suppliers search them and use
//! them as templates for new cycle offers. Suppliers never mutate catalog
//! entries.

pub mod reference;
pub mod store;
pub mod unit;

pub use reference::{NewReferenceProduct, OfferTemplate, ReferenceProduct, ReferenceProductId};
pub use store::CatalogStore;
pub use unit::{ConversionFactor, Unit};
