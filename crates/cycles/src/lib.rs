//! Supplier sales cycles.
//!
//! A cycle collects one supplier's product offers. Offers move through the
//! draft/approved/rejected lifecycle, the cycle is published once at least one
//! offer is approved, and the next cycle can be seeded from the published one.

pub mod cycle;
pub mod lifecycle;
pub mod offer;
pub mod store;

pub use cycle::{
    Cycle, CycleCommand, CycleEvent, CycleId, CycleOpened, CyclePublished, OfferRemoved,
    OfferStatusChanged, OfferUpserted, SuccessorLinked,
};
pub use lifecycle::CycleLifecycleService;
pub use offer::{Certification, OfferId, OfferStatus, ProductInCycle, reuse_offers};
pub use store::CycleStore;
