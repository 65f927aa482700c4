//! `feira-core` — domain foundation building blocks.
//!
//! Pure domain primitives shared by the catalog, cycle, market and report
//! crates. No IO lives here.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod stamp;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, SupplierId, UserId};
pub use money::Money;
pub use stamp::Stamp;
