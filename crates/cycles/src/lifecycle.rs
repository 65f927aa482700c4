//! Cycle lifecycle orchestration: reuse, approval, revision, publication.

use std::sync::Arc;

use feira_catalog::{CatalogStore, ReferenceProductId};
use feira_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, Stamp};
use feira_events::EventEnvelope;

use crate::cycle::{Cycle, CycleCommand, CycleEvent, CycleId};
use crate::offer::{OfferId, OfferStatus, ProductInCycle, reuse_offers};
use crate::store::CycleStore;

/// Validates and applies every lifecycle edit through the [`CycleStore`].
/// Offers are only accepted for reference products the catalog lists as active.
#[derive(Debug, Clone)]
pub struct CycleLifecycleService {
    store: Arc<CycleStore>,
    catalog: Arc<CatalogStore>,
}

impl CycleLifecycleService {
    pub fn new(store: Arc<CycleStore>, catalog: Arc<CatalogStore>) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &Arc<CycleStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    fn ensure_listed(&self, id: &ReferenceProductId) -> DomainResult<()> {
        let product = self
            .catalog
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("reference product {id}")))?;
        if !product.active {
            return Err(DomainError::invalid_state(format!(
                "reference product {id} is inactive"
            )));
        }
        Ok(())
    }

    /// Fresh drafts copied from every offer of `previous`, whatever their
    /// status. Nothing is inserted; see [`Self::merge_reused`].
    pub fn reuse_from_previous(
        &self,
        previous: &CycleId,
        stamp: Stamp,
    ) -> DomainResult<Vec<ProductInCycle>> {
        let cycle = self.store.require(previous)?;
        let drafts = reuse_offers(cycle.offers(), stamp);
        tracing::debug!(previous = %previous, drafts = drafts.len(), "reuse candidates built");
        Ok(drafts)
    }

    /// Insert reused drafts into `cycle_id` atomically. Returns how many were added.
    pub fn merge_reused(
        &self,
        cycle_id: CycleId,
        drafts: Vec<ProductInCycle>,
        stamp: Stamp,
    ) -> DomainResult<usize> {
        let count = drafts.len();
        if count == 0 {
            return Ok(0);
        }
        self.store.execute(
            cycle_id,
            ExpectedVersion::Any,
            CycleCommand::AddDrafts { offers: drafts, stamp },
        )?;
        tracing::info!(cycle_id = %cycle_id, count, "reused drafts merged");
        Ok(count)
    }

    /// Draft → approved. `InvalidState` for any other current status.
    pub fn approve(&self, offer_id: OfferId, stamp: Stamp) -> DomainResult<ProductInCycle> {
        self.change_status(offer_id, OfferStatus::Approved, stamp)
    }

    /// Draft → rejected.
    pub fn reject(&self, offer_id: OfferId, stamp: Stamp) -> DomainResult<ProductInCycle> {
        self.change_status(offer_id, OfferStatus::Rejected, stamp)
    }

    /// Apply one status transition, validated by [`OfferStatus::transition`].
    pub fn change_status(
        &self,
        offer_id: OfferId,
        to: OfferStatus,
        stamp: Stamp,
    ) -> DomainResult<ProductInCycle> {
        let (cycle_id, current) = self
            .store
            .find_offer(&offer_id)
            .ok_or_else(|| DomainError::not_found(format!("offer {offer_id}")))?;

        let result = self.store.execute(
            cycle_id,
            ExpectedVersion::Any,
            CycleCommand::ChangeStatus { offer_id, to, stamp },
        );
        if let Err(err) = &result {
            tracing::warn!(offer_id = %offer_id, from = %current.status, to = %to, error = %err, "status change refused");
        }
        result?;

        tracing::info!(cycle_id = %cycle_id, offer_id = %offer_id, from = %current.status, to = %to, "offer status changed");
        self.store.offer_in(&cycle_id, &offer_id)
    }

    /// Upsert that always leaves the offer as draft (the revision path).
    ///
    /// Pass `ExpectedVersion::Exact` with the cycle version the editor last saw
    /// to refuse overwriting a concurrent edit.
    pub fn save_draft(
        &self,
        cycle_id: CycleId,
        offer: ProductInCycle,
        expected: ExpectedVersion,
        stamp: Stamp,
    ) -> DomainResult<ProductInCycle> {
        let offer_id = offer.id;
        self.ensure_listed(&offer.reference_product_id)?;
        self.store
            .execute(cycle_id, expected, CycleCommand::SaveDraft { offer, stamp })?;
        tracing::info!(cycle_id = %cycle_id, offer_id = %offer_id, "draft saved");
        self.store.offer_in(&cycle_id, &offer_id)
    }

    /// Delete a draft or rejected offer.
    pub fn remove(&self, offer_id: OfferId, stamp: Stamp) -> DomainResult<ProductInCycle> {
        self.store.remove(offer_id, stamp)
    }

    /// Freeze the cycle. Returns the number of approved offers published.
    pub fn publish(&self, cycle_id: CycleId, stamp: Stamp) -> DomainResult<usize> {
        let committed = match self.store.execute(
            cycle_id,
            ExpectedVersion::Any,
            CycleCommand::Publish { stamp },
        ) {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(cycle_id = %cycle_id, error = %err, "publish refused");
                return Err(err);
            }
        };

        let approved = committed
            .iter()
            .find_map(|env| match env.payload() {
                CycleEvent::CyclePublished(e) => Some(e.approved_count),
                _ => None,
            })
            .unwrap_or_default();
        tracing::info!(cycle_id = %cycle_id, approved, "cycle published");
        Ok(approved)
    }

    /// Open the cycle that follows a published one, for the same supplier.
    /// A published cycle has at most one successor; a second call is a `Conflict`.
    ///
    /// With `seed`, the new cycle starts with drafts reused from the published
    /// cycle's approved offers.
    pub fn open_next_cycle(
        &self,
        published: &CycleId,
        next: CycleId,
        seed: bool,
        stamp: Stamp,
    ) -> DomainResult<Cycle> {
        let previous = self.store.require(published)?;
        if !previous.is_published() {
            return Err(DomainError::invalid_state(format!(
                "cycle {published} must be published before the next one opens"
            )));
        }
        let supplier_id = previous
            .supplier_id()
            .ok_or_else(|| DomainError::not_found(format!("supplier of cycle {published}")))?;
        if self.store.get(&next).is_some() {
            return Err(DomainError::conflict(format!("cycle {next} already exists")));
        }

        self.store.execute(
            *published,
            ExpectedVersion::Exact(previous.version()),
            CycleCommand::LinkSuccessor { next, stamp },
        )?;
        self.store.execute(
            next,
            ExpectedVersion::Any,
            CycleCommand::Open {
                supplier_id,
                seeded_from: seed.then_some(*published),
                stamp,
            },
        )?;

        if seed {
            let drafts = reuse_offers(previous.published_offers(), stamp);
            self.merge_reused(next, drafts, stamp)?;
        }

        tracing::info!(previous = %published, next = %next, seed, "next cycle opened");
        self.store.require(&next)
    }

    pub fn history(&self, cycle_id: &CycleId) -> Vec<EventEnvelope<CycleEvent>> {
        self.store.history(cycle_id)
    }
}
