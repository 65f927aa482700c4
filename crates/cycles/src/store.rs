//! In-memory cycle store.
//!
//! Every mutation runs the same pipeline under the write lock:
//!
//! ```text
//! load (or start empty) → check ExpectedVersion → handle → apply → save + record history
//! ```
//!
//! `handle` is pure, so a refused command leaves the stored cycle untouched.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use feira_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, ExpectedVersion, Stamp, SupplierId,
    position_of,
};
use feira_events::EventEnvelope;

use crate::cycle::{Cycle, CycleCommand, CycleEvent, CycleId};
use crate::offer::{OfferId, OfferStatus, ProductInCycle};

/// Stream name recorded on every cycle event envelope.
pub const AGGREGATE_TYPE: &str = "cycles.cycle";

#[derive(Debug, Default)]
struct Inner {
    cycles: Vec<Cycle>,
    history: HashMap<CycleId, Vec<EventEnvelope<CycleEvent>>>,
}

impl Inner {
    fn cycle_of_offer(&self, offer_id: &OfferId) -> Option<CycleId> {
        self.cycles
            .iter()
            .find(|c| c.offer(offer_id).is_some())
            .map(Cycle::id_typed)
    }

    /// Offer ids are unique across cycles, so an offer written into one
    /// cycle may not already live in another.
    fn ensure_offers_unowned_elsewhere(
        &self,
        cycle_id: CycleId,
        command: &CycleCommand,
    ) -> DomainResult<()> {
        let incoming: Vec<OfferId> = match command {
            CycleCommand::Upsert { offer, .. } | CycleCommand::SaveDraft { offer, .. } => {
                vec![offer.id]
            }
            CycleCommand::AddDrafts { offers, .. } => offers.iter().map(|o| o.id).collect(),
            _ => return Ok(()),
        };
        for offer_id in incoming {
            match self.cycle_of_offer(&offer_id) {
                Some(owner) if owner != cycle_id => {
                    return Err(DomainError::conflict(format!(
                        "offer {offer_id} belongs to cycle {owner}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn commit(
        &mut self,
        cycle_id: CycleId,
        expected: ExpectedVersion,
        command: &CycleCommand,
    ) -> DomainResult<Vec<EventEnvelope<CycleEvent>>> {
        let idx = position_of(&self.cycles, &cycle_id);
        let mut cycle = match idx {
            Some(i) => self.cycles[i].clone(),
            None => Cycle::empty(cycle_id),
        };

        expected.check(cycle.version())?;
        self.ensure_offers_unowned_elsewhere(cycle_id, command)?;
        let events = cycle.handle(command)?;

        let mut committed = Vec::with_capacity(events.len());
        for event in events {
            cycle.apply(&event);
            committed.push(EventEnvelope::new(
                cycle_id.0,
                AGGREGATE_TYPE,
                cycle.version(),
                event,
            ));
        }

        match idx {
            Some(i) => self.cycles[i] = cycle,
            None => self.cycles.push(cycle),
        }
        self.history
            .entry(cycle_id)
            .or_default()
            .extend(committed.iter().cloned());

        Ok(committed)
    }
}

/// Owns every cycle and its offers. Readers get clones, never references into
/// the store.
#[derive(Debug, Default)]
pub struct CycleStore {
    inner: RwLock<Inner>,
}

impl CycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `command` against a cycle, failing with `Conflict` if the cycle's
    /// version does not match `expected`.
    pub fn execute(
        &self,
        cycle_id: CycleId,
        expected: ExpectedVersion,
        command: CycleCommand,
    ) -> DomainResult<Vec<EventEnvelope<CycleEvent>>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let committed = inner.commit(cycle_id, expected, &command)?;
        tracing::debug!(cycle_id = %cycle_id, events = committed.len(), "cycle command committed");
        Ok(committed)
    }

    pub fn open(&self, cycle_id: CycleId, supplier_id: SupplierId, stamp: Stamp) -> DomainResult<Cycle> {
        self.execute(
            cycle_id,
            ExpectedVersion::Any,
            CycleCommand::Open {
                supplier_id,
                seeded_from: None,
                stamp,
            },
        )?;
        self.require(&cycle_id)
    }

    pub fn get(&self, cycle_id: &CycleId) -> Option<Cycle> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        position_of(&inner.cycles, cycle_id).map(|i| inner.cycles[i].clone())
    }

    pub(crate) fn require(&self, cycle_id: &CycleId) -> DomainResult<Cycle> {
        self.get(cycle_id)
            .ok_or_else(|| DomainError::not_found(format!("cycle {cycle_id}")))
    }

    /// All cycles in the order they were opened.
    pub fn cycles(&self) -> Vec<Cycle> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cycles
            .clone()
    }

    /// Offers of a cycle in insertion order, optionally only those in `status`.
    pub fn list_products(
        &self,
        cycle_id: &CycleId,
        status: Option<OfferStatus>,
    ) -> DomainResult<Vec<ProductInCycle>> {
        let cycle = self.require(cycle_id)?;
        Ok(cycle
            .offers()
            .iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect())
    }

    /// Insert the offer if its id is unknown, otherwise replace it. The stored
    /// copy is stamped with `stamp`.
    pub fn upsert(
        &self,
        cycle_id: CycleId,
        offer: ProductInCycle,
        stamp: Stamp,
    ) -> DomainResult<ProductInCycle> {
        let offer_id = offer.id;
        self.execute(cycle_id, ExpectedVersion::Any, CycleCommand::Upsert { offer, stamp })?;
        self.offer_in(&cycle_id, &offer_id)
    }

    /// Delete a draft or rejected offer from whichever cycle holds it.
    pub fn remove(&self, offer_id: OfferId, stamp: Stamp) -> DomainResult<ProductInCycle> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let cycle_id = inner
            .cycle_of_offer(&offer_id)
            .ok_or_else(|| DomainError::not_found(format!("offer {offer_id}")))?;
        let removed = position_of(&inner.cycles, &cycle_id)
            .and_then(|i| inner.cycles[i].offer(&offer_id).cloned())
            .ok_or_else(|| DomainError::not_found(format!("offer {offer_id}")))?;

        inner.commit(
            cycle_id,
            ExpectedVersion::Any,
            &CycleCommand::Remove { offer_id, stamp },
        )?;
        tracing::info!(cycle_id = %cycle_id, offer_id = %offer_id, "offer removed");
        Ok(removed)
    }

    /// Locate an offer and the cycle that owns it.
    pub fn find_offer(&self, offer_id: &OfferId) -> Option<(CycleId, ProductInCycle)> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .cycles
            .iter()
            .find_map(|c| c.offer(offer_id).map(|o| (c.id_typed(), o.clone())))
    }

    pub(crate) fn offer_in(&self, cycle_id: &CycleId, offer_id: &OfferId) -> DomainResult<ProductInCycle> {
        self.require(cycle_id)?
            .offer(offer_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("offer {offer_id}")))
    }

    /// Committed events of a cycle, oldest first.
    pub fn history(&self, cycle_id: &CycleId) -> Vec<EventEnvelope<CycleEvent>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .get(cycle_id)
            .cloned()
            .unwrap_or_default()
    }
}
