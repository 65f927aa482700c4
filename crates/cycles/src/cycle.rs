use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use feira_core::{
    Aggregate, AggregateRoot, DomainError, Entity, Stamp, SupplierId, aggregate_id, position_of,
};
use feira_events::Event;

use crate::offer::{OfferId, OfferStatus, ProductInCycle};

aggregate_id!(
    /// Identifier of a supplier's sales cycle.
    CycleId
);

/// Aggregate root: one supplier's sales cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    id: CycleId,
    supplier_id: Option<SupplierId>,
    offers: Vec<ProductInCycle>,
    published_at: Option<DateTime<Utc>>,
    seeded_from: Option<CycleId>,
    next_cycle: Option<CycleId>,
    version: u64,
    created: bool,
}

impl Cycle {
    /// Create an empty, not-yet-opened aggregate instance.
    pub fn empty(id: CycleId) -> Self {
        Self {
            id,
            supplier_id: None,
            offers: Vec::new(),
            published_at: None,
            seeded_from: None,
            next_cycle: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CycleId {
        self.id
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    /// Every offer ever kept in this cycle, in insertion order.
    pub fn offers(&self) -> &[ProductInCycle] {
        &self.offers
    }

    pub fn offer(&self, id: &OfferId) -> Option<&ProductInCycle> {
        position_of(&self.offers, id).map(|i| &self.offers[i])
    }

    pub fn offers_with_status(&self, status: OfferStatus) -> impl Iterator<Item = &ProductInCycle> {
        self.offers.iter().filter(move |o| o.status == status)
    }

    pub fn approved_count(&self) -> usize {
        self.offers_with_status(OfferStatus::Approved).count()
    }

    /// Offers frozen by publication (approved only). Empty while current.
    pub fn published_offers(&self) -> Vec<&ProductInCycle> {
        if self.is_published() {
            self.offers_with_status(OfferStatus::Approved).collect()
        } else {
            Vec::new()
        }
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn seeded_from(&self) -> Option<CycleId> {
        self.seeded_from
    }

    /// The cycle opened after this one was published, if any.
    pub fn next_cycle(&self) -> Option<CycleId> {
        self.next_cycle
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Cycle {
    type Id = CycleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Entity for Cycle {
    type Id = CycleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleCommand {
    Open {
        supplier_id: SupplierId,
        seeded_from: Option<CycleId>,
        stamp: Stamp,
    },
    /// Insert or replace an offer. New offers must enter as drafts; status
    /// changes on existing offers go through the transition table.
    Upsert { offer: ProductInCycle, stamp: Stamp },
    /// Insert or replace an offer, forcing it back to draft.
    SaveDraft { offer: ProductInCycle, stamp: Stamp },
    /// Insert several new drafts at once (all or nothing).
    AddDrafts { offers: Vec<ProductInCycle>, stamp: Stamp },
    ChangeStatus {
        offer_id: OfferId,
        to: OfferStatus,
        stamp: Stamp,
    },
    Remove { offer_id: OfferId, stamp: Stamp },
    Publish { stamp: Stamp },
    /// Record the cycle that follows this published one. Allowed once.
    LinkSuccessor { next: CycleId, stamp: Stamp },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOpened {
    pub cycle_id: CycleId,
    pub supplier_id: SupplierId,
    pub seeded_from: Option<CycleId>,
    pub stamp: Stamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferUpserted {
    pub cycle_id: CycleId,
    pub offer: ProductInCycle,
    pub inserted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferStatusChanged {
    pub cycle_id: CycleId,
    pub offer_id: OfferId,
    pub from: OfferStatus,
    pub to: OfferStatus,
    pub stamp: Stamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRemoved {
    pub cycle_id: CycleId,
    pub offer_id: OfferId,
    pub stamp: Stamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePublished {
    pub cycle_id: CycleId,
    pub approved_count: usize,
    pub stamp: Stamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessorLinked {
    pub cycle_id: CycleId,
    pub next: CycleId,
    pub stamp: Stamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleEvent {
    CycleOpened(CycleOpened),
    OfferUpserted(OfferUpserted),
    OfferStatusChanged(OfferStatusChanged),
    OfferRemoved(OfferRemoved),
    CyclePublished(CyclePublished),
    SuccessorLinked(SuccessorLinked),
}

impl Event for CycleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CycleEvent::CycleOpened(_) => "cycles.cycle.opened",
            CycleEvent::OfferUpserted(_) => "cycles.offer.upserted",
            CycleEvent::OfferStatusChanged(_) => "cycles.offer.status_changed",
            CycleEvent::OfferRemoved(_) => "cycles.offer.removed",
            CycleEvent::CyclePublished(_) => "cycles.cycle.published",
            CycleEvent::SuccessorLinked(_) => "cycles.cycle.successor_linked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CycleEvent::CycleOpened(e) => e.stamp.at,
            CycleEvent::OfferUpserted(e) => e.offer.last_updated,
            CycleEvent::OfferStatusChanged(e) => e.stamp.at,
            CycleEvent::OfferRemoved(e) => e.stamp.at,
            CycleEvent::CyclePublished(e) => e.stamp.at,
            CycleEvent::SuccessorLinked(e) => e.stamp.at,
        }
    }
}

impl Aggregate for Cycle {
    type Command = CycleCommand;
    type Event = CycleEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CycleEvent::CycleOpened(e) => {
                self.id = e.cycle_id;
                self.supplier_id = Some(e.supplier_id);
                self.seeded_from = e.seeded_from;
                self.created = true;
            }
            CycleEvent::OfferUpserted(e) => match position_of(&self.offers, &e.offer.id) {
                Some(i) => self.offers[i] = e.offer.clone(),
                None => self.offers.push(e.offer.clone()),
            },
            CycleEvent::OfferStatusChanged(e) => {
                if let Some(i) = position_of(&self.offers, &e.offer_id) {
                    let offer = &mut self.offers[i];
                    offer.status = e.to;
                    offer.last_updated = e.stamp.at;
                    offer.updated_by = e.stamp.actor;
                }
            }
            CycleEvent::OfferRemoved(e) => {
                self.offers.retain(|o| o.id != e.offer_id);
            }
            CycleEvent::CyclePublished(e) => {
                self.published_at = Some(e.stamp.at);
            }
            CycleEvent::SuccessorLinked(e) => {
                self.next_cycle = Some(e.next);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if !matches!(
            command,
            CycleCommand::Open { .. } | CycleCommand::LinkSuccessor { .. }
        ) {
            self.ensure_current()?;
        }

        match command {
            CycleCommand::Open {
                supplier_id,
                seeded_from,
                stamp,
            } => self.handle_open(*supplier_id, *seeded_from, *stamp),
            CycleCommand::Upsert { offer, stamp } => self.handle_upsert(offer, *stamp),
            CycleCommand::SaveDraft { offer, stamp } => self.handle_save_draft(offer, *stamp),
            CycleCommand::AddDrafts { offers, stamp } => self.handle_add_drafts(offers, *stamp),
            CycleCommand::ChangeStatus { offer_id, to, stamp } => {
                self.handle_change_status(*offer_id, *to, *stamp)
            }
            CycleCommand::Remove { offer_id, stamp } => self.handle_remove(*offer_id, *stamp),
            CycleCommand::Publish { stamp } => self.handle_publish(*stamp),
            CycleCommand::LinkSuccessor { next, stamp } => self.handle_link_successor(*next, *stamp),
        }
    }
}

impl Cycle {
    fn ensure_current(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("cycle {}", self.id)));
        }
        if self.is_published() {
            return Err(DomainError::invalid_state(format!(
                "cycle {} is published and read-only",
                self.id
            )));
        }
        Ok(())
    }

    fn existing_offer(&self, id: OfferId) -> Result<&ProductInCycle, DomainError> {
        self.offer(&id)
            .ok_or_else(|| DomainError::not_found(format!("offer {id} in cycle {}", self.id)))
    }

    fn handle_open(
        &self,
        supplier_id: SupplierId,
        seeded_from: Option<CycleId>,
        stamp: Stamp,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict(format!("cycle {} already exists", self.id)));
        }
        Ok(vec![CycleEvent::CycleOpened(CycleOpened {
            cycle_id: self.id,
            supplier_id,
            seeded_from,
            stamp,
        })])
    }

    fn handle_upsert(
        &self,
        offer: &ProductInCycle,
        stamp: Stamp,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        offer.validate()?;

        let inserted = match self.offer(&offer.id) {
            None => {
                if offer.status != OfferStatus::Draft {
                    return Err(DomainError::invalid_state(format!(
                        "new offers enter the cycle as draft (got {})",
                        offer.status
                    )));
                }
                true
            }
            Some(current) => {
                if current.status != offer.status {
                    current.status.transition(offer.status)?;
                } else if current.status == OfferStatus::Approved
                    && !offer.same_content(current)
                {
                    return Err(DomainError::invalid_state(format!(
                        "offer {} is approved; save it as draft to revise it",
                        offer.id
                    )));
                }
                false
            }
        };

        Ok(vec![CycleEvent::OfferUpserted(OfferUpserted {
            cycle_id: self.id,
            offer: offer.clone().stamped(stamp),
            inserted,
        })])
    }

    fn handle_save_draft(
        &self,
        offer: &ProductInCycle,
        stamp: Stamp,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        let mut draft = offer.clone();
        draft.status = OfferStatus::Draft;
        draft.validate()?;

        Ok(vec![CycleEvent::OfferUpserted(OfferUpserted {
            cycle_id: self.id,
            inserted: self.offer(&draft.id).is_none(),
            offer: draft.stamped(stamp),
        })])
    }

    fn handle_add_drafts(
        &self,
        offers: &[ProductInCycle],
        stamp: Stamp,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        let mut events = Vec::with_capacity(offers.len());
        for (i, offer) in offers.iter().enumerate() {
            offer.validate()?;
            if offer.status != OfferStatus::Draft {
                return Err(DomainError::invalid_state(format!(
                    "offer {} is {}, only drafts can be added",
                    offer.id, offer.status
                )));
            }
            let duplicate_in_batch = offers[..i].iter().any(|o| o.id == offer.id);
            if self.offer(&offer.id).is_some() || duplicate_in_batch {
                return Err(DomainError::conflict(format!(
                    "offer {} already exists in cycle {}",
                    offer.id, self.id
                )));
            }
            events.push(CycleEvent::OfferUpserted(OfferUpserted {
                cycle_id: self.id,
                offer: offer.clone().stamped(stamp),
                inserted: true,
            }));
        }
        Ok(events)
    }

    fn handle_change_status(
        &self,
        offer_id: OfferId,
        to: OfferStatus,
        stamp: Stamp,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        let current = self.existing_offer(offer_id)?;
        let from = current.status;
        from.transition(to)?;

        Ok(vec![CycleEvent::OfferStatusChanged(OfferStatusChanged {
            cycle_id: self.id,
            offer_id,
            from,
            to,
            stamp,
        })])
    }

    fn handle_remove(&self, offer_id: OfferId, stamp: Stamp) -> Result<Vec<CycleEvent>, DomainError> {
        let current = self.existing_offer(offer_id)?;
        if !current.status.is_removable() {
            return Err(DomainError::invalid_state(format!(
                "offer {offer_id} is approved; revert it to draft before removing"
            )));
        }

        Ok(vec![CycleEvent::OfferRemoved(OfferRemoved {
            cycle_id: self.id,
            offer_id,
            stamp,
        })])
    }

    fn handle_publish(&self, stamp: Stamp) -> Result<Vec<CycleEvent>, DomainError> {
        let approved_count = self.approved_count();
        if approved_count == 0 {
            return Err(DomainError::invalid_state(format!(
                "cycle {} has no approved offers to publish",
                self.id
            )));
        }

        Ok(vec![CycleEvent::CyclePublished(CyclePublished {
            cycle_id: self.id,
            approved_count,
            stamp,
        })])
    }

    fn handle_link_successor(&self, next: CycleId, stamp: Stamp) -> Result<Vec<CycleEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("cycle {}", self.id)));
        }
        if !self.is_published() {
            return Err(DomainError::invalid_state(format!(
                "cycle {} must be published before the next one opens",
                self.id
            )));
        }
        if let Some(existing) = self.next_cycle {
            return Err(DomainError::conflict(format!(
                "cycle {} is already followed by cycle {existing}",
                self.id
            )));
        }

        Ok(vec![CycleEvent::SuccessorLinked(SuccessorLinked {
            cycle_id: self.id,
            next,
            stamp,
        })])
    }
}
