use feira_core::{Stamp, UserId};

/// Who is making a mutating request, taken from the `x-actor-id` header.
///
/// Present on every POST/PATCH/DELETE request that reaches a handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor_id: UserId,
}

impl ActorContext {
    pub fn new(actor_id: UserId) -> Self {
        Self { actor_id }
    }

    pub fn actor_id(&self) -> UserId {
        self.actor_id
    }

    /// Metadata stamp for a change made now by this actor.
    pub fn stamp(&self) -> Stamp {
        Stamp::now(self.actor_id)
    }
}
