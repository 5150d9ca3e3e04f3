#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trigger volumes the player interacts with while carrying out a heist.
//!
//! Every trigger is one of a closed set of [`PickupKind`] variants and moves
//! through an explicit [`TriggerState`] machine:
//!
//! ```text
//! Idle --enter--> Occupied --activate--> Activated
//!  ^                 |                      |
//!  +------exit-------+    (drop points return to Occupied)
//! ```
//!
//! Activation yields the gameplay [`Command`] the session should apply, so
//! the trigger never mutates playthrough state itself.

use std::collections::BTreeMap;

use heist_dda_core::{Command, PaintingId, PickupId, PlaythroughScoped};
use thiserror::Error;

/// Closed set of trigger variants placed in a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// Generic collectible with no effect on difficulty.
    Pickup,
    /// A painting that can be taken off the wall.
    StealablePickup {
        /// Painting represented by the trigger.
        painting: PaintingId,
    },
    /// Location where carried paintings are handed in.
    DropPoint,
}

/// Position of a trigger in its interaction state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerState {
    /// Nobody is inside the volume.
    Idle,
    /// The player stands inside the volume.
    Occupied,
    /// The trigger fired and cannot fire again.
    Activated,
}

/// What the player currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Carrier {
    /// Painting in hand, if any.
    pub carrying: Option<PaintingId>,
}

/// Reasons an interaction is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TriggerError {
    /// Activation requires the player to stand inside the volume.
    #[error("pickup {} activated while unoccupied", .0.get())]
    NotOccupied(PickupId),
    /// The trigger already fired.
    #[error("pickup {} already consumed", .0.get())]
    AlreadyConsumed(PickupId),
    /// The player cannot use the trigger with what they carry.
    #[error("pickup {} refused the current carrier", .0.get())]
    Refused(PickupId),
    /// No trigger with this identifier exists.
    #[error("pickup {} does not exist", .0.get())]
    Missing(PickupId),
}

/// Capability interface shared by every trigger variant.
pub trait Trigger {
    /// Reports whether `carrier` may use the trigger right now.
    fn can_be_picked_up(&self, carrier: &Carrier) -> bool;

    /// The player stepped into the volume.
    fn on_enter(&mut self);

    /// The player remains inside the volume; returns whether an interaction prompt applies.
    fn on_stay(&self, carrier: &Carrier) -> bool;

    /// The player left the volume.
    fn on_exit(&mut self);

    /// Fires the trigger, yielding the gameplay command to submit, if any.
    fn activate(&mut self, carrier: &Carrier) -> Result<Option<Command>, TriggerError>;
}

/// A single trigger volume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pickup {
    id: PickupId,
    kind: PickupKind,
    state: TriggerState,
}

impl Pickup {
    /// Creates an idle trigger.
    #[must_use]
    pub const fn new(id: PickupId, kind: PickupKind) -> Self {
        Self {
            id,
            kind,
            state: TriggerState::Idle,
        }
    }

    /// Identifier of the trigger.
    #[must_use]
    pub const fn id(&self) -> PickupId {
        self.id
    }

    /// Variant of the trigger.
    #[must_use]
    pub const fn kind(&self) -> PickupKind {
        self.kind
    }

    /// Current interaction state.
    #[must_use]
    pub const fn state(&self) -> TriggerState {
        self.state
    }
}

impl Trigger for Pickup {
    fn can_be_picked_up(&self, carrier: &Carrier) -> bool {
        if self.state == TriggerState::Activated {
            return false;
        }
        match self.kind {
            PickupKind::Pickup => true,
            PickupKind::StealablePickup { .. } => carrier.carrying.is_none(),
            PickupKind::DropPoint => carrier.carrying.is_some(),
        }
    }

    fn on_enter(&mut self) {
        if self.state == TriggerState::Idle {
            self.state = TriggerState::Occupied;
        }
    }

    fn on_stay(&self, carrier: &Carrier) -> bool {
        self.state == TriggerState::Occupied && self.can_be_picked_up(carrier)
    }

    fn on_exit(&mut self) {
        if self.state == TriggerState::Occupied {
            self.state = TriggerState::Idle;
        }
    }

    fn activate(&mut self, carrier: &Carrier) -> Result<Option<Command>, TriggerError> {
        match self.state {
            TriggerState::Idle => return Err(TriggerError::NotOccupied(self.id)),
            TriggerState::Activated => return Err(TriggerError::AlreadyConsumed(self.id)),
            TriggerState::Occupied => {}
        }
        if !self.can_be_picked_up(carrier) {
            return Err(TriggerError::Refused(self.id));
        }

        let command = match self.kind {
            PickupKind::Pickup => {
                self.state = TriggerState::Activated;
                None
            }
            PickupKind::StealablePickup { painting } => {
                self.state = TriggerState::Activated;
                Some(Command::StealPainting { painting })
            }
            PickupKind::DropPoint => carrier
                .carrying
                .map(|painting| Command::DeliverPainting { painting }),
        };
        log::debug!("pickup {} activated ({:?})", self.id.get(), self.kind);
        Ok(command)
    }
}

/// Every trigger placed in the current level.
#[derive(Clone, Debug, Default)]
pub struct PickupSet {
    pickups: BTreeMap<PickupId, Pickup>,
}

impl PickupSet {
    /// Creates a set from the provided triggers.
    #[must_use]
    pub fn new(pickups: impl IntoIterator<Item = Pickup>) -> Self {
        Self {
            pickups: pickups.into_iter().map(|pickup| (pickup.id, pickup)).collect(),
        }
    }

    /// Looks up a trigger.
    #[must_use]
    pub fn get(&self, id: PickupId) -> Option<&Pickup> {
        self.pickups.get(&id)
    }

    /// Iterates over triggers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.values()
    }

    /// Forwards an enter notification.
    pub fn enter(&mut self, id: PickupId) -> Result<(), TriggerError> {
        self.pickup_mut(id).map(Trigger::on_enter)
    }

    /// Forwards an exit notification.
    pub fn exit(&mut self, id: PickupId) -> Result<(), TriggerError> {
        self.pickup_mut(id).map(Trigger::on_exit)
    }

    /// Forwards an activation request.
    pub fn activate(
        &mut self,
        id: PickupId,
        carrier: &Carrier,
    ) -> Result<Option<Command>, TriggerError> {
        self.pickup_mut(id)?.activate(carrier)
    }

    fn pickup_mut(&mut self, id: PickupId) -> Result<&mut Pickup, TriggerError> {
        self.pickups.get_mut(&id).ok_or(TriggerError::Missing(id))
    }
}

impl PlaythroughScoped for PickupSet {
    fn reset_for_new_playthrough(&mut self) {
        for pickup in self.pickups.values_mut() {
            pickup.state = TriggerState::Idle;
        }
    }
}
