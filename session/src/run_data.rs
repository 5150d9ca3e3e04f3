use std::collections::BTreeSet;

use heist_dda_core::{PaintingId, PlaythroughScoped};
use thiserror::Error;

/// Invariant violations reported by [`RunData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RunDataError {
    /// The painting is already in the player's hands.
    #[error("painting {} is already carried", .0.get())]
    AlreadyCarried(PaintingId),
    /// The painting is not in the player's hands.
    #[error("painting {} is not carried", .0.get())]
    NotCarried(PaintingId),
}

/// Per-playthrough record of stolen and delivered paintings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunData {
    carried: BTreeSet<PaintingId>,
    delivered: Vec<PaintingId>,
}

impl RunData {
    /// Marks `painting` as carried.
    pub fn steal(&mut self, painting: PaintingId) -> Result<(), RunDataError> {
        if self.carried.insert(painting) {
            Ok(())
        } else {
            Err(RunDataError::AlreadyCarried(painting))
        }
    }

    /// Moves `painting` from the player's hands to the delivered list.
    pub fn deliver(&mut self, painting: PaintingId) -> Result<(), RunDataError> {
        if !self.carried.remove(&painting) {
            return Err(RunDataError::NotCarried(painting));
        }
        self.delivered.push(painting);
        Ok(())
    }

    /// Paintings currently carried, in identifier order.
    pub fn carried(&self) -> impl Iterator<Item = PaintingId> + '_ {
        self.carried.iter().copied()
    }

    /// Number of paintings currently carried.
    #[must_use]
    pub fn carried_count(&self) -> u32 {
        u32::try_from(self.carried.len()).unwrap_or(u32::MAX)
    }

    /// Paintings delivered so far, in delivery order.
    #[must_use]
    pub fn delivered(&self) -> &[PaintingId] {
        &self.delivered
    }
}

impl PlaythroughScoped for RunData {
    fn reset_for_new_playthrough(&mut self) {
        self.carried.clear();
        self.delivered.clear();
    }
}
