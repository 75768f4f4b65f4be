//! Motion scheduling contract
//!
//! The core never animates anything itself. Each leg is handed to a
//! [`MotionScheduler`] as a [`Motion`]; when the host has finished moving the
//! puck it reports the motion's [`MotionTicket`] back exactly once.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Identifies one emitted leg of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MotionTicket {
    pub entity: EntityId,
    /// Leg counter, increases with every emitted motion
    pub sequence: u64,
}

/// A straight-line move the host should interpolate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub ticket: MotionTicket,
    /// Top-left corner at the start of the leg
    pub from: DVec2,
    /// Top-left corner at the collision point
    pub to: DVec2,
    /// Seconds, fixed when the motion is emitted
    pub duration: f64,
}

/// Host capability that plays motions and later reports their arrival
pub trait MotionScheduler {
    fn schedule_motion(&mut self, motion: Motion);
}

#[derive(Debug, Clone)]
struct Pending {
    due: f64,
    order: u64,
    motion: Motion,
}

/// Headless scheduler driven by a virtual clock
///
/// Arrivals come out in due-time order, with insertion order breaking ties.
/// Each scheduled motion is delivered once and then forgotten.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    now: f64,
    next_order: u64,
    pending: Vec<Pending>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending motions for one entity
    pub fn pending_for(&self, entity: EntityId) -> impl Iterator<Item = &Motion> {
        self.pending
            .iter()
            .filter(move |p| p.motion.ticket.entity == entity)
            .map(|p| &p.motion)
    }

    fn earliest_index(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.order.cmp(&b.order)))
            .map(|(i, _)| i)
    }

    /// Advance the clock to the next arrival and hand it out
    pub fn next_arrival(&mut self) -> Option<Motion> {
        let index = self.earliest_index()?;
        let pending = self.pending.swap_remove(index);
        self.now = self.now.max(pending.due);
        Some(pending.motion)
    }

    /// Like [`next_arrival`](Self::next_arrival), but only for arrivals due
    /// by `time`
    ///
    /// The clock stops at the arrival's due time, so follow-up legs scheduled
    /// in response start exactly where the previous one ended.
    pub fn next_arrival_by(&mut self, time: f64) -> Option<Motion> {
        let index = self.earliest_index()?;
        if self.pending[index].due > time {
            return None;
        }
        self.next_arrival()
    }

    /// Move the clock forward to `time` once every arrival due by then has
    /// been drained
    pub fn advance_to(&mut self, time: f64) {
        if let Some(index) = self.earliest_index() {
            let due = self.pending[index].due;
            if due < time {
                log::warn!("Advancing to {:.3}s past an undelivered arrival at {:.3}s", time, due);
            }
        }
        self.now = self.now.max(time);
    }

    /// Drop an entity's pending motions so no arrival reaches it
    pub fn cancel_entity(&mut self, entity: EntityId) {
        self.pending.retain(|p| p.motion.ticket.entity != entity);
    }

    /// Drop every pending motion
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending motions", self.pending.len());
        }
        self.pending.clear();
    }
}

impl MotionScheduler for VirtualScheduler {
    fn schedule_motion(&mut self, motion: Motion) {
        let order = self.next_order;
        self.next_order += 1;
        self.pending.push(Pending {
            due: self.now + motion.duration,
            order,
            motion,
        });
    }
}
