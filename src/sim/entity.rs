//! Bouncing puck entity and its motion cycle
//!
//! An entity owns its rectangle, heading and speed. Its cycle is:
//! solve the next collision, emit the leg to the scheduler, wait for the
//! arrival, reflect, repeat. Nothing outside the entity mutates its state.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::{contact_position, reflect, solve_rect};
use super::direction::DirectionGenerator;
use super::geometry::{Rect, Wall};
use super::scheduler::{Motion, MotionScheduler, MotionTicket};
use crate::consts::{DEFAULT_SPEED, MIN_SPEED, SPEED_STEP};
use crate::error::BounceError;

/// Stable entity handle, assigned in launch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an entity is in its motion cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPhase {
    /// Created, no heading yet
    Uninitialized,
    /// Heading drawn, first leg not yet emitted
    Launched,
    /// A leg has been emitted, waiting for its arrival
    InMotion,
    /// Arrived at a wall, next leg not yet emitted
    AtRest,
    /// Halted by a geometry error, stays in place
    Frozen,
    /// Torn down with the simulation
    Destroyed,
}

/// Travel speed and its adjustment limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSettings {
    /// Pixels per second
    pub speed: f64,
    /// Floor for any speed change
    pub min_speed: f64,
    /// Increment used by speed up / speed down
    pub step: f64,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            min_speed: MIN_SPEED,
            step: SPEED_STEP,
        }
    }
}

/// The leg currently being travelled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub ticket: MotionTicket,
    /// Top-left corner on arrival
    pub target: DVec2,
    /// Wall struck on arrival
    pub wall: Wall,
    pub t: f64,
    pub duration: f64,
}

/// Serializable view of an entity for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub rect: Rect,
    pub direction: Option<DVec2>,
    pub speed: f64,
    pub phase: MotionPhase,
    pub debug_style: bool,
    pub leg: Option<Leg>,
}

/// A puck bouncing inside the shared boundary
#[derive(Debug, Clone)]
pub struct BounceEntity {
    id: EntityId,
    rect: Rect,
    direction: Option<DVec2>,
    speed: SpeedSettings,
    phase: MotionPhase,
    leg: Option<Leg>,
    sequence: u64,
    directions: DirectionGenerator,
    debug_style: bool,
}

impl BounceEntity {
    /// Create an entity; `seed` drives its launch heading
    pub fn new(id: EntityId, rect: Rect, speed: SpeedSettings, seed: u64) -> Self {
        let mut entity = Self {
            id,
            rect,
            direction: None,
            speed,
            phase: MotionPhase::Uninitialized,
            leg: None,
            sequence: 0,
            directions: DirectionGenerator::new(seed),
            debug_style: false,
        };
        // Apply the floor to the initial speed as well
        entity.set_speed(speed.speed);
        entity
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn direction(&self) -> Option<DVec2> {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed.speed
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Leg awaiting arrival, if any
    pub fn leg(&self) -> Option<&Leg> {
        self.leg.as_ref()
    }

    pub fn is_debug_style(&self) -> bool {
        self.debug_style
    }

    /// Draw a heading and emit the first leg
    pub fn launch<S: MotionScheduler + ?Sized>(
        &mut self,
        boundary: &Rect,
        scheduler: &mut S,
    ) -> Result<(), BounceError> {
        if self.phase != MotionPhase::Uninitialized {
            return Err(self.invalid_state("launch"));
        }

        let direction = match self.directions.next() {
            Ok(d) => d,
            Err(e) => return Err(self.freeze(e)),
        };
        self.direction = Some(direction);
        self.phase = MotionPhase::Launched;

        log::info!(
            "Launching entity {} from {} with vector ({}, {})",
            self.id,
            self.rect,
            direction.x,
            direction.y
        );

        self.emit_next_leg(direction, boundary, scheduler)
    }

    /// Complete the current leg: move onto the wall, reflect, emit the next
    ///
    /// Arrivals for anything but the current leg are ignored, as are
    /// arrivals after the entity froze or was destroyed.
    pub fn on_arrival<S: MotionScheduler + ?Sized>(
        &mut self,
        ticket: MotionTicket,
        boundary: &Rect,
        scheduler: &mut S,
    ) -> Result<(), BounceError> {
        let leg = match self.leg {
            Some(leg) if self.phase == MotionPhase::InMotion && leg.ticket == ticket => leg,
            _ => {
                log::warn!(
                    "Entity {} ignoring stale arrival {} while {:?}",
                    self.id,
                    ticket.sequence,
                    self.phase
                );
                return Ok(());
            }
        };

        let Some(incident) = self.direction else {
            return Err(self.freeze(self.invalid_state("arrive")));
        };

        self.leg = None;
        self.rect.set_position(leg.target);
        self.phase = MotionPhase::AtRest;

        let reflected = reflect(incident, leg.wall);
        self.direction = Some(reflected);
        log::debug!(
            "Entity {} hit {} wall, reflection vector is ({}, {})",
            self.id,
            leg.wall,
            reflected.x,
            reflected.y
        );

        self.emit_next_leg(reflected, boundary, scheduler)
    }

    fn emit_next_leg<S: MotionScheduler + ?Sized>(
        &mut self,
        direction: DVec2,
        boundary: &Rect,
        scheduler: &mut S,
    ) -> Result<(), BounceError> {
        let collision = match solve_rect(&self.rect, direction, boundary) {
            Ok(c) => c,
            Err(e) => return Err(self.freeze(e)),
        };

        let from = self.rect.position();
        let target = contact_position(&self.rect, direction, collision, boundary);
        // Duration is fixed here; later speed changes apply to later legs
        let duration = from.distance(target) / self.speed.speed;

        log::debug!(
            "Collision Point Calculation: rect[{}, {}] + {} * ({}, {}) = ({}, {}) in {}s",
            from.x,
            from.y,
            collision.t,
            direction.x,
            direction.y,
            target.x,
            target.y,
            duration
        );

        self.sequence += 1;
        let ticket = MotionTicket {
            entity: self.id,
            sequence: self.sequence,
        };
        self.leg = Some(Leg {
            ticket,
            target,
            wall: collision.wall,
            t: collision.t,
            duration,
        });
        self.phase = MotionPhase::InMotion;

        scheduler.schedule_motion(Motion {
            ticket,
            from,
            to: target,
            duration,
        });
        Ok(())
    }

    fn freeze(&mut self, error: BounceError) -> BounceError {
        log::error!("Entity {} frozen at {}: {}", self.id, self.rect, error);
        self.phase = MotionPhase::Frozen;
        self.leg = None;
        error
    }

    fn invalid_state(&self, operation: &'static str) -> BounceError {
        BounceError::InvalidState {
            entity: self.id,
            phase: self.phase,
            operation,
        }
    }

    /// Set the speed for future legs, floored at the minimum speed
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            log::warn!("Entity {} ignoring non-finite speed {}", self.id, speed);
            return;
        }
        self.speed.speed = speed.max(self.speed.min_speed);
    }

    pub fn speed_up(&mut self) {
        self.set_speed(self.speed.speed + self.speed.step);
    }

    pub fn speed_down(&mut self) {
        self.set_speed(self.speed.speed - self.speed.step);
    }

    /// Flip the debug outline flag; returns the new value
    pub fn toggle_debug_style(&mut self) -> bool {
        self.debug_style = !self.debug_style;
        self.debug_style
    }

    pub fn set_debug_style(&mut self, enabled: bool) {
        self.debug_style = enabled;
    }

    /// Terminal state; later arrivals are ignored
    pub fn destroy(&mut self) {
        self.phase = MotionPhase::Destroyed;
        self.leg = None;
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            rect: self.rect,
            direction: self.direction,
            speed: self.speed.speed,
            phase: self.phase,
            debug_style: self.debug_style,
            leg: self.leg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scheduler::VirtualScheduler;

    fn boundary() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    fn entity(seed: u64) -> BounceEntity {
        BounceEntity::new(
            EntityId(1),
            Rect::new(480.0, 335.0, 40.0, 130.0),
            SpeedSettings::default(),
            seed,
        )
    }

    #[test]
    fn test_launch_emits_first_leg() {
        let mut e = entity(3);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();

        assert_eq!(e.phase(), MotionPhase::InMotion);
        let direction = e.direction().unwrap();
        assert!((direction.length() - 1.0).abs() < 1e-9);

        let motions: Vec<Motion> = scheduler.pending_for(e.id()).copied().collect();
        assert_eq!(motions.len(), 1);
        let motion = motions[0];
        assert_eq!(motion.from, e.rect().position());
        let expected = motion.from.distance(motion.to) / DEFAULT_SPEED;
        assert!((motion.duration - expected).abs() < 1e-12);
        assert_eq!(e.leg().unwrap().ticket, motion.ticket);
    }

    #[test]
    fn test_launch_twice_is_rejected() {
        let mut e = entity(3);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();
        let err = e.launch(&boundary(), &mut scheduler).unwrap_err();
        assert!(matches!(err, BounceError::InvalidState { operation: "launch", .. }));
        // Still running
        assert_eq!(e.phase(), MotionPhase::InMotion);
        assert_eq!(scheduler.pending_len(), 1);
    }

    #[test]
    fn test_arrival_moves_and_reflects() {
        let mut e = entity(11);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();

        let incident = e.direction().unwrap();
        let leg = *e.leg().unwrap();
        let motion = scheduler.next_arrival().unwrap();
        e.on_arrival(motion.ticket, &boundary(), &mut scheduler).unwrap();

        assert_eq!(e.rect().position(), leg.target);
        assert_eq!(e.direction().unwrap(), reflect(incident, leg.wall));
        assert_eq!(e.phase(), MotionPhase::InMotion);
        assert_eq!(scheduler.pending_len(), 1);
    }

    #[test]
    fn test_stale_arrival_is_ignored() {
        let mut e = entity(5);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();
        let first = scheduler.next_arrival().unwrap();
        e.on_arrival(first.ticket, &boundary(), &mut scheduler).unwrap();

        let before = e.snapshot();
        // Delivering the first leg again must not move anything
        e.on_arrival(first.ticket, &boundary(), &mut scheduler).unwrap();
        assert_eq!(e.snapshot(), before);
        assert_eq!(scheduler.pending_len(), 1);
    }

    #[test]
    fn test_arrival_before_launch_is_ignored() {
        let mut e = entity(5);
        let mut scheduler = VirtualScheduler::new();
        let ticket = MotionTicket {
            entity: e.id(),
            sequence: 1,
        };
        e.on_arrival(ticket, &boundary(), &mut scheduler).unwrap();
        assert_eq!(e.phase(), MotionPhase::Uninitialized);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_destroyed_ignores_arrival() {
        let mut e = entity(5);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();
        e.destroy();
        let motion = scheduler.next_arrival().unwrap();
        let rect = *e.rect();
        e.on_arrival(motion.ticket, &boundary(), &mut scheduler).unwrap();
        assert_eq!(e.phase(), MotionPhase::Destroyed);
        assert_eq!(*e.rect(), rect);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_speed_floor_and_steps() {
        let mut e = entity(1);
        e.set_speed(5.0);
        assert_eq!(e.speed(), MIN_SPEED);
        e.speed_down();
        assert_eq!(e.speed(), MIN_SPEED);
        e.speed_up();
        assert_eq!(e.speed(), MIN_SPEED + SPEED_STEP);
        e.set_speed(f64::NAN);
        assert_eq!(e.speed(), MIN_SPEED + SPEED_STEP);
    }

    #[test]
    fn test_speed_change_keeps_in_flight_duration() {
        let mut e = entity(9);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();
        let emitted = e.leg().unwrap().duration;

        e.set_speed(DEFAULT_SPEED * 2.0);
        assert_eq!(e.leg().unwrap().duration, emitted);
        let pending: Vec<Motion> = scheduler.pending_for(e.id()).copied().collect();
        assert_eq!(pending[0].duration, emitted);

        // The next leg uses the new speed
        let motion = scheduler.next_arrival().unwrap();
        e.on_arrival(motion.ticket, &boundary(), &mut scheduler).unwrap();
        let next = scheduler.next_arrival().unwrap();
        let expected = next.from.distance(next.to) / (DEFAULT_SPEED * 2.0);
        assert!((next.duration - expected).abs() < 1e-12);
    }

    #[test]
    fn test_debug_toggle_is_orthogonal() {
        let mut e = entity(1);
        assert!(e.toggle_debug_style());
        assert!(e.is_debug_style());
        assert_eq!(e.phase(), MotionPhase::Uninitialized);
        assert!(!e.toggle_debug_style());
    }

    #[test]
    fn test_out_of_bounds_freezes() {
        let mut e = BounceEntity::new(
            EntityId(2),
            Rect::new(990.0, 10.0, 40.0, 40.0),
            SpeedSettings::default(),
            1,
        );
        let mut scheduler = VirtualScheduler::new();
        let err = e.launch(&boundary(), &mut scheduler).unwrap_err();
        assert!(matches!(err, BounceError::OutOfBounds { .. }));
        assert_eq!(e.phase(), MotionPhase::Frozen);
        assert!(scheduler.is_idle());
        // Frozen in place
        assert_eq!(e.rect().position(), DVec2::new(990.0, 10.0));
    }

    #[test]
    fn test_arrival_out_of_bounds_freezes() {
        let mut e = entity(2);
        let mut scheduler = VirtualScheduler::new();
        e.launch(&boundary(), &mut scheduler).unwrap();
        let motion = scheduler.next_arrival().unwrap();

        // Leg target pushed past the east wall
        if let Some(leg) = e.leg.as_mut() {
            leg.target = DVec2::new(5000.0, 0.0);
        }

        let err = e
            .on_arrival(motion.ticket, &boundary(), &mut scheduler)
            .unwrap_err();
        assert!(matches!(err, BounceError::OutOfBounds { .. }));
        assert!(err.is_fatal());
        assert_eq!(e.phase(), MotionPhase::Frozen);
        assert!(e.leg().is_none());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_thousand_arrivals_stay_contained() {
        for seed in [1u64, 2, 3, 42, 2024] {
            let mut e = entity(seed);
            let bounds = boundary();
            let mut scheduler = VirtualScheduler::new();
            e.launch(&bounds, &mut scheduler).unwrap();

            for _ in 0..1_000 {
                let motion = scheduler.next_arrival().unwrap();
                e.on_arrival(motion.ticket, &bounds, &mut scheduler).unwrap();
                assert!(bounds.contains_rect(e.rect()), "escaped: {}", e.rect());
                assert!((e.direction().unwrap().length() - 1.0).abs() < 1e-9);
            }
            assert_eq!(e.rect().width, 40.0);
            assert_eq!(e.rect().height, 130.0);
        }
    }
}
