//! Simulation owning the boundary and its pucks
//!
//! Entities share only the read-only boundary. A failing entity freezes and
//! is recorded; the rest keep bouncing.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::entity::{BounceEntity, EntityId, EntitySnapshot, MotionPhase, SpeedSettings};
use super::geometry::Rect;
use super::scheduler::{MotionScheduler, MotionTicket, VirtualScheduler};
use crate::consts::{DEFAULT_SIZE_MULTIPLIER, FALLBACK_PUCK_SIZE, MAX_BOUNDARY_FRACTION};
use crate::error::BounceError;
use crate::settings::{ImageSize, Settings};

/// An entity halted by a geometry error
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub entity: EntityId,
    pub error: BounceError,
}

/// Serializable view of the whole simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub boundary: Rect,
    pub entities: Vec<EntitySnapshot>,
    /// Frozen entities and the reason
    pub failures: Vec<(EntityId, String)>,
    pub torn_down: bool,
}

/// Bounce simulation: one boundary, any number of independent pucks
#[derive(Debug, Clone)]
pub struct BounceSimulation {
    boundary: Rect,
    speed: SpeedSettings,
    puck_image: Option<ImageSize>,
    rng: Pcg32,
    /// Launch order
    entities: Vec<BounceEntity>,
    failures: Vec<EntityFailure>,
    next_id: u32,
    torn_down: bool,
}

impl BounceSimulation {
    /// Create an empty simulation; the boundary must have positive size
    pub fn new(
        boundary: Rect,
        speed: SpeedSettings,
        puck_image: Option<ImageSize>,
        seed: u64,
    ) -> Result<Self, BounceError> {
        if !boundary.is_valid_boundary() {
            return Err(BounceError::InvalidBoundary {
                width: boundary.width,
                height: boundary.height,
            });
        }
        log::info!("Simulation boundary {} with seed {}", boundary, seed);
        Ok(Self {
            boundary,
            speed,
            puck_image,
            rng: Pcg32::seed_from_u64(seed),
            entities: Vec::new(),
            failures: Vec::new(),
            next_id: 1,
            torn_down: false,
        })
    }

    /// Build the boundary and pucks described by `settings`
    ///
    /// Settings are expected to be validated already.
    pub fn from_settings(settings: &Settings) -> Result<Self, BounceError> {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut sim = Self::new(
            settings.boundary(),
            settings.speed_settings(),
            settings.puck_image,
            seed,
        )?;

        sim.add_entity(None, settings.primary_size_multiplier)?;
        if settings.secondary_enabled {
            sim.add_entity(None, settings.secondary_size_multiplier)?;
        }
        if settings.debug_style {
            sim.entities.iter_mut().for_each(|e| e.set_debug_style(true));
        }
        Ok(sim)
    }

    pub fn boundary(&self) -> &Rect {
        &self.boundary
    }

    pub fn entities(&self) -> &[BounceEntity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&BounceEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut BounceEntity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn failures(&self) -> &[EntityFailure] {
        &self.failures
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Puck size for a multiplier, clamped to the boundary
    ///
    /// With an image the width is `native * 0.15 * multiplier` and the height
    /// follows the image's aspect ratio; otherwise the square fallback puck is
    /// scaled. The larger side never exceeds 95% of the smaller boundary side.
    pub fn puck_size(&self, size_multiplier: f64) -> (f64, f64) {
        let (width, height) = match self.puck_image {
            Some(image) => {
                let width = image.width * DEFAULT_SIZE_MULTIPLIER * size_multiplier;
                (width, width * image.aspect_ratio())
            }
            None => (
                FALLBACK_PUCK_SIZE * size_multiplier,
                FALLBACK_PUCK_SIZE * size_multiplier,
            ),
        };

        let limit = MAX_BOUNDARY_FRACTION * self.boundary.width.min(self.boundary.height);
        let largest = width.max(height);
        if largest > limit {
            let scale = limit / largest;
            log::warn!(
                "Puck {}x{} exceeds the boundary, scaling to {}x{}",
                width,
                height,
                width * scale,
                height * scale
            );
            (width * scale, height * scale)
        } else {
            (width, height)
        }
    }

    /// Add a puck at `initial_position` (top-left) or a random spot
    ///
    /// The puck is always placed fully inside the boundary.
    pub fn add_entity(
        &mut self,
        initial_position: Option<DVec2>,
        size_multiplier: f64,
    ) -> Result<EntityId, BounceError> {
        if self.torn_down {
            return Err(BounceError::InvalidState {
                entity: EntityId(self.next_id),
                phase: MotionPhase::Destroyed,
                operation: "be added",
            });
        }
        if !(size_multiplier.is_finite() && size_multiplier > 0.0) {
            return Err(BounceError::InvalidSizeMultiplier(size_multiplier));
        }

        let (width, height) = self.puck_size(size_multiplier);
        let position = match initial_position {
            Some(requested) => {
                let clamped = self.boundary.clamp_position(requested, width, height);
                if clamped != requested {
                    log::warn!(
                        "Initial position ({}, {}) moved to ({}, {}) to fit the boundary",
                        requested.x,
                        requested.y,
                        clamped.x,
                        clamped.y
                    );
                }
                clamped
            }
            None => DVec2::new(
                self.boundary.left() + self.rng.random::<f64>() * (self.boundary.width - width),
                self.boundary.top() + self.rng.random::<f64>() * (self.boundary.height - height),
            ),
        };

        let id = EntityId(self.next_id);
        self.next_id += 1;
        let seed = self.rng.random::<u64>();
        let rect = Rect::from_position(position, width, height);
        log::info!("Added entity {} at {}", id, rect);

        self.entities.push(BounceEntity::new(id, rect, self.speed, seed));
        Ok(id)
    }

    /// Launch every entity that has not been launched yet
    ///
    /// Returns how many entities are now in motion from this call.
    pub fn start<S: MotionScheduler + ?Sized>(&mut self, scheduler: &mut S) -> usize {
        if self.torn_down {
            log::warn!("Ignoring start on a torn down simulation");
            return 0;
        }

        let mut launched = 0;
        for entity in &mut self.entities {
            if entity.phase() != MotionPhase::Uninitialized {
                continue;
            }
            match entity.launch(&self.boundary, scheduler) {
                Ok(()) => launched += 1,
                Err(error) => Self::record(&mut self.failures, entity.id(), error),
            }
        }
        log::info!("Started {} of {} entities", launched, self.entities.len());
        launched
    }

    /// Route an arrival to its entity
    ///
    /// Arrivals after teardown or for unknown entities are ignored.
    pub fn on_arrival<S: MotionScheduler + ?Sized>(
        &mut self,
        ticket: MotionTicket,
        scheduler: &mut S,
    ) {
        if self.torn_down {
            log::debug!("Ignoring arrival for {} after teardown", ticket.entity);
            return;
        }
        let Some(entity) = self.entities.iter_mut().find(|e| e.id() == ticket.entity) else {
            log::warn!("Arrival for unknown entity {}", ticket.entity);
            return;
        };
        if let Err(error) = entity.on_arrival(ticket, &self.boundary, scheduler) {
            Self::record(&mut self.failures, ticket.entity, error);
        }
    }

    fn record(failures: &mut Vec<EntityFailure>, entity: EntityId, error: BounceError) {
        if error.is_fatal() {
            log::error!("Entity {} halted: {}", entity, error);
            failures.push(EntityFailure { entity, error });
        } else {
            log::warn!("Entity {}: {}", entity, error);
        }
    }

    /// Deliver up to `max_arrivals` arrivals from a virtual scheduler
    ///
    /// Returns the number delivered; fewer means the scheduler ran dry.
    pub fn run_arrivals(
        &mut self,
        scheduler: &mut VirtualScheduler,
        max_arrivals: usize,
    ) -> usize {
        let mut delivered = 0;
        while delivered < max_arrivals {
            let Some(motion) = scheduler.next_arrival() else {
                break;
            };
            self.on_arrival(motion.ticket, scheduler);
            delivered += 1;
        }
        delivered
    }

    /// Deliver every arrival due by `time`, including legs emitted along the
    /// way, then move the virtual clock to `time`
    ///
    /// Suited to hosts that step in frames. Returns the number delivered.
    pub fn run_until(&mut self, scheduler: &mut VirtualScheduler, time: f64) -> usize {
        let mut delivered = 0;
        while let Some(motion) = scheduler.next_arrival_by(time) {
            self.on_arrival(motion.ticket, scheduler);
            delivered += 1;
        }
        scheduler.advance_to(time);
        delivered
    }

    /// Speed for future legs of every entity
    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            log::warn!("Ignoring non-finite speed {}", speed);
            return;
        }
        self.speed.speed = speed.max(self.speed.min_speed);
        self.entities.iter_mut().for_each(|e| e.set_speed(speed));
    }

    pub fn speed_up(&mut self) {
        self.set_speed(self.speed.speed + self.speed.step);
    }

    pub fn speed_down(&mut self) {
        self.set_speed(self.speed.speed - self.speed.step);
    }

    /// Current simulation-wide speed (used for newly added entities)
    pub fn speed(&self) -> f64 {
        self.speed.speed
    }

    /// Flip every entity's debug outline
    pub fn toggle_debug_style(&mut self) {
        self.entities.iter_mut().for_each(|e| {
            e.toggle_debug_style();
        });
    }

    /// Destroy every entity; later arrivals become no-ops
    ///
    /// Resizing is not supported: build a new simulation instead.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.entities.iter_mut().for_each(BounceEntity::destroy);
        self.torn_down = true;
        log::info!("Simulation torn down ({} entities)", self.entities.len());
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            boundary: self.boundary,
            entities: self.entities.iter().map(BounceEntity::snapshot).collect(),
            failures: self
                .failures
                .iter()
                .map(|f| (f.entity, f.error.to_string()))
                .collect(),
            torn_down: self.torn_down,
        }
    }
}
