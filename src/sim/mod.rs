//! Deterministic bounce simulation module
//!
//! All motion logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - No rendering, timers or platform dependencies
//! - Entities never touch each other's state

pub mod collision;
pub mod direction;
pub mod entity;
pub mod geometry;
pub mod scheduler;
pub mod simulation;

pub use collision::{Collision, contact_position, reflect, solve_point, solve_rect};
pub use direction::DirectionGenerator;
pub use entity::{BounceEntity, EntityId, EntitySnapshot, Leg, MotionPhase, SpeedSettings};
pub use geometry::{Rect, Vector2, Wall, normalize};
pub use scheduler::{Motion, MotionScheduler, MotionTicket, VirtualScheduler};
pub use simulation::{BounceSimulation, EntityFailure, SimulationSnapshot};
