//! Bounce Core - screensaver-style pucks bouncing inside a rectangle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision solving, reflection, entity cycles)
//! - `settings`: Configuration surface handed in by the host
//! - `error`: Geometry and state errors surfaced by the core

pub mod error;
pub mod settings;
pub mod sim;

pub use error::BounceError;
pub use settings::{ImageSize, Settings, SettingsError};

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Default travel speed (pixels per second)
    pub const DEFAULT_SPEED: f64 = 300.0;
    /// Speed floor so leg durations stay finite
    pub const MIN_SPEED: f64 = 10.0;
    /// Speed change per speed-up / speed-down request
    pub const SPEED_STEP: f64 = 20.0;

    /// Puck width as a fraction of the native image width
    pub const DEFAULT_SIZE_MULTIPLIER: f64 = 0.15;
    /// Largest puck extent relative to the smaller boundary dimension
    pub const MAX_BOUNDARY_FRACTION: f64 = 0.95;
    /// Puck footprint used when no image is configured
    pub const FALLBACK_PUCK_SIZE: f64 = 200.0;

    /// Default display resolution
    pub const DEFAULT_DISPLAY_WIDTH: f64 = 1920.0;
    pub const DEFAULT_DISPLAY_HEIGHT: f64 = 1080.0;

    /// Native dimensions of the default logo
    pub const DEFAULT_IMAGE_WIDTH: f64 = 400.0;
    pub const DEFAULT_IMAGE_HEIGHT: f64 = 130.0;

    /// Points this far outside the boundary still count as on the edge
    pub const BOUNDARY_EPSILON: f64 = 1e-7;
    /// Travel distances at or below this count as "behind" the point
    pub const T_EPSILON: f64 = 1e-9;
    /// An edge this close to a wall is in contact with it
    pub const CONTACT_EPSILON: f64 = 1e-6;
}

/// Unit heading for an angle, measured clockwise from +Y (screen down)
///
/// Returns `(sin θ, cos θ)`, matching how launch angles are drawn.
#[inline]
pub fn direction_from_angle(theta: f64) -> DVec2 {
    DVec2::new(theta.sin(), theta.cos())
}

/// Angle of a heading, inverse of [`direction_from_angle`], in [0, 2π)
#[inline]
pub fn angle_of_direction(direction: DVec2) -> f64 {
    direction.x.atan2(direction.y).rem_euclid(std::f64::consts::TAU)
}
