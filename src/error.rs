//! Error types for the bounce core.
//!
//! Geometry errors are invariant violations, not transient faults: the
//! entity that hits one freezes and the simulation keeps the others running.

use std::fmt;

use glam::DVec2;

use crate::sim::{EntityId, MotionPhase, Rect};

/// Errors raised by the solvers, entities and simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum BounceError {
    /// Normalizing a zero-length (or non-finite) vector.
    DegenerateVector(DVec2),
    /// Solver starting point lies outside the boundary.
    OutOfBounds { point: DVec2, boundary: Rect },
    /// No wall qualified as the next hit.
    NoCollisionFound { point: DVec2, direction: DVec2 },
    /// A wall name or index that does not denote one of the four walls.
    UnknownWall(String),
    /// Operation not permitted in the entity's current phase.
    InvalidState {
        entity: EntityId,
        phase: MotionPhase,
        operation: &'static str,
    },
    /// Boundary with non-positive or non-finite dimensions.
    InvalidBoundary { width: f64, height: f64 },
    /// Puck size multiplier that is not a positive finite number.
    InvalidSizeMultiplier(f64),
}

impl BounceError {
    /// Whether the error must halt the affected entity's motion cycle.
    pub fn is_fatal(&self) -> bool {
        match self {
            BounceError::DegenerateVector(_)
            | BounceError::OutOfBounds { .. }
            | BounceError::NoCollisionFound { .. }
            | BounceError::UnknownWall(_) => true,
            BounceError::InvalidState { .. }
            | BounceError::InvalidBoundary { .. }
            | BounceError::InvalidSizeMultiplier(_) => false,
        }
    }
}

impl fmt::Display for BounceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BounceError::DegenerateVector(v) => {
                write!(f, "Cannot normalize degenerate vector ({}, {})", v.x, v.y)
            }
            BounceError::OutOfBounds { point, boundary } => write!(
                f,
                "Starting point ({}, {}) not situated within the bounding box {}",
                point.x, point.y, boundary
            ),
            BounceError::NoCollisionFound { point, direction } => write!(
                f,
                "Could not determine collision t for vector ({}, {}) from starting point ({}, {})",
                direction.x, direction.y, point.x, point.y
            ),
            BounceError::UnknownWall(name) => write!(f, "Unknown wall \"{}\"", name),
            BounceError::InvalidState {
                entity,
                phase,
                operation,
            } => write!(
                f,
                "Entity {} cannot {} while {:?}",
                entity, operation, phase
            ),
            BounceError::InvalidBoundary { width, height } => {
                write!(f, "Invalid boundary dimensions {}x{}", width, height)
            }
            BounceError::InvalidSizeMultiplier(m) => {
                write!(f, "Invalid puck size multiplier {}", m)
            }
        }
    }
}

impl std::error::Error for BounceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(BounceError::DegenerateVector(DVec2::ZERO).is_fatal());
        assert!(BounceError::UnknownWall("up".into()).is_fatal());
        assert!(
            BounceError::NoCollisionFound {
                point: DVec2::ZERO,
                direction: DVec2::X,
            }
            .is_fatal()
        );
        assert!(
            !BounceError::InvalidState {
                entity: EntityId(1),
                phase: MotionPhase::InMotion,
                operation: "launch",
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_display_mentions_inputs() {
        let err = BounceError::OutOfBounds {
            point: DVec2::new(-5.0, 3.0),
            boundary: Rect::new(0.0, 0.0, 100.0, 100.0),
        };
        let msg = err.to_string();
        assert!(msg.contains("-5"));
        assert!(msg.contains("100"));
    }
}
