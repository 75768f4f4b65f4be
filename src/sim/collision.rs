//! Collision solving and reflection for axis-aligned geometry
//!
//! The core of the bounce: for a point or rectangle travelling along a unit
//! heading inside a boundary, find how far it can go before touching a wall,
//! which wall that is, and how the heading changes after the bounce.

use glam::DVec2;

use super::geometry::{Rect, Wall};
use crate::consts::{BOUNDARY_EPSILON, CONTACT_EPSILON, T_EPSILON};
use crate::error::BounceError;

/// Result of a collision solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Travel distance along the heading until contact
    pub t: f64,
    /// Wall that is touched first
    pub wall: Wall,
}

fn check_heading(direction: DVec2) -> Result<(), BounceError> {
    if !direction.is_finite() || direction.length_squared() == 0.0 {
        return Err(BounceError::DegenerateVector(direction));
    }
    Ok(())
}

/// Find where a point travelling along `direction` first reaches a wall
///
/// A wall qualifies when the heading has a component toward it, the travel
/// distance is strictly positive, and the hit lies within the wall's extent.
/// A point resting on a wall it moves along or away from never re-hits it.
/// Walls are tried North, East, South, West; ties keep the earlier one.
pub fn solve_point(
    point: DVec2,
    direction: DVec2,
    boundary: &Rect,
) -> Result<Collision, BounceError> {
    check_heading(direction)?;

    if !boundary.contains_point(point) {
        return Err(BounceError::OutOfBounds {
            point,
            boundary: *boundary,
        });
    }
    // Absorb the tolerated slack so the point lies exactly inside
    let point = boundary.clamp_point(point);

    let mut best: Option<Collision> = None;

    for wall in Wall::ALL {
        let (component, origin) = if wall.is_horizontal() {
            (direction.y, point.y)
        } else {
            (direction.x, point.x)
        };

        // Parallel to the wall, it is never reached
        if component == 0.0 {
            continue;
        }

        let t = (wall.coordinate(boundary) - origin) / component;

        // Behind the point, or the wall it just departed from
        if !(t > T_EPSILON) {
            continue;
        }

        let hit = point + direction * t;
        let within = if wall.is_horizontal() {
            hit.x >= boundary.left() - BOUNDARY_EPSILON
                && hit.x <= boundary.right() + BOUNDARY_EPSILON
        } else {
            hit.y >= boundary.top() - BOUNDARY_EPSILON
                && hit.y <= boundary.bottom() + BOUNDARY_EPSILON
        };
        if !within {
            continue;
        }

        if best.is_none_or(|b| t < b.t) {
            best = Some(Collision { t, wall });
        }
    }

    best.ok_or(BounceError::NoCollisionFound { point, direction })
}

/// Rectangle edge coordinate facing the given wall
fn facing_edge(rect: &Rect, wall: Wall) -> f64 {
    match wall {
        Wall::North => rect.top(),
        Wall::East => rect.right(),
        Wall::South => rect.bottom(),
        Wall::West => rect.left(),
    }
}

/// Find where a moving rectangle first touches a wall
///
/// Every corner is solved separately and the smallest travel distance wins,
/// so the whole rectangle stops at the boundary rather than its center.
/// Corner ties resolve top-left, top-right, bottom-right, bottom-left.
///
/// A rectangle already touching a wall while heading into it reports that
/// wall with `t = 0`; exact corner hits therefore reflect both components
/// over two consecutive legs.
pub fn solve_rect(
    rect: &Rect,
    direction: DVec2,
    boundary: &Rect,
) -> Result<Collision, BounceError> {
    check_heading(direction)?;

    if let Some(outside) = rect
        .corners()
        .into_iter()
        .find(|c| !boundary.contains_point(*c))
    {
        return Err(BounceError::OutOfBounds {
            point: outside,
            boundary: *boundary,
        });
    }

    for wall in Wall::ALL {
        let gap = (facing_edge(rect, wall) - wall.coordinate(boundary)).abs();
        if gap <= CONTACT_EPSILON && direction.dot(wall.outward_normal()) > 0.0 {
            log::debug!("Rect {} rests against the {} wall, zero-length leg", rect, wall);
            return Ok(Collision { t: 0.0, wall });
        }
    }

    let corners = rect.corners();
    let mut solved = [Collision {
        t: f64::INFINITY,
        wall: Wall::North,
    }; 4];
    for (slot, corner) in solved.iter_mut().zip(corners) {
        *slot = solve_point(corner, direction, boundary)?;
    }

    let mut min = solved[0];
    for candidate in &solved[1..] {
        if candidate.t < min.t {
            min = *candidate;
        }
    }

    log::debug!(
        "Out of the t's {} (LT), {} (RT), {} (RB), and {} (LB) determined minimum t as: {} ({})",
        solved[0].t,
        solved[1].t,
        solved[2].t,
        solved[3].t,
        min.t,
        min.wall
    );

    Ok(min)
}

/// Top-left position of `rect` once it has travelled to the collision
///
/// The struck edge is placed exactly on its wall and the result is clamped
/// into the boundary, so repeated legs cannot drift outside.
pub fn contact_position(
    rect: &Rect,
    direction: DVec2,
    collision: Collision,
    boundary: &Rect,
) -> DVec2 {
    let mut target = rect.position() + direction * collision.t;
    match collision.wall {
        Wall::North => target.y = boundary.top(),
        Wall::East => target.x = boundary.right() - rect.width,
        Wall::South => target.y = boundary.bottom() - rect.height,
        Wall::West => target.x = boundary.left(),
    }
    boundary.clamp_position(target, rect.width, rect.height)
}

/// Reflect a heading off a wall
///
/// North/South flip the Y component, East/West flip the X component.
#[inline]
pub fn reflect(direction: DVec2, wall: Wall) -> DVec2 {
    if wall.is_horizontal() {
        DVec2::new(direction.x, -direction.y)
    } else {
        DVec2::new(-direction.x, direction.y)
    }
}
