//! Vectors, rectangles and walls
//!
//! Plain value types shared by the solvers. Vectors are `glam::DVec2`;
//! the arithmetic (add, scale, distance) comes from glam's operators.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::BOUNDARY_EPSILON;
use crate::error::BounceError;

/// 2D vector used for positions and headings
pub type Vector2 = DVec2;

/// Normalize to unit length, refusing zero-length or non-finite vectors
pub fn normalize(v: DVec2) -> Result<DVec2, BounceError> {
    v.try_normalize().ok_or(BounceError::DegenerateVector(v))
}

/// Axis-aligned rectangle, `(x, y)` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at `position` with the given size
    pub fn from_position(position: DVec2, width: f64, height: f64) -> Self {
        Self::new(position.x, position.y, width, height)
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Corners in solver order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.left(), self.top()),
            DVec2::new(self.right(), self.top()),
            DVec2::new(self.right(), self.bottom()),
            DVec2::new(self.left(), self.bottom()),
        ]
    }

    /// Move the top-left corner, size is untouched
    pub fn set_position(&mut self, position: DVec2) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Usable size: both dimensions finite and strictly positive
    pub fn is_valid_boundary(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Point inside or on the edge, allowing `BOUNDARY_EPSILON` of slack
    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.left() - BOUNDARY_EPSILON
            && p.x <= self.right() + BOUNDARY_EPSILON
            && p.y >= self.top() - BOUNDARY_EPSILON
            && p.y <= self.bottom() + BOUNDARY_EPSILON
    }

    /// `other` lies fully inside (touching allowed)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.corners().iter().all(|c| self.contains_point(*c))
    }

    /// Clamp a point onto the rectangle
    pub fn clamp_point(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            p.x.clamp(self.left(), self.right()),
            p.y.clamp(self.top(), self.bottom()),
        )
    }

    /// Clamp a top-left position so a `width` x `height` box fits inside
    pub fn clamp_position(&self, position: DVec2, width: f64, height: f64) -> DVec2 {
        let max_x = (self.right() - width).max(self.left());
        let max_y = (self.bottom() - height).max(self.top());
        DVec2::new(
            position.x.clamp(self.left(), max_x),
            position.y.clamp(self.top(), max_y),
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect[x={}, y={}, width={}, height={}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Boundary edge that was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    North,
    East,
    South,
    West,
}

impl Wall {
    /// Evaluation order; ties resolve to the earlier wall
    pub const ALL: [Wall; 4] = [Wall::North, Wall::East, Wall::South, Wall::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Wall::North => "north",
            Wall::East => "east",
            Wall::South => "south",
            Wall::West => "west",
        }
    }

    /// Whether the wall runs horizontally (North/South)
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Wall::North | Wall::South)
    }

    /// Coordinate of the wall's line (y for North/South, x for East/West)
    pub fn coordinate(&self, boundary: &Rect) -> f64 {
        match self {
            Wall::North => boundary.top(),
            Wall::East => boundary.right(),
            Wall::South => boundary.bottom(),
            Wall::West => boundary.left(),
        }
    }

    /// Outward normal (pointing out of the boundary, screen coordinates)
    pub fn outward_normal(&self) -> DVec2 {
        match self {
            Wall::North => DVec2::NEG_Y,
            Wall::East => DVec2::X,
            Wall::South => DVec2::Y,
            Wall::West => DVec2::NEG_X,
        }
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Wall {
    type Err = BounceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "top" => Ok(Wall::North),
            "east" | "e" | "right" => Ok(Wall::East),
            "south" | "s" | "bottom" => Ok(Wall::South),
            "west" | "w" | "left" => Ok(Wall::West),
            _ => Err(BounceError::UnknownWall(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Wall {
    type Error = BounceError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Wall::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| BounceError::UnknownWall(index.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let v = normalize(DVec2::new(3.0, 4.0)).unwrap();
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.y - 0.8).abs() < 1e-12);
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_fails() {
        assert_eq!(
            normalize(DVec2::ZERO),
            Err(BounceError::DegenerateVector(DVec2::ZERO))
        );
        assert!(normalize(DVec2::new(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn test_vector_ops() {
        let a = DVec2::new(1.0, 2.0);
        let b = DVec2::new(4.0, 6.0);
        assert_eq!(a + b, DVec2::new(5.0, 8.0));
        assert_eq!(a * 3.0, DVec2::new(3.0, 6.0));
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rect_corners_order() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        let [tl, tr, br, bl] = r.corners();
        assert_eq!(tl, DVec2::new(10.0, 20.0));
        assert_eq!(tr, DVec2::new(40.0, 20.0));
        assert_eq!(br, DVec2::new(40.0, 60.0));
        assert_eq!(bl, DVec2::new(10.0, 60.0));
    }

    #[test]
    fn test_contains() {
        let boundary = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(boundary.contains_point(DVec2::new(100.0, 0.0)));
        assert!(!boundary.contains_point(DVec2::new(100.1, 0.0)));
        assert!(boundary.contains_rect(&Rect::new(0.0, 80.0, 100.0, 20.0)));
        assert!(!boundary.contains_rect(&Rect::new(-1.0, 80.0, 10.0, 10.0)));
    }

    #[test]
    fn test_clamp_position() {
        let boundary = Rect::new(0.0, 0.0, 100.0, 50.0);
        let p = boundary.clamp_position(DVec2::new(95.0, -3.0), 20.0, 10.0);
        assert_eq!(p, DVec2::new(80.0, 0.0));
    }

    #[test]
    fn test_wall_parsing() {
        assert_eq!("North".parse::<Wall>(), Ok(Wall::North));
        assert_eq!("left".parse::<Wall>(), Ok(Wall::West));
        assert_eq!(
            "up".parse::<Wall>(),
            Err(BounceError::UnknownWall("up".to_string()))
        );
        assert_eq!(Wall::try_from(2), Ok(Wall::South));
        assert!(matches!(Wall::try_from(4), Err(BounceError::UnknownWall(_))));
    }
}
