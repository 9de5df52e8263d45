//! 2D vector primitives for the simulation
//!
//! `Vector2D` is a continuous position or heading, `TileCoord` addresses a
//! cell of the track grid. The y axis grows downward, like the rows of a
//! track layout.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A continuous 2D vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        (*other - *self).length()
    }

    pub fn dot(&self, other: &Vector2D) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit vector with the same direction, or zero for the zero vector
    pub fn normalize(&self) -> Vector2D {
        let length = self.length();
        if length == 0.0 {
            return Vector2D::ZERO;
        }
        Vector2D::new(self.x / length, self.y / length)
    }

    /// Unsigned angle to another vector, in degrees
    ///
    /// Returns 0 when either vector is zero.
    pub fn angle_between(&self, other: &Vector2D) -> f32 {
        let lengths = self.length() * other.length();
        if lengths == 0.0 {
            return 0.0;
        }
        // acos is undefined past +-1, which float error can reach for parallel vectors
        let cos = (self.dot(other) / lengths).clamp(-1.0, 1.0);
        cos.acos().to_degrees()
    }

    /// Rotate by `degrees`; positive is clockwise on screen (y down)
    pub fn rotate(&self, degrees: f32) -> Vector2D {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vector2D::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Vector2D) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2D {
    type Output = Vector2D;

    fn mul(self, rhs: f32) -> Vector2D {
        Vector2D::new(self.x * rhs, self.y * rhs)
    }
}

impl From<TileCoord> for Vector2D {
    fn from(tile: TileCoord) -> Self {
        Vector2D::new(tile.x as f32, tile.y as f32)
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x{:.2}, y{:.2})", self.x, self.y)
    }
}

/// Integer coordinate of a track tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile containing a continuous point
    pub fn containing(position: Vector2D) -> Self {
        TileCoord::new(position.x.floor() as i32, position.y.floor() as i32)
    }

    /// Continuous coordinate of the tile's center
    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

impl Add for TileCoord {
    type Output = TileCoord;

    fn add(self, rhs: TileCoord) -> TileCoord {
        TileCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for TileCoord {
    fn add_assign(&mut self, rhs: TileCoord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<i32> for TileCoord {
    type Output = TileCoord;

    fn mul(self, rhs: i32) -> TileCoord {
        TileCoord::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
