//! Geometric primitives for diagram layout.
//!
//! This module provides the geometric types used by the layout engine to
//! describe where each diagram element sits on the canvas.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! tfgraph uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward

use serde::{Serialize, Serializer, ser::SerializeStruct};

/// A 2D point in canvas coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Clamps a computed dimension to `min`, replacing NaN with `min`.
pub fn clamp_dimension(value: f32, min: f32) -> f32 {
    if value.is_nan() { min } else { value.max(min) }
}

/// An axis-aligned rectangle with minimum and maximum coordinates.
///
/// # Examples
///
/// ```
/// # use tfgraph_core::geometry::{Bounds, Point, Size};
/// let outer = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
/// let inner = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(20.0, 20.0));
///
/// assert!(outer.contains(&inner));
/// assert!(outer.intersects(&inner));
/// assert!(!inner.contains(&outer));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Shrinks the bounds by the given insets.
    ///
    /// The result never inverts: when the insets exceed the available space
    /// the affected axis collapses onto its midpoint.
    pub fn shrink(self, insets: Insets) -> Self {
        let mut min_x = self.min_x + insets.left;
        let mut max_x = self.max_x - insets.right;
        if min_x > max_x {
            min_x = ((min_x + max_x) / 2.0).clamp(self.min_x, self.max_x);
            max_x = min_x;
        }
        let mut min_y = self.min_y + insets.top;
        let mut max_y = self.max_y - insets.bottom;
        if min_y > max_y {
            min_y = ((min_y + max_y) / 2.0).clamp(self.min_y, self.max_y);
            max_y = min_y;
        }
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Returns `true` if `other` lies entirely within these bounds.
    ///
    /// Edges are inclusive and compared with a small tolerance so that
    /// rectangles computed by repeated float additions still qualify.
    pub fn contains(&self, other: &Bounds) -> bool {
        const EPSILON: f32 = 0.01;
        other.min_x >= self.min_x - EPSILON
            && other.min_y >= self.min_y - EPSILON
            && other.max_x <= self.max_x + EPSILON
            && other.max_y <= self.max_y + EPSILON
    }

    /// Returns `true` if the interiors of the two bounds overlap.
    ///
    /// Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        const EPSILON: f32 = 0.01;
        self.min_x < other.max_x - EPSILON
            && other.min_x < self.max_x - EPSILON
            && self.min_y < other.max_y - EPSILON
            && other.min_y < self.max_y - EPSILON
    }
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Bounds", 4)?;
        state.serialize_field("x", &self.min_x)?;
        state.serialize_field("y", &self.min_y)?;
        state.serialize_field("width", &self.width())?;
        state.serialize_field("height", &self.height())?;
        state.end()
    }
}

/// Represents spacing around an element (padding, margin, etc.)
/// with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}
