//! Plain value types describing positions and collision bodies on the board.

use serde::{Deserialize, Serialize};

/// Two-dimensional vector expressed in board cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[must_use]
    pub fn add(self, other: Vec2) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    #[must_use]
    pub fn sub(self, other: Vec2) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Multiplies both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Euclidean length.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Vec2) -> f64 {
        other.sub(self).magnitude()
    }

    /// Angle of the vector in radians, measured from the positive x axis.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unit vector with the same direction.
    ///
    /// A zero-length vector normalizes to [`Vec2::ZERO`] so that idle
    /// entities never drift.
    #[must_use]
    pub fn normalize(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 || !magnitude.is_finite() {
            return Self::ZERO;
        }
        Self::new(self.x / magnitude, self.y / magnitude)
    }
}

/// Circle used for attack and aggro radii.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre of the circle.
    pub center: Vec2,
    /// Radius in board cells.
    pub radius: f64,
}

impl Circle {
    /// Creates a circle around `center`.
    #[must_use]
    pub const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// Used for static regions such as deploy zones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Reports whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Axis-aligned collision body stored as a centre plus size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    /// Horizontal position of the centre.
    pub x: f64,
    /// Vertical position of the centre.
    pub y: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Bbox {
    /// Creates a box centred on `center`.
    #[must_use]
    pub const fn new(center: Vec2, width: f64, height: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            width,
            height,
        }
    }

    /// Converts a top-left anchored rectangle into a centred box.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(
            Vec2::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0),
            rect.width,
            rect.height,
        )
    }

    /// Centre of the box.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Recentres the box on `center`, keeping its size.
    pub fn move_to(&mut self, center: Vec2) {
        self.x = center.x;
        self.y = center.y;
    }

    /// Left edge.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.x - self.width / 2.0
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Top edge.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.y - self.height / 2.0
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Axis-aligned overlap test. Touching edges count as overlapping.
    #[must_use]
    pub fn intersects(&self, other: &Bbox) -> bool {
        !(self.max_x() < other.min_x()
            || self.min_x() > other.max_x()
            || self.max_y() < other.min_y()
            || self.min_y() > other.max_y())
    }

    /// Reports whether `point` lies inside the box, edges included.
    #[must_use]
    pub fn intersects_point(&self, point: Vec2) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Rectangle-versus-circle overlap test.
    ///
    /// The circle centre is clamped into the box and the clamped point's
    /// distance to the centre is compared against the radius.
    #[must_use]
    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        let closest = Vec2::new(
            circle.center.x.clamp(self.min_x(), self.max_x()),
            circle.center.y.clamp(self.min_y(), self.max_y()),
        );
        closest.distance(circle.center) <= circle.radius
    }
}
