//! Unit vectors, lines and the point movement primitive.
//!
//! Every instruction that moves a point goes through
//! [`move_point_at`]: positions are measured along the projection vector
//! and points travel along the freedom vector.

use super::fixed::F26Dot6;

/// Point in device space.
pub type Point = read_fonts::types::Point<F26Dot6>;

/// Unit direction vector with 2.14 components.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    /// 1.0 in 2.14.
    pub const ONE: i32 = 0x4000;

    /// Unit vector along the x axis.
    pub const X_AXIS: Self = Self { x: Self::ONE, y: 0 };

    /// Unit vector along the y axis.
    pub const Y_AXIS: Self = Self { x: 0, y: Self::ONE };

    /// Creates a unit vector pointing in the direction of (`x`, `y`).
    ///
    /// Components may be in any consistent scale. A zero length input
    /// produces the x axis.
    pub fn from_components(x: i64, y: i64) -> Self {
        if x == 0 && y == 0 {
            return Self::X_AXIS;
        }
        if y == 0 {
            return Self {
                x: Self::ONE * x.signum() as i32,
                y: 0,
            };
        }
        if x == 0 {
            return Self {
                x: 0,
                y: Self::ONE * y.signum() as i32,
            };
        }
        // Scale up so the integer square root keeps enough precision for
        // small inputs.
        let (x, y) = ((x as i128) << 20, (y as i128) << 20);
        let len = (x * x + y * y).isqrt();
        let scale = |c: i128| {
            let n = c * Self::ONE as i128;
            let half = if n < 0 { -len / 2 } else { len / 2 };
            ((n + half) / len) as i32
        };
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    /// Returns the vector rotated counterclockwise by 90 degrees.
    pub fn rotate_90(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Returns the dot product with another unit vector, in 2.14.
    pub fn dot(self, other: Self) -> i32 {
        let d = self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64;
        round_shift14(d) as i32
    }

    /// Returns the displacement produced by travelling `distance` along
    /// this vector.
    pub fn offset(self, distance: F26Dot6) -> Point {
        let scale = |c: i32| F26Dot6::from_bits(round_shift14(distance.to_bits() * c as i64));
        Point::new(scale(self.x), scale(self.y))
    }

    /// Returns true if this vector lies along the given axis in either
    /// direction.
    pub fn is_axis(self, axis: Self) -> bool {
        self.dot(axis).abs() == Self::ONE
    }
}

impl Default for Vector {
    fn default() -> Self {
        Self::X_AXIS
    }
}

/// Line through `origin` along `direction`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Line {
    pub origin: Point,
    pub direction: Vector,
}

impl Line {
    pub fn new(origin: Point, direction: Vector) -> Self {
        Self { origin, direction }
    }

    /// Returns the point where this line crosses `other`, or `None` if the
    /// lines are parallel.
    ///
    /// With this line as `P + t * r` and the other as `Q + s * u`, the
    /// result is `Q + s * u` where
    /// `s = cross(P - Q, r) / cross(u, r)`.
    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let r = self.direction;
        let u = other.direction;
        let den = u.x as i128 * r.y as i128 - u.y as i128 * r.x as i128;
        if den == 0 {
            return None;
        }
        let dx = (self.origin.x - other.origin.x).to_bits() as i128;
        let dy = (self.origin.y - other.origin.y).to_bits() as i128;
        let num = dx * r.y as i128 - dy * r.x as i128;
        let offset = |c: i32| F26Dot6::from_bits(div_round(num * c as i128, den) as i64);
        Some(Point::new(
            other.origin.x + offset(u.x),
            other.origin.y + offset(u.y),
        ))
    }
}

/// Returns the signed distance of `point` from the origin along
/// `projection`.
pub fn measure(point: Point, projection: Vector) -> F26Dot6 {
    if projection == Vector::X_AXIS {
        return point.x;
    }
    if projection == Vector::Y_AXIS {
        return point.y;
    }
    let d = point.x.to_bits() as i128 * projection.x as i128
        + point.y.to_bits() as i128 * projection.y as i128;
    F26Dot6::from_bits(round_shift14(d as i64))
}

/// Moves `point` along `freedom` until its measurement along `projection`
/// equals `target`.
///
/// Returns the point unchanged when the two vectors are perpendicular
/// since no motion along the freedom vector can change the measurement.
pub fn move_point_at(point: Point, target: F26Dot6, projection: Vector, freedom: Vector) -> Point {
    let along = |c: i32| {
        F26Dot6::from_bits(div_round(
            target.to_bits() as i128 * c as i128,
            Vector::ONE as i128,
        ) as i64)
    };
    let constant = Line::new(
        Point::new(along(projection.x), along(projection.y)),
        projection.rotate_90(),
    );
    let travel = Line::new(point, freedom);
    constant.intersect(&travel).unwrap_or(point)
}

/// Divides rounding halves away from zero.
fn div_round(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let half = den / 2;
    if num < 0 {
        (num - half) / den
    } else {
        (num + half) / den
    }
}

fn round_shift14(v: i64) -> i64 {
    (v + 0x2000 + (v >> 63)) >> 14
}
