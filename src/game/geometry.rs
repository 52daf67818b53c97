//! Planar math for sectors, circles and arcs

use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

/// Discriminant slack for ray/circle tests; a graze counts as a hit.
pub const GRAZE_EPSILON: f64 = 1e-3;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Wraps an angle into `[0, 2π)`.
pub fn clamp_angle(a: f64) -> f64 {
    let a = a.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Wraps an angle into `(-π, π]`.
pub fn normalize_angle(a: f64) -> f64 {
    let a = clamp_angle(a);
    if a > PI {
        a - TAU
    } else {
        a
    }
}

// ==================== Vectors ====================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians).
    pub fn from_angle(angle: f64) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Angle of this vector in `(-π, π]`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// ==================== Sectors ====================

/// Shortest distance from `point` to the segment `a`..`b`.
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Whether the circular sector with apex `origin`, direction `dir` (radians),
/// half-width `half_width` and radius `range` touches the disk at `center`.
///
/// A disk whose edge merely grazes the sector boundary counts as touched.
pub fn sector_hits_disk(
    origin: Vec2,
    dir: f64,
    half_width: f64,
    range: f64,
    center: Vec2,
    radius: f64,
) -> bool {
    let dist = origin.distance(center);
    if dist > range + radius {
        return false;
    }
    if dist <= radius {
        // Apex inside the disk
        return true;
    }
    let bearing = (center - origin).angle();
    if normalize_angle(bearing - dir).abs() <= half_width {
        return true;
    }
    // Disk center outside the angular span: the closest sector point lies on
    // one of the two straight edges.
    let edge_a = origin + Vec2::from_angle(dir - half_width) * range;
    let edge_b = origin + Vec2::from_angle(dir + half_width) * range;
    point_segment_distance(center, origin, edge_a) <= radius
        || point_segment_distance(center, origin, edge_b) <= radius
}

// ==================== Circles ====================

/// Tangent lines from an external point to a circle.
#[derive(Debug, Clone, Copy)]
pub struct Tangents {
    pub point_a: Vec2,
    pub point_b: Vec2,
    /// Half-angle of the tangent cone as seen from the external point.
    pub half_angle: f64,
}

/// Tangents from `point` to the circle at `center`. `None` when `point` is
/// inside or on the circle.
pub fn circle_tangents(point: Vec2, center: Vec2, radius: f64) -> Option<Tangents> {
    let dist = point.distance(center);
    if dist <= radius {
        return None;
    }
    let bearing = (center - point).angle();
    let internal = (radius / dist).acos();
    Some(Tangents {
        point_a: center - Vec2::from_angle(bearing - internal) * radius,
        point_b: center - Vec2::from_angle(bearing + internal) * radius,
        half_angle: PI / 2.0 - internal,
    })
}

/// First intersection of the ray `origin + t * dir` (`dir` unit length,
/// `t >= 0`) with the circle at `center`, if any.
pub fn ray_circle_hit(origin: Vec2, dir: Vec2, center: Vec2, radius: f64) -> Option<Vec2> {
    let q = origin - center;
    let c2 = 2.0 * q.dot(dir);
    let c3 = q.length_sq() - radius * radius;
    let mut delta = c2 * c2 - 4.0 * c3;
    if delta.abs() <= GRAZE_EPSILON {
        delta = delta.abs();
    }
    if delta < 0.0 {
        return None;
    }
    let sq = delta.sqrt();
    let mut t = (-c2 - sq) / 2.0;
    if t < 0.0 {
        t = (-c2 + sq) / 2.0;
    }
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}

/// Intersection points of two circle boundaries. Tangent circles yield the
/// single contact point twice; disjoint, nested or concentric circles yield
/// `None`.
pub fn circle_circle_intersection(
    c1: Vec2,
    r1: f64,
    c2: Vec2,
    r2: f64,
) -> Option<(Vec2, Vec2)> {
    let dist = c1.distance(c2);
    if dist == 0.0 || dist > r1 + r2 || dist < (r1 - r2).abs() {
        return None;
    }
    let dist_sq = dist * dist;
    let a = (r1 * r1 - r2 * r2) / (2.0 * dist_sq);
    let mid = (c1 + c2) * 0.5 + (c2 - c1) * a;
    let under = (2.0 * (r1 * r1 + r2 * r2) / dist_sq
        - (r1 * r1 - r2 * r2).powi(2) / (dist_sq * dist_sq)
        - 1.0)
        .max(0.0);
    let offset = Vec2::new(c2.y - c1.y, c1.x - c2.x) * (0.5 * under.sqrt());
    Some((mid + offset, mid - offset))
}

// ==================== Arcs ====================

/// Overlap of `[a0, a1]` and `[b0, b1]` on the real line, never negative.
fn span_overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

/// Length (radians) of the overlap between two circular arcs, each given as
/// a center angle and a half-width. Arc B may wrap; arc A must not span the
/// full circle.
pub fn arc_overlap(a_center: f64, a_half: f64, b_center: f64, b_half: f64) -> f64 {
    let a_len = 2.0 * a_half;
    let b_len = 2.0 * b_half;
    if b_len >= TAU {
        return a_len;
    }
    // Rotate so that arc A starts at zero, then unwrap arc B once.
    let b_start = clamp_angle((b_center - b_half) - (a_center - a_half));
    let b_end = b_start + b_len;
    let mut total = span_overlap(b_start, b_end, 0.0, a_len);
    if b_end > TAU {
        total += span_overlap(0.0, b_end - TAU, 0.0, a_len);
    }
    total
}
