//! Directed-query geometry: strike tests and shield occlusion

use crate::game::geometry::{
    arc_overlap, circle_circle_intersection, circle_tangents, normalize_angle, ray_circle_hit,
    sector_hits_disk, Vec2,
};
use crate::game::ship::{Ship, MIN_SHIELD_WIDTH};

/// Covered-arc spans below this are resolved all-or-nothing.
const SLIVER_SPAN: f64 = 1e-9;

/// A resolved scan or shot: a circular sector fired from `origin`.
#[derive(Debug, Clone, Copy)]
pub struct Query {
    pub origin: Vec2,
    /// Center direction, radians.
    pub dir: f64,
    /// Half-angle of the cone, radians.
    pub half_width: f64,
    /// Reach of the sector, already extended by the acting ship's radius.
    pub range: f64,
}

impl Query {
    /// Whether the target's hull disk touches this sector at all.
    pub fn strikes(&self, target: &Ship) -> bool {
        sector_hits_disk(
            self.origin,
            self.dir,
            self.half_width,
            self.range,
            target.pos,
            target.radius(),
        )
    }

    /// Fraction of this shot the victim's shield absorbs, in `[0, 1]`.
    ///
    /// Works in two frames: first the visible slice of the hull is clipped
    /// in shot space (silhouette cone, shot cone, range cap), then the
    /// boundary rays are cast and the covered hull arc is compared against
    /// the shield arc in the victim's frame. Boundary cases are exact: a
    /// shield arc containing the whole covered arc blocks 1, a disjoint one
    /// blocks 0.
    pub fn blocked_fraction(&self, victim: &Ship) -> f64 {
        let radius = victim.radius();
        let delta = victim.pos - self.origin;
        let dist = delta.length();
        if dist <= radius {
            // Shooting from inside the hull bypasses the shield.
            return 0.0;
        }
        if victim.shield_width < MIN_SHIELD_WIDTH {
            return 0.0;
        }
        let dir = normalize_angle(self.dir);
        let Some(tangents) = circle_tangents(self.origin, victim.pos, radius) else {
            return 0.0;
        };

        // Shot-space angle of the victim's center, and the silhouette cone
        // around it. Angles stay unwrapped around `cas` from here on so the
        // interval endpoints keep their order across the -π/π seam.
        let cas = normalize_angle(delta.angle() - dir);
        let mut lo = (cas - tangents.half_angle).max(-self.half_width);
        let mut hi = (cas + tangents.half_angle).min(self.half_width);

        // The range cap cuts into the visible slice only while it is nearer
        // than the tangent points.
        if self.range * self.range < dist * dist - radius * radius {
            if let Some((p, q)) =
                circle_circle_intersection(self.origin, self.range, victim.pos, radius)
            {
                let cap_p = unwrap_near(cas, (p - self.origin).angle() - dir);
                let cap_q = unwrap_near(cas, (q - self.origin).angle() - dir);
                lo = lo.max(cap_p.min(cap_q));
                hi = hi.min(cap_p.max(cap_q));
            }
        }
        if hi - lo <= 0.0 {
            return 0.0;
        }

        // Boundary rays onto the hull; a graze can slip past the clipped
        // interval by float dust, which counts as nothing covered.
        let Some(hit_lo) =
            ray_circle_hit(self.origin, Vec2::from_angle(dir + lo), victim.pos, radius)
        else {
            return 0.0;
        };
        let Some(hit_hi) =
            ray_circle_hit(self.origin, Vec2::from_angle(dir + hi), victim.pos, radius)
        else {
            return 0.0;
        };

        covered_fraction(
            (hit_lo - victim.pos).angle(),
            (hit_hi - victim.pos).angle(),
            victim.shield_dir,
            victim.shield_width,
        )
    }
}

/// Re-express `angle` in the unwrapped branch closest to `anchor`.
fn unwrap_near(anchor: f64, angle: f64) -> f64 {
    anchor + normalize_angle(angle - anchor)
}

/// Fraction of the hull arc between the two boundary hits that lies under
/// the shield arc.
fn covered_fraction(hit_a: f64, hit_b: f64, shield_dir: f64, shield_width: f64) -> f64 {
    let mut start = hit_a;
    let mut span = normalize_angle(hit_b - hit_a);
    if span < 0.0 {
        start = hit_b;
        span = -span;
    }
    if span < SLIVER_SPAN {
        // Degenerate slice: shielded exactly when its midpoint is.
        return if normalize_angle(start - shield_dir).abs() <= shield_width {
            1.0
        } else {
            0.0
        };
    }
    let half = span / 2.0;
    let overlap = arc_overlap(start + half, half, shield_dir, shield_width);
    (overlap / span).clamp(0.0, 1.0)
}
