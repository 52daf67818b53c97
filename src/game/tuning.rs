//! Calibrated combat curves, swappable for experiments and tests

use std::f64::consts::PI;

/// Energy-to-swept-area factor for directed queries.
pub const SCAN_ENERGY_SCALING_FACTOR: f64 = 2000.0;

/// Range of a directed query. `half_width` in radians, `energy` unscaled.
///
/// The spent energy buys a fixed swept area, so narrower cones reach farther.
pub fn default_query_radius(half_width: f64, energy: f64) -> f64 {
    if energy <= 0.0 || half_width <= 0.0 {
        return 0.0;
    }
    (energy * SCAN_ENERGY_SCALING_FACTOR / (2.0 * half_width)).sqrt()
}

/// Damage delivered to a single target before shielding.
///
/// `scaled_energy` is the shot's energy budget times its damage multiplier;
/// wider cones and farther targets both dilute it.
pub fn default_shot_damage(scaled_energy: f64, half_width: f64, distance: f64) -> f64 {
    let distance = distance.max(1.0);
    scaled_energy / (2.0_f64.powf(2.0 * half_width).max(1.0) * distance.sqrt())
}

/// Shield energy consumption in multiples of the passive regen rate.
///
/// `width` is the shield half-angle in radians, already clamped to `[0, π]`.
/// A quarter-turn shield is exactly neutral; a full turn doubles the regen
/// rate, so the net drain equals one regen rate.
pub fn default_shield_load(width: f64) -> f64 {
    let neutral = PI / 2.0;
    if width <= neutral {
        width / neutral
    } else {
        let over = (width - neutral) / neutral;
        1.0 + over * over
    }
}

/// Injectable tuning curves. Every simulation formula that is calibrated
/// rather than derived goes through here so tests can pin their own.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    /// `(half_width_rad, energy) -> range`
    pub query_radius: fn(f64, f64) -> f64,
    /// `(scaled_energy, half_width_rad, distance) -> damage`
    pub shot_damage: fn(f64, f64, f64) -> f64,
    /// `(shield_half_width_rad) -> consumption in regen multiples`
    pub shield_load: fn(f64) -> f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            query_radius: default_query_radius,
            shot_damage: default_shot_damage,
            shield_load: default_shield_load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_radius_guards_degenerate_input() {
        assert_eq!(default_query_radius(PI / 4.0, 0.0), 0.0);
        assert_eq!(default_query_radius(PI / 4.0, -3.0), 0.0);
        assert_eq!(default_query_radius(0.0, 10.0), 0.0);
    }

    #[test]
    fn query_radius_scales_with_energy_and_width() {
        let base = default_query_radius(PI / 4.0, 1.0);
        // Four times the energy doubles the reach.
        assert!((default_query_radius(PI / 4.0, 4.0) - 2.0 * base).abs() < 1e-9);
        // A quarter of the width doubles the reach.
        assert!((default_query_radius(PI / 16.0, 1.0) - 2.0 * base).abs() < 1e-9);
    }

    #[test]
    fn shot_damage_dilutes_with_width_and_distance() {
        let near = default_shot_damage(10.0, 0.1, 4.0);
        assert!(default_shot_damage(10.0, 0.1, 100.0) < near);
        assert!(default_shot_damage(10.0, 1.0, 4.0) < near);
        // Point-blank shots are treated as distance one.
        assert_eq!(
            default_shot_damage(10.0, 0.1, 0.01),
            default_shot_damage(10.0, 0.1, 1.0)
        );
    }

    #[test]
    fn shield_load_boundary_conditions() {
        assert_eq!(default_shield_load(0.0), 0.0);
        assert_eq!(default_shield_load(PI / 2.0), 1.0);
        assert_eq!(default_shield_load(PI), 2.0);
    }

    #[test]
    fn shield_load_interior_shape() {
        // Halfway to neutral is exactly half a regen rate.
        assert!((default_shield_load(PI / 4.0) - 0.5).abs() < 1e-12);
        // Just past neutral the overdraw grows quadratically, not linearly.
        let just_over = default_shield_load(PI / 2.0 + PI / 20.0);
        assert!(just_over > 1.0);
        assert!(just_over < 1.05);
    }
}
