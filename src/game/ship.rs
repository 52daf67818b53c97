//! Ship state and lazy time integration

use std::f64::consts::PI;

use crate::game::geometry::{clamp_angle, Vec2};
use crate::game::tuning::Tuning;

pub const STARTING_AREA: f64 = 1.0;
pub const STARTING_ENERGY: f64 = 10.0;
/// Energy capacity per unit of area.
pub const ENERGY_CAP_FACTOR: f64 = 10.0;
/// Shields narrower than this block nothing.
pub const MIN_SHIELD_WIDTH: f64 = 1e-3;

/// One ship's authoritative state. Time-dependent fields are valid as of
/// `last_update`; call `catch_up` before reading or mutating them.
#[derive(Debug, Clone)]
pub struct Ship {
    /// Public identifier, safe to reveal to other players.
    pub id: String,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Size and hit points in one; zero once destroyed.
    pub area: f64,
    pub energy: f64,
    /// Shield arc center, radians in `[0, 2π)`.
    pub shield_dir: f64,
    /// Shield half-angle, radians in `[0, π]`; zero means off.
    pub shield_width: f64,
    pub alive: bool,
    /// Simulation timestamp of the last integration.
    pub last_update: f64,
}

impl Ship {
    pub fn new(id: String, now: f64) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            area: STARTING_AREA,
            energy: STARTING_ENERGY,
            shield_dir: 0.0,
            shield_width: 0.0,
            alive: true,
            last_update: now,
        }
    }

    pub fn radius(&self) -> f64 {
        (self.area / PI).sqrt()
    }

    pub fn energy_cap(&self) -> f64 {
        self.area * ENERGY_CAP_FACTOR
    }

    /// Advance this ship to `now` in closed form: drift, then energy
    /// drain/regen. Splitting the interval at shield exhaustion keeps the
    /// result exact under arbitrarily large jumps of the debug clock.
    pub fn catch_up(&mut self, now: f64, tuning: &Tuning) {
        let dt = now - self.last_update;
        if dt <= 0.0 || !self.alive {
            return;
        }
        self.pos = self.pos + self.vel * dt;

        let cap = self.energy_cap();
        if self.shield_width > 0.0 {
            let load = (tuning.shield_load)(self.shield_width);
            let rate = self.area * (1.0 - load);
            if rate >= 0.0 {
                self.energy = (self.energy + rate * dt).min(cap);
            } else {
                let until_empty = self.energy / -rate;
                if dt <= until_empty {
                    self.energy = (self.energy + rate * dt).max(0.0);
                } else {
                    // Shield collapses at exhaustion; the rest of the
                    // interval regenerates unshielded.
                    self.shield_width = 0.0;
                    self.energy = (self.area * (dt - until_empty)).min(cap);
                }
            }
        } else {
            self.energy = (self.energy + self.area * dt).min(cap);
        }
        self.last_update = now;
    }

    /// Apply a velocity change of up to `(dx, dy)`, spending one energy per
    /// unit of requested L1 length. Short on energy, the change shrinks
    /// proportionally and energy lands on exactly zero.
    pub fn thrust(&mut self, dx: f64, dy: f64) {
        let cost = dx.abs() + dy.abs();
        if cost <= 0.0 {
            return;
        }
        if cost <= self.energy {
            self.vel = self.vel + Vec2::new(dx, dy);
            self.energy -= cost;
        } else {
            let scale = self.energy / cost;
            self.vel = self.vel + Vec2::new(dx * scale, dy * scale);
            self.energy = 0.0;
        }
    }

    /// Point the shield. The caller catches up first, so drain integration
    /// restarts from the current instant.
    pub fn set_shield(&mut self, dir: f64, width: f64) {
        self.shield_dir = clamp_angle(dir);
        self.shield_width = width.clamp(0.0, PI);
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.area = 0.0;
        self.energy = 0.0;
        self.shield_width = 0.0;
    }
}
