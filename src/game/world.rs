//! The authoritative world: sessions, catch-up ordering and verb resolution

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::clock::GameClock;
use crate::game::combat::Query;
use crate::game::geometry::{deg_to_rad, rad_to_deg};
use crate::game::ship::Ship;
use crate::game::tuning::Tuning;

/// Length of the public id suffix carved from the session token.
const PUBLIC_ID_LEN: usize = 8;

/// Why a verb was refused. The dead-ship message is a fixed literal that
/// clients match on, so it must never change.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Spaceship token not in sent data.")]
    MissingToken,
    #[error("Ship not found for given token.")]
    UnknownToken,
    #[error("Your spaceship has been killed. Please reconnect.")]
    ShipDead,
    #[error("{0}")]
    Invalid(String),
}

/// Point-in-time copy of one ship, angles already converted to degrees for
/// the API and the persistence mirror.
#[derive(Debug, Clone)]
pub struct ShipSnapshot {
    pub token: String,
    pub id: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub area: f64,
    pub energy: f64,
    /// Degrees in `[0, 360)`.
    pub shield_dir: f64,
    /// Degrees in `[0, 180]`.
    pub shield_width: f64,
    pub alive: bool,
}

impl ShipSnapshot {
    fn capture(token: &str, ship: &Ship) -> Self {
        Self {
            token: token.to_owned(),
            id: ship.id.clone(),
            pos_x: ship.pos.x,
            pos_y: ship.pos.y,
            vel_x: ship.vel.x,
            vel_y: ship.vel.y,
            area: ship.area,
            energy: ship.energy,
            shield_dir: rad_to_deg(ship.shield_dir),
            shield_width: rad_to_deg(ship.shield_width),
            alive: ship.alive,
        }
    }
}

/// What a directed query reveals about another ship. For shot victims the
/// area is the one before the shot landed.
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: String,
    pub area: f64,
    pub pos_x: f64,
    pub pos_y: f64,
}

/// Field overrides applied by the debug verb; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    pub vel_x: Option<f64>,
    pub vel_y: Option<f64>,
    pub area: Option<f64>,
    pub energy: Option<f64>,
    /// Absolute clock pin, in milliseconds.
    pub time_ms: Option<f64>,
}

impl StatePatch {
    fn touches_ship(&self) -> bool {
        self.pos_x.is_some()
            || self.pos_y.is_some()
            || self.vel_x.is_some()
            || self.vel_y.is_some()
            || self.area.is_some()
            || self.energy.is_some()
    }
}

/// All live sessions plus the clock they share.
///
/// Single-ship verbs lock exactly one ship. Scan and shoot lock every ship,
/// always in ascending token order, which serializes overlapping shots and
/// makes the kill-steal tie-break deterministic per interleaving.
#[derive(Debug)]
pub struct World {
    clock: GameClock,
    tuning: Tuning,
    ships: DashMap<String, Arc<Mutex<Ship>>>,
}

impl World {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            clock: GameClock::new(),
            tuning,
            ships: DashMap::new(),
        }
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    // ==================== Session lifecycle ====================

    /// Register a new ship and hand out its session token.
    pub fn connect(&self) -> ShipSnapshot {
        let token = Uuid::new_v4().to_string();
        let id = token[token.len() - PUBLIC_ID_LEN..].to_string();
        let ship = Ship::new(id, self.clock.now());
        let snapshot = ShipSnapshot::capture(&token, &ship);
        self.ships.insert(token, Arc::new(Mutex::new(ship)));
        info!(id = %snapshot.id, "ship connected");
        snapshot
    }

    /// Remove a session. Works on dead ships too; returns the final state
    /// so the caller can flush it to the persistence mirror.
    pub fn disconnect(&self, token: &str) -> Result<ShipSnapshot, GameError> {
        let (token, handle) = self.ships.remove(token).ok_or(GameError::UnknownToken)?;
        let mut ship = handle.lock();
        ship.catch_up(self.clock.now(), &self.tuning);
        info!(id = %ship.id, "ship disconnected");
        Ok(ShipSnapshot::capture(&token, &ship))
    }

    // ==================== Single-ship verbs ====================

    pub fn accelerate(&self, token: &str, dx: f64, dy: f64) -> Result<ShipSnapshot, GameError> {
        let handle = self.handle(token)?;
        let dx = finite(dx, "x")?;
        let dy = finite(dy, "y")?;
        let mut ship = handle.lock();
        ship.catch_up(self.clock.now(), &self.tuning);
        if !ship.alive {
            return Err(GameError::ShipDead);
        }
        ship.thrust(dx, dy);
        Ok(ShipSnapshot::capture(token, &ship))
    }

    pub fn ship_info(&self, token: &str) -> Result<ShipSnapshot, GameError> {
        let handle = self.handle(token)?;
        let mut ship = handle.lock();
        ship.catch_up(self.clock.now(), &self.tuning);
        if !ship.alive {
            return Err(GameError::ShipDead);
        }
        Ok(ShipSnapshot::capture(token, &ship))
    }

    /// Point the shield arc. Direction wraps modulo a full turn and width is
    /// clamped into `[0°, 180°]` rather than rejected.
    pub fn set_shield(
        &self,
        token: &str,
        direction_deg: f64,
        width_deg: f64,
    ) -> Result<ShipSnapshot, GameError> {
        let handle = self.handle(token)?;
        let direction = finite(direction_deg, "direction")?;
        let width = finite(width_deg, "width")?;
        let mut ship = handle.lock();
        ship.catch_up(self.clock.now(), &self.tuning);
        if !ship.alive {
            return Err(GameError::ShipDead);
        }
        ship.set_shield(deg_to_rad(direction), deg_to_rad(width));
        Ok(ShipSnapshot::capture(token, &ship))
    }

    // ==================== Directed queries ====================

    /// Sweep a sector and report every live ship it touches. Spends up to
    /// `energy`, capped at what the ship has; spending nothing sees nothing.
    pub fn scan(
        &self,
        token: &str,
        direction_deg: f64,
        width_deg: f64,
        energy: f64,
    ) -> Result<Vec<Contact>, GameError> {
        if !self.ships.contains_key(token) {
            return Err(GameError::UnknownToken);
        }
        let direction = deg_to_rad(finite(direction_deg, "direction")?);
        let half_width = query_width(width_deg)?;
        let energy = positive(energy, "energy")?;

        let parties = self.all_handles();
        let mut guards = lock_ordered(&parties);
        let actor = find_actor(&parties, token)?;
        self.catch_up_all(&mut guards);
        if !guards[actor].alive {
            return Err(GameError::ShipDead);
        }

        let spent = energy.min(guards[actor].energy);
        guards[actor].energy -= spent;
        if spent <= 0.0 {
            return Ok(Vec::new());
        }
        let query = Query {
            origin: guards[actor].pos,
            dir: direction,
            half_width,
            range: (self.tuning.query_radius)(half_width, spent) + guards[actor].radius(),
        };
        let mut contacts = Vec::new();
        for (i, ship) in guards.iter().enumerate() {
            if i == actor || !ship.alive {
                continue;
            }
            if query.strikes(ship) {
                contacts.push(Contact {
                    id: ship.id.clone(),
                    area: ship.area,
                    pos_x: ship.pos.x,
                    pos_y: ship.pos.y,
                });
            }
        }
        debug!(id = %guards[actor].id, spent, matches = contacts.len(), "scan resolved");
        Ok(contacts)
    }

    /// Fire a sector-shaped shot. Energy actually used is bounded by
    /// `available / damage`; the shot reaches as far as a scan of the same
    /// unscaled energy would. Kills transfer the victim's pre-shot area to
    /// the shooter, whole.
    pub fn shoot(
        &self,
        token: &str,
        direction_deg: f64,
        width_deg: f64,
        energy: f64,
        damage: f64,
    ) -> Result<Vec<Contact>, GameError> {
        if !self.ships.contains_key(token) {
            return Err(GameError::UnknownToken);
        }
        let direction = deg_to_rad(finite(direction_deg, "direction")?);
        let half_width = query_width(width_deg)?;
        let energy = positive(energy, "energy")?;
        let damage = positive(damage, "damage")?;

        let parties = self.all_handles();
        let mut guards = lock_ordered(&parties);
        let actor = find_actor(&parties, token)?;
        self.catch_up_all(&mut guards);
        if !guards[actor].alive {
            return Err(GameError::ShipDead);
        }

        let energy_used = energy.min(guards[actor].energy / damage);
        if energy_used <= 0.0 {
            return Ok(Vec::new());
        }
        let scaled = energy_used * damage;
        guards[actor].energy = (guards[actor].energy - scaled).max(0.0);

        let origin = guards[actor].pos;
        let query = Query {
            origin,
            dir: direction,
            half_width,
            range: (self.tuning.query_radius)(half_width, energy_used) + guards[actor].radius(),
        };
        let mut contacts = Vec::new();
        let mut area_reward = 0.0;
        for i in 0..guards.len() {
            if i == actor || !guards[i].alive {
                continue;
            }
            if !query.strikes(&guards[i]) {
                continue;
            }
            let pre_area = guards[i].area;
            let distance = origin.distance(guards[i].pos);
            let base = (self.tuning.shot_damage)(scaled, half_width, distance);
            let blocked = query.blocked_fraction(&guards[i]);
            contacts.push(Contact {
                id: guards[i].id.clone(),
                area: pre_area,
                pos_x: guards[i].pos.x,
                pos_y: guards[i].pos.y,
            });
            guards[i].area -= base * (1.0 - blocked);
            if guards[i].area <= 0.0 {
                guards[i].kill();
                area_reward += pre_area;
                info!(
                    shooter = %guards[actor].id,
                    victim = %guards[i].id,
                    area = pre_area,
                    "ship destroyed"
                );
            }
        }
        if area_reward > 0.0 {
            guards[actor].area += area_reward;
        }
        debug!(id = %guards[actor].id, spent = scaled, struck = contacts.len(), "shot resolved");
        Ok(contacts)
    }

    // ==================== Debug control ====================

    /// Overwrite ship fields and/or pin the shared clock. Validation happens
    /// up front so a rejected patch changes nothing. The clock-only form
    /// needs no token.
    pub fn sudo(&self, token: Option<&str>, patch: &StatePatch) -> Result<(), GameError> {
        if let Some(t) = patch.time_ms {
            if !t.is_finite() || t < 0.0 {
                return Err(GameError::Invalid(
                    "time must be a non-negative number.".into(),
                ));
            }
        }
        if let Some(a) = patch.area {
            if !a.is_finite() || a <= 0.0 {
                return Err(GameError::Invalid("area must be a positive number.".into()));
            }
        }
        if let Some(e) = patch.energy {
            if !e.is_finite() || e < 0.0 {
                return Err(GameError::Invalid(
                    "energy must be a non-negative number.".into(),
                ));
            }
        }
        for value in [patch.pos_x, patch.pos_y, patch.vel_x, patch.vel_y]
            .into_iter()
            .flatten()
        {
            finite(value, "position and velocity")?;
        }

        let handle = if patch.touches_ship() {
            let token = token.ok_or(GameError::MissingToken)?;
            Some(self.handle(token)?)
        } else {
            None
        };
        let mut guard = match &handle {
            Some(h) => {
                let ship = h.lock();
                if !ship.alive {
                    return Err(GameError::ShipDead);
                }
                Some(ship)
            }
            None => None,
        };

        if let Some(ms) = patch.time_ms {
            self.clock.pin(ms / 1000.0);
            info!(seconds = ms / 1000.0, "clock pinned");
        }
        if let Some(ship) = guard.as_mut() {
            // Integrate up to the (possibly just pinned) present before the
            // overrides land, so they are not re-integrated away.
            ship.catch_up(self.clock.now(), &self.tuning);
            if let Some(x) = patch.pos_x {
                ship.pos.x = x;
            }
            if let Some(y) = patch.pos_y {
                ship.pos.y = y;
            }
            if let Some(x) = patch.vel_x {
                ship.vel.x = x;
            }
            if let Some(y) = patch.vel_y {
                ship.vel.y = y;
            }
            if let Some(a) = patch.area {
                ship.area = a;
            }
            if let Some(e) = patch.energy {
                ship.energy = e;
            }
        }
        Ok(())
    }

    // ==================== Mirror support ====================

    /// Catch up and snapshot every session, dead ones included.
    pub fn snapshot_all(&self) -> Vec<ShipSnapshot> {
        let now = self.clock.now();
        self.ships
            .iter()
            .map(|entry| {
                let mut ship = entry.value().lock();
                ship.catch_up(now, &self.tuning);
                ShipSnapshot::capture(entry.key(), &ship)
            })
            .collect()
    }

    // ==================== Internals ====================

    fn handle(&self, token: &str) -> Result<Arc<Mutex<Ship>>, GameError> {
        self.ships
            .get(token)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(GameError::UnknownToken)
    }

    /// Clone out every session handle, sorted by token. Cloning first keeps
    /// map shard guards out of the lock acquisition path.
    fn all_handles(&self) -> Vec<(String, Arc<Mutex<Ship>>)> {
        let mut handles: Vec<_> = self
            .ships
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));
        handles
    }

    fn catch_up_all(&self, guards: &mut [MutexGuard<'_, Ship>]) {
        let now = self.clock.now();
        for ship in guards.iter_mut() {
            ship.catch_up(now, &self.tuning);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock every handle in the given (already sorted) order.
fn lock_ordered<'a>(
    handles: &'a [(String, Arc<Mutex<Ship>>)],
) -> Vec<MutexGuard<'a, Ship>> {
    handles.iter().map(|(_, h)| h.lock()).collect()
}

/// Index of the acting ship among the locked parties. The actor can vanish
/// between the auth check and the lock sweep if it disconnects concurrently.
fn find_actor(handles: &[(String, Arc<Mutex<Ship>>)], token: &str) -> Result<usize, GameError> {
    handles
        .iter()
        .position(|(t, _)| t == token)
        .ok_or(GameError::UnknownToken)
}

fn finite(value: f64, name: &str) -> Result<f64, GameError> {
    if !value.is_finite() {
        return Err(GameError::Invalid(format!(
            "{name} must be a finite number."
        )));
    }
    Ok(value)
}

fn positive(value: f64, name: &str) -> Result<f64, GameError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GameError::Invalid(format!(
            "{name} must be a positive number."
        )));
    }
    Ok(value)
}

/// Scan/shoot cone half-angle: strictly inside (0°, 90°), converted to
/// radians.
fn query_width(width_deg: f64) -> Result<f64, GameError> {
    if !width_deg.is_finite() || width_deg <= 0.0 || width_deg >= 90.0 {
        return Err(GameError::Invalid(
            "width must be strictly between 0 and 90 degrees.".into(),
        ));
    }
    Ok(deg_to_rad(width_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tuning::default_shot_damage;

    const DEAD_MESSAGE: &str = "Your spaceship has been killed. Please reconnect.";

    /// World with a pinned clock so nothing regenerates between steps.
    fn frozen_world() -> World {
        let world = World::new();
        world.clock().pin(0.0);
        world
    }

    fn place(world: &World, token: &str, x: f64, y: f64, area: f64, energy: f64) {
        world
            .sudo(
                Some(token),
                &StatePatch {
                    pos_x: Some(x),
                    pos_y: Some(y),
                    area: Some(area),
                    energy: Some(energy),
                    ..StatePatch::default()
                },
            )
            .expect("sudo placement");
    }

    #[test]
    fn connect_hands_out_fresh_ships() {
        let world = frozen_world();
        let a = world.connect();
        let b = world.connect();
        assert_ne!(a.token, b.token);
        assert_ne!(a.id, b.id);
        assert_eq!(a.area, 1.0);
        assert_eq!(a.energy, 10.0);
        assert_eq!((a.pos_x, a.pos_y), (0.0, 0.0));
        assert_eq!((a.vel_x, a.vel_y), (0.0, 0.0));
        assert_eq!(a.shield_width, 0.0);
        assert_eq!(world.ship_count(), 2);
    }

    #[test]
    fn token_is_secret_but_id_is_derived() {
        let world = frozen_world();
        let a = world.connect();
        assert!(a.token.ends_with(&a.id));
        assert_eq!(a.id.len(), 8);
    }

    #[test]
    fn disconnect_removes_the_session() {
        let world = frozen_world();
        let a = world.connect();
        world.disconnect(&a.token).expect("first disconnect");
        assert!(matches!(
            world.disconnect(&a.token),
            Err(GameError::UnknownToken)
        ));
        assert_eq!(world.ship_count(), 0);
    }

    #[test]
    fn unknown_token_is_rejected() {
        let world = frozen_world();
        assert!(matches!(
            world.accelerate("nope", 1.0, 0.0),
            Err(GameError::UnknownToken)
        ));
        assert!(matches!(
            world.scan("nope", 0.0, 45.0, 1.0),
            Err(GameError::UnknownToken)
        ));
    }

    #[test]
    fn accelerate_is_applied_through_the_world() {
        let world = frozen_world();
        let a = world.connect();
        let after = world.accelerate(&a.token, 2.0, -1.0).expect("accelerate");
        assert_eq!((after.vel_x, after.vel_y), (2.0, -1.0));
        assert_eq!(after.energy, 7.0);
    }

    #[test]
    fn time_pin_drives_drift_and_regen() {
        let world = frozen_world();
        let a = world.connect();
        world.accelerate(&a.token, 2.0, 0.0).expect("accelerate");
        world
            .sudo(None, &StatePatch { time_ms: Some(3000.0), ..StatePatch::default() })
            .expect("time sudo without token");
        let info = world.ship_info(&a.token).expect("info");
        assert_eq!(info.pos_x, 6.0);
        // 8 energy left after the burn, regen 1/sec for 3s, capped at 10.
        assert_eq!(info.energy, 10.0);
    }

    #[test]
    fn scan_sees_ahead_not_behind() {
        let world = frozen_world();
        let scanner = world.connect();
        let target = world.connect();
        place(&world, &target.token, 50.0, 0.0, 1.0, 10.0);

        let ahead = world.scan(&scanner.token, 0.0, 30.0, 10.0).expect("scan");
        assert_eq!(ahead.len(), 1);
        assert_eq!(ahead[0].id, target.id);
        assert_eq!(ahead[0].pos_x, 50.0);

        // Refill and look the other way.
        place(&world, &scanner.token, 0.0, 0.0, 1.0, 10.0);
        let behind = world.scan(&scanner.token, 180.0, 30.0, 10.0).expect("scan");
        assert!(behind.is_empty());
    }

    #[test]
    fn scan_spends_capped_energy_and_zero_spend_sees_nothing() {
        let world = frozen_world();
        let scanner = world.connect();
        let target = world.connect();
        place(&world, &target.token, 50.0, 0.0, 1.0, 10.0);

        world.scan(&scanner.token, 0.0, 30.0, 999.0).expect("scan");
        let drained = world.ship_info(&scanner.token).expect("info");
        assert_eq!(drained.energy, 0.0);

        // Broke scanners get an empty result, not an error.
        let blind = world.scan(&scanner.token, 0.0, 30.0, 999.0).expect("scan");
        assert!(blind.is_empty());
    }

    #[test]
    fn query_width_bounds_are_exclusive() {
        let world = frozen_world();
        let a = world.connect();
        for bad in [0.0, 90.0, -5.0, f64::NAN] {
            assert!(matches!(
                world.scan(&a.token, 0.0, bad, 1.0),
                Err(GameError::Invalid(_))
            ));
        }
        assert!(world.scan(&a.token, 0.0, 89.9, 1.0).is_ok());
    }

    #[test]
    fn shoot_kills_and_transfers_pre_shot_area() {
        let world = frozen_world();
        let shooter = world.connect();
        let b = world.connect();
        let c = world.connect();
        place(&world, &shooter.token, 0.0, 0.0, 20.0, 200.0);
        place(&world, &b.token, 10.0, 0.0, 20.0, 100.0);
        place(&world, &c.token, 30.0, 0.0, 5.0, 10.0);

        let struck = world
            .shoot(&shooter.token, 0.0, 1.0, 20.0, 10.0)
            .expect("shoot");
        let mut ids: Vec<_> = struck.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        let mut expected = vec![b.id.as_str(), c.id.as_str()];
        expected.sort_unstable();
        assert_eq!(ids, expected);
        // Struck entries report the area as it was when the shot landed.
        for contact in &struck {
            if contact.id == b.id {
                assert_eq!(contact.area, 20.0);
            } else {
                assert_eq!(contact.area, 5.0);
            }
        }

        let after = world.ship_info(&shooter.token).expect("info");
        assert_eq!(after.area, 45.0);
        assert_eq!(after.energy, 0.0);

        let dead = world.ship_info(&b.token).expect_err("b is dead");
        assert!(matches!(dead, GameError::ShipDead));
        assert_eq!(dead.to_string(), DEAD_MESSAGE);
    }

    #[test]
    fn dead_ships_refuse_verbs_but_can_disconnect() {
        let world = frozen_world();
        let shooter = world.connect();
        let victim = world.connect();
        place(&world, &shooter.token, 0.0, 0.0, 20.0, 200.0);
        place(&world, &victim.token, 10.0, 0.0, 1.0, 10.0);
        world
            .shoot(&shooter.token, 0.0, 1.0, 20.0, 10.0)
            .expect("lethal shot");

        assert!(matches!(
            world.accelerate(&victim.token, 1.0, 0.0),
            Err(GameError::ShipDead)
        ));
        assert!(matches!(
            world.scan(&victim.token, 0.0, 45.0, 1.0),
            Err(GameError::ShipDead)
        ));
        assert!(matches!(
            world.set_shield(&victim.token, 0.0, 90.0),
            Err(GameError::ShipDead)
        ));
        let last = world.disconnect(&victim.token).expect("disconnect works");
        assert!(!last.alive);
    }

    #[test]
    fn dead_ships_are_invisible_to_queries() {
        let world = frozen_world();
        let shooter = world.connect();
        let victim = world.connect();
        place(&world, &shooter.token, 0.0, 0.0, 20.0, 200.0);
        place(&world, &victim.token, 10.0, 0.0, 1.0, 10.0);
        world
            .shoot(&shooter.token, 0.0, 1.0, 20.0, 10.0)
            .expect("lethal shot");

        place(&world, &shooter.token, 0.0, 0.0, 20.0, 200.0);
        let contacts = world.scan(&shooter.token, 0.0, 45.0, 50.0).expect("scan");
        assert!(contacts.is_empty());
    }

    #[test]
    fn kill_steal_goes_to_the_lethal_blow() {
        let world = frozen_world();
        let early = world.connect();
        let late = world.connect();
        let victim = world.connect();
        // Off-axis so the two shooters never clip each other.
        place(&world, &early.token, 0.0, 0.0, 1.0, 100.0);
        place(&world, &late.token, 10.0, 20.0, 1.0, 200.0);
        place(&world, &victim.token, 10.0, 0.0, 10.0, 10.0);

        world
            .shoot(&early.token, 0.0, 1.0, 5.0, 1.0)
            .expect("wounding shot");
        let chipped = default_shot_damage(5.0, deg_to_rad(1.0), 10.0);
        assert!(chipped < 10.0);

        world
            .shoot(&late.token, 270.0, 1.0, 20.0, 10.0)
            .expect("lethal shot");

        let early_after = world.ship_info(&early.token).expect("info");
        let late_after = world.ship_info(&late.token).expect("info");
        assert_eq!(early_after.area, 1.0);
        assert_eq!(late_after.area, 1.0 + (10.0 - chipped));
    }

    #[test]
    fn full_shield_block_keeps_area_intact() {
        let world = frozen_world();
        let shooter = world.connect();
        let defender = world.connect();
        place(&world, &shooter.token, 0.0, 0.0, 20.0, 200.0);
        place(&world, &defender.token, 10.0, 0.0, 10.0, 100.0);
        world
            .set_shield(&defender.token, 180.0, 179.0)
            .expect("shield up");

        let struck = world
            .shoot(&shooter.token, 0.0, 1.0, 20.0, 10.0)
            .expect("shoot");
        assert_eq!(struck.len(), 1);
        let defender_after = world.ship_info(&defender.token).expect("info");
        assert_eq!(defender_after.area, 10.0);
    }

    #[test]
    fn sudo_requires_token_for_ship_fields() {
        let world = frozen_world();
        world.connect();
        let err = world
            .sudo(None, &StatePatch { area: Some(5.0), ..StatePatch::default() })
            .expect_err("no token");
        assert!(matches!(err, GameError::MissingToken));
        assert_eq!(err.to_string(), "Spaceship token not in sent data.");

        let err = world
            .sudo(
                Some("bogus"),
                &StatePatch { area: Some(5.0), ..StatePatch::default() },
            )
            .expect_err("bad token");
        assert!(matches!(err, GameError::UnknownToken));
        assert_eq!(err.to_string(), "Ship not found for given token.");
    }

    #[test]
    fn sudo_rejects_invalid_values_without_side_effects() {
        let world = frozen_world();
        let a = world.connect();
        for patch in [
            StatePatch { area: Some(0.0), ..StatePatch::default() },
            StatePatch { area: Some(-3.0), ..StatePatch::default() },
            StatePatch { energy: Some(-1.0), ..StatePatch::default() },
            StatePatch { time_ms: Some(-5.0), ..StatePatch::default() },
            StatePatch { pos_x: Some(f64::NAN), ..StatePatch::default() },
        ] {
            assert!(matches!(
                world.sudo(Some(&a.token), &patch),
                Err(GameError::Invalid(_))
            ));
        }
        let info = world.ship_info(&a.token).expect("info");
        assert_eq!(info.area, 1.0);
        assert_eq!(info.energy, 10.0);
    }

    #[test]
    fn sudo_mixed_patch_pins_clock_then_overwrites() {
        let world = frozen_world();
        let a = world.connect();
        world.accelerate(&a.token, 1.0, 0.0).expect("accelerate");
        world
            .sudo(
                Some(&a.token),
                &StatePatch {
                    time_ms: Some(10_000.0),
                    pos_x: Some(-5.0),
                    energy: Some(3.0),
                    ..StatePatch::default()
                },
            )
            .expect("sudo");
        let info = world.ship_info(&a.token).expect("info");
        // Drift to x=10 happened first, then the override landed.
        assert_eq!(info.pos_x, -5.0);
        assert_eq!(info.energy, 3.0);
        assert_eq!(info.vel_x, 1.0);
    }

    #[test]
    fn snapshot_all_reports_every_session() {
        let world = frozen_world();
        let a = world.connect();
        let b = world.connect();
        world.accelerate(&a.token, 1.0, 0.0).expect("accelerate");
        world
            .sudo(None, &StatePatch { time_ms: Some(2000.0), ..StatePatch::default() })
            .expect("pin");
        let snapshots = world.snapshot_all();
        assert_eq!(snapshots.len(), 2);
        let a_snap = snapshots.iter().find(|s| s.token == a.token).expect("a");
        assert_eq!(a_snap.pos_x, 2.0);
        assert!(snapshots.iter().any(|s| s.token == b.token));
    }
}
