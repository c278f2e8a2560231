use std::sync::Arc;

use afps_combat::{
    explosion_damage, resolve_hitscan, resolve_projectile_impact, shockwave_hits, CombatState,
    FireOutcome, HitResult, PlayerWeaponState, PoseHistory, ProjectileImpact, ProjectileState,
    WeaponConfig, WeaponKind,
};
use afps_geometry::{vec3, ViewAngles};
use afps_protocol::{
    encode_message, GameEvent, GameEventKind, InputCmd, ServerMessage, SnapshotFieldMask,
};
use afps_scheduled::Scheduled;
use afps_signaling::SignalingStore;
use afps_sim::{step_player, CollisionWorld, PlayerState, SimConfig, SimInput};
use rustc_hash::FxHashMap;
use tracing::{info, instrument};

use crate::{
    pickup::{PickupDefinition, PickupKind, PickupState},
    snapshot::{encode_snapshot, SnapshotFields},
};

/// How many pose samples `PoseHistory` retains per connection: half a
/// second of ticks at the protocol's authoritative tick rate, matching
/// "typically ≤ 0.5 s of ticks" in the rewind-window guidance.
const POSE_HISTORY_SAMPLES: usize = (afps_protocol::SERVER_TICK_RATE as usize) / 2;

#[derive(Debug, Default, Clone, Copy)]
struct TickTelemetry {
    ticks: u64,
    batches: u64,
    inputs: u64,
    snapshots: u64,
}

/// Owns every piece of per-connection simulation state and runs the
/// authoritative per-tick procedure. The only writer to `PlayerState`,
/// `PoseHistory`, combat/weapon state, the projectile list, and snapshot
/// baselines; everything here is meant to run on one dedicated thread.
pub struct TickLoop {
    tick: u64,
    sim_config: SimConfig,
    weapon_config: WeaponConfig,
    world: Option<CollisionWorld>,
    tick_rate: u32,
    snapshot_rate: u32,
    keyframe_interval: u32,
    rewind_ticks: u64,

    players: FxHashMap<String, PlayerState>,
    combat: FxHashMap<String, CombatState>,
    weapons: FxHashMap<String, PlayerWeaponState>,
    pose_histories: FxHashMap<String, PoseHistory>,
    last_processed_input_seq: FxHashMap<String, u64>,
    current_weapon_slot: FxHashMap<String, u32>,

    projectiles: Vec<ProjectileState<String>>,
    next_projectile_id: u64,

    pickups: Vec<PickupState>,
    /// Min-heap of `(respawn_tick, pickup index)`, so reactivation only
    /// touches pickups whose countdown is actually due instead of
    /// scanning every inactive pickup on every tick.
    pickup_respawns: Scheduled<u64, usize>,

    pending_events: Vec<GameEventKind>,
    snapshot_accum: f64,
    telemetry: TickTelemetry,
    last_telemetry_at: Option<f64>,
}

impl TickLoop {
    #[must_use]
    pub fn new(
        sim_config: SimConfig,
        weapon_config: WeaponConfig,
        world: Option<CollisionWorld>,
        tick_rate: u32,
        snapshot_rate: u32,
        keyframe_interval: u32,
        rewind_ticks: u64,
        pickup_definitions: Vec<PickupDefinition>,
    ) -> Self {
        Self {
            tick: 0,
            sim_config,
            weapon_config,
            world,
            tick_rate,
            snapshot_rate,
            keyframe_interval,
            rewind_ticks,
            players: FxHashMap::default(),
            combat: FxHashMap::default(),
            weapons: FxHashMap::default(),
            pose_histories: FxHashMap::default(),
            last_processed_input_seq: FxHashMap::default(),
            current_weapon_slot: FxHashMap::default(),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            pickups: pickup_definitions.into_iter().map(PickupState::new).collect(),
            pickup_respawns: Scheduled::new(),
            pending_events: Vec::new(),
            snapshot_accum: 0.0,
            telemetry: TickTelemetry::default(),
            last_telemetry_at: None,
        }
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn player(&self, connection_id: &str) -> Option<&PlayerState> {
        self.players.get(connection_id)
    }

    #[must_use]
    pub fn combat_state(&self, connection_id: &str) -> Option<&CombatState> {
        self.combat.get(connection_id)
    }

    fn ensure_connection(&mut self, connection_id: &str) {
        self.players
            .entry(connection_id.to_owned())
            .or_insert_with(|| PlayerState::spawn_at(vec3(0.0, 0.0, 0.0)));
        self.combat
            .entry(connection_id.to_owned())
            .or_default();
        self.weapons
            .entry(connection_id.to_owned())
            .or_insert_with(|| PlayerWeaponState::new(&self.weapon_config));
        self.pose_histories
            .entry(connection_id.to_owned())
            .or_insert_with(|| PoseHistory::new(POSE_HISTORY_SAMPLES));
        self.current_weapon_slot
            .entry(connection_id.to_owned())
            .or_insert(0);
    }

    fn prune_to(&mut self, ready: &[String]) {
        let keep: std::collections::HashSet<&str> = ready.iter().map(String::as_str).collect();
        self.players.retain(|id, _| keep.contains(id.as_str()));
        self.combat.retain(|id, _| keep.contains(id.as_str()));
        self.weapons.retain(|id, _| keep.contains(id.as_str()));
        self.pose_histories.retain(|id, _| keep.contains(id.as_str()));
        self.last_processed_input_seq
            .retain(|id, _| keep.contains(id.as_str()));
        self.current_weapon_slot
            .retain(|id, _| keep.contains(id.as_str()));
    }

    /// Runs exactly one fixed tick: input drain, simulation, combat
    /// resolution, pickups, and (on cadence) snapshot emission. `now` is
    /// the wall-clock time used only for the once-per-second telemetry
    /// line, never for simulation.
    #[instrument(skip(self, store), fields(tick = self.tick + 1))]
    pub fn step(&mut self, store: &SignalingStore, dt: f64, now: f64) {
        self.tick += 1;
        self.telemetry.ticks += 1;

        let mut ready = store.ready_connection_ids();
        ready.sort_unstable();
        self.prune_to(&ready);
        for id in &ready {
            self.ensure_connection(id);
        }

        let batches = store.drain_all_inputs();
        self.telemetry.batches += batches.len() as u64;
        let mut latest_inputs: FxHashMap<String, InputCmd> = FxHashMap::default();
        for (id, cmds) in batches {
            self.telemetry.inputs += cmds.len() as u64;
            if let Some(last) = cmds.into_iter().max_by_key(|cmd| cmd.input_seq) {
                self.last_processed_input_seq
                    .insert(id.clone(), last.input_seq);
                latest_inputs.insert(id, last);
            }
        }

        for id in &ready {
            self.step_one_connection(id, latest_inputs.get(id), dt);
        }

        self.advance_projectiles(dt, &ready);
        self.update_pickups(&ready);

        self.flush_events(store, &ready);

        self.snapshot_accum += f64::from(self.snapshot_rate) / f64::from(self.tick_rate.max(1));
        while self.snapshot_accum >= 1.0 {
            self.snapshot_accum -= 1.0;
            self.emit_snapshots(store, &ready);
        }

        self.maybe_report_telemetry(ready.len(), now);
    }

    fn step_one_connection(&mut self, id: &str, cmd: Option<&InputCmd>, dt: f64) {
        let alive = self.combat.get(id).is_some_and(|state| state.alive);
        let sim_input = cmd.map_or_else(SimInput::neutral, |cmd| {
            SimInput::new(
                cmd.move_x,
                cmd.move_y,
                cmd.view_yaw.unwrap_or(0.0),
                cmd.view_pitch.unwrap_or(0.0),
                cmd.jump,
                cmd.sprint,
                cmd.dash.unwrap_or(false),
                cmd.grapple.unwrap_or(false),
                cmd.shield.unwrap_or(false),
                cmd.shockwave.unwrap_or(false),
            )
        });

        if alive {
            if let Some(state) = self.players.get_mut(id) {
                step_player(state, &sim_input, &self.sim_config, dt, self.world.as_ref());
            }
        }

        if let Some(state) = self.players.get(id) {
            if let Some(history) = self.pose_histories.get_mut(id) {
                history.push(self.tick, *state);
            }
            if state.shockwave_triggered {
                self.apply_shockwave(id, state.position);
            }
        }

        if let Some(weapons) = self.weapons.get_mut(id) {
            weapons.tick(&self.weapon_config, dt);
        }
        if let Some(combat) = self.combat.get_mut(id) {
            combat.update_respawn(dt);
        }

        if let Some(cmd) = cmd {
            if let Some(slot) = cmd.weapon_slot {
                self.current_weapon_slot.insert(id.to_owned(), slot);
            }
            if cmd.fire && alive {
                self.handle_fire(id, cmd);
            }
        }
    }

    fn handle_fire(&mut self, shooter_id: &str, cmd: &InputCmd) {
        let slot_index = cmd.weapon_slot.unwrap_or(0) as usize;
        let Some(definition) = self.weapon_config.definition(slot_index).copied() else {
            return;
        };
        let outcome = self
            .weapons
            .get_mut(shooter_id)
            .and_then(|weapons| weapons.slots.get_mut(slot_index))
            .map(|slot| slot.try_fire(&definition));
        if outcome != Some(FireOutcome::Fired) {
            return;
        }

        let view = ViewAngles::sanitize(cmd.view_yaw.unwrap_or(0.0), cmd.view_pitch.unwrap_or(0.0));
        let rewind_tick = self.tick.saturating_sub(self.rewind_ticks);

        match definition.kind {
            WeaponKind::Hitscan => {
                let result = resolve_hitscan(
                    &shooter_id.to_owned(),
                    &self.pose_histories,
                    rewind_tick,
                    view,
                    &self.sim_config,
                    definition.range,
                );
                if let HitResult::Hit { target_id, .. } = result {
                    let killed = self.apply_damage(shooter_id, &target_id, definition.damage);
                    self.pending_events.push(GameEventKind::Hit {
                        attacker_id: shooter_id.to_owned(),
                        target_id,
                        damage: Some(definition.damage),
                        killed,
                    });
                }
            }
            WeaponKind::Projectile => {
                let Some(shooter_pose) = self.players.get(shooter_id) else {
                    return;
                };
                let origin =
                    shooter_pose.position + vec3(0.0, 0.0, self.sim_config.eye_height());
                let velocity = view.direction() * definition.projectile_speed;
                let id = self.next_projectile_id;
                self.next_projectile_id += 1;
                self.projectiles.push(ProjectileState {
                    id,
                    owner_id: shooter_id.to_owned(),
                    position: origin,
                    velocity,
                    ttl: definition.projectile_ttl,
                    radius: definition.projectile_radius,
                    damage: definition.damage,
                    explosion_radius: definition.explosion_radius,
                });
                self.pending_events.push(GameEventKind::ProjectileSpawn {
                    owner_id: shooter_id.to_owned(),
                    projectile_id: id,
                    pos_x: origin.x,
                    pos_y: origin.y,
                    pos_z: origin.z,
                    vel_x: velocity.x,
                    vel_y: velocity.y,
                    vel_z: velocity.z,
                    ttl: definition.projectile_ttl,
                });
            }
        }
    }

    /// Applies `damage` from `attacker_id` to `target_id`, crediting a kill
    /// exactly once. Returns whether this call was the killing blow.
    fn apply_damage(&mut self, attacker_id: &str, target_id: &str, damage: f64) -> bool {
        let shield_active = self
            .players
            .get(target_id)
            .is_some_and(|state| state.shield_active);
        let Some(target_combat) = self.combat.get_mut(target_id) else {
            return false;
        };
        let killed = target_combat.apply_damage_with_shield(
            damage,
            shield_active,
            self.sim_config.shield_damage_multiplier,
        );
        if killed && attacker_id != target_id {
            if let Some(attacker_combat) = self.combat.get_mut(attacker_id) {
                attacker_combat.credit_kill();
            }
        }
        killed
    }

    fn apply_shockwave(&mut self, shooter_id: &str, position: afps_geometry::Vec3) {
        let center = position + vec3(0.0, 0.0, self.sim_config.player_height * 0.5);
        let owner = shooter_id.to_owned();
        let hits = shockwave_hits(
            center,
            self.sim_config.shockwave_radius,
            self.sim_config.shockwave_impulse,
            self.sim_config.shockwave_damage,
            &self.sim_config,
            self.world.as_ref(),
            &self.players,
            &owner,
        );
        for (hit, impulse) in hits {
            let killed = self.apply_damage(shooter_id, &hit.target_id, hit.damage);
            if let Some(state) = self.players.get_mut(&hit.target_id) {
                state.velocity += hit.impulse_direction * impulse;
            }
            self.pending_events.push(GameEventKind::Hit {
                attacker_id: shooter_id.to_owned(),
                target_id: hit.target_id,
                damage: Some(hit.damage),
                killed,
            });
        }
    }

    fn advance_projectiles(&mut self, dt: f64, ready: &[String]) {
        if self.projectiles.is_empty() {
            return;
        }
        let mut survivors = Vec::with_capacity(self.projectiles.len());
        let projectiles = std::mem::take(&mut self.projectiles);
        for mut proj in projectiles {
            proj.ttl -= dt;
            if proj.ttl <= 0.0 {
                self.pending_events.push(GameEventKind::ProjectileRemove {
                    owner_id: proj.owner_id.clone(),
                    projectile_id: proj.id,
                });
                continue;
            }

            let delta = proj.velocity * dt;
            let players: FxHashMap<String, PlayerState> = ready
                .iter()
                .filter_map(|id| self.players.get(id).map(|state| (id.clone(), *state)))
                .collect();
            let impact = resolve_projectile_impact(
                &proj,
                delta,
                &self.sim_config,
                &players,
                &proj.owner_id,
            );

            match impact {
                ProjectileImpact::None => {
                    proj.position += delta;
                    survivors.push(proj);
                }
                ProjectileImpact::Player { target_id, .. } => {
                    self.resolve_explosion_or_direct(&proj, Some(&target_id));
                    self.pending_events.push(GameEventKind::ProjectileRemove {
                        owner_id: proj.owner_id.clone(),
                        projectile_id: proj.id,
                    });
                }
                ProjectileImpact::World { point, .. } => {
                    let mut landed = proj.clone();
                    landed.position = point;
                    self.resolve_explosion_or_direct(&landed, None);
                    self.pending_events.push(GameEventKind::ProjectileRemove {
                        owner_id: proj.owner_id.clone(),
                        projectile_id: proj.id,
                    });
                }
            }
        }
        self.projectiles = survivors;
    }

    fn resolve_explosion_or_direct(
        &mut self,
        proj: &ProjectileState<String>,
        direct_target: Option<&str>,
    ) {
        if proj.explosion_radius > 0.0 {
            let hits = explosion_damage(
                proj.position,
                proj.explosion_radius,
                proj.damage,
                &self.players,
                &proj.owner_id,
            );
            for hit in hits {
                let killed = self.apply_damage(&proj.owner_id, &hit.target_id, hit.damage);
                self.pending_events.push(GameEventKind::Hit {
                    attacker_id: proj.owner_id.clone(),
                    target_id: hit.target_id,
                    damage: Some(hit.damage),
                    killed,
                });
            }
        } else if let Some(target_id) = direct_target {
            let killed = self.apply_damage(&proj.owner_id, target_id, proj.damage);
            self.pending_events.push(GameEventKind::Hit {
                attacker_id: proj.owner_id.clone(),
                target_id: target_id.to_owned(),
                damage: Some(proj.damage),
                killed,
            });
        }
    }

    fn update_pickups(&mut self, ready: &[String]) {
        for index in self.pickup_respawns.pop_until(&self.tick).collect::<Vec<_>>() {
            self.pickups[index].active = true;
        }

        for index in 0..self.pickups.len() {
            if !self.pickups[index].active {
                continue;
            }
            let definition_position = self.pickups[index].definition.position;
            let definition_radius = self.pickups[index].definition.radius;
            let collector = ready.iter().find(|id| {
                self.players
                    .get(id.as_str())
                    .is_some_and(|state| state.position.distance(definition_position) <= definition_radius)
            });
            let Some(collector) = collector.cloned() else {
                continue;
            };

            match self.pickups[index].definition.kind {
                PickupKind::Health => {
                    if let Some(combat) = self.combat.get_mut(&collector) {
                        combat.health =
                            (combat.health + self.pickups[index].definition.health_amount)
                                .min(afps_combat::MAX_HEALTH);
                    }
                }
                PickupKind::Ammo => {
                    let slot_index = self.pickups[index].definition.ammo_slot;
                    let amount = self.pickups[index].definition.ammo_amount;
                    if let Some(magazine_size) =
                        self.weapon_config.definition(slot_index).map(|d| d.magazine_size)
                    {
                        if let Some(weapons) = self.weapons.get_mut(&collector) {
                            if let Some(slot) = weapons.slots.get_mut(slot_index) {
                                slot.ammo_in_mag = (slot.ammo_in_mag + amount).min(magazine_size);
                            }
                        }
                    }
                }
            }

            self.pickups[index].deactivate(self.tick, self.tick_rate);
            if let Some(respawn_tick) = self.pickups[index].respawn_tick {
                self.pickup_respawns.schedule(respawn_tick, index);
            }
        }
    }

    fn flush_events(&mut self, store: &SignalingStore, ready: &[String]) {
        if self.pending_events.is_empty() {
            return;
        }
        for kind in self.pending_events.drain(..) {
            let message = ServerMessage::GameEvent(GameEvent { kind });
            let Ok(bytes) = encode_message(&message) else {
                continue;
            };
            for id in ready {
                if let Some(conn) = store.get_connection(id) {
                    let _ = conn.send_unreliable(bytes.clone().into());
                }
            }
        }
    }

    fn emit_snapshots(&mut self, store: &SignalingStore, ready: &[String]) {
        for id in ready {
            let Some(conn) = store.get_connection(id) else {
                continue;
            };
            let Some(player) = self.players.get(id) else {
                continue;
            };
            let Some(combat) = self.combat.get(id) else {
                continue;
            };
            let weapon_slot = *self.current_weapon_slot.get(id).unwrap_or(&0);
            let fields = SnapshotFields {
                position: player.position,
                velocity: player.velocity,
                dash_cooldown: player.dash_cooldown,
                health: combat.health,
                kills: combat.kills,
                deaths: combat.deaths,
                weapon_slot,
            };
            let last_seq = *self.last_processed_input_seq.get(id).unwrap_or(&0);
            let message =
                encode_snapshot(&conn, self.tick, last_seq, id, fields, self.keyframe_interval);
            if let Ok(bytes) = encode_message(&message) {
                let _ = conn.send_unreliable(bytes.into());
                self.telemetry.snapshots += 1;
            }
        }
    }

    fn maybe_report_telemetry(&mut self, ready_count: usize, now: f64) {
        let due = match self.last_telemetry_at {
            None => true,
            Some(last) => now - last >= 1.0,
        };
        if !due {
            return;
        }
        self.last_telemetry_at = Some(now);
        info!(
            ticks = self.telemetry.ticks,
            connections = ready_count,
            batches = self.telemetry.batches,
            inputs = self.telemetry.inputs,
            snapshots = self.telemetry.snapshots,
            "tick loop telemetry"
        );
        self.telemetry = TickTelemetry::default();
    }
}

#[allow(unused)]
fn assert_mask_bits_are_stable() {
    let _ = SnapshotFieldMask::ALL;
}
