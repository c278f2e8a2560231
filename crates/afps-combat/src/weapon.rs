use serde::{Deserialize, Serialize};

/// Whether a weapon slot fires an instant [`crate::resolve_hitscan`] shot
/// or spawns a [`crate::ProjectileState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Hitscan,
    Projectile,
}

/// Static tunables for one weapon slot. The on-disk hot-reloadable loader
/// named in the original source is out of scope; this table is a
/// hardcoded default, but the slot-state machine it drives is fully
/// implemented because the tick loop and combat resolver depend on it
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub kind: WeaponKind,
    pub damage: f64,
    /// Seconds between shots.
    pub fire_rate: f64,
    pub magazine_size: u32,
    pub reload_seconds: f64,
    /// Heat added per shot; once cumulative heat reaches
    /// `overheat_threshold` the slot locks out until `overheat_timer`
    /// drains. A definition with `heat_per_shot == 0.0` never overheats.
    pub heat_per_shot: f64,
    pub overheat_threshold: f64,
    pub overheat_cooldown_seconds: f64,
    /// Hitscan-only: max ray distance.
    pub range: f64,
    /// Projectile-only.
    pub projectile_speed: f64,
    pub projectile_ttl: f64,
    pub projectile_radius: f64,
    pub explosion_radius: f64,
}

/// The full weapon loadout, indexed by `weapon_slot`. `Default` provides
/// three representative slots: a no-overheat hitscan rifle, a
/// fast-firing hitscan blaster that overheats, and a projectile launcher
/// with an explosion radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub slots: Vec<WeaponDefinition>,
}

/// `slot 0`: rifle, `slot 1`: blaster, `slot 2`: launcher.
pub const DEFAULT_WEAPON_SLOTS: usize = 3;

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            slots: vec![
                WeaponDefinition {
                    kind: WeaponKind::Hitscan,
                    damage: 25.0,
                    fire_rate: 0.15,
                    magazine_size: 30,
                    reload_seconds: 1.8,
                    heat_per_shot: 0.0,
                    overheat_threshold: 0.0,
                    overheat_cooldown_seconds: 0.0,
                    range: 100.0,
                    projectile_speed: 0.0,
                    projectile_ttl: 0.0,
                    projectile_radius: 0.0,
                    explosion_radius: 0.0,
                },
                WeaponDefinition {
                    kind: WeaponKind::Hitscan,
                    damage: 8.0,
                    fire_rate: 0.05,
                    magazine_size: 60,
                    reload_seconds: 2.2,
                    heat_per_shot: 10.0,
                    overheat_threshold: 100.0,
                    overheat_cooldown_seconds: 2.5,
                    range: 60.0,
                    projectile_speed: 0.0,
                    projectile_ttl: 0.0,
                    projectile_radius: 0.0,
                    explosion_radius: 0.0,
                },
                WeaponDefinition {
                    kind: WeaponKind::Projectile,
                    damage: 60.0,
                    fire_rate: 0.9,
                    magazine_size: 4,
                    reload_seconds: 2.5,
                    heat_per_shot: 0.0,
                    overheat_threshold: 0.0,
                    overheat_cooldown_seconds: 0.0,
                    range: 0.0,
                    projectile_speed: 28.0,
                    projectile_ttl: 4.0,
                    projectile_radius: 0.2,
                    explosion_radius: 4.0,
                },
            ],
        }
    }
}

impl WeaponConfig {
    #[must_use]
    pub fn definition(&self, slot: usize) -> Option<&WeaponDefinition> {
        self.slots.get(slot)
    }
}

/// Mutable per-slot firing state, owned by the tick loop and mutated only
/// inside a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponSlotState {
    pub ammo_in_mag: u32,
    pub cooldown: f64,
    pub reload_timer: f64,
    pub heat: f64,
    pub overheat_timer: f64,
}

impl WeaponSlotState {
    #[must_use]
    pub fn full(definition: &WeaponDefinition) -> Self {
        Self {
            ammo_in_mag: definition.magazine_size,
            cooldown: 0.0,
            reload_timer: 0.0,
            heat: 0.0,
            overheat_timer: 0.0,
        }
    }

    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reload_timer > 0.0
    }

    #[must_use]
    pub fn is_overheated(&self) -> bool {
        self.overheat_timer > 0.0
    }

    /// Advances all per-slot timers by `dt`. Completing a reload refills
    /// the magazine; completing the overheat cooldown resets `heat` to
    /// zero.
    pub fn tick(&mut self, definition: &WeaponDefinition, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.cooldown = (self.cooldown - dt).max(0.0);

        if self.reload_timer > 0.0 {
            self.reload_timer = (self.reload_timer - dt).max(0.0);
            if self.reload_timer <= 0.0 {
                self.ammo_in_mag = definition.magazine_size;
            }
        }

        if self.overheat_timer > 0.0 {
            self.overheat_timer = (self.overheat_timer - dt).max(0.0);
            if self.overheat_timer <= 0.0 {
                self.heat = 0.0;
            }
        }
    }

    /// Starts a reload if the magazine isn't already full and a reload
    /// isn't already running. A no-op otherwise (including while
    /// overheated; letting the heat drain is a separate gate).
    pub fn start_reload(&mut self, definition: &WeaponDefinition) {
        if self.is_reloading() || self.ammo_in_mag >= definition.magazine_size {
            return;
        }
        self.reload_timer = definition.reload_seconds;
    }

    /// Attempts to fire this slot. On success, decrements ammo, resets
    /// the cooldown, accumulates heat (starting the overheat cooldown if
    /// the threshold is crossed), and auto-starts a reload if the
    /// magazine emptied.
    pub fn try_fire(&mut self, definition: &WeaponDefinition) -> FireOutcome {
        if self.is_overheated() {
            return FireOutcome::Overheated;
        }
        if self.is_reloading() {
            return FireOutcome::Reloading;
        }
        if self.cooldown > 0.0 {
            return FireOutcome::OnCooldown;
        }
        if self.ammo_in_mag == 0 {
            self.start_reload(definition);
            return FireOutcome::OutOfAmmo;
        }

        self.ammo_in_mag -= 1;
        self.cooldown = definition.fire_rate;

        if definition.heat_per_shot > 0.0 {
            self.heat += definition.heat_per_shot;
            if self.heat >= definition.overheat_threshold {
                self.overheat_timer = definition.overheat_cooldown_seconds;
            }
        }

        if self.ammo_in_mag == 0 {
            self.start_reload(definition);
        }

        FireOutcome::Fired
    }
}

/// Result of [`WeaponSlotState::try_fire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    OnCooldown,
    OutOfAmmo,
    Reloading,
    Overheated,
}

/// Per-connection weapon state: every slot's [`WeaponSlotState`] plus a
/// monotonically increasing counter stamped onto outgoing `GameEvent`s so
/// clients can dedupe retransmitted events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeaponState {
    pub slots: Vec<WeaponSlotState>,
    pub shot_seq: u64,
}

impl PlayerWeaponState {
    #[must_use]
    pub fn new(config: &WeaponConfig) -> Self {
        Self {
            slots: config.slots.iter().map(WeaponSlotState::full).collect(),
            shot_seq: 0,
        }
    }

    pub fn tick(&mut self, config: &WeaponConfig, dt: f64) {
        for (slot, definition) in self.slots.iter_mut().zip(&config.slots) {
            slot.tick(definition, dt);
        }
    }

    pub fn next_shot_seq(&mut self) -> u64 {
        self.shot_seq += 1;
        self.shot_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_until_empty_then_reloads() {
        let definition = WeaponDefinition {
            magazine_size: 2,
            fire_rate: 0.0,
            reload_seconds: 1.0,
            ..WeaponConfig::default().slots[0]
        };
        let mut slot = WeaponSlotState::full(&definition);

        assert_eq!(slot.try_fire(&definition), FireOutcome::Fired);
        assert_eq!(slot.try_fire(&definition), FireOutcome::Fired);
        assert!(slot.is_reloading());
        assert_eq!(slot.try_fire(&definition), FireOutcome::Reloading);

        slot.tick(&definition, 1.0);
        assert!(!slot.is_reloading());
        assert_eq!(slot.ammo_in_mag, definition.magazine_size);
    }

    #[test]
    fn overheating_locks_out_until_drained() {
        let definition = WeaponDefinition {
            magazine_size: 100,
            fire_rate: 0.0,
            heat_per_shot: 50.0,
            overheat_threshold: 100.0,
            overheat_cooldown_seconds: 1.0,
            ..WeaponConfig::default().slots[1]
        };
        let mut slot = WeaponSlotState::full(&definition);
        assert_eq!(slot.try_fire(&definition), FireOutcome::Fired);
        assert_eq!(slot.try_fire(&definition), FireOutcome::Fired);
        assert!(slot.is_overheated());
        assert_eq!(slot.try_fire(&definition), FireOutcome::Overheated);

        slot.tick(&definition, 1.0);
        assert!(!slot.is_overheated());
        assert_eq!(slot.heat, 0.0);
    }

    #[test]
    fn respects_fire_rate_cooldown() {
        let definition = WeaponConfig::default().slots[0];
        let mut slot = WeaponSlotState::full(&definition);
        assert_eq!(slot.try_fire(&definition), FireOutcome::Fired);
        assert_eq!(slot.try_fire(&definition), FireOutcome::OnCooldown);
    }
}
