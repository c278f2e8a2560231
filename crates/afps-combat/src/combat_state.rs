use serde::{Deserialize, Serialize};

/// Maximum health a player can have. Mirrors the original `kMaxHealth`.
pub const MAX_HEALTH: f64 = 100.0;
/// Seconds between a death and the player becoming eligible to respawn.
pub const RESPAWN_DELAY_SECONDS: f64 = 3.0;

/// Per-player life/score state. Health is monotonically non-increasing
/// within a life; crossing zero triggers exactly one death/kill
/// side-effect and starts the respawn timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub health: f64,
    pub kills: u32,
    pub deaths: u32,
    pub alive: bool,
    pub respawn_timer: f64,
}

impl Default for CombatState {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            kills: 0,
            deaths: 0,
            alive: true,
            respawn_timer: 0.0,
        }
    }
}

impl CombatState {
    /// Applies `damage`, scaled by `multiplier` if `shield_active`, to this
    /// target's health. `multiplier` is clamped to `[0, 1]` so a shield can
    /// only reduce incoming damage, never amplify it. Returns `true` if
    /// this call was the killing blow (health crossed from positive to
    /// zero), in which case the caller should credit the attacker's kill
    /// exactly once.
    pub fn apply_damage_with_shield(
        &mut self,
        damage: f64,
        shield_active: bool,
        multiplier: f64,
    ) -> bool {
        if !self.alive || !damage.is_finite() || damage <= 0.0 {
            return false;
        }

        let scaled = if shield_active {
            damage * multiplier.clamp(0.0, 1.0)
        } else {
            damage
        };

        let was_alive = self.health > 0.0;
        self.health = (self.health - scaled).max(0.0);

        if was_alive && self.health <= 0.0 {
            self.alive = false;
            self.deaths += 1;
            self.respawn_timer = RESPAWN_DELAY_SECONDS;
            true
        } else {
            false
        }
    }

    /// Credits this attacker with one kill.
    pub fn credit_kill(&mut self) {
        self.kills += 1;
    }

    /// Counts down the respawn timer; once it reaches zero, revives the
    /// player at full health. Call once per tick for dead players.
    pub fn update_respawn(&mut self, dt: f64) {
        if self.alive || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.respawn_timer = (self.respawn_timer - dt).max(0.0);
        if self.respawn_timer <= 0.0 {
            self.alive = true;
            self.health = MAX_HEALTH;
        }
    }
}
