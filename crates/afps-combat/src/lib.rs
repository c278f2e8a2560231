//! Lag-compensated combat resolution: hitscan and projectile hit
//! detection against rewound player poses, area-effect damage, shield
//! scaling, and the per-slot weapon firing state machine. Everything here
//! is pure data plus pure functions; the tick loop owns the actual
//! per-connection instances and decides when to call into this crate.

mod area;
mod combat_state;
mod hitscan;
mod pose_history;
mod projectile;
mod weapon;

pub use area::{explosion_damage, shockwave_hits, AreaHit};
pub use combat_state::{CombatState, MAX_HEALTH, RESPAWN_DELAY_SECONDS};
pub use hitscan::{resolve_hitscan, HitResult};
pub use pose_history::PoseHistory;
pub use projectile::{resolve_projectile_impact, ProjectileImpact, ProjectileState};
pub use weapon::{
    FireOutcome, PlayerWeaponState, WeaponConfig, WeaponDefinition, WeaponKind, WeaponSlotState,
    DEFAULT_WEAPON_SLOTS,
};
