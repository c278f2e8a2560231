//! The wall-clock-driven tick loop: a fixed-rate accumulator, the
//! per-tick procedure that folds drained input into [`afps_sim::step_player`]
//! and the combat resolver, projectile and pickup lifecycle, and the
//! snapshot cadence that emits a keyframe or delta per ready connection.
//! Everything here is meant to run on one dedicated thread, as the sole
//! writer of simulation state.

mod accumulator;
mod pickup;
mod snapshot;
mod tick_loop;

pub use accumulator::TickAccumulator;
pub use pickup::{PickupDefinition, PickupKind, PickupState};
pub use snapshot::{encode_snapshot, SnapshotFields};
pub use tick_loop::TickLoop;
