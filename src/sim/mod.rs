//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::handle_collisions;
pub use spawn::handle_spawning;
pub use state::{
    AuraPickup, Bullet, BulletOwner, Enemy, EnemyStats, GameEvent, GamePhase, GameState, Player,
    RunOutcome, Star, WeaponTier,
};
pub use tick::{TickInput, restart, tick};
pub use world::{WORLDS, WorldConfig};
