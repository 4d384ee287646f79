//! Per-world tuning table
//!
//! Worlds are played in order. Each one is harder than the last: a faster
//! ship, fewer lives, cheaper pickups, busier spawns and a later boss.

use serde::{Deserialize, Serialize};

/// Static tuning for one world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// 1-based number shown to the player
    pub world_number: u32,
    /// Ship speed (pixels per tick)
    pub player_speed: f32,
    pub starting_lives: u32,
    pub aura_gain_per_pickup: u32,
    /// Per-tick probability of a regular enemy spawn
    pub enemy_spawn_rate: f64,
    /// Per-tick probability of an aura pickup spawn
    pub aura_spawn_rate: f64,
    /// Inclusive level range for regular enemies
    pub enemy_level_range: (u32, u32),
    pub boss_level: u32,
    pub aura_required_for_boss_spawn: u32,
}

#[allow(clippy::too_many_arguments)]
const fn world(
    world_number: u32,
    player_speed: f32,
    starting_lives: u32,
    aura_gain_per_pickup: u32,
    enemy_spawn_rate: f64,
    aura_spawn_rate: f64,
    enemy_level_range: (u32, u32),
    boss_level: u32,
    aura_required_for_boss_spawn: u32,
) -> WorldConfig {
    WorldConfig {
        world_number,
        player_speed,
        starting_lives,
        aura_gain_per_pickup,
        enemy_spawn_rate,
        aura_spawn_rate,
        enemy_level_range,
        boss_level,
        aura_required_for_boss_spawn,
    }
}

/// All worlds, easiest first
pub const WORLDS: [WorldConfig; 7] = [
    world(1, 4.8, 6, 12, 0.012, 0.018, (1, 2), 4, 220),
    world(2, 5.0, 6, 11, 0.014, 0.017, (1, 3), 5, 300),
    world(3, 5.2, 5, 10, 0.016, 0.016, (2, 4), 6, 390),
    world(4, 5.4, 5, 9, 0.018, 0.015, (3, 5), 7, 500),
    world(5, 5.6, 4, 8, 0.020, 0.014, (4, 6), 8, 620),
    world(6, 5.8, 4, 7, 0.022, 0.013, (5, 7), 9, 760),
    world(7, 6.0, 3, 6, 0.026, 0.012, (6, 8), 10, 920),
];

/// Look up a world by 0-based index.
///
/// `None` means the index ran past the last world, i.e. the run was won.
pub fn get(world_index: usize) -> Option<&'static WorldConfig> {
    WORLDS.get(world_index)
}

/// Number of worlds in a full run
pub fn world_count() -> usize {
    WORLDS.len()
}
