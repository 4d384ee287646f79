//! Spawning policy
//!
//! Pickups and regular enemies arrive through independent per-tick Bernoulli
//! trials. The boss arrives once per world, as soon as the player's aura
//! reaches the world's threshold, and shuts off regular spawns from then on.

use glam::Vec2;
use rand::Rng;

use super::state::{AuraPickup, Enemy, GameEvent, GameState};
use super::world::WorldConfig;
use crate::consts::*;

/// Screen edge a regular enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Uniform point along this edge, just outside the playfield
    pub fn random_point(self, rng: &mut impl Rng) -> Vec2 {
        let m = ENEMY_SPAWN_MARGIN;
        match self {
            Edge::Top => Vec2::new(rng.random_range(0.0..=WIDTH), -m),
            Edge::Bottom => Vec2::new(rng.random_range(0.0..=WIDTH), HEIGHT + m),
            Edge::Left => Vec2::new(-m, rng.random_range(0.0..=HEIGHT)),
            Edge::Right => Vec2::new(WIDTH + m, rng.random_range(0.0..=HEIGHT)),
        }
    }
}

/// Where the boss appears
pub fn boss_spawn_point() -> Vec2 {
    Vec2::new(WIDTH / 2.0, BOSS_SPAWN_Y)
}

/// A regular enemy on a random edge with a level from the world's range
pub fn random_enemy(world: &WorldConfig, rng: &mut impl Rng) -> Enemy {
    let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
    let pos = edge.random_point(rng);
    let (min_level, max_level) = world.enemy_level_range;
    let level = rng.random_range(min_level..=max_level);
    Enemy::new(level, pos, false, rng)
}

/// Spawn this world's boss, once
pub fn spawn_boss(state: &mut GameState) {
    if state.boss_spawned {
        return;
    }
    state.boss_spawned = true;
    let boss = Enemy::new(state.world.boss_level, boss_spawn_point(), true, &mut state.rng);
    state.enemies.push(boss);
    state.events.push(GameEvent::BossSpawned {
        world_number: state.world.world_number,
    });
    log::info!(
        "World {} boss spawned at aura {}",
        state.world.world_number,
        state.player.aura
    );
}

/// Run one tick of the spawning policy
pub fn handle_spawning(state: &mut GameState) {
    let world = state.world;

    if state.pickups.len() < MAX_PICKUPS && state.rng.random_bool(world.aura_spawn_rate) {
        state.pickups.push(AuraPickup::new(&mut state.rng));
    }

    if !state.boss_spawned && state.player.aura >= world.aura_required_for_boss_spawn {
        spawn_boss(state);
    }

    if !state.boss_spawned && state.rng.random_bool(world.enemy_spawn_rate) {
        let enemy = random_enemy(&world, &mut state.rng);
        state.enemies.push(enemy);
    }
}
