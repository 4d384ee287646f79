//! Light War - a world-hopping arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, combat, world progression)
//! - `driver`: Fixed timestep loop that feeds the simulation and its collaborators
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Sound effects and music playlist (always optional)
//! - `settings`: Runtime configuration

pub mod audio;
pub mod autopilot;
pub mod driver;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::Game;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const WIDTH: f32 = 900.0;
    pub const HEIGHT: f32 = 700.0;

    /// Simulation steps per nominal second
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Pause between a defeated boss and the next world (2 seconds)
    pub const WORLD_COMPLETE_TICKS: u32 = 2 * TICK_RATE;

    /// Player defaults (velocities are pixels per tick)
    pub const PLAYER_RADIUS: f32 = 18.0;
    pub const PLAYER_SPAWN_OFFSET_Y: f32 = 80.0;
    pub const PLAYER_EDGE_INSET: f32 = 20.0;
    pub const PLAYER_FIRE_COOLDOWN: u32 = 10;
    pub const PLAYER_BULLET_DAMAGE: i32 = 5;
    pub const PLAYER_BULLET_RADIUS: f32 = 4.0;

    /// Enemy defaults
    pub const ENEMY_EDGE_INSET: f32 = 10.0;
    pub const ENEMY_SPAWN_MARGIN: f32 = 20.0;
    pub const ENEMY_MIN_SHOOT_COOLDOWN: i32 = 24;
    pub const ENEMY_FIRST_SHOT_MIN: i32 = 20;
    pub const ENEMY_WOBBLE_AMPLITUDE: f32 = 0.45;
    /// Milliseconds per radian of wobble phase
    pub const ENEMY_WOBBLE_PERIOD_MS: f32 = 220.0;
    pub const ENEMY_BULLET_DAMAGE: i32 = 1;
    pub const ENEMY_GLOW_TICKS: u32 = 12;
    pub const BOSS_SPAWN_Y: f32 = 80.0;

    /// Bullets die once they leave the playfield by this much
    pub const BULLET_OFFSCREEN_MARGIN: f32 = 20.0;
    /// Trail history kept for rendering
    pub const BULLET_TRAIL_LENGTH: usize = 7;

    /// Aura pickups
    pub const MAX_PICKUPS: usize = 8;
    pub const PICKUP_RADIUS: f32 = 9.0;
    pub const PICKUP_EDGE_INSET: f32 = 24.0;
    pub const PICKUP_PULSE_STEP: f32 = 0.12;

    /// Background starfield
    pub const STAR_COUNT: usize = 120;
}

/// Unit vector from `from` toward `to`, pointing down the screen when they coincide
#[inline]
pub fn direction_or_down(from: Vec2, to: Vec2) -> Vec2 {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO { Vec2::Y } else { dir }
}

/// Clamp a point into the playfield shrunk by `inset` on every side
#[inline]
pub fn clamp_to_playfield(pos: Vec2, inset: f32) -> Vec2 {
    pos.clamp(
        Vec2::splat(inset),
        Vec2::new(consts::WIDTH - inset, consts::HEIGHT - inset),
    )
}

/// Circle-circle overlap test; touching circles count as overlapping
#[inline]
pub fn circles_touch(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) <= radius_a + radius_b
}
