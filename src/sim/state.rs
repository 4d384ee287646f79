//! Game state and core simulation types
//!
//! Every entity owns its own per-tick update rule; `GameState` owns the
//! entity collections plus the per-world and per-run counters.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::world::{self, WorldConfig};
use crate::consts::*;
use crate::{clamp_to_playfield, direction_or_down};

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Lives ran out
    Defeated,
    /// Every world's boss was beaten
    Victory,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Boss beaten, counting down to the next world
    WorldComplete,
    /// Run ended; only a restart leaves this phase
    GameOver(RunOutcome),
}

/// Bullet pattern level, derived purely from aura
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponTier {
    I,
    II,
    III,
    IV,
}

const PATTERN_I: [Vec2; 1] = [Vec2::new(0.0, -9.0)];
const PATTERN_II: [Vec2; 2] = [Vec2::new(-1.3, -9.0), Vec2::new(1.3, -9.0)];
const PATTERN_III: [Vec2; 3] = [
    Vec2::new(-1.8, -9.4),
    Vec2::new(0.0, -9.6),
    Vec2::new(1.8, -9.4),
];
const PATTERN_IV: [Vec2; 5] = [
    Vec2::new(-3.0, -11.0),
    Vec2::new(-1.4, -11.8),
    Vec2::new(0.0, -12.2),
    Vec2::new(1.4, -11.8),
    Vec2::new(3.0, -11.0),
];

impl WeaponTier {
    /// Aura needed to reach tiers II, III and IV
    pub const THRESHOLDS: [u32; 3] = [100, 250, 500];

    pub fn from_aura(aura: u32) -> Self {
        match aura {
            a if a < Self::THRESHOLDS[0] => WeaponTier::I,
            a if a < Self::THRESHOLDS[1] => WeaponTier::II,
            a if a < Self::THRESHOLDS[2] => WeaponTier::III,
            _ => WeaponTier::IV,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponTier::I => "I",
            WeaponTier::II => "II",
            WeaponTier::III => "III",
            WeaponTier::IV => "IV",
        }
    }

    /// Bullet velocities fired in one volley (pixels per tick)
    pub fn bullet_pattern(&self) -> &'static [Vec2] {
        match self {
            WeaponTier::I => &PATTERN_I,
            WeaponTier::II => &PATTERN_II,
            WeaponTier::III => &PATTERN_III,
            WeaponTier::IV => &PATTERN_IV,
        }
    }
}

/// Decorative background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub size: u32,
}

impl Star {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(rng.random_range(0.0..WIDTH), rng.random_range(0.0..HEIGHT)),
            speed: rng.random_range(0.4..2.2),
            size: rng.random_range(1..=3),
        }
    }

    /// Drift down; wrap to a random column just above the screen
    pub fn update(&mut self, rng: &mut impl Rng) {
        self.pos.y += self.speed;
        if self.pos.y > HEIGHT {
            self.pos.y = rng.random_range(-20.0..0.0);
            self.pos.x = rng.random_range(0.0..WIDTH);
        }
    }
}

/// Collectible that grants aura
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuraPickup {
    pub pos: Vec2,
    pub radius: f32,
    /// Render-only pulse phase
    pub pulse: f32,
}

impl AuraPickup {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range(PICKUP_EDGE_INSET..=WIDTH - PICKUP_EDGE_INSET),
                rng.random_range(PICKUP_EDGE_INSET..=HEIGHT - PICKUP_EDGE_INSET),
            ),
            radius: PICKUP_RADIUS,
            pulse: rng.random::<f32>() * TAU,
        }
    }

    pub fn update(&mut self) {
        self.pulse += PICKUP_PULSE_STEP;
    }
}

/// Which side fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A projectile moving in a straight line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub owner: BulletOwner,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub radius: f32,
    pub alive: bool,
    /// Previous positions for rendering (oldest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Bullet {
    pub fn new(owner: BulletOwner, pos: Vec2, vel: Vec2, damage: i32, radius: f32) -> Self {
        Self {
            owner,
            pos,
            vel,
            damage,
            radius,
            alive: true,
            trail: Vec::with_capacity(BULLET_TRAIL_LENGTH + 1),
        }
    }

    pub fn update(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > BULLET_TRAIL_LENGTH {
            self.trail.remove(0);
        }
        self.pos += self.vel;
        let m = BULLET_OFFSCREEN_MARGIN;
        if self.pos.x < -m || self.pos.x > WIDTH + m || self.pos.y < -m || self.pos.y > HEIGHT + m
        {
            self.alive = false;
        }
    }
}

/// Stats that follow from an enemy's level and boss flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub radius: f32,
    pub hp: i32,
    pub speed: f32,
    pub shoot_cooldown: i32,
}

impl EnemyStats {
    pub fn for_level(level: u32, boss: bool) -> Self {
        let l = level as i32;
        Self {
            radius: (18 + l * 2 + if boss { 20 } else { 0 }) as f32,
            hp: 10 + l * 6 + if boss { 80 } else { 0 },
            speed: 1.0 + level as f32 * 0.16 + if boss { 0.45 } else { 0.0 },
            shoot_cooldown: (120 - l * 6 - if boss { 30 } else { 0 })
                .max(ENEMY_MIN_SHOOT_COOLDOWN),
        }
    }
}

/// A hostile ship homing in on the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub level: u32,
    pub pos: Vec2,
    pub boss: bool,
    pub radius: f32,
    pub hp: i32,
    pub speed: f32,
    pub shoot_cooldown: i32,
    /// Ticks until the next shot
    pub shoot_timer: i32,
    /// Render-only flash after firing
    pub glow_boost: u32,
    /// Per-enemy phase offset for the weaving approach
    pub wobble_seed: f32,
}

impl Enemy {
    pub fn new(level: u32, pos: Vec2, boss: bool, rng: &mut impl Rng) -> Self {
        let stats = EnemyStats::for_level(level, boss);
        Self {
            level,
            pos,
            boss,
            radius: stats.radius,
            hp: stats.hp,
            speed: stats.speed,
            shoot_cooldown: stats.shoot_cooldown,
            shoot_timer: rng.random_range(ENEMY_FIRST_SHOT_MIN..=stats.shoot_cooldown),
            glow_boost: 0,
            wobble_seed: rng.random::<f32>() * TAU,
        }
    }

    /// Weave toward `target` and count down the shot timer
    pub fn update(&mut self, target: Vec2, elapsed_ms: f32) {
        let dir = direction_or_down(self.pos, target);
        let wobble = (elapsed_ms / ENEMY_WOBBLE_PERIOD_MS + self.wobble_seed).sin();
        let velocity = dir * self.speed + dir.perp() * wobble * ENEMY_WOBBLE_AMPLITUDE;
        self.pos = clamp_to_playfield(self.pos + velocity, ENEMY_EDGE_INSET);

        self.shoot_timer -= 1;
        self.glow_boost = self.glow_boost.saturating_sub(1);
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_timer <= 0
    }

    /// Bullet aimed at `target`; resets the shot timer
    pub fn fire_at(&mut self, target: Vec2) -> Bullet {
        let dir = direction_or_down(self.pos, target);
        let speed = 3.0 + self.level as f32 * 0.35 + if self.boss { 1.3 } else { 0.0 };
        let radius = if self.boss { 5.0 } else { 4.0 };
        self.shoot_timer = self.shoot_cooldown;
        self.glow_boost = ENEMY_GLOW_TICKS;
        Bullet::new(
            BulletOwner::Enemy,
            self.pos + dir * self.radius * 0.5,
            dir * speed,
            ENEMY_BULLET_DAMAGE,
            radius,
        )
    }

    /// Aura granted for destroying this enemy
    pub fn kill_reward(&self) -> u32 {
        10 + self.level * 4 + if self.boss { 45 } else { 0 }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f32,
    pub lives: u32,
    pub aura: u32,
    pub radius: f32,
    /// Ticks until the next volley
    pub shoot_timer: u32,
}

impl Player {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            pos: Vec2::new(WIDTH / 2.0, HEIGHT - PLAYER_SPAWN_OFFSET_Y),
            speed: config.player_speed,
            lives: config.starting_lives,
            aura: 0,
            radius: PLAYER_RADIUS,
            shoot_timer: 0,
        }
    }

    pub fn weapon_tier(&self) -> WeaponTier {
        WeaponTier::from_aura(self.aura)
    }

    /// Move along `axis` (any length; normalized here) and tick the fire cooldown
    pub fn update(&mut self, axis: Vec2) {
        let dir = axis.normalize_or_zero();
        self.pos = clamp_to_playfield(self.pos + dir * self.speed, PLAYER_EDGE_INSET);
        self.shoot_timer = self.shoot_timer.saturating_sub(1);
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_timer == 0
    }

    /// Bullets for one volley of the current weapon tier; resets the cooldown
    pub fn fire(&mut self) -> Vec<Bullet> {
        self.shoot_timer = PLAYER_FIRE_COOLDOWN;
        self.weapon_tier()
            .bullet_pattern()
            .iter()
            .map(|&vel| {
                let offset = Vec2::new(vel.x * 2.2, -self.radius);
                Bullet::new(
                    BulletOwner::Player,
                    self.pos + offset,
                    vel,
                    PLAYER_BULLET_DAMAGE,
                    PLAYER_BULLET_RADIUS,
                )
            })
            .collect()
    }
}

/// Things that happened during a tick, drained by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerFired { bullets: usize },
    EnemyFired { boss: bool },
    EnemyDestroyed { level: u32, boss: bool, pos: Vec2, reward: u32 },
    PickupCollected { aura: u32 },
    PlayerHit { lives: u32 },
    BossSpawned { world_number: u32 },
    WorldComplete { world_number: u32 },
    WorldStarted { world_number: u32 },
    GameOver { outcome: RunOutcome },
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay randomness: spawns, enemy levels, wobble seeds
    pub rng: Pcg32,
    /// Cosmetic randomness (starfield), kept apart so visuals never shift gameplay
    pub fx_rng: Pcg32,
    /// Current world (0-based index into the world table)
    pub world_index: usize,
    pub world: WorldConfig,
    pub phase: GamePhase,
    /// Ticks left in the WorldComplete countdown
    pub state_timer: u32,
    /// Simulation tick counter (never reset)
    pub time_ticks: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub pickups: Vec<AuraPickup>,
    pub stars: Vec<Star>,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_rngs(seed, Pcg32::seed_from_u64(seed), Pcg32::new(seed, 0xa02b_dbf7_bb3c_0a7))
    }

    /// Create a state with caller-supplied generators
    pub fn with_rngs(seed: u64, rng: Pcg32, mut fx_rng: Pcg32) -> Self {
        let world = world::WORLDS[0];
        let stars = (0..STAR_COUNT).map(|_| Star::new(&mut fx_rng)).collect();
        Self {
            seed,
            rng,
            fx_rng,
            world_index: 0,
            world,
            phase: GamePhase::Playing,
            state_timer: 0,
            time_ticks: 0,
            player: Player::new(&world),
            enemies: Vec::new(),
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            pickups: Vec::new(),
            stars,
            boss_spawned: false,
            boss_defeated: false,
            events: Vec::new(),
        }
    }

    /// Rebuild per-world state for `world_index`, optionally carrying aura over
    pub fn reset_world(&mut self, keep_aura: bool) {
        let prev_aura = if keep_aura { self.player.aura } else { 0 };
        if let Some(config) = world::get(self.world_index) {
            self.world = *config;
        }
        self.player = Player::new(&self.world);
        self.player.aura = prev_aura;
        self.clear_combat();
        self.pickups.clear();
        self.boss_spawned = false;
        self.boss_defeated = false;
    }

    /// Drop every enemy and bullet
    pub fn clear_combat(&mut self) {
        self.enemies.clear();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
    }

    /// Elapsed simulation time in milliseconds
    pub fn elapsed_ms(&self) -> f32 {
        (self.time_ticks as f64 * 1000.0 / TICK_RATE as f64) as f32
    }

    pub fn boss_alive(&self) -> bool {
        self.enemies.iter().any(|e| e.boss)
    }

    pub fn is_last_world(&self) -> bool {
        self.world_index + 1 >= world::world_count()
    }

    /// Take all events raised since the previous call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
