//! Sleigh Run - a side-scrolling present-delivery arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, boss fight)
//! - `bounds`: Opaque-pixel bounds for host-side hitbox trimming
//! - `highscores`: Local score table with file persistence
//! - `settings`: Player preferences and unlocks

pub mod bounds;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (host render loop runs at 60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;

    /// World dimensions in screen pixels
    pub const WORLD_W: f32 = 1200.0;
    pub const WORLD_H: f32 = 800.0;
    /// Sky band is the top third; ground entities live below it
    pub const SKY_H: f32 = WORLD_H / 3.0;

    /// World scroll speed (houses, landmarks, ground enemies), px/s
    pub const SCROLL_SPEED: f32 = 500.0;
    /// Balloons drift a bit slower than the ground
    pub const BALLOON_SCROLL_SPEED: f32 = 400.0;
    /// Reindeer pickups drift between the two
    pub const REINDEER_PICKUP_SCROLL_SPEED: f32 = 450.0;

    /// Wall-time cadence for house spawns
    pub const HOUSE_SPAWN_INTERVAL_MS: f32 = 1800.0;

    /// Biome thresholds (houses passed)
    pub const VEGAS_AT: u32 = 75;
    pub const FOREST_AT: u32 = 150;
    pub const WASTELAND_AT: u32 = 225;

    /// Player sleigh
    pub const SLEIGH_X: f32 = 100.0;
    pub const SLEIGH_MIN_Y: f32 = 60.0;
    pub const SLEIGH_MAX_Y: f32 = WORLD_H - 60.0;
    /// Cursor-follow smoothing factor per tick
    pub const SLEIGH_FOLLOW: f32 = 0.25;
    /// Follow factor while slowed by freezing wind
    pub const SLEIGH_FOLLOW_SLOWED: f32 = 0.06;
    pub const MAX_PRESENTS: u32 = 15;
    pub const START_LIVES: u8 = 3;
    /// Post-hit flash window during which the sleigh cannot be hit again
    pub const HIT_INVINCIBLE_MS: f32 = 1000.0;
    pub const SLOW_DEBUFF_MS: f32 = 8000.0;

    /// Hit regions (w, h), sized to the visible sprite cores
    pub const SLEIGH_SIZE: (f32, f32) = (120.0, 64.0);
    pub const HOUSE_SIZE: (f32, f32) = (140.0, 120.0);
    pub const BALLOON_SIZE: (f32, f32) = (90.0, 110.0);
    pub const PICKUP_SIZE: (f32, f32) = (56.0, 48.0);
    pub const JET_SIZE: (f32, f32) = (130.0, 48.0);
    pub const ELITE_JET_SIZE: (f32, f32) = (150.0, 56.0);
    pub const BULLET_SIZE: (f32, f32) = (14.0, 4.0);
    pub const MISSILE_SIZE: (f32, f32) = (26.0, 10.0);
    pub const WENDIGO_SIZE: (f32, f32) = (70.0, 110.0);
    pub const DIRT_BALL_SIZE: (f32, f32) = (20.0, 20.0);
    pub const REINDEER_SHOT_SIZE: (f32, f32) = (60.0, 44.0);
    pub const COAL_SHOT_SIZE: (f32, f32) = (14.0, 14.0);
    pub const BOSS_SIZE: (f32, f32) = (160.0, 200.0);
    pub const CAPITOL_W: f32 = 340.0;
    pub const AIRBASE_W: f32 = 420.0;

    /// Spawn cadence (houses passed)
    pub const CAPITOL_AT: u32 = 10;
    pub const AIRBASE_AT: u32 = 85;
    pub const REINDEER_FIRST_AT: u32 = 40;
    pub const COAL_FIRST_AT: u32 = 105;
    pub const SHIELD_AT: u32 = 200;
    /// Missed pickups come back this many houses later
    pub const PICKUP_RETRY_HOUSES: u32 = 10;
    pub const BALLOON_MIN_HOUSES: u32 = 5;
    pub const BALLOON_MAX_HOUSES: u32 = 10;
    /// Post-wave counters: flyby warning, then the next wave
    pub const FLYBY_AFTER_HOUSES: u32 = 8;
    pub const WAVE_AFTER_HOUSES: u32 = 10;
    pub const ELITE_RETURN_MIN_HOUSES: u32 = 6;
    pub const ELITE_RETURN_MAX_HOUSES: u32 = 11;

    /// Fighter jets
    pub const JET_WAVE_SIZE: u32 = 2;
    pub const JET_HOVER_X: f32 = WORLD_W - 140.0;
    pub const JET_APPROACH_MS: f32 = 650.0;
    pub const JET_HOVER_MIN_MS: f32 = 1800.0;
    pub const JET_HOVER_MAX_MS: f32 = 2600.0;
    pub const JET_FIRE_MS: f32 = 900.0;
    pub const JET_FIRE_EVERY_MS: f32 = 110.0;
    pub const JET_EXIT_VX: f32 = -1200.0;
    pub const BULLET_SPEED: f32 = 900.0;

    /// Elite jets
    pub const ELITE_HOVER_X: f32 = WORLD_W - 160.0;
    pub const ELITE_HOVER_STAGGER: f32 = 70.0;
    pub const ELITE_CLOAK_MIN_MS: f32 = 1000.0;
    pub const ELITE_CLOAK_MAX_MS: f32 = 2000.0;
    pub const ELITE_VISIBLE_MS: f32 = 5000.0;
    pub const ELITE_EXIT_VX: f32 = -900.0;
    pub const ELITE_DODGE_DX: f32 = 140.0;
    pub const ELITE_DODGE_DY: f32 = 120.0;
    pub const MISSILE_SPEED: f32 = 520.0;
    pub const MISSILE_TRACKING_MS: f32 = 1000.0;

    /// Wendigos ramp from 1-per-10 to 1-per-1 houses across this progress span
    pub const WENDIGO_RAMP_START: u32 = 150;
    pub const WENDIGO_RAMP_END: u32 = 190;
    pub const DIRT_GRAVITY: f32 = 900.0;
    pub const DIRT_FLIGHT_SECS: f32 = 1.05;

    /// Sleigh weapons
    pub const REINDEER_MAX: u32 = 3;
    pub const REINDEER_SHOT_SPEED: f32 = 1200.0;
    pub const REINDEER_COOLDOWN_MS: f32 = 500.0;
    /// Deliveries needed to restore one launched reindeer
    pub const RECHARGE_DELIVERIES: u32 = 5;
    pub const COAL_COOLDOWN_MS: f32 = 8000.0;
    pub const COAL_SHOT_SPEED: f32 = 1000.0;
    pub const COAL_BLAST_RADIUS: f32 = 130.0;
    pub const SMOKE_LIFE_MS: f32 = 2600.0;

    /// Bubble shield: usable time when full, and time to refill from empty
    pub const SHIELD_MAX_MS: f32 = 3000.0;
    pub const SHIELD_RECHARGE_MS: f32 = 15_000.0;

    /// Boss fight
    pub const BOSS_SPAWN_HOUSES_INTO_WASTELAND: u32 = 8;
    pub const BOSS_MAX_HP: u32 = 20;
    pub const BOSS_HOVER_X: f32 = WORLD_W - 140.0;
    pub const BOSS_FIRST_ATTACK_MIN_MS: f32 = 1500.0;
    pub const BOSS_FIRST_ATTACK_MAX_MS: f32 = 2500.0;
    pub const BOSS_ATTACK_MIN_MS: f32 = 5000.0;
    pub const BOSS_ATTACK_MAX_MS: f32 = 8000.0;
    /// Follow-up delay while a snowstorm is raging
    pub const BOSS_STORM_ATTACK_MIN_MS: f32 = 1000.0;
    pub const BOSS_STORM_ATTACK_MAX_MS: f32 = 4000.0;
    pub const CHAIN_EXTEND_MS: f32 = 840.0;
    pub const CHAIN_HOLD_MS: f32 = 2000.0;
    pub const CHAIN_RETRACT_MS: f32 = 1640.0;
    /// A chain alive past this is force-cleared
    pub const CHAIN_SAFETY_MS: f32 = 8000.0;
    pub const ICICLE_SPEED: f32 = 900.0;
    pub const ICICLE_GAP_H: f32 = 260.0;
    pub const ICICLE_W: f32 = 90.0;
    pub const GUST_SPEED: f32 = 700.0;
    pub const GUST_W: f32 = WORLD_W * 0.40;
    pub const GUST_H: f32 = WORLD_H * 0.40;
    pub const SNOWSTORM_MS: f32 = 10_000.0;

    /// Survival mode
    pub const SURVIVAL_SPEED_SCALE: f32 = 1.5;
    pub const SURVIVAL_ATTACK_EVERY_MS: f32 = 10_000.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
