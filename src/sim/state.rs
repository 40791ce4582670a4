//! Game state and core simulation types
//!
//! Everything that must be persisted for save/continue and determinism lives
//! on `GameState`; the per-frame event queue is transient and serde-skipped.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{BossAttack, BossAttacks, Krampus};
use super::entity::{
    Balloon, CoalShot, DirtBall, House, Landmark, Pickup, PickupKind, ReindeerShot, SmokeCloud,
    Wendigo,
};
use super::jet::{Bullet, EliteSlot, FighterJet, HomingMissile};
use super::spawn::SpawnSchedule;
use crate::consts::*;
use crate::lerp;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen; only the pause toggle is honored
    Paused,
    /// Out of lives (terminal)
    GameOver,
    /// Boss defeated (terminal)
    Won,
}

/// Game mode selected at the title screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Biomes progress with the counter; boss fight at the end
    #[default]
    Campaign,
    /// Wasteland pinned, 1.5x speed, periodic boss attacks, no boss body
    Survival,
}

impl Mode {
    /// Multiplier applied to the world delta each tick
    pub fn speed_scale(&self) -> f32 {
        match self {
            Mode::Campaign => 1.0,
            Mode::Survival => SURVIVAL_SPEED_SCALE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Campaign => "campaign",
            Mode::Survival => "survival",
        }
    }
}

/// Visual/gameplay zone, keyed off the progress counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Biome {
    #[default]
    Snow,
    Vegas,
    Forest,
    Wasteland,
}

impl Biome {
    /// Pure function of the progress counter (monotonically non-decreasing),
    /// except survival mode pins the wasteland.
    pub fn for_progress(houses_passed: u32, mode: Mode) -> Biome {
        if mode == Mode::Survival {
            return Biome::Wasteland;
        }
        match houses_passed {
            p if p >= WASTELAND_AT => Biome::Wasteland,
            p if p >= FOREST_AT => Biome::Forest,
            p if p >= VEGAS_AT => Biome::Vegas,
            _ => Biome::Snow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Biome::Snow => "snow",
            Biome::Vegas => "vegas",
            Biome::Forest => "forest",
            Biome::Wasteland => "wasteland",
        }
    }
}

/// Scripted periods during which a named enemy group is active; the host maps
/// these to music ducking and overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterKind {
    Jets,
    Elites,
}

/// One-frame notifications drained by the host after each tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BiomeChanged(Biome),
    PresentDelivered { house: u32 },
    PresentsRestocked,
    PickupCollected(PickupKind),
    ShieldBlocked,
    Slowed,
    LifeLost { remaining: u8 },
    GameOver { score: u32 },
    EncounterStarted(EncounterKind),
    EncounterEnded(EncounterKind),
    /// Background jets streak past as a warning before the next wave
    FlybyWarning,
    JetDowned { remaining: u32 },
    EliteDowned { slot: usize },
    CoalExploded { x: f32, y: f32 },
    BossSpawned,
    BossAttack(BossAttack),
    BossHit { hp: u32 },
    BossDefeated { score: u32 },
}

/// Bubble shield energy meter.
///
/// Drains 1:1 while projecting; draining to empty trips a lockout that only
/// clears at full charge. Recharge runs whenever the bubble is not actively
/// projecting, so holding the key with an empty meter does not stall it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shield {
    pub unlocked: bool,
    pub energy_ms: f32,
    pub active: bool,
    pub lockout: bool,
}

impl Shield {
    /// Unlock with a full meter (pickup effect)
    pub fn grant(&mut self) {
        self.unlocked = true;
        self.energy_ms = SHIELD_MAX_MS;
        self.lockout = false;
    }

    /// Advance the meter by the raw (unscaled) frame delta
    pub fn update(&mut self, holding: bool, dt_ms: f32) {
        if !self.unlocked {
            self.active = false;
            return;
        }

        let recharge_rate = SHIELD_MAX_MS / SHIELD_RECHARGE_MS;

        if self.lockout {
            self.active = false;
            self.energy_ms = (self.energy_ms + dt_ms * recharge_rate).min(SHIELD_MAX_MS);
            if self.energy_ms >= SHIELD_MAX_MS {
                self.lockout = false;
            }
        } else if holding && self.energy_ms > 0.0 {
            self.active = true;
            self.energy_ms = (self.energy_ms - dt_ms).max(0.0);
            if self.energy_ms <= 1.0 {
                self.active = false;
                self.lockout = true;
                self.energy_ms = 0.0;
            }
        } else {
            self.active = false;
            self.energy_ms = (self.energy_ms + dt_ms * recharge_rate).min(SHIELD_MAX_MS);
        }
    }
}

/// The player's sleigh: fixed X, cursor-chasing Y, presents and upgrades
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sleigh {
    pub y: f32,
    pub presents: u32,
    /// Post-hit flash window; hazards pass through while > 0
    pub invincible_ms: f32,
    /// Freezing-wind debuff; slows cursor following while > 0
    pub slow_ms: f32,
    /// Reindeer pickups collected (0..=3)
    pub reindeer_unlocked: u32,
    /// Reindeer currently attached and ready to launch
    pub reindeer_ready: u32,
    pub reindeer_cooldown_ms: f32,
    /// Launched reindeer awaiting the delivery-recharge loop
    pub recharge_needed: u32,
    pub recharge_progress: u32,
    pub coal_mounted: bool,
    pub coal_cooldown_ms: f32,
    pub shield: Shield,
}

impl Default for Sleigh {
    fn default() -> Self {
        Self {
            y: WORLD_H / 2.0,
            presents: MAX_PRESENTS,
            invincible_ms: 0.0,
            slow_ms: 0.0,
            reindeer_unlocked: 0,
            reindeer_ready: 0,
            reindeer_cooldown_ms: 0.0,
            recharge_needed: 0,
            recharge_progress: 0,
            coal_mounted: false,
            coal_cooldown_ms: 0.0,
            shield: Shield::default(),
        }
    }
}

impl Sleigh {
    /// Chase the cursor and run down weapon/debuff timers
    pub fn update(&mut self, target_y: Option<f32>, dt_ms: f32) {
        if let Some(target) = target_y {
            let target = target.clamp(SLEIGH_MIN_Y, SLEIGH_MAX_Y);
            let follow = if self.slow_ms > 0.0 {
                SLEIGH_FOLLOW_SLOWED
            } else {
                SLEIGH_FOLLOW
            };
            self.y = lerp(self.y, target, follow);
        }
        self.y = self.y.clamp(SLEIGH_MIN_Y, SLEIGH_MAX_Y);

        self.invincible_ms = (self.invincible_ms - dt_ms).max(0.0);
        self.slow_ms = (self.slow_ms - dt_ms).max(0.0);
        self.reindeer_cooldown_ms = (self.reindeer_cooldown_ms - dt_ms).max(0.0);
        self.coal_cooldown_ms = (self.coal_cooldown_ms - dt_ms).max(0.0);
    }

    pub fn bounds(&self) -> super::Aabb {
        super::Aabb::centered(SLEIGH_X, self.y, SLEIGH_SIZE)
    }

    pub fn vulnerable(&self) -> bool {
        self.invincible_ms <= 0.0
    }

    pub fn restock(&mut self) {
        self.presents = MAX_PRESENTS;
    }

    pub fn consume_present(&mut self) -> bool {
        if self.presents == 0 {
            return false;
        }
        self.presents -= 1;
        true
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub mode: Mode,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Presents delivered
    pub score: u32,
    pub lives: u8,
    /// Progress counter: houses that have scrolled off the left edge
    pub houses_passed: u32,
    /// Derived from the counter each frame; cached for change detection
    pub biome: Biome,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub sleigh: Sleigh,

    // World collections (spawn order = iteration order)
    pub houses: Vec<House>,
    pub landmarks: Vec<Landmark>,
    pub balloons: Vec<Balloon>,
    pub reindeer_pickup: Option<Pickup>,
    pub coal_pickup: Option<Pickup>,
    pub shield_pickup: Option<Pickup>,

    // Enemies and their projectiles
    pub jets: Vec<FighterJet>,
    pub bullets: Vec<Bullet>,
    pub elites: [EliteSlot; 2],
    pub missiles: Vec<HomingMissile>,
    pub wendigos: Vec<Wendigo>,
    pub dirt_balls: Vec<DirtBall>,

    // Sleigh weapons
    pub reindeer_shots: Vec<ReindeerShot>,
    pub coal_shots: Vec<CoalShot>,
    pub smoke_clouds: Vec<SmokeCloud>,

    // Boss fight
    pub boss: Option<Krampus>,
    pub boss_defeated: bool,
    /// Boss attacks run even with no boss body (survival mode)
    pub attacks: BossAttacks,

    pub schedule: SpawnSchedule,

    /// Terminal-state score has been handed to the leaderboard collaborator
    pub score_submitted: bool,

    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(seed: u64, mode: Mode) -> Self {
        let mut state = Self {
            seed,
            mode,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            score: 0,
            lives: START_LIVES,
            houses_passed: 0,
            biome: Biome::for_progress(0, mode),
            time_ticks: 0,
            sleigh: Sleigh::default(),
            houses: Vec::new(),
            landmarks: Vec::new(),
            balloons: Vec::new(),
            reindeer_pickup: None,
            coal_pickup: None,
            shield_pickup: None,
            jets: Vec::new(),
            bullets: Vec::new(),
            elites: Default::default(),
            missiles: Vec::new(),
            wendigos: Vec::new(),
            dirt_balls: Vec::new(),
            reindeer_shots: Vec::new(),
            coal_shots: Vec::new(),
            smoke_clouds: Vec::new(),
            boss: None,
            boss_defeated: false,
            attacks: BossAttacks::default(),
            schedule: SpawnSchedule::new(mode),
            score_submitted: false,
            events: Vec::new(),
            next_id: 1,
        };

        if mode == Mode::Survival {
            // Survival starts with the full loadout instead of pickups
            state.sleigh.reindeer_unlocked = 1;
            state.sleigh.reindeer_ready = 1;
            state.sleigh.coal_mounted = true;
            state.sleigh.shield.grant();
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// True once a terminal state has been reached
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Won)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_biome_thresholds() {
        assert_eq!(Biome::for_progress(0, Mode::Campaign), Biome::Snow);
        assert_eq!(Biome::for_progress(74, Mode::Campaign), Biome::Snow);
        assert_eq!(Biome::for_progress(80, Mode::Campaign), Biome::Vegas);
        assert_eq!(Biome::for_progress(160, Mode::Campaign), Biome::Forest);
        assert_eq!(Biome::for_progress(230, Mode::Campaign), Biome::Wasteland);
    }

    #[test]
    fn test_survival_pins_wasteland() {
        for p in [0, 10, 80, 160, 500] {
            assert_eq!(Biome::for_progress(p, Mode::Survival), Biome::Wasteland);
        }
    }

    proptest! {
        #[test]
        fn biome_is_monotonic(p in 0u32..100_000) {
            let rank = |b: Biome| match b {
                Biome::Snow => 0,
                Biome::Vegas => 1,
                Biome::Forest => 2,
                Biome::Wasteland => 3,
            };
            let here = rank(Biome::for_progress(p, Mode::Campaign));
            let next = rank(Biome::for_progress(p + 1, Mode::Campaign));
            prop_assert!(next >= here);
        }
    }

    #[test]
    fn test_shield_drains_and_locks_out() {
        let mut shield = Shield::default();
        shield.grant();
        assert_eq!(shield.energy_ms, SHIELD_MAX_MS);

        // Hold until the meter runs dry
        let mut held = 0.0;
        while !shield.lockout {
            shield.update(true, SIM_DT_MS);
            held += SIM_DT_MS;
            assert!(held < SHIELD_MAX_MS + 1000.0, "meter never ran dry");
        }
        assert!(!shield.active);
        assert_eq!(shield.energy_ms, 0.0);

        // Holding the key while locked out must not stall the recharge
        let mut elapsed = 0.0;
        while shield.lockout {
            shield.update(true, SIM_DT_MS);
            assert!(!shield.active);
            elapsed += SIM_DT_MS;
            assert!(elapsed < SHIELD_RECHARGE_MS + 1000.0, "recharge never finished");
        }
        assert_eq!(shield.energy_ms, SHIELD_MAX_MS);

        // Once full again it can project immediately
        shield.update(true, SIM_DT_MS);
        assert!(shield.active);
    }

    #[test]
    fn test_shield_recharges_when_released() {
        let mut shield = Shield::default();
        shield.grant();
        shield.update(true, 1000.0);
        let drained = shield.energy_ms;
        assert!(drained < SHIELD_MAX_MS);

        shield.update(false, 1000.0);
        assert!(shield.energy_ms > drained);
        assert!(!shield.active);
    }

    #[test]
    fn test_sleigh_clamps_to_band() {
        let mut sleigh = Sleigh::default();
        for _ in 0..600 {
            sleigh.update(Some(-500.0), SIM_DT_MS);
        }
        assert!(sleigh.y >= SLEIGH_MIN_Y);

        for _ in 0..600 {
            sleigh.update(Some(WORLD_H + 500.0), SIM_DT_MS);
        }
        assert!(sleigh.y <= SLEIGH_MAX_Y);
    }

    #[test]
    fn test_consume_present_stops_at_zero() {
        let mut sleigh = Sleigh::default();
        for _ in 0..MAX_PRESENTS {
            assert!(sleigh.consume_present());
        }
        assert!(!sleigh.consume_present());
        sleigh.restock();
        assert_eq!(sleigh.presents, MAX_PRESENTS);
    }

    #[test]
    fn test_survival_loadout() {
        let state = GameState::new(7, Mode::Survival);
        assert!(state.sleigh.coal_mounted);
        assert!(state.sleigh.shield.unlocked);
        assert_eq!(state.sleigh.reindeer_ready, 1);
        assert_eq!(state.biome, Biome::Wasteland);
    }
}
