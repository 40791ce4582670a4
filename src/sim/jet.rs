//! Enemy aircraft: fighter-jet and elite-jet phase machines plus their
//! projectiles.
//!
//! Phase transitions fire the instant a countdown reaches <= 0, never
//! interpolated across the boundary.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::ReindeerShot;
use crate::consts::*;
use crate::lerp;

/// Straight leftward cannon round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
}

impl Bullet {
    pub fn update(&mut self, dt_ms: f32) {
        self.pos.x -= BULLET_SPEED * dt_ms / 1000.0;
    }

    pub fn off_left(&self) -> bool {
        self.pos.x < -50.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos.x, self.pos.y, BULLET_SIZE)
    }
}

/// Fighter-jet behavior phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JetPhase {
    /// Timed slide toward a hover point
    Approach {
        ms_left: f32,
        target: Vec2,
        hover_ms: f32,
    },
    /// Bobbing at the hover point before opening fire
    Hover { ms_left: f32 },
    /// Periodic bullets for the burst duration
    Firing { ms_left: f32, cooldown_ms: f32 },
    /// Constant velocity off the screen
    Exit { vel: Vec2 },
}

/// Basic enemy aircraft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterJet {
    pub id: u32,
    pub pos: Vec2,
    pub phase: JetPhase,
    bob_ms: f32,
}

impl FighterJet {
    /// Spawn sliding in toward a hover point (normal wave entry)
    pub fn approaching(id: u32, pos: Vec2, target: Vec2, hover_ms: f32) -> Self {
        Self {
            id,
            pos,
            phase: JetPhase::Approach {
                ms_left: JET_APPROACH_MS,
                target,
                hover_ms,
            },
            bob_ms: 0.0,
        }
    }

    /// Spawn already on station (chain-grab release)
    pub fn hovering(id: u32, pos: Vec2, hover_ms: f32) -> Self {
        Self {
            id,
            pos,
            phase: JetPhase::Hover { ms_left: hover_ms },
            bob_ms: 0.0,
        }
    }

    pub fn update(&mut self, dt_ms: f32, bullets: &mut Vec<Bullet>, rng: &mut Pcg32) {
        self.bob_ms += dt_ms;
        let mut phase = self.phase;

        match &mut phase {
            JetPhase::Approach {
                ms_left,
                target,
                hover_ms,
            } => {
                *ms_left -= dt_ms;
                self.pos.x = lerp(self.pos.x, target.x, 0.08);
                self.pos.y = lerp(self.pos.y, target.y, 0.08);
                if *ms_left <= 0.0 {
                    // Snap to the hover point and begin hovering
                    self.pos = *target;
                    phase = JetPhase::Hover { ms_left: *hover_ms };
                }
            }
            JetPhase::Hover { ms_left } => {
                *ms_left -= dt_ms;
                self.pos.y += (self.bob_ms / 180.0).sin() * 0.12;
                if *ms_left <= 0.0 {
                    phase = JetPhase::Firing {
                        ms_left: JET_FIRE_MS,
                        cooldown_ms: 0.0,
                    };
                }
            }
            JetPhase::Firing { ms_left, cooldown_ms } => {
                *ms_left -= dt_ms;
                *cooldown_ms -= dt_ms;
                if *cooldown_ms <= 0.0 {
                    bullets.push(Bullet {
                        pos: Vec2::new(self.pos.x - JET_SIZE.0 * 0.45, self.pos.y),
                    });
                    *cooldown_ms = JET_FIRE_EVERY_MS;
                }
                if *ms_left <= 0.0 {
                    // Accelerate past the sleigh off to the side
                    let vy = rng.random_range(-120.0..120.0);
                    phase = JetPhase::Exit {
                        vel: Vec2::new(JET_EXIT_VX, vy),
                    };
                }
            }
            JetPhase::Exit { vel } => {
                self.pos += *vel * dt_ms / 1000.0;
            }
        }

        self.phase = phase;
    }

    pub fn offscreen(&self) -> bool {
        self.pos.x < -JET_SIZE.0 - 50.0
            || self.pos.x > WORLD_W + JET_SIZE.0 + 50.0
            || self.pos.y < -JET_SIZE.1 - 50.0
            || self.pos.y > WORLD_H + JET_SIZE.1 + 50.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos.x, self.pos.y, JET_SIZE)
    }
}

/// Elite-jet behavior phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ElitePhase {
    /// Sliding to station while cloaked
    CloakIn { ms_left: f32 },
    /// Decloaked after firing; holds station
    Visible { ms_left: f32 },
    /// Cloaked again, leaving
    Exit { vel: Vec2 },
}

/// Cloaking missile platform. Dodges reindeer and only dies to coal blasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliteJet {
    pub id: u32,
    pub pos: Vec2,
    pub hover_x: f32,
    pub cloaked: bool,
    pub phase: ElitePhase,
}

impl EliteJet {
    pub fn new(id: u32, pos: Vec2, hover_x: f32, cloak_ms: f32) -> Self {
        Self {
            id,
            pos,
            hover_x,
            cloaked: true,
            phase: ElitePhase::CloakIn { ms_left: cloak_ms },
        }
    }

    pub fn update(
        &mut self,
        dt_ms: f32,
        missiles: &mut Vec<HomingMissile>,
        shots: &[ReindeerShot],
        rng: &mut Pcg32,
    ) {
        // Sidestep incoming reindeer; they cannot damage an elite
        for shot in shots {
            if (shot.pos.x - self.pos.x).abs() < ELITE_DODGE_DX
                && (shot.pos.y - self.pos.y).abs() < ELITE_DODGE_DY
            {
                self.pos.y += if shot.pos.y < self.pos.y { 120.0 } else { -120.0 };
                self.pos.y = self.pos.y.clamp(60.0, WORLD_H - 60.0);
            }
        }

        let mut phase = self.phase;
        match &mut phase {
            ElitePhase::CloakIn { ms_left } => {
                self.pos.x = lerp(self.pos.x, self.hover_x, 0.06);
                *ms_left -= dt_ms;
                if *ms_left <= 0.0 {
                    // Decloak and fire immediately
                    self.cloaked = false;
                    missiles.push(HomingMissile::new(Vec2::new(
                        self.pos.x - 30.0,
                        self.pos.y,
                    )));
                    phase = ElitePhase::Visible {
                        ms_left: ELITE_VISIBLE_MS,
                    };
                }
            }
            ElitePhase::Visible { ms_left } => {
                self.pos.x = lerp(self.pos.x, self.hover_x, 0.08);
                *ms_left -= dt_ms;
                if *ms_left <= 0.0 {
                    self.cloaked = true;
                    let vy = rng.random_range(-120.0..120.0);
                    phase = ElitePhase::Exit {
                        vel: Vec2::new(ELITE_EXIT_VX, vy),
                    };
                }
            }
            ElitePhase::Exit { vel } => {
                self.pos += *vel * dt_ms / 1000.0;
            }
        }
        self.phase = phase;
    }

    pub fn off_left(&self) -> bool {
        self.pos.x < -ELITE_JET_SIZE.0 - 80.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos.x, self.pos.y, ELITE_JET_SIZE)
    }
}

/// One of the two elite hangar slots: its live jet, permanent-down flag and
/// the progress threshold for its next appearance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EliteSlot {
    pub jet: Option<EliteJet>,
    pub downed: bool,
    pub next_at: Option<u32>,
}

/// Steers at the sleigh for a fixed window, then flies straight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomingMissile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub tracking_ms: f32,
    pub hp: u8,
}

impl HomingMissile {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(-MISSILE_SPEED, 0.0),
            tracking_ms: MISSILE_TRACKING_MS,
            hp: 1,
        }
    }

    pub fn update(&mut self, dt_ms: f32, target: Vec2) {
        if self.tracking_ms > 0.0 {
            self.tracking_ms -= dt_ms;
            let dir = (target - self.pos).normalize_or_zero();
            if dir != Vec2::ZERO {
                self.vel = dir * MISSILE_SPEED;
            }
        }
        self.pos += self.vel * dt_ms / 1000.0;
    }

    /// Apply one hit; true if destroyed
    pub fn take_hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp == 0
    }

    pub fn offscreen(&self) -> bool {
        self.pos.x < -60.0 || self.pos.x > WORLD_W + 60.0 || self.pos.y < -60.0 || self.pos.y > WORLD_H + 60.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.pos.x, self.pos.y, MISSILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_jet_phase_sequence() {
        let mut rng = rng();
        let mut bullets = Vec::new();
        let mut jet = FighterJet::approaching(
            1,
            Vec2::new(WORLD_W + 40.0, 400.0),
            Vec2::new(JET_HOVER_X, 300.0),
            2000.0,
        );

        // Approach ends the tick its countdown crosses zero
        let mut ticks = 0;
        while matches!(jet.phase, JetPhase::Approach { .. }) {
            jet.update(SIM_DT_MS, &mut bullets, &mut rng);
            ticks += 1;
            assert!(ticks < 60, "approach never ended");
        }
        assert!(ticks as f32 * SIM_DT_MS >= JET_APPROACH_MS);
        assert!(matches!(jet.phase, JetPhase::Hover { .. }));
        assert_eq!(jet.pos.x, JET_HOVER_X);

        // Hover, then firing
        while matches!(jet.phase, JetPhase::Hover { .. }) {
            jet.update(SIM_DT_MS, &mut bullets, &mut rng);
            ticks += 1;
            assert!(ticks < 60 * 5, "hover never ended");
        }
        assert!(matches!(jet.phase, JetPhase::Firing { .. }));

        // Burst finishes and the jet exits leftward
        while matches!(jet.phase, JetPhase::Firing { .. }) {
            jet.update(SIM_DT_MS, &mut bullets, &mut rng);
            ticks += 1;
            assert!(ticks < 60 * 10, "burst never ended");
        }
        match jet.phase {
            JetPhase::Exit { vel } => assert_eq!(vel.x, JET_EXIT_VX),
            other => panic!("expected exit, got {other:?}"),
        }

        // One bullet on entering the burst, then one per cadence interval
        assert!(bullets.len() >= 8);
    }

    #[test]
    fn test_jet_exits_offscreen() {
        let mut rng = rng();
        let mut bullets = Vec::new();
        let mut jet = FighterJet::hovering(1, Vec2::new(JET_HOVER_X, 300.0), 100.0);
        for _ in 0..60 * 5 {
            jet.update(SIM_DT_MS, &mut bullets, &mut rng);
            if jet.offscreen() {
                return;
            }
        }
        panic!("jet never left the screen");
    }

    #[test]
    fn test_elite_fires_on_decloak() {
        let mut rng = rng();
        let mut missiles = Vec::new();
        let mut elite = EliteJet::new(1, Vec2::new(WORLD_W + 100.0, 300.0), ELITE_HOVER_X, 1200.0);
        assert!(elite.cloaked);

        let mut ticks = 0;
        while matches!(elite.phase, ElitePhase::CloakIn { .. }) {
            elite.update(SIM_DT_MS, &mut missiles, &[], &mut rng);
            ticks += 1;
            assert!(ticks < 60 * 3, "never decloaked");
        }
        assert!(!elite.cloaked);
        assert_eq!(missiles.len(), 1);
        assert!(matches!(elite.phase, ElitePhase::Visible { .. }));
    }

    #[test]
    fn test_elite_dodges_reindeer() {
        let mut rng = rng();
        let mut missiles = Vec::new();
        let mut elite = EliteJet::new(1, Vec2::new(800.0, 400.0), ELITE_HOVER_X, 5000.0);

        let shot = ReindeerShot {
            pos: Vec2::new(720.0, 420.0),
        };
        let before = elite.pos.y;
        elite.update(SIM_DT_MS, &mut missiles, &[shot], &mut rng);
        // Shot below the jet: it jukes upward
        assert!(elite.pos.y < before);
    }

    #[test]
    fn test_missile_tracks_then_flies_straight() {
        let target = Vec2::new(SLEIGH_X, 100.0);
        let mut missile = HomingMissile::new(Vec2::new(1000.0, 700.0));

        missile.update(SIM_DT_MS, target);
        assert!(missile.vel.y < 0.0, "should steer up toward the target");

        // Exhaust the tracking window, then the velocity freezes
        while missile.tracking_ms > 0.0 {
            missile.update(SIM_DT_MS, target);
        }
        let frozen = missile.vel;
        missile.update(SIM_DT_MS, Vec2::new(SLEIGH_X, 790.0));
        assert_eq!(missile.vel, frozen);
    }

    #[test]
    fn test_missile_single_hit() {
        let mut missile = HomingMissile::new(Vec2::new(500.0, 300.0));
        assert!(missile.take_hit());
        // Already destroyed; further hits are no-ops
        assert!(missile.take_hit());
    }
}
