//! Axis-aligned overlap tests and the per-frame interaction resolver.
//!
//! All checks run once per frame in a fixed priority order: pickups, then
//! deliveries, then player hazards, then the sleigh's own shots. A frame can
//! cost at most one life no matter how many hazards overlap the sleigh
//! (break-on-first-hit), and pickups apply their effect exactly once.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss;
use super::entity::{PickupKind, SmokeCloud};
use super::state::{GameEvent, GamePhase, GameState, Mode};
use crate::consts::*;

/// Axis-aligned bounding box, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn centered(cx: f32, cy: f32, (w, h): (f32, f32)) -> Self {
        Self {
            x: cx - w / 2.0,
            y: cy - h / 2.0,
            w,
            h,
        }
    }

    /// Ground entities anchor at their bottom edge
    pub fn bottom_anchored(cx: f32, bottom_y: f32, (w, h): (f32, f32)) -> Self {
        Self {
            x: cx - w / 2.0,
            y: bottom_y - h,
            w,
            h,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// Run the whole interaction pass for this frame
pub fn resolve(state: &mut GameState) {
    resolve_pickups(state);
    resolve_deliveries(state);
    resolve_player_hazards(state);
    resolve_player_shots(state);
}

fn resolve_pickups(state: &mut GameState) {
    let sleigh_bounds = state.sleigh.bounds();

    // Each upgrade slot clears atomically with its effect
    if state
        .reindeer_pickup
        .as_ref()
        .is_some_and(|p| p.bounds().overlaps(&sleigh_bounds))
    {
        state.reindeer_pickup = None;
        if state.sleigh.reindeer_unlocked < REINDEER_MAX {
            state.sleigh.reindeer_unlocked += 1;
            state.sleigh.reindeer_ready += 1;
            if state.sleigh.reindeer_unlocked < REINDEER_MAX {
                state.schedule.next_reindeer_at =
                    Some(state.houses_passed + PICKUP_RETRY_HOUSES);
            }
        }
        state.push_event(GameEvent::PickupCollected(PickupKind::Reindeer));
    }

    if !state.sleigh.coal_mounted
        && state
            .coal_pickup
            .as_ref()
            .is_some_and(|p| p.bounds().overlaps(&sleigh_bounds))
    {
        state.coal_pickup = None;
        state.sleigh.coal_mounted = true;
        state.sleigh.coal_cooldown_ms = 0.0;
        state.push_event(GameEvent::PickupCollected(PickupKind::CoalLauncher));
    }

    if !state.sleigh.shield.unlocked
        && state
            .shield_pickup
            .as_ref()
            .is_some_and(|p| p.bounds().overlaps(&sleigh_bounds))
    {
        state.shield_pickup = None;
        state.sleigh.shield.grant();
        state.push_event(GameEvent::PickupCollected(PickupKind::Shield));
    }

    // Balloons restock once each and keep drifting
    for i in 0..state.balloons.len() {
        if state.balloons[i].has_present
            && state.balloons[i].bounds().overlaps(&sleigh_bounds)
            && state.balloons[i].collect()
        {
            state.sleigh.restock();
            state.push_event(GameEvent::PresentsRestocked);
        }
    }
}

fn resolve_deliveries(state: &mut GameState) {
    let sleigh_bounds = state.sleigh.bounds();
    for i in 0..state.houses.len() {
        if !state.houses[i].delivery_ready(&sleigh_bounds) {
            continue;
        }
        if !state.sleigh.consume_present() {
            break;
        }
        state.houses[i].delivered = true;
        state.score += 1;
        let house = state.houses[i].id;
        state.push_event(GameEvent::PresentDelivered { house });

        // Five deliveries buy back one launched reindeer
        if state.sleigh.recharge_needed > 0 {
            state.sleigh.recharge_progress += 1;
            if state.sleigh.recharge_progress >= RECHARGE_DELIVERIES {
                state.sleigh.recharge_progress = 0;
                state.sleigh.recharge_needed -= 1;
                if state.sleigh.reindeer_ready < state.sleigh.reindeer_unlocked {
                    state.sleigh.reindeer_ready += 1;
                }
            }
        }
    }
}

/// First damaging hazard in priority order wins; everything after it this
/// frame is ignored. Wind gusts slow instead of damaging and sit outside the
/// one-hit latch.
fn resolve_player_hazards(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    let sleigh_bounds = state.sleigh.bounds();

    if state.sleigh.vulnerable() {
        let mut hit = false;

        if let Some(i) = state
            .bullets
            .iter()
            .position(|b| b.bounds().overlaps(&sleigh_bounds))
        {
            state.bullets.remove(i);
            hit = true;
        } else if let Some(i) = state
            .missiles
            .iter()
            .position(|m| m.bounds().overlaps(&sleigh_bounds))
        {
            state.missiles.remove(i);
            hit = true;
        } else if let Some(i) = state
            .dirt_balls
            .iter()
            .position(|d| d.bounds().overlaps(&sleigh_bounds))
        {
            state.dirt_balls.remove(i);
            hit = true;
        } else {
            // Wall-type hazards damage without being consumed
            let anchor_x = boss::chain_anchor_x(state);
            let chain_hit = state
                .attacks
                .chain
                .as_ref()
                .is_some_and(|c| c.is_damaging() && c.bounds(anchor_x).overlaps(&sleigh_bounds));
            let icicle_hit = state.attacks.icicles.iter().any(|w| {
                w.top_bounds().overlaps(&sleigh_bounds)
                    || w.bottom_bounds().overlaps(&sleigh_bounds)
            });
            hit = chain_hit || icicle_hit;
        }

        if hit {
            if state.sleigh.shield.active {
                state.push_event(GameEvent::ShieldBlocked);
            } else {
                lose_life(state);
            }
        }
    }

    for i in 0..state.attacks.gusts.len() {
        if state.attacks.gusts[i].bounds().overlaps(&sleigh_bounds) {
            if !state.sleigh.shield.active {
                if state.sleigh.slow_ms <= 0.0 {
                    state.push_event(GameEvent::Slowed);
                }
                state.sleigh.slow_ms = state.sleigh.slow_ms.max(SLOW_DEBUFF_MS);
            }
            break;
        }
    }
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.sleigh.invincible_ms = HIT_INVINCIBLE_MS;
    let remaining = state.lives;
    state.push_event(GameEvent::LifeLost { remaining });

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!("game over at {} presents", state.score);
        state.push_event(GameEvent::GameOver { score: state.score });
    }
}

fn resolve_player_shots(state: &mut GameState) {
    // Reindeer down the first thing they touch and disappear
    let mut i = 0;
    while i < state.reindeer_shots.len() {
        let shot_bounds = state.reindeer_shots[i].bounds();
        let mut consumed = false;

        if let Some(j) = state
            .jets
            .iter()
            .position(|jet| jet.bounds().overlaps(&shot_bounds))
        {
            state.jets.remove(j);
            on_jet_downed(state);
            consumed = true;
        }

        if !consumed {
            if let Some(m) = state
                .missiles
                .iter()
                .position(|m| m.bounds().overlaps(&shot_bounds))
            {
                if state.missiles[m].take_hit() {
                    state.missiles.remove(m);
                }
                consumed = true;
            }
        }

        if !consumed
            && state
                .boss
                .as_ref()
                .is_some_and(|b| b.bounds().overlaps(&shot_bounds))
        {
            boss::damage_boss(state, 1);
            consumed = true;
        }

        if consumed {
            state.reindeer_shots.remove(i);
        } else {
            i += 1;
        }
    }

    // Coal detonates on the first impact
    let mut i = 0;
    while i < state.coal_shots.len() {
        let shot_bounds = state.coal_shots[i].bounds();
        let impact = state.jets.iter().any(|j| j.bounds().overlaps(&shot_bounds))
            || state
                .elites
                .iter()
                .any(|s| s.jet.as_ref().is_some_and(|j| j.bounds().overlaps(&shot_bounds)))
            || state
                .missiles
                .iter()
                .any(|m| m.bounds().overlaps(&shot_bounds))
            || state
                .boss
                .as_ref()
                .is_some_and(|b| b.bounds().overlaps(&shot_bounds));

        if impact {
            let pos = state.coal_shots[i].pos;
            state.coal_shots.remove(i);
            explode_coal(state, pos);
        } else {
            i += 1;
        }
    }
}

fn on_jet_downed(state: &mut GameState) {
    let remaining = if state.mode == Mode::Survival {
        // Jets always come back in survival
        state.schedule.jets_remaining
    } else {
        state.schedule.jets_remaining = state.schedule.jets_remaining.saturating_sub(1);
        state.schedule.jets_remaining
    };
    state.push_event(GameEvent::JetDowned { remaining });

    if state.mode != Mode::Survival && remaining == 0 {
        // Both jets gone for good: no more flybys or waves
        state.schedule.jet_wave_active = false;
        state.schedule.post_wave_start = None;
        state.schedule.flyby_shown = true;
    }
}

/// Area blast: kills basic and elite jets, chips missiles and the boss,
/// leaves a drifting smoke cloud
fn explode_coal(state: &mut GameState, pos: Vec2) {
    let r2 = COAL_BLAST_RADIUS * COAL_BLAST_RADIUS;
    state.smoke_clouds.push(SmokeCloud::new(pos));
    state.push_event(GameEvent::CoalExploded { x: pos.x, y: pos.y });

    let mut j = state.jets.len();
    while j > 0 {
        j -= 1;
        if (state.jets[j].pos - pos).length_squared() <= r2 {
            state.jets.remove(j);
            on_jet_downed(state);
        }
    }

    for idx in 0..state.elites.len() {
        let in_range = state.elites[idx]
            .jet
            .as_ref()
            .is_some_and(|e| (e.pos - pos).length_squared() <= r2);
        if !in_range {
            continue;
        }
        state.elites[idx].jet = None;
        if state.mode == Mode::Survival {
            // Survival elites reschedule instead of dying for good
            state.elites[idx].downed = false;
            let back_in = state
                .rng
                .random_range(ELITE_RETURN_MIN_HOUSES..=ELITE_RETURN_MAX_HOUSES);
            state.elites[idx].next_at = Some(state.houses_passed + back_in);
            state.schedule.airbase_in_view = true;
        } else {
            state.elites[idx].downed = true;
            state.elites[idx].next_at = None;
        }
        state.push_event(GameEvent::EliteDowned { slot: idx });
    }

    let mut m = state.missiles.len();
    while m > 0 {
        m -= 1;
        if (state.missiles[m].pos - pos).length_squared() <= r2 && state.missiles[m].take_hit() {
            state.missiles.remove(m);
        }
    }

    let boss_in_range = state
        .boss
        .as_ref()
        .is_some_and(|b| (b.pos - pos).length_squared() <= r2);
    if boss_in_range {
        boss::damage_boss(state, 1);
    }
}
