//! Progress-keyed spawn scheduling.
//!
//! Houses spawn on a wall-time cadence; everything else keys off the progress
//! counter. One-shot rules fire at a threshold, repeating rules re-roll their
//! next threshold after each spawn, and spawns gated on a landmark poll its
//! entered-view edge every frame instead of retrying on a timer.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Balloon, House, Landmark, LandmarkKind, Pickup, PickupKind, Wendigo};
use super::jet::FighterJet;
use super::state::{Biome, EncounterKind, GameEvent, GameState, Mode};
use crate::consts::*;

/// Spawn bookkeeping: thresholds, one-shot flags and the jet-wave cycle.
/// `None` thresholds are disabled rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSchedule {
    pub house_timer_ms: f32,
    pub capitol_spawned: bool,
    pub capitol_in_view: bool,
    /// Jets left in the campaign; reindeer kills are permanent
    pub jets_remaining: u32,
    pub jet_wave_active: bool,
    pub jet_encounter_active: bool,
    pub elite_encounter_active: bool,
    /// Progress mark when the last wave ended; drives flyby + next wave
    pub post_wave_start: Option<u32>,
    pub flyby_shown: bool,
    pub airbase_spawned: bool,
    pub airbase_in_view: bool,
    pub next_balloon_at: Option<u32>,
    pub next_reindeer_at: Option<u32>,
    pub next_coal_at: Option<u32>,
    pub next_shield_at: Option<u32>,
    pub next_wendigo_at: Option<u32>,
    pub boss_spawn_at: Option<u32>,
    pub survival_attack_ms: f32,
}

impl SpawnSchedule {
    pub fn new(mode: Mode) -> Self {
        let survival = mode == Mode::Survival;
        Self {
            house_timer_ms: 0.0,
            // Survival has no scripted landmarks; the chain introduces enemies
            capitol_spawned: survival,
            capitol_in_view: false,
            jets_remaining: JET_WAVE_SIZE,
            jet_wave_active: false,
            jet_encounter_active: false,
            elite_encounter_active: false,
            post_wave_start: None,
            flyby_shown: false,
            airbase_spawned: survival,
            airbase_in_view: false,
            next_balloon_at: None,
            next_reindeer_at: (!survival).then_some(REINDEER_FIRST_AT),
            next_coal_at: (!survival).then_some(COAL_FIRST_AT),
            next_shield_at: (!survival).then_some(SHIELD_AT),
            next_wendigo_at: None,
            boss_spawn_at: None,
            survival_attack_ms: SURVIVAL_ATTACK_EVERY_MS,
        }
    }
}

/// Run every spawn rule once for this frame
pub fn advance(state: &mut GameState, dt_ms: f32) {
    state.schedule.house_timer_ms += dt_ms;
    if state.schedule.house_timer_ms >= HOUSE_SPAWN_INTERVAL_MS {
        state.schedule.house_timer_ms = 0.0;
        spawn_house(state);
    }

    spawn_landmarks(state);
    poll_capitol(state);
    jet_wave_cycle(state);
    poll_airbase(state);
    elite_returns(state);
    spawn_balloons(state);
    spawn_pickups(state);
    spawn_wendigos(state);
}

fn spawn_house(state: &mut GameState) {
    let id = state.next_entity_id();
    // Houses sit on the ground band below the skyline
    let y = state.rng.random_range(SKY_H + 140.0..WORLD_H - 90.0);
    let biome = state.biome;
    state
        .houses
        .push(House::new(id, WORLD_W + 50.0, y, biome));
}

fn spawn_landmarks(state: &mut GameState) {
    if !state.schedule.capitol_spawned && state.houses_passed >= CAPITOL_AT {
        state.schedule.capitol_spawned = true;
        let id = state.next_entity_id();
        state
            .landmarks
            .push(Landmark::new(id, LandmarkKind::Capitol, WORLD_W + 80.0));
    }

    if !state.schedule.airbase_spawned && state.houses_passed >= AIRBASE_AT {
        state.schedule.airbase_spawned = true;
        let id = state.next_entity_id();
        state
            .landmarks
            .push(Landmark::new(id, LandmarkKind::Airbase, WORLD_W + 90.0));
    }
}

/// The first jet wave launches from the capitol once it is fully on screen
fn poll_capitol(state: &mut GameState) {
    if !state.schedule.capitol_spawned || state.schedule.capitol_in_view {
        return;
    }
    let in_view = state
        .landmarks
        .iter()
        .find(|l| l.kind == LandmarkKind::Capitol)
        .is_some_and(|l| l.fully_in_view());
    if in_view {
        state.schedule.capitol_in_view = true;
        if state.schedule.jets_remaining > 0 {
            start_jet_wave(state);
        }
    }
}

/// Between waves: flyby warning after 8 houses, next wave after 10
fn jet_wave_cycle(state: &mut GameState) {
    if !state.schedule.capitol_in_view || state.schedule.jet_wave_active {
        return;
    }
    let Some(start) = state.schedule.post_wave_start else {
        return;
    };
    let since = state.houses_passed.saturating_sub(start);

    if !state.schedule.flyby_shown && since >= FLYBY_AFTER_HOUSES {
        state.schedule.flyby_shown = true;
        if state.schedule.jets_remaining > 0 {
            state.push_event(GameEvent::FlybyWarning);
        }
    }
    if since >= WAVE_AFTER_HOUSES {
        state.schedule.post_wave_start = None;
        if state.schedule.jets_remaining > 0 {
            start_jet_wave(state);
        }
    }
}

pub(crate) fn start_jet_wave(state: &mut GameState) {
    if !state.schedule.capitol_in_view
        || state.schedule.jet_wave_active
        || state.schedule.jets_remaining == 0
    {
        return;
    }
    state.schedule.jet_wave_active = true;

    // Launch from the capitol roof when it is still around
    let spawn = state
        .landmarks
        .iter()
        .find(|l| l.kind == LandmarkKind::Capitol)
        .map(|l| Vec2::new(l.x, WORLD_H - 340.0))
        .unwrap_or(Vec2::new(WORLD_W + 40.0, WORLD_H / 2.0));

    let count = state.schedule.jets_remaining.min(JET_WAVE_SIZE);
    for i in 0..count {
        let id = state.next_entity_id();
        let offset = Vec2::new(30.0 * i as f32, 20.0 * i as f32);
        let target = Vec2::new(
            JET_HOVER_X + 40.0 * i as f32,
            state.rng.random_range(60.0..WORLD_H - 60.0),
        );
        let hover_ms = state.rng.random_range(JET_HOVER_MIN_MS..JET_HOVER_MAX_MS);
        state
            .jets
            .push(FighterJet::approaching(id, spawn + offset, target, hover_ms));
    }

    if !state.schedule.jet_encounter_active {
        state.schedule.jet_encounter_active = true;
        state.push_event(GameEvent::EncounterStarted(EncounterKind::Jets));
    }
}

/// Both elite jets scramble once the airbase is fully on screen
fn poll_airbase(state: &mut GameState) {
    if !state.schedule.airbase_spawned || state.schedule.airbase_in_view {
        return;
    }
    let in_view = state
        .landmarks
        .iter()
        .find(|l| l.kind == LandmarkKind::Airbase)
        .is_some_and(|l| l.fully_in_view());
    if in_view {
        state.schedule.airbase_in_view = true;
        spawn_elite(state, 0);
        spawn_elite(state, 1);
    }
}

/// A slot whose jet left re-enters a few houses later, unless permanently downed
fn elite_returns(state: &mut GameState) {
    if !state.schedule.airbase_in_view {
        return;
    }
    for idx in 0..state.elites.len() {
        let slot = &state.elites[idx];
        let due = !slot.downed
            && slot.jet.is_none()
            && slot.next_at.is_some_and(|at| state.houses_passed >= at);
        if due {
            state.elites[idx].next_at = None;
            spawn_elite(state, idx);
        }
    }
}

pub(crate) fn spawn_elite(state: &mut GameState, idx: usize) {
    if state.elites[idx].downed || state.elites[idx].jet.is_some() {
        return;
    }
    let id = state.next_entity_id();
    let y = state.rng.random_range(70.0..WORLD_H - 120.0);
    let cloak_ms = state
        .rng
        .random_range(ELITE_CLOAK_MIN_MS..ELITE_CLOAK_MAX_MS);
    // Staggered hover points so the pair never overlaps perfectly
    let hover_x = ELITE_HOVER_X - idx as f32 * ELITE_HOVER_STAGGER;
    state.elites[idx].jet = Some(super::jet::EliteJet::new(
        id,
        Vec2::new(WORLD_W + 70.0, y),
        hover_x,
        cloak_ms,
    ));

    if !state.schedule.elite_encounter_active {
        state.schedule.elite_encounter_active = true;
        state.push_event(GameEvent::EncounterStarted(EncounterKind::Elites));
    }
}

fn spawn_balloons(state: &mut GameState) {
    let roll = |rng: &mut rand_pcg::Pcg32, from: u32| {
        from + rng.random_range(BALLOON_MIN_HOUSES..=BALLOON_MAX_HOUSES)
    };

    match state.schedule.next_balloon_at {
        None => {
            let at = roll(&mut state.rng, state.houses_passed);
            state.schedule.next_balloon_at = Some(at);
        }
        Some(at) if state.houses_passed >= at => {
            let id = state.next_entity_id();
            let y = state.rng.random_range(60.0..(SKY_H - 40.0).max(80.0));
            let bob_phase = state.rng.random_range(0.0..std::f32::consts::TAU);
            state
                .balloons
                .push(Balloon::new(id, WORLD_W + 80.0, y, bob_phase));
            let at = roll(&mut state.rng, state.houses_passed);
            state.schedule.next_balloon_at = Some(at);
        }
        _ => {}
    }
}

fn spawn_pickups(state: &mut GameState) {
    // Reindeer, until all three are unlocked
    let due = state.sleigh.reindeer_unlocked < REINDEER_MAX
        && state.reindeer_pickup.is_none()
        && state
            .schedule
            .next_reindeer_at
            .is_some_and(|at| state.houses_passed >= at);
    if due {
        state.schedule.next_reindeer_at = None;
        let y = state.rng.random_range(60.0..WORLD_H - 60.0);
        state.reindeer_pickup = Some(Pickup::new(PickupKind::Reindeer, WORLD_W + 80.0, y));
    }

    // Coal launcher
    let due = !state.sleigh.coal_mounted
        && state.coal_pickup.is_none()
        && state
            .schedule
            .next_coal_at
            .is_some_and(|at| state.houses_passed >= at);
    if due {
        state.schedule.next_coal_at = None;
        // Kept low in the ground band so it is easy to grab
        let y = state.rng.random_range(SKY_H + 90.0..WORLD_H - 70.0);
        state.coal_pickup = Some(Pickup::new(PickupKind::CoalLauncher, WORLD_W + 90.0, y));
    }

    // Shield
    let due = !state.sleigh.shield.unlocked
        && state.shield_pickup.is_none()
        && state
            .schedule
            .next_shield_at
            .is_some_and(|at| state.houses_passed >= at);
    if due {
        state.schedule.next_shield_at = None;
        let y = state.rng.random_range(SKY_H + 110.0..WORLD_H - 80.0);
        state.shield_pickup = Some(Pickup::new(PickupKind::Shield, WORLD_W + 100.0, y));
    }
}

/// Interval ramps from one-per-10 houses down to one-per-house across the
/// forest's first stretch
pub fn wendigo_interval(houses_passed: u32) -> u32 {
    let span = (WENDIGO_RAMP_END - WENDIGO_RAMP_START) as f32;
    let t = ((houses_passed.saturating_sub(WENDIGO_RAMP_START)) as f32 / span).clamp(0.0, 1.0);
    (10.0 - t * 9.0).round().clamp(1.0, 10.0) as u32
}

fn spawn_wendigos(state: &mut GameState) {
    if state.biome != Biome::Forest {
        return;
    }
    let at = match state.schedule.next_wendigo_at {
        Some(at) => at,
        None => {
            state.schedule.next_wendigo_at = Some(state.houses_passed);
            state.houses_passed
        }
    };
    if state.houses_passed < at {
        return;
    }

    let id = state.next_entity_id();
    // Jitter keeps spawns from lining up with the house cadence
    let jitter = state.rng.random_range(0.0..220.0);
    let y = state.rng.random_range(SKY_H + 140.0..WORLD_H - 8.0);
    state
        .wendigos
        .push(Wendigo::new(id, WORLD_W + 120.0 + jitter, y));

    let interval = wendigo_interval(state.houses_passed);
    state.schedule.next_wendigo_at = Some(state.houses_passed + interval);
}
