//! Per-frame orchestrator.
//!
//! Drives, once per tick and in this fixed order: player -> spawner -> entity
//! advance/cull -> biome transition -> boss -> interaction resolver ->
//! encounter bookkeeping. Pausing or a terminal state skips the whole
//! sequence, which also freezes every millisecond countdown for free.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::collision;
use super::entity::{CoalShot, ReindeerShot};
use super::spawn;
use super::state::{Biome, EncounterKind, GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target sleigh Y (from mouse/touch position)
    pub target_y: Option<f32>,
    /// Launch an attached reindeer
    pub launch_reindeer: bool,
    /// Fire the coal cannon
    pub fire_coal: bool,
    /// Hold the bubble shield up
    pub shield_held: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    state.events.clear();

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
            }
            _ => {}
        }
    }

    // Don't tick while paused or after a terminal state
    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    let input = &input;

    state.time_ticks += 1;

    // World entities run on the mode-scaled delta; the shield meter and the
    // boss attack clock run on the raw one
    let world_dt = dt_ms * state.mode.speed_scale();

    state.sleigh.update(input.target_y, world_dt);
    if input.launch_reindeer {
        fire_reindeer(state);
    }
    if input.fire_coal {
        fire_coal(state);
    }
    state.sleigh.shield.update(input.shield_held, dt_ms);

    spawn::advance(state, world_dt);
    advance_entities(state, world_dt);

    // Biome transition is a pure function of the progress counter
    let biome = Biome::for_progress(state.houses_passed, state.mode);
    if biome != state.biome {
        state.biome = biome;
        log::info!("entering {} at {} houses", biome.as_str(), state.houses_passed);
        state.push_event(GameEvent::BiomeChanged(biome));
        match biome {
            Biome::Forest => {
                // Start spawning immediately on entry
                state.schedule.next_wendigo_at = Some(state.houses_passed);
            }
            Biome::Wasteland => {
                state.schedule.next_wendigo_at = None;
                state.schedule.boss_spawn_at =
                    Some(state.houses_passed + BOSS_SPAWN_HOUSES_INTO_WASTELAND);
            }
            _ => {
                state.schedule.next_wendigo_at = None;
            }
        }
    }

    boss::advance(state, dt_ms);
    collision::resolve(state);
    end_encounters(state);
}

/// Launch one attached reindeer straight ahead
fn fire_reindeer(state: &mut GameState) {
    if state.sleigh.reindeer_cooldown_ms > 0.0 || state.sleigh.reindeer_ready == 0 {
        return;
    }
    state.sleigh.reindeer_ready -= 1;
    state.sleigh.reindeer_cooldown_ms = REINDEER_COOLDOWN_MS;
    // Restoring it costs deliveries
    state.sleigh.recharge_needed += 1;
    state.reindeer_shots.push(ReindeerShot {
        pos: Vec2::new(SLEIGH_X + 90.0, state.sleigh.y + 2.0),
    });
}

fn fire_coal(state: &mut GameState) {
    if !state.sleigh.coal_mounted || state.sleigh.coal_cooldown_ms > 0.0 {
        return;
    }
    state.sleigh.coal_cooldown_ms = COAL_COOLDOWN_MS;
    // Muzzle sits just under the sleigh's nose
    state.coal_shots.push(CoalShot {
        pos: Vec2::new(SLEIGH_X + 4.0, state.sleigh.y + 35.0),
    });
}

/// Advance every collection and cull what has left the screen. A culled house
/// is what moves the progress counter.
fn advance_entities(state: &mut GameState, dt_ms: f32) {
    {
        let GameState {
            houses,
            houses_passed,
            ..
        } = &mut *state;
        houses.retain_mut(|h| {
            h.update(dt_ms);
            if h.off_left() {
                *houses_passed += 1;
                false
            } else {
                true
            }
        });
    }

    state.landmarks.retain_mut(|l| {
        l.update(dt_ms);
        !l.off_left()
    });
    state.balloons.retain_mut(|b| {
        b.update(dt_ms);
        !b.off_left()
    });

    // Single-slot pickups: a miss re-arms the spawn rule a few houses out
    if let Some(p) = state.reindeer_pickup.as_mut() {
        p.update(dt_ms);
    }
    if state.reindeer_pickup.as_ref().is_some_and(|p| p.off_left()) {
        state.reindeer_pickup = None;
        if state.sleigh.reindeer_unlocked < REINDEER_MAX {
            state.schedule.next_reindeer_at = Some(state.houses_passed + PICKUP_RETRY_HOUSES);
        }
    }

    if let Some(p) = state.coal_pickup.as_mut() {
        p.update(dt_ms);
    }
    if state.coal_pickup.as_ref().is_some_and(|p| p.off_left()) {
        state.coal_pickup = None;
        state.schedule.next_coal_at = Some(state.houses_passed + PICKUP_RETRY_HOUSES);
    }

    if let Some(p) = state.shield_pickup.as_mut() {
        p.update(dt_ms);
    }
    if state.shield_pickup.as_ref().is_some_and(|p| p.off_left()) {
        state.shield_pickup = None;
        state.schedule.next_shield_at = Some(state.houses_passed + PICKUP_RETRY_HOUSES);
    }

    // Jets and their bullets
    {
        let GameState {
            jets,
            bullets,
            rng,
            ..
        } = &mut *state;
        for jet in jets.iter_mut() {
            jet.update(dt_ms, bullets, rng);
        }
    }
    state.jets.retain(|j| !j.offscreen());
    state.bullets.retain_mut(|b| {
        b.update(dt_ms);
        !b.off_left()
    });

    // Elite jets; an exit schedules the slot's next entrance
    {
        let GameState {
            elites,
            missiles,
            reindeer_shots,
            rng,
            ..
        } = &mut *state;
        for slot in elites.iter_mut() {
            if let Some(jet) = slot.jet.as_mut() {
                jet.update(dt_ms, missiles, reindeer_shots, rng);
            }
        }
    }
    for idx in 0..state.elites.len() {
        let gone = state.elites[idx].jet.as_ref().is_some_and(|j| j.off_left());
        if gone {
            state.elites[idx].jet = None;
            if !state.elites[idx].downed {
                let back_in = state
                    .rng
                    .random_range(ELITE_RETURN_MIN_HOUSES..=ELITE_RETURN_MAX_HOUSES);
                state.elites[idx].next_at = Some(state.houses_passed + back_in);
            }
        }
    }

    let sleigh_pos = Vec2::new(SLEIGH_X, state.sleigh.y);
    state.missiles.retain_mut(|m| {
        m.update(dt_ms, sleigh_pos);
        !m.offscreen()
    });

    // Wendigos throw as they come into view
    {
        let GameState {
            wendigos,
            dirt_balls,
            sleigh,
            ..
        } = &mut *state;
        let target = Vec2::new(SLEIGH_X, sleigh.y);
        for wendigo in wendigos.iter_mut() {
            if let Some(dirt) = wendigo.update(dt_ms, target) {
                dirt_balls.push(dirt);
            }
        }
    }
    state.wendigos.retain(|w| !w.off_left());
    state.dirt_balls.retain_mut(|d| {
        d.update(dt_ms);
        !d.offscreen()
    });

    state.reindeer_shots.retain_mut(|s| {
        s.update(dt_ms);
        !s.off_right()
    });
    state.coal_shots.retain_mut(|c| {
        c.update(dt_ms);
        !c.off_right()
    });
    state.smoke_clouds.retain_mut(|s| {
        s.update(dt_ms);
        !s.dead_or_off_left()
    });
}

/// Encounters end the frame their last enemy is gone, however it went
fn end_encounters(state: &mut GameState) {
    if state.schedule.jet_wave_active && state.jets.is_empty() {
        state.schedule.jet_wave_active = false;
        state.schedule.post_wave_start = Some(state.houses_passed);
        state.schedule.flyby_shown = false;
    }
    if state.schedule.jet_encounter_active && state.jets.is_empty() {
        state.schedule.jet_encounter_active = false;
        state.push_event(GameEvent::EncounterEnded(EncounterKind::Jets));
    }
    if state.schedule.elite_encounter_active && state.elites.iter().all(|s| s.jet.is_none()) {
        state.schedule.elite_encounter_active = false;
        state.push_event(GameEvent::EncounterEnded(EncounterKind::Elites));
    }
}

/// Demo-mode pilot: dodge what is closing in, otherwise line up the next
/// delivery, and use whatever weapons are mounted.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let sleigh_y = state.sleigh.y;

    let threat = state
        .bullets
        .iter()
        .map(|b| b.pos)
        .chain(state.missiles.iter().map(|m| m.pos))
        .chain(state.dirt_balls.iter().map(|d| d.pos))
        .filter(|p| {
            p.x > SLEIGH_X - 40.0 && p.x - SLEIGH_X < 420.0 && (p.y - sleigh_y).abs() < 140.0
        })
        .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    if let Some(p) = threat {
        // Break hard away from the nearest incoming shot
        input.target_y = Some(if p.y > sleigh_y {
            sleigh_y - 180.0
        } else {
            sleigh_y + 180.0
        });
    } else if let Some(house) = state
        .houses
        .iter()
        .filter(|h| !h.delivered && h.x > SLEIGH_X)
        .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    {
        input.target_y = Some(house.y - 40.0);
    }

    input.launch_reindeer = !state.jets.is_empty() && state.sleigh.reindeer_ready > 0;
    input.fire_coal = state.sleigh.coal_mounted
        && (state.boss.is_some()
            || !state.jets.is_empty()
            || state.elites.iter().any(|s| s.jet.is_some()));
    input.shield_held = state.sleigh.shield.unlocked
        && (state.attacks.chain.is_some() || !state.attacks.icicles.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Mode;
    use crate::sim::entity::House;

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = GameState::new(1, Mode::Campaign);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut state, &pause, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Paused);
        let frozen_ticks = state.time_ticks;

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.time_ticks, frozen_ticks);

        // Unpausing resumes on the same tick
        tick(&mut state, &pause, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, frozen_ticks + 1);
    }

    #[test]
    fn test_terminal_states_skip_the_tick() {
        let mut state = GameState::new(2, Mode::Campaign);
        state.phase = GamePhase::GameOver;
        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_house_cull_advances_progress() {
        let mut state = GameState::new(3, Mode::Campaign);
        let id = state.next_entity_id();
        state
            .houses
            .push(House::new(id, -HOUSE_SIZE.0 + 1.0, 700.0, Biome::Snow));

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert!(state.houses.is_empty());
        assert_eq!(state.houses_passed, 1);
    }

    #[test]
    fn test_biome_change_emits_event_and_schedules_boss() {
        let mut state = GameState::new(4, Mode::Campaign);
        state.houses_passed = VEGAS_AT - 1;
        state.biome = Biome::Snow;
        let id = state.next_entity_id();
        state
            .houses
            .push(House::new(id, -HOUSE_SIZE.0 + 1.0, 700.0, Biome::Snow));

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.biome, Biome::Vegas);
        assert!(state.events.contains(&GameEvent::BiomeChanged(Biome::Vegas)));

        // Entering the wasteland arms the boss spawn threshold
        let mut state = GameState::new(5, Mode::Campaign);
        state.houses_passed = WASTELAND_AT - 1;
        state.biome = Biome::Forest;
        let id = state.next_entity_id();
        state
            .houses
            .push(House::new(id, -HOUSE_SIZE.0 + 1.0, 700.0, Biome::Forest));

        tick(&mut state, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.biome, Biome::Wasteland);
        assert_eq!(
            state.schedule.boss_spawn_at,
            Some(WASTELAND_AT + BOSS_SPAWN_HOUSES_INTO_WASTELAND)
        );
    }

    #[test]
    fn test_fire_reindeer_needs_stock_and_cooldown() {
        let mut state = GameState::new(6, Mode::Campaign);
        let shoot = TickInput {
            launch_reindeer: true,
            ..Default::default()
        };

        tick(&mut state, &shoot, SIM_DT_MS);
        assert!(state.reindeer_shots.is_empty(), "nothing attached yet");

        state.sleigh.reindeer_unlocked = 2;
        state.sleigh.reindeer_ready = 2;
        tick(&mut state, &shoot, SIM_DT_MS);
        assert_eq!(state.reindeer_shots.len(), 1);
        assert_eq!(state.sleigh.reindeer_ready, 1);

        // Cooldown gates the second launch
        tick(&mut state, &shoot, SIM_DT_MS);
        assert_eq!(state.reindeer_shots.len(), 1);
    }

    #[test]
    fn test_coal_cooldown() {
        let mut state = GameState::new(7, Mode::Campaign);
        state.sleigh.coal_mounted = true;
        let fire = TickInput {
            fire_coal: true,
            ..Default::default()
        };

        tick(&mut state, &fire, SIM_DT_MS);
        assert_eq!(state.coal_shots.len(), 1);
        tick(&mut state, &fire, SIM_DT_MS);
        assert_eq!(state.coal_shots.len(), 1, "cooldown still running");
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed and inputs stay identical
        let mut a = GameState::new(424242, Mode::Campaign);
        let mut b = GameState::new(424242, Mode::Campaign);

        let inputs = [
            TickInput {
                target_y: Some(300.0),
                ..Default::default()
            },
            TickInput {
                target_y: Some(700.0),
                shield_held: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, SIM_DT_MS);
            tick(&mut b, input, SIM_DT_MS);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.houses_passed, b.houses_passed);
        assert_eq!(a.houses.len(), b.houses.len());
        assert_eq!(a.score, b.score);
        assert!((a.sleigh.y - b.sleigh.y).abs() < 0.0001);
        for (ha, hb) in a.houses.iter().zip(&b.houses) {
            assert!((ha.x - hb.x).abs() < 0.0001);
            assert_eq!(ha.id, hb.id);
        }
    }

    #[test]
    fn test_survival_runs_faster() {
        let mut campaign = GameState::new(8, Mode::Campaign);
        let mut survival = GameState::new(8, Mode::Survival);
        let id = campaign.next_entity_id();
        campaign.houses.push(House::new(id, 900.0, 700.0, Biome::Snow));
        let id = survival.next_entity_id();
        survival
            .houses
            .push(House::new(id, 900.0, 700.0, Biome::Wasteland));

        tick(&mut campaign, &TickInput::default(), SIM_DT_MS);
        tick(&mut survival, &TickInput::default(), SIM_DT_MS);

        let campaign_x = campaign.houses[0].x;
        let survival_x = survival.houses[0].x;
        assert!(survival_x < campaign_x, "survival world scrolls 1.5x faster");
    }
}
