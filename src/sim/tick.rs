//! Per-frame simulation tick
//!
//! Frame order while playing: terrain, character, obstacles, collision, then
//! distance. The score meter runs every tick in every phase except paused so
//! a flash started just before a crash still finishes.

use super::clock::split_delta;
use super::collision::check_nearest;
use super::state::{GameEvent, GamePhase, GameState};
use super::trex::DUCKING_BOXES;
use crate::consts::MS_PER_FRAME;

/// Frames of warning the autopilot gives itself before an obstacle arrives
const AUTOPILOT_LEAD_FRAMES: f32 = 4.0;

/// Intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (also starts the first run, or restarts after a crash once the
    /// game-over clear time has passed)
    pub jump: bool,
    /// Duck pressed
    pub duck_start: bool,
    /// Duck released
    pub duck_end: bool,
    /// Restart (only honored while crashed)
    pub restart: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the character plays by itself
    pub autopilot: bool,
}

/// Advance the game by `delta_ms` of wall-clock time
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Paused => {
                // The delta on this tick spans the pause
                state.phase = state.resume_phase;
                log::info!("Resumed");
                return;
            }
            phase => {
                state.resume_phase = phase;
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
        }
    }

    if state.phase == GamePhase::Paused {
        return;
    }

    state.time_ticks += 1;

    let runner = &state.settings.runner;
    if delta_ms > runner.max_frame_delta_ms {
        log::warn!(
            "Clamping frame delta {delta_ms:.1}ms to {}ms",
            runner.max_frame_delta_ms
        );
    }
    let (steps, step_ms) = split_delta(
        delta_ms,
        runner.max_frame_delta_ms,
        runner.max_physics_step_frames * MS_PER_FRAME,
    );
    let delta = step_ms * steps as f32;

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    handle_intents(state, &input);

    match state.phase {
        GamePhase::Playing => {
            for _ in 0..steps {
                if !step(state, step_ms) {
                    break;
                }
            }
            if state.phase == GamePhase::Playing {
                let runner = &state.settings.runner;
                state.current_speed = (state.current_speed + runner.acceleration).min(runner.max_speed);
            }
        }
        GamePhase::Crashed => {
            state.crash_time_ms += delta;
        }
        GamePhase::Waiting => {
            state.trex.update(delta);
        }
        GamePhase::Paused => {}
    }

    if state.distance_meter.update(delta, state.distance_ran) {
        let score = state.score();
        state.emit(GameEvent::Achievement { score });
    }
}

/// Apply this tick's intents for the current phase
fn handle_intents(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Waiting => {
            if input.jump {
                state.start();
                try_jump(state);
            } else if input.duck_start {
                state.start();
                state.trex.set_duck(true);
            }
        }
        GamePhase::Playing => {
            if input.duck_end {
                state.trex.set_duck(false);
            }
            if input.jump {
                try_jump(state);
            }
            if input.duck_start {
                state.trex.set_duck(true);
            }
        }
        GamePhase::Crashed => {
            let cleared = state.crash_time_ms >= state.settings.runner.gameover_clear_time_ms;
            if input.restart || (input.jump && cleared) {
                state.restart();
            }
        }
        GamePhase::Paused => {}
    }
}

fn try_jump(state: &mut GameState) {
    if state.trex.start_jump(state.current_speed) {
        state.emit(GameEvent::Jump);
    }
}

/// One physics sub-step. Returns false if the run ended.
fn step(state: &mut GameState, step_ms: f32) -> bool {
    let speed = state.current_speed;
    state.running_time_ms += step_ms;

    state.horizon.update(step_ms, speed, &mut state.rng);
    state.trex.update(step_ms);

    // Obstacle-free lead-in at the start of each run
    if state.running_time_ms > state.settings.runner.clear_time_ms {
        state.spawner.tick(step_ms, speed, &mut state.rng);
    }

    let nearest = state.spawner.nearest_ahead(state.trex.x_pos);
    if let Some(hit) = check_nearest(&state.trex, nearest) {
        state.game_over(Some(hit));
        return false;
    }

    state.distance_ran += speed as f64 * step_ms as f64 / MS_PER_FRAME as f64;
    true
}

/// Fill in intents for demo mode
fn autopilot(state: &GameState, input: &mut TickInput) {
    match state.phase {
        GamePhase::Waiting => {
            input.jump = true;
            return;
        }
        GamePhase::Crashed => {
            input.restart = true;
            return;
        }
        GamePhase::Playing => {}
        GamePhase::Paused => return,
    }

    let trex = &state.trex;
    let ground = trex.ground_y();
    let lead = state.current_speed * AUTOPILOT_LEAD_FRAMES;

    let (want_jump, want_duck) = match state.spawner.nearest_ahead(trex.x_pos) {
        Some(next) => {
            let distance = next.pos.x - trex.sprite_box().right();
            let bottom = next
                .collision_boxes
                .iter()
                .map(|b| next.pos.y + b.bottom())
                .fold(f32::MIN, f32::max);
            let near = distance <= lead;

            if bottom <= ground {
                // Passes overhead
                (false, false)
            } else if bottom <= ground + DUCKING_BOXES[0].y {
                (false, near)
            } else {
                (near, false)
            }
        }
        None => (false, false),
    };

    if trex.ducking && !want_duck {
        input.duck_end = true;
    }
    if want_duck && !trex.ducking && !trex.jumping {
        input.duck_start = true;
    }
    if want_jump && !trex.jumping {
        input.jump = true;
    }
}
