//! The player character: jump/duck physics and animation state
//!
//! Physics and animation run on separate clocks. Jump integration converts
//! the delta into reference frames; the animation timer accumulates raw
//! milliseconds against the per-status frame duration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision_box::CollisionBox;
use crate::frames_elapsed;
use crate::settings::{Settings, TrexTuning};

/// Sub-boxes while upright (running, jumping, waiting, crashed)
pub const RUNNING_BOXES: [CollisionBox; 6] = [
    CollisionBox::new(22.0, 0.0, 17.0, 16.0),
    CollisionBox::new(1.0, 18.0, 30.0, 9.0),
    CollisionBox::new(10.0, 35.0, 14.0, 8.0),
    CollisionBox::new(1.0, 24.0, 29.0, 5.0),
    CollisionBox::new(5.0, 30.0, 21.0, 4.0),
    CollisionBox::new(9.0, 34.0, 15.0, 4.0),
];

/// Sub-boxes while ducking
pub const DUCKING_BOXES: [CollisionBox; 1] = [CollisionBox::new(1.0, 18.0, 55.0, 25.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrexStatus {
    /// Before the first run starts
    Waiting,
    Running,
    Jumping,
    Ducking,
    Crashed,
}

impl TrexStatus {
    /// Frames in this status' animation loop
    pub fn frame_count(&self) -> usize {
        match self {
            TrexStatus::Waiting | TrexStatus::Running | TrexStatus::Ducking => 2,
            TrexStatus::Jumping | TrexStatus::Crashed => 1,
        }
    }

    /// How long each animation frame is shown
    pub fn ms_per_frame(&self) -> f32 {
        match self {
            TrexStatus::Waiting => 1000.0 / 3.0,
            TrexStatus::Running => 1000.0 / 12.0,
            TrexStatus::Ducking => 1000.0 / 8.0,
            TrexStatus::Jumping | TrexStatus::Crashed => 1000.0 / 60.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrexStatus::Waiting => "WAITING",
            TrexStatus::Running => "RUNNING",
            TrexStatus::Jumping => "JUMPING",
            TrexStatus::Ducking => "DUCKING",
            TrexStatus::Crashed => "CRASHED",
        }
    }
}

/// The character
#[derive(Debug, Clone)]
pub struct Trex {
    pub x_pos: f32,
    /// Top edge; never greater than `ground_y` after an update
    pub y_pos: f32,
    pub status: TrexStatus,
    /// Positive is downward
    pub jump_velocity: f32,
    pub jumping: bool,
    pub ducking: bool,
    pub speed_drop: bool,
    pub reached_min_height: bool,
    /// Accepted jumps since the last reset
    pub jump_count: u32,
    pub anim_frame: usize,
    anim_timer: f32,
    /// Duck intent currently held (grounded duck or armed speed drop)
    duck_held: bool,
    ground_y: f32,
    /// Absolute y that must be passed before a jump may be cut short
    min_jump_y: f32,
    tuning: TrexTuning,
}

impl Trex {
    pub fn new(settings: &Settings) -> Self {
        let ground_y = settings.ground_y();
        Self {
            x_pos: settings.trex.start_x_pos,
            y_pos: ground_y,
            status: TrexStatus::Waiting,
            jump_velocity: 0.0,
            jumping: false,
            ducking: false,
            speed_drop: false,
            reached_min_height: false,
            jump_count: 0,
            anim_frame: 0,
            anim_timer: 0.0,
            duck_held: false,
            ground_y,
            min_jump_y: ground_y - settings.trex.min_jump_height,
            tuning: settings.trex.clone(),
        }
    }

    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x_pos, self.y_pos)
    }

    #[inline]
    pub fn is_crashed(&self) -> bool {
        self.status == TrexStatus::Crashed
    }

    /// Switch status and restart its animation loop
    fn set_status(&mut self, status: TrexStatus) {
        self.status = status;
        self.anim_frame = 0;
        self.anim_timer = 0.0;
    }

    /// Leave the waiting pose
    pub fn start_running(&mut self) {
        if self.status == TrexStatus::Waiting {
            self.set_status(TrexStatus::Running);
        }
    }

    /// Begin a jump. Returns false (and changes nothing) when already
    /// airborne, ducking, or crashed.
    pub fn start_jump(&mut self, speed: f32) -> bool {
        if self.jumping || self.ducking || self.is_crashed() {
            return false;
        }
        self.set_status(TrexStatus::Jumping);
        self.jump_velocity = self.tuning.initial_jump_velocity - speed * self.tuning.jump_velocity_per_speed;
        self.jumping = true;
        self.reached_min_height = false;
        self.speed_drop = false;
        self.jump_count += 1;
        true
    }

    /// Cut the ascent short once the minimum height has been cleared
    pub fn end_jump(&mut self) {
        if self.reached_min_height && self.jump_velocity < self.tuning.drop_velocity {
            self.jump_velocity = self.tuning.drop_velocity;
        }
    }

    /// Start an accelerated descent
    pub fn set_speed_drop(&mut self) {
        self.speed_drop = true;
        self.jump_velocity = self.tuning.speed_drop_velocity;
    }

    /// Duck intent. Airborne it arms a speed drop instead; releasing a duck
    /// that was never pressed does nothing.
    pub fn set_duck(&mut self, duck: bool) {
        if self.is_crashed() {
            return;
        }

        if duck {
            self.duck_held = true;
            if self.jumping {
                if !self.speed_drop {
                    self.set_speed_drop();
                }
            } else if self.status != TrexStatus::Ducking {
                self.ducking = true;
                self.set_status(TrexStatus::Ducking);
            }
        } else {
            if !self.duck_held {
                return;
            }
            self.duck_held = false;
            if self.jumping {
                self.speed_drop = false;
            } else if self.status == TrexStatus::Ducking {
                self.ducking = false;
                self.set_status(TrexStatus::Running);
            }
        }
    }

    fn update_jump(&mut self, delta_ms: f32) {
        let frames = frames_elapsed(delta_ms);

        let step = if self.speed_drop {
            self.jump_velocity * self.tuning.speed_drop_coefficient * frames
        } else {
            self.jump_velocity * frames
        };
        self.y_pos += step.round();
        self.jump_velocity += self.tuning.gravity * frames;

        if self.y_pos < self.min_jump_y || self.speed_drop {
            self.reached_min_height = true;
        }

        if self.y_pos < self.tuning.max_jump_height || self.speed_drop {
            self.end_jump();
        }

        if self.y_pos > self.ground_y || (self.y_pos >= self.ground_y && self.jump_velocity > 0.0) {
            self.land();
        }
    }

    fn land(&mut self) {
        let duck_landing = self.speed_drop && self.duck_held;

        self.y_pos = self.ground_y;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.speed_drop = false;
        self.reached_min_height = false;

        if duck_landing {
            self.ducking = true;
            self.set_status(TrexStatus::Ducking);
        } else {
            self.duck_held = false;
            self.set_status(TrexStatus::Running);
        }
    }

    /// Advance jump physics (if airborne) and the animation loop
    pub fn update(&mut self, delta_ms: f32) {
        if self.jumping {
            self.update_jump(delta_ms);
        }

        if self.status.frame_count() > 1 {
            self.anim_timer += delta_ms;
            if self.anim_timer >= self.status.ms_per_frame() {
                self.anim_frame = (self.anim_frame + 1) % self.status.frame_count();
                self.anim_timer = 0.0;
            }
        }
    }

    /// Freeze in place. A ducking character is nudged forward one unit so
    /// the upright crash pose lines up with the obstacle.
    pub fn crash(&mut self) {
        if self.is_crashed() {
            return;
        }
        if self.status == TrexStatus::Ducking {
            self.x_pos += 1.0;
        }
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
        self.duck_held = false;
        self.jump_velocity = 0.0;
        self.set_status(TrexStatus::Crashed);
    }

    /// Back on the ground, running
    pub fn reset(&mut self) {
        self.x_pos = self.tuning.start_x_pos;
        self.y_pos = self.ground_y;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
        self.reached_min_height = false;
        self.duck_held = false;
        self.jump_count = 0;
        self.set_status(TrexStatus::Running);
    }

    /// Sub-boxes for the current status, body-local
    pub fn collision_boxes(&self) -> &'static [CollisionBox] {
        match self.status {
            TrexStatus::Ducking => &DUCKING_BOXES,
            _ => &RUNNING_BOXES,
        }
    }

    /// Full sprite rectangle in world space
    pub fn sprite_box(&self) -> CollisionBox {
        let width = if self.status == TrexStatus::Ducking {
            self.tuning.width_duck
        } else {
            self.tuning.width
        };
        CollisionBox::new(self.x_pos, self.y_pos, width, self.tuning.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MS_PER_FRAME;
    use proptest::prelude::*;

    fn trex() -> Trex {
        let mut t = Trex::new(&Settings::default());
        t.start_running();
        t
    }

    fn run_until_landed(t: &mut Trex, max_frames: usize) -> usize {
        for frame in 1..=max_frames {
            t.update(MS_PER_FRAME);
            if !t.jumping {
                return frame;
            }
        }
        panic!("did not land within {max_frames} frames");
    }

    #[test]
    fn test_starts_waiting_on_ground() {
        let t = Trex::new(&Settings::default());
        assert_eq!(t.status, TrexStatus::Waiting);
        assert_eq!(t.y_pos, 93.0);
        assert_eq!(t.x_pos, 50.0);
    }

    #[test]
    fn test_jump_velocity_scales_with_speed() {
        let mut t = trex();
        assert!(t.start_jump(6.0));
        assert!((t.jump_velocity - -10.6).abs() < 0.001);
        assert_eq!(t.status, TrexStatus::Jumping);
        assert_eq!(t.jump_count, 1);
    }

    #[test]
    fn test_second_jump_rejected() {
        let mut t = trex();
        assert!(t.start_jump(6.0));
        t.update(MS_PER_FRAME);
        let (y, v) = (t.y_pos, t.jump_velocity);
        assert!(!t.start_jump(6.0));
        assert_eq!((t.y_pos, t.jump_velocity), (y, v));
        assert_eq!(t.jump_count, 1);
    }

    #[test]
    fn test_jump_arc_lands_with_clamped_descent() {
        let mut settings = Settings::default();
        settings.trex.initial_jump_velocity = -12.0;
        settings.trex.jump_velocity_per_speed = 0.0;
        let mut t = Trex::new(&settings);
        t.start_running();
        assert!(t.start_jump(0.0));

        let mut cut = false;
        let mut lowest_y = t.y_pos;
        for _ in 0..120 {
            t.update(16.7);
            lowest_y = lowest_y.min(t.y_pos);
            assert!(t.y_pos <= t.ground_y());
            if t.y_pos < settings.trex.max_jump_height {
                cut = true;
            }
            if cut && t.jumping {
                assert!(t.jump_velocity >= settings.trex.drop_velocity - 0.001);
            }
            if !t.jumping {
                break;
            }
        }
        assert!(cut, "jump should pass the max jump height");
        assert!(!t.jumping);
        assert_eq!(t.y_pos, t.ground_y());
        assert_eq!(t.jump_velocity, 0.0);
        assert_eq!(t.status, TrexStatus::Running);
        assert!(lowest_y < settings.trex.max_jump_height);
    }

    #[test]
    fn test_short_hop_lands_quickly() {
        let mut t = trex();
        t.start_jump(6.0);
        let frames = run_until_landed(&mut t, 100);
        assert!(frames > 10 && frames < 60, "landed after {frames} frames");
    }

    #[test]
    fn test_speed_drop_shortens_jump() {
        let mut normal = trex();
        normal.start_jump(6.0);
        let normal_frames = run_until_landed(&mut normal, 100);

        let mut dropped = trex();
        dropped.start_jump(6.0);
        for _ in 0..5 {
            dropped.update(MS_PER_FRAME);
        }
        dropped.set_duck(true);
        assert!(dropped.speed_drop);
        assert_eq!(dropped.jump_velocity, 1.0);
        assert_eq!(dropped.status, TrexStatus::Jumping);
        let dropped_frames = run_until_landed(&mut dropped, 100) + 5;
        assert!(dropped_frames < normal_frames);
    }

    #[test]
    fn test_speed_drop_with_held_duck_lands_ducking() {
        let mut t = trex();
        t.start_jump(6.0);
        t.update(MS_PER_FRAME);
        t.set_duck(true);
        run_until_landed(&mut t, 100);
        assert_eq!(t.status, TrexStatus::Ducking);
        assert!(t.ducking);

        t.set_duck(false);
        assert_eq!(t.status, TrexStatus::Running);
        assert!(!t.ducking);
    }

    #[test]
    fn test_released_duck_lands_running() {
        let mut t = trex();
        t.start_jump(6.0);
        t.update(MS_PER_FRAME);
        t.set_duck(true);
        t.set_duck(false);
        assert!(!t.speed_drop);
        run_until_landed(&mut t, 100);
        assert_eq!(t.status, TrexStatus::Running);
    }

    #[test]
    fn test_grounded_duck_toggles_status() {
        let mut t = trex();
        t.set_duck(true);
        assert_eq!(t.status, TrexStatus::Ducking);
        assert_eq!(t.collision_boxes().len(), 1);
        assert_eq!(t.sprite_box().width, 59.0);
        assert!(!t.start_jump(6.0), "no jumping out of a duck");

        t.set_duck(false);
        assert_eq!(t.status, TrexStatus::Running);
        assert_eq!(t.collision_boxes().len(), 6);
    }

    #[test]
    fn test_unmatched_duck_end_is_noop() {
        let mut t = trex();
        t.set_duck(false);
        assert_eq!(t.status, TrexStatus::Running);

        t.start_jump(6.0);
        let v = t.jump_velocity;
        t.set_duck(false);
        assert_eq!(t.jump_velocity, v);
        assert!(t.jumping);
    }

    #[test]
    fn test_crash_while_ducking_nudges_once() {
        let mut t = trex();
        t.set_duck(true);
        t.crash();
        assert_eq!(t.status, TrexStatus::Crashed);
        assert_eq!(t.x_pos, 51.0);
        assert_eq!(t.collision_boxes(), &RUNNING_BOXES);
        t.crash();
        assert_eq!(t.x_pos, 51.0);

        t.set_duck(true);
        assert!(!t.start_jump(6.0));
        assert_eq!(t.status, TrexStatus::Crashed);

        t.reset();
        assert_eq!(t.status, TrexStatus::Running);
        assert_eq!(t.x_pos, 50.0);
    }

    #[test]
    fn test_crash_midair_freezes() {
        let mut t = trex();
        t.start_jump(6.0);
        for _ in 0..5 {
            t.update(MS_PER_FRAME);
        }
        let y = t.y_pos;
        t.crash();
        assert!(!t.jumping);
        for _ in 0..10 {
            t.update(MS_PER_FRAME);
        }
        assert_eq!(t.y_pos, y);

        t.reset();
        assert_eq!(t.y_pos, t.ground_y());
        assert_eq!(t.jump_count, 0);
    }

    #[test]
    fn test_animation_independent_of_physics() {
        let mut t = trex();
        assert_eq!(t.anim_frame, 0);
        // Running frames last 1000/12 ms
        t.update(50.0);
        assert_eq!(t.anim_frame, 0);
        t.update(40.0);
        assert_eq!(t.anim_frame, 1);
        t.update(90.0);
        assert_eq!(t.anim_frame, 0);
        assert_eq!(t.y_pos, t.ground_y());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Jump(f32),
        DuckStart,
        DuckEnd,
        Update(f32),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (6.0f32..13.0).prop_map(Op::Jump),
            Just(Op::DuckStart),
            Just(Op::DuckEnd),
            (0.0f32..200.0).prop_map(Op::Update),
        ]
    }

    proptest! {
        #[test]
        fn prop_never_below_ground(ops in prop::collection::vec(arb_op(), 1..200)) {
            let mut t = trex();
            for op in ops {
                match op {
                    Op::Jump(speed) => { t.start_jump(speed); }
                    Op::DuckStart => t.set_duck(true),
                    Op::DuckEnd => t.set_duck(false),
                    Op::Update(dt) => {
                        t.update(dt);
                        prop_assert!(t.y_pos <= t.ground_y());
                    }
                }
                prop_assert!(!t.jumping || t.status == TrexStatus::Jumping);
            }
        }

        #[test]
        fn prop_double_jump_same_trajectory(speed in 6.0f32..13.0, frames in 1usize..80) {
            let mut once = trex();
            let mut twice = trex();
            once.start_jump(speed);
            twice.start_jump(speed);
            twice.start_jump(speed);
            for _ in 0..frames {
                once.update(MS_PER_FRAME);
                twice.update(MS_PER_FRAME);
                prop_assert_eq!(once.y_pos, twice.y_pos);
                prop_assert_eq!(once.jump_velocity, twice.jump_velocity);
            }
        }
    }
}
