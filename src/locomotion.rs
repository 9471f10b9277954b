//! Locomotion state machine: Idle, Walk, Sprint and Jump.
//!
//! The machine owns its states in a name-keyed registry and forwards each
//! physics tick to the active one. States never hold a reference back to the
//! machine; a state that wants to transition returns the target name from
//! `physics_update` and the machine performs the lookup.

use glam::{Vec2, Vec3};
use std::collections::HashMap;

use crate::config::{AIR_CONTROL, GRAVITY, JUMP_VELOCITY, SPRINT_SPEED, WALK_SPEED};
use crate::input::TickInput;
use crate::player::Player;

/// Everything a state may read or mutate during one tick.
pub struct StateContext<'a> {
    pub body: &'a mut Player,
    pub input: &'a TickInput,
    pub dt: f32,
}

/// Lifecycle hooks for one locomotion state. Every hook defaults to a no-op;
/// concrete states override only what they need. `physics_update` may return
/// the name of a successor state.
pub trait State {
    fn name(&self) -> &'static str;
    fn enter(&mut self, _ctx: &mut StateContext) {}
    fn exit(&mut self, _ctx: &mut StateContext) {}
    fn handle_input(&mut self, _ctx: &mut StateContext) {}
    fn physics_update(&mut self, _ctx: &mut StateContext) -> Option<&'static str> {
        None
    }
}

pub struct StateMachine {
    states: HashMap<String, Box<dyn State>>,
    current: Option<String>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }

    /// Machine with the four locomotion states registered and idle active.
    pub fn locomotion(ctx: &mut StateContext) -> Self {
        let mut machine = Self::new();
        machine.register(Box::new(Idle));
        machine.register(Box::new(Walk));
        machine.register(Box::new(Sprint));
        machine.register(Box::new(Jump));
        machine.change_state("idle", ctx);
        machine
    }

    /// Adds a state under its lowercased name. Re-registering a name replaces
    /// the previous state, loudly.
    pub fn register(&mut self, state: Box<dyn State>) {
        let key = state.name().to_lowercase();
        if self.states.insert(key.clone(), state).is_some() {
            log::warn!("locomotion state '{}' registered twice, replacing", key);
        }
    }

    /// Transitions to `name` (case-insensitive). An unknown name leaves the
    /// active state untouched. Requesting the active state's own name runs a
    /// full exit/enter cycle.
    pub fn change_state(&mut self, name: &str, ctx: &mut StateContext) {
        let key = name.to_lowercase();
        if !self.states.contains_key(&key) {
            log::warn!(
                "unknown locomotion state '{}', staying in '{}'",
                name,
                self.current.as_deref().unwrap_or("<none>")
            );
            return;
        }
        if let Some(current) = self.current.as_ref() {
            if let Some(state) = self.states.get_mut(current) {
                state.exit(ctx);
            }
        }
        log::debug!(
            "locomotion: {} -> {}",
            self.current.as_deref().unwrap_or("<none>"),
            key
        );
        self.current = Some(key.clone());
        if let Some(state) = self.states.get_mut(&key) {
            state.enter(ctx);
        }
    }

    pub fn physics_update(&mut self, ctx: &mut StateContext) {
        let Some(current) = self.current.clone() else {
            return;
        };
        let next = self
            .states
            .get_mut(&current)
            .and_then(|state| state.physics_update(ctx));
        if let Some(next) = next {
            self.change_state(next, ctx);
        }
    }

    pub fn handle_input(&mut self, ctx: &mut StateContext) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        if let Some(state) = self.states.get_mut(current) {
            state.handle_input(ctx);
        }
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Desired horizontal direction in world space: local move input rotated into
/// the player's facing basis.
fn horizontal_direction(body: &Player, move_dir: Vec2) -> Vec3 {
    let (sin, cos) = body.yaw.sin_cos();
    let forward = Vec3::new(sin, 0.0, -cos);
    let right = Vec3::new(cos, 0.0, sin);
    (forward * move_dir.y + right * move_dir.x).normalize_or_zero()
}

fn set_horizontal_velocity(ctx: &mut StateContext, speed: f32) {
    let dir = horizontal_direction(ctx.body, ctx.input.move_dir);
    ctx.body.velocity.x = dir.x * speed;
    ctx.body.velocity.z = dir.z * speed;
}

pub struct Idle;

impl State for Idle {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn enter(&mut self, ctx: &mut StateContext) {
        // Hard reset, not damped.
        ctx.body.velocity.x = 0.0;
        ctx.body.velocity.z = 0.0;
    }

    fn physics_update(&mut self, ctx: &mut StateContext) -> Option<&'static str> {
        ctx.body.velocity.x = 0.0;
        ctx.body.velocity.z = 0.0;
        if ctx.input.move_dir != Vec2::ZERO {
            return Some("walk");
        }
        if ctx.input.jump_pressed && ctx.body.on_ground {
            return Some("jump");
        }
        None
    }
}

pub struct Walk;

impl State for Walk {
    fn name(&self) -> &'static str {
        "walk"
    }

    fn enter(&mut self, ctx: &mut StateContext) {
        set_horizontal_velocity(ctx, WALK_SPEED);
    }

    fn physics_update(&mut self, ctx: &mut StateContext) -> Option<&'static str> {
        if !ctx.body.on_ground {
            ctx.body.velocity.y -= GRAVITY * ctx.dt;
        }
        set_horizontal_velocity(ctx, WALK_SPEED);
        if ctx.input.move_dir == Vec2::ZERO {
            return Some("idle");
        }
        if ctx.input.sprint_held {
            return Some("sprint");
        }
        if ctx.input.jump_pressed && ctx.body.on_ground {
            return Some("jump");
        }
        None
    }
}

pub struct Sprint;

impl State for Sprint {
    fn name(&self) -> &'static str {
        "sprint"
    }

    fn enter(&mut self, ctx: &mut StateContext) {
        set_horizontal_velocity(ctx, SPRINT_SPEED);
    }

    fn physics_update(&mut self, ctx: &mut StateContext) -> Option<&'static str> {
        if !ctx.body.on_ground {
            ctx.body.velocity.y -= GRAVITY * ctx.dt;
        }
        set_horizontal_velocity(ctx, SPRINT_SPEED);
        if ctx.input.move_dir == Vec2::ZERO {
            return Some("walk");
        }
        if !ctx.input.sprint_held {
            return Some("walk");
        }
        if ctx.input.jump_pressed && ctx.body.on_ground {
            return Some("jump");
        }
        None
    }
}

pub struct Jump;

impl State for Jump {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn enter(&mut self, ctx: &mut StateContext) {
        ctx.body.velocity.y = JUMP_VELOCITY;
    }

    fn physics_update(&mut self, ctx: &mut StateContext) -> Option<&'static str> {
        // Airborne steering keeps the grounded speed model at reduced authority.
        let ground_speed = if ctx.input.sprint_held {
            SPRINT_SPEED
        } else {
            WALK_SPEED
        };
        set_horizontal_velocity(ctx, ground_speed * AIR_CONTROL);
        // Gravity applies regardless of floor state; this state is only
        // active while airborne for its main duration.
        ctx.body.velocity.y -= GRAVITY * ctx.dt;
        if ctx.body.on_ground {
            if ctx.input.move_dir == Vec2::ZERO {
                return Some("idle");
            }
            if ctx.input.sprint_held {
                return Some("sprint");
            }
            return Some("walk");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TICK_DT;
    use std::cell::Cell;
    use std::rc::Rc;

    fn tick_input(move_dir: Vec2, sprint_held: bool, jump_pressed: bool) -> TickInput {
        TickInput {
            move_dir,
            sprint_held,
            jump_pressed,
        }
    }

    fn machine_in(state: &str, body: &mut Player) -> StateMachine {
        let input = TickInput::default();
        let mut ctx = StateContext {
            body,
            input: &input,
            dt: TICK_DT,
        };
        let mut machine = StateMachine::locomotion(&mut ctx);
        machine.change_state(state, &mut ctx);
        machine
    }

    fn step(
        machine: &mut StateMachine,
        body: &mut Player,
        grounded: bool,
        input: TickInput,
    ) {
        body.on_ground = grounded;
        let mut ctx = StateContext {
            body,
            input: &input,
            dt: TICK_DT,
        };
        machine.physics_update(&mut ctx);
    }

    #[test]
    fn transition_table_compliance() {
        let forward = Vec2::new(0.0, 1.0);
        // (start, move, sprint, jump, grounded, expected)
        let cases = [
            ("idle", Vec2::ZERO, false, false, true, "idle"),
            ("idle", forward, false, false, true, "walk"),
            ("idle", forward, true, false, true, "walk"),
            ("idle", Vec2::ZERO, false, true, true, "jump"),
            ("idle", Vec2::ZERO, false, true, false, "idle"),
            ("walk", forward, false, false, true, "walk"),
            ("walk", Vec2::ZERO, false, false, true, "idle"),
            ("walk", forward, true, false, true, "sprint"),
            ("walk", forward, false, true, true, "jump"),
            ("walk", forward, false, true, false, "walk"),
            ("sprint", forward, true, false, true, "sprint"),
            ("sprint", Vec2::ZERO, true, false, true, "walk"),
            ("sprint", forward, false, false, true, "walk"),
            ("sprint", forward, true, true, true, "jump"),
            ("sprint", forward, true, true, false, "sprint"),
            ("jump", forward, false, false, false, "jump"),
            ("jump", Vec2::ZERO, false, false, true, "idle"),
            ("jump", forward, true, false, true, "sprint"),
            // Zero input outranks sprint on landing.
            ("jump", Vec2::ZERO, true, false, true, "idle"),
            ("jump", forward, false, false, true, "walk"),
        ];

        for (start, move_dir, sprint, jump, grounded, expected) in cases {
            let mut body = Player::new(Vec3::ZERO);
            let mut machine = machine_in(start, &mut body);
            step(
                &mut machine,
                &mut body,
                grounded,
                tick_input(move_dir, sprint, jump),
            );
            assert_eq!(
                machine.current_state(),
                Some(expected),
                "{start} with move={move_dir:?} sprint={sprint} jump={jump} grounded={grounded}"
            );
        }
    }

    #[test]
    fn unknown_state_is_a_logged_no_op() {
        let mut body = Player::new(Vec3::ZERO);
        let mut machine = machine_in("walk", &mut body);
        let input = TickInput::default();
        let mut ctx = StateContext {
            body: &mut body,
            input: &input,
            dt: TICK_DT,
        };
        machine.change_state("nonexistent", &mut ctx);
        assert_eq!(machine.current_state(), Some("walk"));
    }

    #[test]
    fn state_lookup_is_case_insensitive() {
        let mut body = Player::new(Vec3::ZERO);
        let mut machine = machine_in("idle", &mut body);
        let input = TickInput::default();
        let mut ctx = StateContext {
            body: &mut body,
            input: &input,
            dt: TICK_DT,
        };
        machine.change_state("SPRINT", &mut ctx);
        assert_eq!(machine.current_state(), Some("sprint"));
    }

    struct Recorder {
        enters: Rc<Cell<usize>>,
        exits: Rc<Cell<usize>>,
    }

    impl State for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn enter(&mut self, _ctx: &mut StateContext) {
            self.enters.set(self.enters.get() + 1);
        }
        fn exit(&mut self, _ctx: &mut StateContext) {
            self.exits.set(self.exits.get() + 1);
        }
    }

    #[test]
    fn reentering_active_state_runs_exit_then_enter() {
        let enters = Rc::new(Cell::new(0));
        let exits = Rc::new(Cell::new(0));
        let mut body = Player::new(Vec3::ZERO);
        let input = TickInput::default();
        let mut ctx = StateContext {
            body: &mut body,
            input: &input,
            dt: TICK_DT,
        };
        let mut machine = StateMachine::new();
        machine.register(Box::new(Recorder {
            enters: enters.clone(),
            exits: exits.clone(),
        }));
        machine.change_state("recorder", &mut ctx);
        machine.change_state("recorder", &mut ctx);
        assert_eq!(enters.get(), 2);
        assert_eq!(exits.get(), 1);
    }

    #[test]
    fn duplicate_registration_replaces_previous_state() {
        let first_enters = Rc::new(Cell::new(0));
        let second_enters = Rc::new(Cell::new(0));
        let mut body = Player::new(Vec3::ZERO);
        let input = TickInput::default();
        let mut ctx = StateContext {
            body: &mut body,
            input: &input,
            dt: TICK_DT,
        };
        let mut machine = StateMachine::new();
        machine.register(Box::new(Recorder {
            enters: first_enters.clone(),
            exits: Rc::new(Cell::new(0)),
        }));
        machine.register(Box::new(Recorder {
            enters: second_enters.clone(),
            exits: Rc::new(Cell::new(0)),
        }));
        machine.change_state("recorder", &mut ctx);
        assert_eq!(first_enters.get(), 0);
        assert_eq!(second_enters.get(), 1);
    }

    #[test]
    fn idle_hard_resets_horizontal_velocity() {
        let mut body = Player::new(Vec3::ZERO);
        body.velocity = Vec3::new(3.0, -1.0, 2.0);
        let mut machine = machine_in("idle", &mut body);
        step(&mut machine, &mut body, true, TickInput::default());
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.velocity.z, 0.0);
        assert_eq!(body.velocity.y, -1.0, "idle leaves vertical velocity alone");
    }

    #[test]
    fn walk_assigns_speed_along_facing() {
        let mut body = Player::new(Vec3::ZERO);
        let mut machine = machine_in("walk", &mut body);
        step(
            &mut machine,
            &mut body,
            true,
            tick_input(Vec2::new(0.0, 1.0), false, false),
        );
        // yaw = 0 faces -Z
        assert!((body.velocity.z - -WALK_SPEED).abs() < 1e-5);
        assert!(body.velocity.x.abs() < 1e-5);
    }

    #[test]
    fn jump_enter_applies_impulse_and_air_control_scales_speed() {
        let mut body = Player::new(Vec3::ZERO);
        body.on_ground = true;
        let mut machine = machine_in("walk", &mut body);
        step(
            &mut machine,
            &mut body,
            true,
            tick_input(Vec2::new(0.0, 1.0), false, true),
        );
        assert_eq!(machine.current_state(), Some("jump"));
        assert_eq!(body.velocity.y, JUMP_VELOCITY);

        // Next airborne tick: horizontal speed is reduced by the air factor.
        step(
            &mut machine,
            &mut body,
            false,
            tick_input(Vec2::new(0.0, 1.0), false, false),
        );
        let planar = Vec2::new(body.velocity.x, body.velocity.z).length();
        assert!((planar - WALK_SPEED * AIR_CONTROL).abs() < 1e-4);
        assert!(body.velocity.y < JUMP_VELOCITY, "gravity applied while airborne");
    }
}
