use glam::{Mat4, Vec2, Vec3};

use crate::collision::PhysicsWorld;
use crate::config::*;
use crate::input::TickInput;
use crate::locomotion::{StateContext, StateMachine};

/// The kinematic body: position, velocity and look orientation. Mutated only
/// by the controller's tick and by raw mouse-look events.
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl Player {
    pub fn new(spawn_position: Vec3) -> Self {
        Self {
            position: spawn_position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
        }
    }

    /// Mouse look: yaw on the body, pitch on the camera, pitch clamped to
    /// straight up / straight down.
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch - dy * MOUSE_SENSITIVITY)
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    }

    pub fn respawn(&mut self, spawn_position: Vec3) {
        self.position = spawn_position;
        self.velocity = Vec3::ZERO;
        self.on_ground = false;
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position + Vec3::new(0.0, EYE_HEIGHT, 0.0);
        let look_dir = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize();
        Mat4::look_at_rh(eye, eye + look_dir, Vec3::Y)
    }
}

/// Root per-tick driver: gravity and ground resolution, state dispatch,
/// kinematic movement, boundary enforcement and fall recovery.
pub struct PlayerController {
    pub player: Player,
    pub(crate) machine: StateMachine,
    spawn: Vec3,
    was_grounded: bool,
}

impl PlayerController {
    pub fn new(spawn: Vec3) -> Self {
        let mut player = Player::new(spawn);
        let initial_input = TickInput::default();
        let mut ctx = StateContext {
            body: &mut player,
            input: &initial_input,
            dt: 0.0,
        };
        let machine = StateMachine::locomotion(&mut ctx);
        Self {
            player,
            machine,
            spawn,
            was_grounded: false,
        }
    }

    pub fn state(&self) -> Option<&str> {
        self.machine.current_state()
    }

    pub fn update(&mut self, dt: f32, input: &TickInput, physics: &PhysicsWorld) {
        // Fall recovery skips the rest of the tick; no state update runs.
        if self.player.position.y < FALL_RESET_Y {
            log::info!("player fell out of the arena, respawning");
            self.player.respawn(self.spawn);
            self.was_grounded = false;
            return;
        }

        // States never see stale downward velocity while grounded.
        if self.player.on_ground {
            self.player.velocity.y = 0.0;
        } else {
            self.player.velocity.y -= GRAVITY * dt;
        }

        let mut ctx = StateContext {
            body: &mut self.player,
            input,
            dt,
        };
        self.machine.handle_input(&mut ctx);
        self.machine.physics_update(&mut ctx);

        let desired = self.player.position + self.player.velocity * dt;
        let (resolved, mut grounded) = physics.move_player(desired, self.player.velocity);
        self.player.position = resolved;

        // World boundary: clamp back onto the circle, kill horizontal motion
        // and reconcile the clamped position with the collision mesh.
        let planar = Vec2::new(self.player.position.x, self.player.position.z);
        if planar.length() > MAX_RADIUS {
            let clamped = planar.normalize() * MAX_RADIUS;
            self.player.position.x = clamped.x;
            self.player.position.z = clamped.y;
            self.player.velocity.x = 0.0;
            self.player.velocity.z = 0.0;
            let (reclamped, reground) =
                physics.move_player(self.player.position, self.player.velocity);
            self.player.position = reclamped;
            grounded = reground;
        }

        self.player.on_ground = grounded;

        // Diagnostic only.
        if grounded != self.was_grounded {
            log::debug!(
                "floor contact: {}",
                if grounded { "landed" } else { "airborne" }
            );
            self.was_grounded = grounded;
        }
    }
}
