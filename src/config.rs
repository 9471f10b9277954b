// Player dimensions and physics
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const PLAYER_WIDTH: f32 = 0.6;
pub const EYE_HEIGHT: f32 = 1.6;
pub const STEP_OVER_HEIGHT: f32 = 0.4; // can step over obstacles this tall
pub const GROUND_SNAP_MARGIN: f32 = 0.1; // extra distance for ground detection tolerance
pub const FLOOR_MAX_ANGLE: f32 = std::f32::consts::FRAC_PI_4; // steeper surfaces act as walls

// Movement
pub const WALK_SPEED: f32 = 5.0;
pub const SPRINT_SPEED: f32 = 9.0;
pub const JUMP_VELOCITY: f32 = 4.5;
pub const GRAVITY: f32 = 9.8;
pub const AIR_CONTROL: f32 = 0.8;
pub const MOUSE_SENSITIVITY: f32 = 0.002;

// World boundary
pub const MAX_RADIUS: f32 = 45.0; // planar distance from the arena axis is clamped to this
pub const FALL_RESET_Y: f32 = -10.0; // below this the player is returned to spawn

// Arena generation
pub const ARENA_RADIUS: f32 = 48.0;
pub const WALL_HEIGHT: f32 = 4.0;
pub const ARENA_SEGMENTS: u32 = 64;

// Simulation
pub const TICK_DT: f32 = 1.0 / 60.0;
