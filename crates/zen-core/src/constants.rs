use glam::Vec3;

// Shared tuning constants used by both web and native frontends.

// Particle buffers
pub const BASE_PARTICLE_COUNT: usize = 4000;
pub const TRAIL_LENGTH: usize = 5;
pub const SHAPE_RADIUS: f32 = 2.0; // base radius handed to the shape sampler
pub const BASE_SCALE_MIN: f32 = 0.5; // per-particle size drawn from [MIN, MIN + SPAN)
pub const BASE_SCALE_SPAN: f32 = 1.0;
pub const TRAIL_SCALE_STEP: f32 = 0.15; // size lost per trail slot
pub const TRAIL_SCALE_FLOOR: f32 = 0.05;

// Field state
pub const TENSION_SMOOTHING_RATE: f32 = 5.0; // 1/s
pub const RESTING_TENSION: f32 = 0.1; // raw tension used while no hand is tracked
pub const EXPLOSION_DECAY_RATE: f32 = 3.0; // impulse units per second
pub const SPIN_RATE: f32 = 0.1; // rad/s around Y
pub const TILT_GAIN: f32 = 0.5; // hand offset from centre -> tilt radians
pub const TILT_RATE: f32 = 1.0; // 1/s

// Evolver
pub const TRAIL_LAG_SEC: f32 = 0.08;
pub const REPULSION_STRENGTH: f32 = 0.8;
pub const REPULSION_NOISE_FREQ: f32 = 3.0;
pub const BOUNCE_STRENGTH: f32 = 3.0;
pub const BOUNCE_OFFSETS: [f32; 3] = [0.0, 10.0, 20.0];
pub const BREATHE_RATE: f32 = 1.5;
pub const BREATHE_PHASE_SPREAD: f32 = 10.0;
pub const BREATHE_AMPLITUDE: f32 = 0.1;
pub const TURBULENCE_FREQ: f32 = 0.5;
pub const TURBULENCE_DRIFT: f32 = 0.3;
pub const TURBULENCE_OPEN: f32 = 0.5;
pub const TURBULENCE_CLOSED: f32 = 0.1;
pub const EXPANSION_OPEN: f32 = 2.5;
pub const EXPANSION_CLOSED: f32 = 0.5;
pub const BLAST_STRENGTH: f32 = 5.0;
pub const TRAIL_GRAVITY: f32 = 0.02;
pub const ORIGIN_EPSILON: f32 = 0.001;

// Sprites
pub const POINT_BASE_SIZE: f32 = 40.0;
pub const FLASH_MIX: f32 = 0.8; // share of white at full explosion
pub const CORE_WHITE_MIX: f32 = 0.5; // share of white at the sprite centre
pub const SPRITE_FALLOFF: f32 = 1.5;
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Camera
pub const CAMERA_Z: f32 = 8.0;
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Clap detection (gesture collaborator)
pub const CLAP_OPEN_BELOW: f32 = 0.4;
pub const CLAP_CLOSED_ABOVE: f32 = 0.7;
pub const CLAP_DEBOUNCE_MS: u64 = 500;

// Landmark tension mapping
pub const LANDMARK_COUNT: usize = 21;
pub const OPEN_HAND_RATIO: f32 = 2.0;
pub const FIST_RATIO: f32 = 0.9;
pub const MIN_PALM_SIZE: f32 = 0.01;

// Default palette
pub const DEFAULT_COLOR_HEX: &str = "#00f3ff";
pub const THEME_COLORS: [&str; 6] = [
    "#00f3ff", // cyan
    "#ff00ff", // magenta
    "#ffcc00", // gold
    "#00ff66", // green
    "#ff3355", // red
    "#ffffff", // white
];

#[inline]
pub fn camera_eye() -> Vec3 {
    Vec3::new(0.0, 0.0, CAMERA_Z)
}
