// --- Simulation timing ---
pub const SIM_DT: f64 = 1.0 / 60.0; // Fixed simulation step (seconds)
pub const MAX_SUBSTEPS: u32 = 8; // Drop accumulated time beyond this many steps per frame

// --- Player ---
pub const ORBIT_RADIUS: i32 = 100;
pub const SPHERE_RADIUS: i32 = 20;
pub const ROTATION_SPEED: f64 = std::f64::consts::PI; // Radians per second

pub const TRAIL_LIFETIME: f64 = 0.5;
pub const TRAIL_SIZE: i32 = 20;

// --- Enemies and bonuses ---
pub const PROJECTILE_SPEED: f64 = 100.0; // Pixels per second
pub const PROJECTILE_RADIUS: i32 = 10; // Collision radius, also the drawn half-size
pub const TARGET_RADIUS: f64 = 100.0; // Spawn targets land within this distance of the center
pub const SCORE_PER_LEVEL: u32 = 5; // One extra enemy and one background step per this many points

// --- Explosions ---
pub const EXPLOSION_LIFETIME: f64 = 1.0;
pub const EXPLOSION_MIN_SPEED: f64 = 50.0;
pub const EXPLOSION_MAX_SPEED: f64 = 150.0;
pub const PROJECTILE_EXPLOSION_PARTICLES: usize = 20;
pub const PROJECTILE_EXPLOSION_SIZE: i32 = 10;
pub const PLAYER_EXPLOSION_PARTICLES_PER_SPHERE: usize = 50;
pub const PLAYER_EXPLOSION_SIZE: i32 = 20;

// --- Colors (packed ARGB) ---
pub const COLOR_WHITE: u32 = 0xFFFFFFFF;
pub const COLOR_ORBIT: u32 = 0xFF3CA741;
pub const COLOR_ENEMY: u32 = 0xFF000000;
pub const COLOR_ENEMY_EXPLOSION: u32 = 0xFFFF0000;
pub const COLOR_BONUS: u32 = 0xFFFFFF00;

pub const BACKGROUND_INITIAL: u32 = 0xFF324961;
pub const BACKGROUND_RESET: u32 = 0xFF808080;
pub const BACKGROUND_PALETTE: [u32; 5] = [0xFF0C486C, 0xFF3B8787, 0xFF7ABD9A, 0xFFA9DBA8, 0xFFCFF09F];

// --- HUD ---
pub const SCORE_X: i32 = 30;
pub const SCORE_Y: i32 = 30;
pub const SCORE_SCALE: i32 = 20;

// --- Host ---
pub const DEFAULT_SCREEN_WIDTH: u32 = 1024;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 768;
pub const MIN_SCREEN_SIZE: u32 = 64;
pub const INITIAL_HOLD_FRAMES: u64 = 45; // Press to first auto-repeat; longer than the slowest common repeat delay (660 ms)
pub const MIN_REPEAT_DELAY_FRAMES: u64 = 15; // A second press sooner than this is a new tap, not auto-repeat
pub const REPEAT_HOLD_FRAMES: u64 = 8; // Gap between repeats that ends a hold
pub const DEFAULT_DEBUG_FRAMES: u64 = 600;
pub const DEBUG_COLS: u16 = 80;
pub const DEBUG_ROWS: u16 = 24;
pub const DEBUG_SNAPSHOT_INTERVAL: u64 = 60; // Frames between logged screen dumps
