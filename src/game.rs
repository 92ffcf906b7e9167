use std::f64::consts::TAU;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::constants::*;
use crate::types::Vector2D;
use crate::rendering::FrameBuffer;
use crate::entities::{ParticleSystem, Player, Projectile, ProjectileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Game over, explosion particles still in flight.
    Exploding,
    /// Game over, waiting for a reset.
    GameOver,
}

/// Background color and the palette cursor, which survives resets.
#[derive(Clone, Copy, Debug)]
pub struct Backdrop {
    color: u32,
    palette_index: usize,
}

impl Backdrop {
    pub fn new() -> Self {
        Backdrop { color: BACKGROUND_INITIAL, palette_index: 0 }
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    pub fn advance(&mut self) {
        self.color = BACKGROUND_PALETTE[self.palette_index];
        self.palette_index = (self.palette_index + 1) % BACKGROUND_PALETTE.len();
    }

    pub fn reset(&mut self) {
        self.color = BACKGROUND_RESET;
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys held down during the current frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Controls {
    pub rotate: bool,
    pub reset: bool,
}

pub struct Game {
    width: u32,
    height: u32,
    player: Player,
    enemies: Vec<Projectile>,
    bonuses: Vec<Projectile>,
    particles: ParticleSystem,
    score: u32,
    rotate_held: bool,
    phase: Phase,
    backdrop: Backdrop,
    rng: StdRng,
}

impl Game {
    pub fn with_seed(width: u32, height: u32, seed: u64) -> Self {
        let mut game = Game {
            width,
            height,
            player: Player::new((width / 2) as i32, (height / 2) as i32),
            enemies: Vec::new(),
            bonuses: Vec::new(),
            particles: ParticleSystem::new(),
            score: 0,
            rotate_held: false,
            phase: Phase::Playing,
            backdrop: Backdrop::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        game.spawn(ProjectileKind::Enemy);
        game.spawn(ProjectileKind::Bonus);
        game
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase != Phase::Playing
    }

    pub fn is_explosion_animation(&self) -> bool {
        self.phase == Phase::Exploding
    }

    pub fn background(&self) -> u32 {
        self.backdrop.color()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn bonus_count(&self) -> usize {
        self.bonuses.len()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Rotation toggles on the press edge only; reset works once the explosion has settled.
    pub fn handle_input(&mut self, controls: Controls) {
        if controls.rotate {
            if !self.rotate_held {
                self.player.toggle_rotation();
                self.rotate_held = true;
                debug!("Rotation toggled (clockwise: {})", self.player.rotates_clockwise());
            }
        } else {
            self.rotate_held = false;
        }

        if controls.reset && self.phase == Phase::GameOver {
            self.reset();
        }
    }

    pub fn update(&mut self, dt: f64) {
        match self.phase {
            Phase::GameOver => return,
            Phase::Exploding => {
                self.particles.advance(dt);
                if self.particles.is_empty() {
                    self.phase = Phase::GameOver;
                    info!("Explosion finished. Waiting for reset.");
                }
                return;
            }
            Phase::Playing => {}
        }

        self.player.update(dt);

        if self.update_enemies(dt) {
            return;
        }
        self.update_bonuses(dt);
        self.particles.advance(dt);

        if self.bonuses.is_empty() {
            self.spawn(ProjectileKind::Bonus);
        }
        if self.enemies.len() < self.enemy_quota() {
            self.spawn(ProjectileKind::Enemy);
        }
    }

    fn enemy_quota(&self) -> usize {
        (self.score / SCORE_PER_LEVEL) as usize + 1
    }

    // Returns true when an enemy reached the player.
    fn update_enemies(&mut self, dt: f64) -> bool {
        let mut hit = None;
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.update(dt, self.width, self.height);
            if !enemy.on_screen {
                continue;
            }
            let (x, y) = enemy.pixel();
            if self.player.check_collision(x, y, PROJECTILE_RADIUS) {
                hit = Some(index);
                break;
            }
        }

        if let Some(index) = hit {
            self.enemies[index].explode(&mut self.particles, &mut self.rng);
            self.phase = Phase::Exploding;
            self.player.explode(&mut self.particles, &mut self.rng);
            self.enemies.clear();
            self.player.trail.clear();
            info!("Player destroyed. Final score: {}", self.score);
            return true;
        }

        self.enemies.retain(|enemy| enemy.on_screen);
        false
    }

    fn update_bonuses(&mut self, dt: f64) {
        let Game { width, height, player, bonuses, particles, score, backdrop, rng, .. } = self;
        bonuses.retain_mut(|bonus| {
            bonus.update(dt, *width, *height);
            if !bonus.on_screen {
                return false;
            }
            let (x, y) = bonus.pixel();
            if !player.check_collision(x, y, PROJECTILE_RADIUS) {
                return true;
            }

            *score += 1;
            bonus.explode(particles, rng);
            if *score % SCORE_PER_LEVEL == 0 {
                backdrop.advance();
                info!(
                    "Score {} reached, background now {:#010X} (next palette entry {})",
                    score,
                    backdrop.color(),
                    backdrop.palette_index()
                );
            }
            false
        });
    }

    /// Launches a projectile from the bottom or right edge toward a point near the center.
    fn spawn(&mut self, kind: ProjectileKind) {
        let center = Vector2D::new((self.width / 2) as f64, (self.height / 2) as f64);
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = self.rng.gen_range(0.0..=TARGET_RADIUS);
        let target = center.add(Vector2D::from_angle(angle).scale(radius));

        let start = if self.rng.gen_bool(0.5) {
            Vector2D::new(self.rng.gen_range(0..self.width) as f64, (self.height - 1) as f64)
        } else {
            Vector2D::new((self.width - 1) as f64, self.rng.gen_range(0..self.height) as f64)
        };

        debug!("Spawning {:?} at ({}, {}) toward ({:.1}, {:.1})", kind, start.x, start.y, target.x, target.y);
        let projectile = Projectile::new(kind, start, target);
        match kind {
            ProjectileKind::Enemy => self.enemies.push(projectile),
            ProjectileKind::Bonus => self.bonuses.push(projectile),
        }
    }

    // The player's angle and rotation carry over into the next round.
    fn reset(&mut self) {
        self.enemies.clear();
        self.bonuses.clear();
        self.particles.clear();
        self.score = 0;
        self.phase = Phase::Playing;
        self.backdrop.reset();
        self.spawn(ProjectileKind::Enemy);
        self.spawn(ProjectileKind::Bonus);
        info!("Game reset.");
    }

    pub fn render(&self, frame: &mut FrameBuffer) {
        frame.fill(self.backdrop.color());
        if !self.is_explosion_animation() {
            self.player.draw(frame);
        }
        for enemy in &self.enemies {
            enemy.draw(frame);
        }
        for bonus in &self.bonuses {
            bonus.draw(frame);
        }
        self.particles.draw(frame);
        frame.draw_text(SCORE_X, SCORE_Y, &self.score.to_string(), SCORE_SCALE, COLOR_WHITE);
    }
}
