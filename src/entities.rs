use std::f64::consts::{PI, TAU};
use crate::constants::*;
use crate::types::{Vector2D, wrap_angle};
use crate::rendering::FrameBuffer;
use rand::Rng;

// --- Particles ---
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub lifetime: f64, // Seconds remaining
    max_lifetime: f64,
    pub initial_size: i32,
    pub color: u32,
}

impl Particle {
    pub fn new(position: Vector2D, velocity: Vector2D, lifetime: f64, initial_size: i32, color: u32) -> Self {
        Particle {
            position,
            velocity,
            lifetime,
            max_lifetime: lifetime,
            initial_size,
            color,
        }
    }

    /// Radius shrinks linearly with remaining life; zero once expired.
    pub fn radius(&self) -> i32 {
        if self.lifetime <= 0.0 || self.max_lifetime <= 0.0 {
            return 0;
        }
        (self.initial_size as f64 * (self.lifetime / self.max_lifetime)) as i32
    }

    pub fn update(&mut self, dt: f64) {
        self.position = self.position.add(self.velocity.scale(dt));
        self.lifetime -= dt;
    }

    pub fn draw(&self, frame: &mut FrameBuffer) {
        let radius = self.radius();
        if radius > 0 {
            let (x, y) = self.position.to_pixel();
            frame.draw_circle(x, y, radius, self.color);
        }
    }
}

/// A collection of particles owned by one emitter.
#[derive(Clone, Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        ParticleSystem { particles: Vec::new() }
    }

    pub fn spawn(&mut self, position: Vector2D, velocity: Vector2D, lifetime: f64, size: i32, color: u32) {
        self.particles.push(Particle::new(position, velocity, lifetime, size, color));
    }

    /// Emits `count` particles from `origin` with a uniformly random heading and speed.
    pub fn burst(&mut self, rng: &mut impl Rng, origin: Vector2D, count: usize, size: i32, color: u32) {
        for _ in 0..count {
            let velocity = random_explosion_velocity(rng);
            self.spawn(origin, velocity, EXPLOSION_LIFETIME, size, color);
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.particles.retain_mut(|particle| {
            particle.update(dt);
            particle.lifetime > 0.0
        });
    }

    pub fn draw(&self, frame: &mut FrameBuffer) {
        for particle in &self.particles {
            particle.draw(frame);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

pub fn random_explosion_velocity(rng: &mut impl Rng) -> Vector2D {
    let angle = rng.gen_range(0.0..TAU);
    let speed = rng.gen_range(EXPLOSION_MIN_SPEED..EXPLOSION_MAX_SPEED);
    Vector2D::from_angle(angle).scale(speed)
}

// --- Player ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    fn sign(self) -> f64 {
        match self {
            Rotation::Clockwise => 1.0,
            Rotation::CounterClockwise => -1.0,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sphere {
    First,
    Second,
}

pub struct Player {
    center: (i32, i32),
    pub angle: f64, // Radians, always in [0, 2π)
    pub rotation: Rotation,
    pub trail: ParticleSystem,
}

impl Player {
    pub fn new(center_x: i32, center_y: i32) -> Self {
        Player {
            center: (center_x, center_y),
            angle: 0.0,
            rotation: Rotation::Clockwise,
            trail: ParticleSystem::new(),
        }
    }

    pub fn rotates_clockwise(&self) -> bool {
        self.rotation == Rotation::Clockwise
    }

    pub fn toggle_rotation(&mut self) {
        self.rotation = self.rotation.toggled();
    }

    /// Pixel position of an orbiting sphere. The second sphere sits opposite the first.
    pub fn sphere_position(&self, sphere: Sphere) -> (i32, i32) {
        let angle = match sphere {
            Sphere::First => self.angle,
            Sphere::Second => self.angle + PI,
        };
        let radius = ORBIT_RADIUS as f64;
        (
            self.center.0 + (radius * angle.cos()) as i32,
            self.center.1 + (radius * angle.sin()) as i32,
        )
    }

    pub fn sphere_positions(&self) -> [(i32, i32); 2] {
        [self.sphere_position(Sphere::First), self.sphere_position(Sphere::Second)]
    }

    pub fn update(&mut self, dt: f64) {
        self.angle = wrap_angle(self.angle + self.rotation.sign() * ROTATION_SPEED * dt);

        for (x, y) in self.sphere_positions() {
            let position = Vector2D::new(x as f64, y as f64);
            self.trail.spawn(position, Vector2D::default(), TRAIL_LIFETIME, TRAIL_SIZE, COLOR_WHITE);
        }
        self.trail.advance(dt);
    }

    /// Strict circle overlap against either sphere: touching is not a hit.
    pub fn check_collision(&self, x: i32, y: i32, other_radius: i32) -> bool {
        let reach = (SPHERE_RADIUS + other_radius) as f64;
        self.sphere_positions().iter().any(|&(sx, sy)| {
            ((sx - x) as f64).hypot((sy - y) as f64) < reach
        })
    }

    /// Throws 50 particles off each sphere; both spheres share each random velocity.
    pub fn explode(&self, particles: &mut ParticleSystem, rng: &mut impl Rng) {
        let [(x1, y1), (x2, y2)] = self.sphere_positions();
        let first = Vector2D::new(x1 as f64, y1 as f64);
        let second = Vector2D::new(x2 as f64, y2 as f64);
        for _ in 0..PLAYER_EXPLOSION_PARTICLES_PER_SPHERE {
            let velocity = random_explosion_velocity(rng);
            particles.spawn(first, velocity, EXPLOSION_LIFETIME, PLAYER_EXPLOSION_SIZE, COLOR_WHITE);
            particles.spawn(second, velocity, EXPLOSION_LIFETIME, PLAYER_EXPLOSION_SIZE, COLOR_WHITE);
        }
    }

    pub fn draw(&self, frame: &mut FrameBuffer) {
        frame.draw_circle(self.center.0, self.center.1, ORBIT_RADIUS, COLOR_ORBIT);
        for (x, y) in self.sphere_positions() {
            frame.draw_circle(x, y, SPHERE_RADIUS, COLOR_WHITE);
        }
        self.trail.draw(frame);
    }
}

// --- Enemies and bonuses ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    Enemy,
    Bonus,
}

impl ProjectileKind {
    pub fn explosion_color(self) -> u32 {
        match self {
            ProjectileKind::Enemy => COLOR_ENEMY_EXPLOSION,
            ProjectileKind::Bonus => COLOR_BONUS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub position: Vector2D,
    pub direction: Vector2D, // Unit length
    pub speed: f64,
    pub on_screen: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, spawn: Vector2D, target: Vector2D) -> Self {
        Projectile {
            kind,
            position: spawn,
            direction: Vector2D::from_angle(target.sub(spawn).angle()),
            speed: PROJECTILE_SPEED,
            on_screen: true,
        }
    }

    pub fn update(&mut self, dt: f64, width: u32, height: u32) {
        self.position = self.position.add(self.direction.scale(self.speed * dt));
        let Vector2D { x, y } = self.position;
        if x < 0.0 || x >= width as f64 || y < 0.0 || y >= height as f64 {
            self.on_screen = false;
        }
    }

    pub fn pixel(&self) -> (i32, i32) {
        self.position.to_pixel()
    }

    pub fn explode(&self, particles: &mut ParticleSystem, rng: &mut impl Rng) {
        particles.burst(
            rng,
            self.position,
            PROJECTILE_EXPLOSION_PARTICLES,
            PROJECTILE_EXPLOSION_SIZE,
            self.kind.explosion_color(),
        );
    }

    pub fn draw(&self, frame: &mut FrameBuffer) {
        if !self.on_screen {
            return;
        }
        let (x, y) = self.pixel();
        if x < 0 || y < 0 || x as u32 >= frame.width || y as u32 >= frame.height {
            return;
        }
        match self.kind {
            ProjectileKind::Enemy => frame.draw_square(x, y, PROJECTILE_RADIUS, COLOR_ENEMY),
            ProjectileKind::Bonus => frame.draw_circle(x, y, PROJECTILE_RADIUS, COLOR_BONUS),
        }
    }
}
