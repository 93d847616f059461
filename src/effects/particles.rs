//! Burst particles and the set of live bursts

use crate::config::Rgb;
use crate::surface::{Canvas, Circle};

/// Alpha at or below this counts as burnt out. Repeated float subtraction
/// leaves residue around zero, so `alpha <= 0` alone could keep a particle
/// alive for one extra tick.
const FADE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub alpha: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, dx: f32, dy: f32) -> Self {
        Self { x, y, dx, dy, alpha: 1.0 }
    }

    pub fn update(&mut self, gravity: f32, decay: f32) {
        self.x += self.dx;
        self.y += self.dy;
        self.dy += gravity;
        self.alpha -= decay;
    }

    pub fn is_spent(&self) -> bool {
        self.alpha <= FADE_EPSILON
    }
}

/// Particles from one detonation, sharing a colour
#[derive(Debug, Clone)]
pub struct Burst {
    color: Rgb,
    particles: Vec<Particle>,
}

impl Burst {
    pub fn new(color: Rgb, particles: Vec<Particle>) -> Self {
        Self { color, particles }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Every live burst. Owned by the render loop; nothing else mutates it.
pub struct ActiveBursts {
    bursts: Vec<Burst>,
    gravity: f32,
    decay: f32,
    particle_radius: f32,
}

impl ActiveBursts {
    pub fn new(gravity: f32, decay: f32, particle_radius: f32) -> Self {
        Self {
            bursts: Vec::new(),
            gravity,
            decay,
            particle_radius,
        }
    }

    pub fn push(&mut self, burst: Burst) {
        self.bursts.push(burst);
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.bursts.iter().map(Burst::len).sum()
    }

    /// Move, fade and draw every particle.
    pub fn advance_and_draw<C: Canvas>(&mut self, canvas: &mut C) {
        for burst in &mut self.bursts {
            for particle in &mut burst.particles {
                particle.update(self.gravity, self.decay);
                canvas.fill_circle(&Circle {
                    x: particle.x,
                    y: particle.y,
                    radius: self.particle_radius,
                    color: burst.color,
                    alpha: particle.alpha,
                    glow: 0.0,
                });
            }
        }
    }

    /// Drop burnt-out particles, then bursts left with none. Compacts in place.
    pub fn prune(&mut self) {
        for burst in &mut self.bursts {
            burst.particles.retain(|p| !p.is_spent());
        }
        self.bursts.retain(|b| !b.is_empty());
    }
}
