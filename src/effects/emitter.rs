//! Firework emitter: periodic launches, cooperative ascent timers, detonation

use crate::config::{FireworksConfig, Rgb, sample};
use crate::effects::particles::{Burst, Particle};
use std::time::Duration;

/// A marker climbing toward its detonation altitude. Never drawn.
#[derive(Debug, Clone)]
pub struct Ascent {
    start_x: f32,
    y: f32,
    target_y: f32,
    color: Rgb,
    clock: Duration,
    steps: u32,
}

impl Ascent {
    pub fn new(start_x: f32, start_y: f32, target_y: f32, color: Rgb) -> Self {
        Self {
            start_x,
            y: start_y,
            target_y,
            color,
            clock: Duration::ZERO,
            steps: 0,
        }
    }

    pub fn altitude(&self) -> f32 {
        self.y
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// One ascent step. Returns the burst when the marker reaches its target.
    pub fn step(&mut self, config: &FireworksConfig, rng: &mut fastrand::Rng) -> Option<Burst> {
        if self.y > self.target_y {
            self.y -= config.ascent_rate;
            self.steps += 1;
        }
        if self.y > self.target_y {
            return None;
        }

        let particles = (0..config.burst_size)
            .map(|_| {
                let angle = rng.f32() * std::f32::consts::PI * 2.0;
                let speed = sample(rng, config.speed);
                Particle::new(self.start_x, self.target_y, angle.cos() * speed, angle.sin() * speed)
            })
            .collect();

        log::debug!(
            "detonation at ({:.1}, {:.1}) after {} steps, color {:?}",
            self.start_x,
            self.target_y,
            self.steps,
            self.color
        );
        Some(Burst::new(self.color, particles))
    }
}

pub struct Emitter {
    config: FireworksConfig,
    launch_clock: Duration,
    ascents: Vec<Ascent>,
}

impl Emitter {
    pub fn new(config: &FireworksConfig) -> Self {
        Self {
            config: config.clone(),
            launch_clock: Duration::ZERO,
            ascents: Vec::new(),
        }
    }

    pub fn ascents(&self) -> &[Ascent] {
        &self.ascents
    }

    /// Start a new marker from the bottom edge of a `width` x `height` surface.
    pub fn launch(&mut self, width: f32, height: f32, rng: &mut fastrand::Rng) {
        let start_x = rng.f32() * width;
        let target_y = rng.f32() * height * 0.5;
        let color = (rng.u8(0..255), rng.u8(0..255), rng.u8(0..255));

        log::debug!("launch from x={:.1} toward y={:.1}", start_x, target_y);
        self.ascents.push(Ascent::new(start_x, height, target_y, color));
    }

    /// Advance the launch timer and every ascent timer by `elapsed`.
    /// Bursts detonated during this poll are returned in detonation order.
    pub fn poll(
        &mut self,
        elapsed: Duration,
        width: f32,
        height: f32,
        rng: &mut fastrand::Rng,
    ) -> Vec<Burst> {
        let step = self.config.ascent_step();
        let config = &self.config;
        let mut detonated = Vec::new();

        self.ascents.retain_mut(|ascent| {
            ascent.clock += elapsed;
            while ascent.clock >= step {
                ascent.clock -= step;
                if let Some(burst) = ascent.step(config, rng) {
                    detonated.push(burst);
                    return false;
                }
            }
            true
        });

        // Markers launched now start their ascent clock from zero
        let period = self.config.launch_period();
        self.launch_clock += elapsed;
        while self.launch_clock >= period {
            self.launch_clock -= period;
            self.launch(width, height, rng);
        }

        detonated
    }
}
