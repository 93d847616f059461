use super::Effect;
use super::ambient::AmbientField;
use super::emitter::Emitter;
use super::particles::ActiveBursts;
use crate::config::SkyConfig;
use crate::surface::{Canvas, Surface};
use std::io::{BufWriter, Stdout};
use std::time::Duration;

/// All fireworks state. One `tick` per display frame.
pub struct FireworksScene {
    ambient: AmbientField,
    bursts: ActiveBursts,
    emitter: Emitter,
    rng: fastrand::Rng,
}

impl FireworksScene {
    pub fn new(config: &SkyConfig, width: f32, height: f32, mut rng: fastrand::Rng) -> Self {
        let fw = &config.fireworks;
        Self {
            ambient: AmbientField::initialize(&config.ambient, width, height, &mut rng),
            bursts: ActiveBursts::new(fw.gravity, fw.decay, fw.particle_radius),
            emitter: Emitter::new(fw),
            rng,
        }
    }

    pub fn ambient(&self) -> &AmbientField {
        &self.ambient
    }

    pub fn bursts(&self) -> &ActiveBursts {
        &self.bursts
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Clear, sparkles, particles, prune, then let the emitter catch up on `elapsed`.
    /// Bursts detonated here are first drawn on the next tick.
    pub fn tick<C: Canvas>(&mut self, elapsed: Duration, canvas: &mut C) {
        canvas.clear();
        self.ambient.step_and_draw(canvas, &mut self.rng);
        self.bursts.advance_and_draw(canvas);
        self.bursts.prune();

        let (width, height) = canvas.size();
        for burst in self.emitter.poll(elapsed, width, height, &mut self.rng) {
            self.bursts.push(burst);
        }
    }
}

pub struct FireworksEffect {
    scene: FireworksScene,
    surface: Surface,
}

impl Effect for FireworksEffect {
    fn new(width: usize, height: usize, config: &SkyConfig) -> Self {
        let background = config.background().unwrap_or((0, 0, 0));
        let surface = Surface::new(width, height, config.display.scale, background);
        let (w, h) = surface.size();

        Self {
            scene: FireworksScene::new(config, w, h, super::scene_rng(config)),
            surface,
        }
    }

    fn update(&mut self, dt: Duration) {
        self.scene.tick(dt, &mut self.surface);
    }

    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.surface.present(stdout)
    }

    fn resize(&mut self, width: usize, height: usize) {
        log::info!("resizing surface to {}x{} pixels", width, height);
        self.surface.resize(width, height);
    }
}
