use crate::config::SkyConfig;
use crossterm::event::Event;
use std::io::{BufWriter, Stdout};
use std::time::Duration;

pub mod ambient;
pub mod emitter;
pub mod festival;
pub mod fireworks;
pub mod lanterns;
pub mod particles;

pub trait Effect {
    fn new(width: usize, height: usize, config: &SkyConfig) -> Self
    where
        Self: Sized;
    fn update(&mut self, dt: Duration);
    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()>;
    fn resize(&mut self, width: usize, height: usize);
    fn handle_event(&mut self, _event: &Event) {}
}

/// Scene RNG, seeded from the config when a seed is set
pub fn scene_rng(config: &SkyConfig) -> fastrand::Rng {
    match config.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}
