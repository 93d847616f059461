use super::Effect;
use super::fireworks::FireworksScene;
use super::lanterns::LanternSky;
use crate::config::SkyConfig;
use crate::surface::{Canvas, Surface};
use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind};
use std::io::{BufWriter, Stdout};
use std::time::Duration;

/// Fireworks with wish lanterns floating in front of them
pub struct FestivalEffect {
    fireworks: FireworksScene,
    lanterns: LanternSky,
    surface: Surface,
}

impl Effect for FestivalEffect {
    fn new(width: usize, height: usize, config: &SkyConfig) -> Self {
        let background = config.background().unwrap_or((0, 0, 0));
        let surface = Surface::new(width, height, config.display.scale, background);
        let (w, h) = surface.size();

        // The two layers share nothing, not even a random stream
        let mut rng = super::scene_rng(config);
        let lantern_rng = rng.fork();

        Self {
            fireworks: FireworksScene::new(config, w, h, rng),
            lanterns: LanternSky::new(&config.lanterns, w, h, lantern_rng),
            surface,
        }
    }

    fn update(&mut self, dt: Duration) {
        self.fireworks.tick(dt, &mut self.surface);
        self.lanterns.update(dt);
        self.lanterns.draw(&mut self.surface);
    }

    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.surface.present(stdout)
    }

    fn resize(&mut self, width: usize, height: usize) {
        log::info!("resizing surface to {}x{} pixels", width, height);
        self.surface.resize(width, height);
        let (w, h) = self.surface.size();
        self.lanterns.resize(w, h);
    }

    fn handle_event(&mut self, event: &Event) {
        if let Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) = event
        {
            let (x, y) = self.surface.cell_to_logical(*column, *row);
            if self.lanterns.click(x, y) {
                log::debug!("wish #{} from click at {},{}", self.lanterns.clicks(), column, row);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn festival() -> FestivalEffect {
        let config = SkyConfig {
            seed: Some(11),
            ..SkyConfig::default()
        };
        FestivalEffect::new(80, 48, &config)
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn runs_both_layers_and_renders() {
        let mut effect = festival();
        for _ in 0..120 {
            effect.update(Duration::from_millis(16));
        }
        let mut out = Vec::new();
        effect.surface.present(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains('▄'));
    }

    #[test]
    fn clicks_off_any_lantern_are_ignored() {
        let mut effect = festival();
        effect.update(Duration::from_millis(16));
        // Every lantern still starts below the bottom edge
        effect.handle_event(&click(0, 0));
        effect.handle_event(&click(79, 0));
        assert_eq!(effect.lanterns.clicks(), 0);
    }

    #[test]
    fn resize_reaches_the_lantern_layer() {
        let mut effect = festival();
        effect.resize(20, 10);
        assert_eq!(effect.surface.size(), (160.0, 80.0));
        for _ in 0..60 {
            effect.update(Duration::from_millis(16));
        }
        effect.handle_event(&click(5, 2));
    }
}
