//! Wish lanterns: rise, sway, pause on click to show a wish, respawn when gone

use crate::config::{LanternConfig, Rgb, sample};
use crate::surface::{Canvas, Circle};
use noise::{NoiseFn, Perlin};
use std::time::Duration;

const LANTERN_GLOW: Rgb = (255, 140, 40);
const LANTERN_FLAME: Rgb = (255, 220, 120);
const WISH_COLOR: Rgb = (255, 236, 179);
const FINAL_COLOR: Rgb = (255, 215, 0);

/// Lantern body height relative to its width
const ASPECT: f32 = 1.2;
/// Horizontal sway amplitude in logical pixels
const SWAY: f32 = 18.0;
/// Wishes appear this far above the lantern and drift up by `WISH_LIFT`
const WISH_OFFSET: f32 = 60.0;
const WISH_LIFT: f32 = 20.0;
const WISH_DELAY: f32 = 0.05;
const REVEAL_FADE_SECS: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanternState {
    Rising,
    /// Held in place while its wish is showing
    Paused,
    /// Drifted off the top; replaced on the next update
    Expired,
}

#[derive(Debug, Clone)]
pub struct Lantern {
    id: u64,
    x: f32,
    start_y: f32,
    end_y: f32,
    duration: f32,
    progress: f32,
    sway_seed: f64,
    state: LanternState,
}

impl Lantern {
    pub fn state(&self) -> LanternState {
        self.state
    }

    fn position(&self, perlin: &Perlin) -> (f32, f32) {
        let sway = perlin.get([self.sway_seed, self.progress as f64 * 4.0]) as f32;
        let y = self.start_y + (self.end_y - self.start_y) * self.progress;
        (self.x + sway * SWAY, y)
    }

    /// Fade in over the first 5% of the climb, out over the last 10%
    fn alpha(&self) -> f32 {
        let fade_in = (self.progress / 0.05).min(1.0);
        let fade_out = ((1.0 - self.progress) / 0.1).min(1.0);
        fade_in.min(fade_out).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Wish {
    lantern: u64,
    text: String,
    x: f32,
    y: f32,
    age: f32,
}

impl Wish {
    pub fn text(&self) -> &str {
        &self.text
    }

    fn fade_in(&self, fade: f32) -> f32 {
        if self.age < WISH_DELAY {
            0.0
        } else if fade <= 0.0 {
            1.0
        } else {
            ((self.age - WISH_DELAY) / fade).min(1.0)
        }
    }

    fn alpha(&self, config: &LanternConfig) -> f32 {
        if self.age < config.wish_secs {
            self.fade_in(config.wish_fade_secs)
        } else if config.wish_fade_secs <= 0.0 {
            0.0
        } else {
            (1.0 - (self.age - config.wish_secs) / config.wish_fade_secs).max(0.0)
        }
    }

    fn is_gone(&self, config: &LanternConfig) -> bool {
        self.age >= config.wish_secs + config.wish_fade_secs
    }
}

pub struct LanternSky {
    config: LanternConfig,
    lanterns: Vec<Lantern>,
    wishes: Vec<Wish>,
    clicks: u32,
    revealed_for: Option<f32>,
    width: f32,
    height: f32,
    perlin: Perlin,
    rng: fastrand::Rng,
    next_id: u64,
}

impl LanternSky {
    pub fn new(config: &LanternConfig, width: f32, height: f32, mut rng: fastrand::Rng) -> Self {
        let perlin = Perlin::new(rng.u32(..));
        let mut sky = Self {
            config: config.clone(),
            lanterns: Vec::with_capacity(config.count),
            wishes: Vec::new(),
            clicks: 0,
            revealed_for: None,
            width,
            height,
            perlin,
            rng,
            next_id: 0,
        };
        for _ in 0..config.count {
            let lantern = sky.spawn();
            sky.lanterns.push(lantern);
        }
        sky
    }

    pub fn lanterns(&self) -> &[Lantern] {
        &self.lanterns
    }

    pub fn wishes(&self) -> &[Wish] {
        &self.wishes
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed_for.is_some()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn spawn(&mut self) -> Lantern {
        let id = self.next_id;
        self.next_id += 1;
        let lantern_height = self.config.width * ASPECT;

        Lantern {
            id,
            x: self.rng.f32() * (self.width - self.config.width).max(0.0),
            start_y: self.height + self.rng.f32() * self.config.spawn_depth,
            end_y: -lantern_height,
            duration: sample(&mut self.rng, self.config.rise_secs),
            progress: 0.0,
            sway_seed: self.rng.f64() * 256.0,
            state: LanternState::Rising,
        }
    }

    pub fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();

        for lantern in &mut self.lanterns {
            if lantern.state == LanternState::Rising {
                lantern.progress += dt / lantern.duration;
                if lantern.progress >= 1.0 {
                    lantern.progress = 1.0;
                    lantern.state = LanternState::Expired;
                }
            }
        }

        for i in 0..self.lanterns.len() {
            if self.lanterns[i].state == LanternState::Expired {
                let replacement = self.spawn();
                log::debug!(
                    "lantern {} drifted away, {} takes its place",
                    self.lanterns[i].id,
                    replacement.id
                );
                self.lanterns[i] = replacement;
            }
        }

        for wish in &mut self.wishes {
            wish.age += dt;
        }
        let config = &self.config;
        let (gone, kept): (Vec<Wish>, Vec<Wish>) =
            self.wishes.drain(..).partition(|w| w.is_gone(config));
        self.wishes = kept;

        // A lantern holds while any of its wishes is still showing
        for wish in gone {
            if self.wishes.iter().any(|w| w.lantern == wish.lantern) {
                continue;
            }
            if let Some(lantern) = self.lanterns.iter_mut().find(|l| l.id == wish.lantern) {
                if lantern.state == LanternState::Paused {
                    lantern.state = LanternState::Rising;
                }
            }
        }

        if let Some(age) = self.revealed_for.as_mut() {
            *age += dt;
        }
    }

    /// Handle a click at logical `(x, y)`. Returns whether a lantern was hit.
    /// Paused lanterns still take clicks, each one adding another wish.
    pub fn click(&mut self, x: f32, y: f32) -> bool {
        let width = self.config.width;
        let height = width * ASPECT;
        let perlin = &self.perlin;

        // Last drawn is on top
        let hit = self.lanterns.iter_mut().rev().find(|l| {
            let (lx, ly) = l.position(perlin);
            l.state != LanternState::Expired
                && x >= lx
                && x < lx + width
                && y >= ly
                && y < ly + height
        });
        let Some(lantern) = hit else {
            return false;
        };

        lantern.state = LanternState::Paused;
        let (lx, ly) = lantern.position(perlin);
        let id = lantern.id;

        let messages = &self.config.messages;
        let text = if messages.is_empty() {
            String::new()
        } else {
            messages[self.rng.usize(..messages.len())].clone()
        };
        self.wishes.push(Wish {
            lantern: id,
            text,
            x: lx,
            y: ly - WISH_OFFSET,
            age: 0.0,
        });

        self.clicks += 1;
        if self.clicks == self.config.reveal_after && self.revealed_for.is_none() {
            log::info!("{} wishes made, revealing the final message", self.clicks);
            self.revealed_for = Some(0.0);
        }
        true
    }

    pub fn draw<C: Canvas>(&self, canvas: &mut C) {
        let radius = self.config.width * 0.5;
        let body_height = self.config.width * ASPECT;

        for lantern in &self.lanterns {
            if lantern.state == LanternState::Expired {
                continue;
            }
            let (x, y) = lantern.position(&self.perlin);
            let (cx, cy) = (x + radius, y + body_height * 0.5);
            let alpha = lantern.alpha();

            canvas.fill_circle(&Circle {
                x: cx,
                y: cy,
                radius: radius * 0.7,
                color: LANTERN_GLOW,
                alpha: alpha * 0.9,
                glow: radius,
            });
            canvas.fill_circle(&Circle {
                x: cx,
                y: cy + body_height * 0.15,
                radius: radius * 0.25,
                color: LANTERN_FLAME,
                alpha,
                glow: radius * 0.3,
            });
        }

        for wish in &self.wishes {
            let lift = WISH_LIFT * wish.fade_in(self.config.wish_fade_secs);
            let alpha = wish.alpha(&self.config);
            canvas.draw_text(wish.x, wish.y - lift, &wish.text, WISH_COLOR, alpha);
        }

        if let Some(age) = self.revealed_for {
            let text = &self.config.final_message;
            let x = ((self.width - canvas.text_width(text)) * 0.5).max(0.0);
            let alpha = (age / REVEAL_FADE_SECS).min(1.0);
            canvas.draw_text(x, self.height * 0.5, text, FINAL_COLOR, alpha);
        }
    }
}
