//! Ambient field: a fixed population of drifting, twinkling gold sparkles

use crate::config::{AmbientConfig, sample};
use crate::surface::{Canvas, Circle};

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientPoint {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub dx: f32,
    pub dy: f32,
    pub opacity: f32,
    pub glow: f32,
}

pub struct AmbientField {
    points: Vec<AmbientPoint>,
    config: AmbientConfig,
}

impl AmbientField {
    /// Scatter `config.count` points uniformly over a `width` x `height` surface.
    pub fn initialize(
        config: &AmbientConfig,
        width: f32,
        height: f32,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let drift = [-config.drift, config.drift];
        let points = (0..config.count)
            .map(|_| AmbientPoint {
                x: rng.f32() * width,
                y: rng.f32() * height,
                radius: sample(rng, config.radius),
                dx: sample(rng, drift),
                dy: sample(rng, drift),
                opacity: rng.f32(),
                glow: sample(rng, config.glow),
            })
            .collect();

        Self {
            points,
            config: config.clone(),
        }
    }

    pub fn points(&self) -> &[AmbientPoint] {
        &self.points
    }

    /// Draw every point where it is, then move it on. Must run once per tick, after the clear.
    pub fn step_and_draw<C: Canvas>(&mut self, canvas: &mut C, rng: &mut fastrand::Rng) {
        let (width, height) = canvas.size();
        let [min_opacity, max_opacity] = self.config.opacity;

        for point in &mut self.points {
            canvas.fill_circle(&Circle {
                x: point.x,
                y: point.y,
                radius: point.radius,
                color: self.config.color,
                alpha: point.opacity,
                glow: point.glow * self.config.blur_scale,
            });

            point.x = wrap(point.x + point.dx, width);
            point.y = wrap(point.y + point.dy, height);

            point.opacity += (rng.f32() - 0.5) * self.config.twinkle;
            point.opacity = point.opacity.clamp(min_opacity, max_opacity);
        }
    }
}

/// Wrap `value` into `[0, max)`; anything leaving one edge re-enters at the other.
fn wrap(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if wrapped >= max { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingCanvas;

    fn field(count: usize, seed: u64) -> (AmbientField, fastrand::Rng) {
        let mut rng = fastrand::Rng::with_seed(seed);
        let config = AmbientConfig {
            count,
            ..AmbientConfig::default()
        };
        (AmbientField::initialize(&config, 640.0, 384.0, &mut rng), rng)
    }

    fn in_bounds(point: &AmbientPoint, width: f32, height: f32) -> bool {
        (0.0..width).contains(&point.x) && (0.0..height).contains(&point.y)
    }

    #[test]
    fn initialize_populates_exactly_count_points_in_bounds() {
        let (field, _) = field(80, 1);
        assert_eq!(field.points().len(), 80);
        for p in field.points() {
            assert!(in_bounds(p, 640.0, 384.0));
            assert!((1.0..=3.0).contains(&p.radius));
            assert!((-0.25..=0.25).contains(&p.dx));
            assert!((-0.25..=0.25).contains(&p.dy));
            assert!((0.0..=1.0).contains(&p.opacity));
            assert!((0.2..=1.0).contains(&p.glow));
        }
    }

    #[test]
    fn points_stay_in_bounds_and_opacity_clamped() {
        let (mut field, mut rng) = field(80, 2);
        let mut canvas = RecordingCanvas::new(640.0, 384.0);

        for _ in 0..2000 {
            canvas.clear();
            field.step_and_draw(&mut canvas, &mut rng);
            assert_eq!(canvas.circles.len(), 80);
        }

        assert_eq!(field.points().len(), 80);
        for p in field.points() {
            assert!(in_bounds(p, 640.0, 384.0), "{:?} escaped", p);
            assert!((0.1..=1.0).contains(&p.opacity));
        }
    }

    #[test]
    fn draws_before_moving() {
        let (mut field, mut rng) = field(1, 3);
        let before = field.points()[0].clone();
        let mut canvas = RecordingCanvas::new(640.0, 384.0);
        field.step_and_draw(&mut canvas, &mut rng);

        let drawn = canvas.circles[0];
        assert_eq!((drawn.x, drawn.y), (before.x, before.y));
        assert_eq!(drawn.alpha, before.opacity);
        assert_eq!(drawn.glow, before.glow * 10.0);
        assert_eq!(drawn.color, (255, 215, 0));
    }

    #[test]
    fn wraps_to_opposite_edge() {
        let (mut field, mut rng) = field(1, 4);
        field.points[0] = AmbientPoint {
            x: 639.9,
            y: 0.1,
            radius: 1.0,
            dx: 0.25,
            dy: -0.25,
            opacity: 0.5,
            glow: 0.5,
        };
        let mut canvas = RecordingCanvas::new(640.0, 384.0);
        field.step_and_draw(&mut canvas, &mut rng);

        let p = &field.points()[0];
        assert!(p.x < 1.0, "x wrapped to {}", p.x);
        assert!(p.y > 383.0, "y wrapped to {}", p.y);
    }

    #[test]
    fn shrinking_surface_pulls_points_back_inside() {
        let (mut field, mut rng) = field(80, 5);
        let mut canvas = RecordingCanvas::new(100.0, 50.0);
        field.step_and_draw(&mut canvas, &mut rng);
        for p in field.points() {
            assert!(in_bounds(p, 100.0, 50.0));
        }
    }

    #[test]
    fn wrap_handles_edges() {
        assert_eq!(wrap(-1.0, 10.0), 9.0);
        assert_eq!(wrap(10.0, 10.0), 0.0);
        assert_eq!(wrap(25.0, 10.0), 5.0);
        assert!(wrap(-1e-9, 10.0) < 10.0);
        assert_eq!(wrap(3.0, 0.0), 0.0);
    }
}
