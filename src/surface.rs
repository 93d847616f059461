//! Raster drawing surface rendered to the terminal with half-blocks

use crate::config::Rgb;
use std::io::Write;

/// Glow is weaker than the solid core of a circle
const GLOW_STRENGTH: f32 = 0.6;
/// Smallest radius (in half-block pixels) that still lights the centre pixel
const MIN_PIXEL_RADIUS: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
    pub alpha: f32,
    /// Blur radius beyond the solid disc, 0 for none
    pub glow: f32,
}

/// Everything the scene needs from whatever it draws on.
/// Coordinates are logical pixels with the origin at the top left.
pub trait Canvas {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self);
    fn fill_circle(&mut self, circle: &Circle);
    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgb, alpha: f32);
    /// Horizontal extent of `text` once drawn
    fn text_width(&self, text: &str) -> f32;
}

struct TextOverlay {
    col: usize,
    row: usize,
    text: String,
    color: Rgb,
}

pub struct Surface {
    width: usize,
    height: usize,
    scale: f32,
    background: Rgb,
    pixels: Vec<(f32, f32, f32)>,
    overlays: Vec<TextOverlay>,
    output_buf: Vec<u8>,
}

impl Surface {
    /// `width` x `height` half-block pixels, i.e. `height / 2` terminal rows.
    pub fn new(width: usize, height: usize, scale: f32, background: Rgb) -> Self {
        let bg = to_float(background);
        Self {
            width,
            height,
            scale,
            background,
            pixels: vec![bg; width * height],
            overlays: Vec::new(),
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width == 0 || height == 0 {
            log::warn!("surface resized to an empty area ({}x{})", width, height);
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![to_float(self.background); width * height];
        self.overlays.clear();
        self.output_buf = Vec::with_capacity(width * height * 25);
    }

    /// Terminal cell to logical pixel (centre of the cell)
    pub fn cell_to_logical(&self, column: u16, row: u16) -> (f32, f32) {
        (
            (column as f32 + 0.5) * self.scale,
            (row as f32 * 2.0 + 1.0) * self.scale,
        )
    }

    fn pixel(&self, x: usize, y: usize) -> Rgb {
        let p = self.pixels[y * self.width + x];
        (
            p.0.round().clamp(0.0, 255.0) as u8,
            p.1.round().clamp(0.0, 255.0) as u8,
            p.2.round().clamp(0.0, 255.0) as u8,
        )
    }

    pub fn present<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top_color: Rgb = (255, 255, 255);
        let mut prev_bot_color: Rgb = (255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_color = self.pixel(x, y);
                let bot_color = if y + 1 < self.height {
                    self.pixel(x, y + 1)
                } else {
                    top_color
                };

                if top_color != prev_top_color {
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m",
                        top_color.0, top_color.1, top_color.2
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        self.output_buf,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.0, bot_color.1, bot_color.2
                    )?;
                    prev_bot_color = bot_color;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = (255, 255, 255);
            prev_bot_color = (255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        // Text goes on top, over the colour of the pixel row it lands on
        for overlay in &self.overlays {
            let available = self.width.saturating_sub(overlay.col);
            if available == 0 || overlay.row * 2 >= self.height {
                continue;
            }
            let bg = self.pixel(overlay.col, overlay.row * 2);
            write!(
                self.output_buf,
                "\x1b[{};{}H\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m",
                overlay.row + 1,
                overlay.col + 1,
                bg.0,
                bg.1,
                bg.2,
                overlay.color.0,
                overlay.color.1,
                overlay.color.2
            )?;
            let text: String = overlay.text.chars().take(available).collect();
            self.output_buf.extend_from_slice(text.as_bytes());
            self.output_buf.extend_from_slice(b"\x1b[0m");
        }

        out.write_all(&self.output_buf)?;
        out.flush()?;
        Ok(())
    }
}

impl Canvas for Surface {
    fn size(&self) -> (f32, f32) {
        (self.width as f32 * self.scale, self.height as f32 * self.scale)
    }

    fn clear(&mut self) {
        let bg = to_float(self.background);
        self.pixels.fill(bg);
        self.overlays.clear();
    }

    fn fill_circle(&mut self, circle: &Circle) {
        let alpha = circle.alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        let cx = circle.x / self.scale;
        let cy = circle.y / self.scale;
        let radius = (circle.radius / self.scale).max(MIN_PIXEL_RADIUS);
        let blur = (circle.glow / self.scale).max(0.0);
        let reach = radius + blur;

        let x_min = (cx - reach).floor().max(0.0) as usize;
        let y_min = (cy - reach).floor().max(0.0) as usize;
        let x_max = (cx + reach).ceil().min(self.width as f32 - 1.0);
        let y_max = (cy + reach).ceil().min(self.height as f32 - 1.0);
        if x_max < 0.0 || y_max < 0.0 {
            return;
        }
        let (x_max, y_max) = (x_max as usize, y_max as usize);

        let color = to_float(circle.color);
        for py in y_min..=y_max {
            for px in x_min..=x_max {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();

                let coverage = if dist <= radius {
                    1.0
                } else if blur > 0.0 && dist < reach {
                    (1.0 - (dist - radius) / blur).powf(2.0) * GLOW_STRENGTH
                } else {
                    continue;
                };

                let a = alpha * coverage;
                if a > 0.01 {
                    let idx = py * self.width + px;
                    let p = &mut self.pixels[idx];
                    p.0 += (color.0 - p.0) * a;
                    p.1 += (color.1 - p.1) * a;
                    p.2 += (color.2 - p.2) * a;
                }
            }
        }
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha < 0.05 {
            return;
        }
        // Text anchored off the top or left edge is pinned to it
        let col = (x.max(0.0) / self.scale) as usize;
        let row = (y.max(0.0) / self.scale / 2.0) as usize;
        let bg = self.background;
        let blend = |from: u8, to: u8| (from as f32 * (1.0 - alpha) + to as f32 * alpha) as u8;

        self.overlays.push(TextOverlay {
            col,
            row,
            text: text.to_string(),
            color: (blend(bg.0, color.0), blend(bg.1, color.1), blend(bg.2, color.2)),
        });
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.scale
    }
}

fn to_float(color: Rgb) -> (f32, f32, f32) {
    (color.0 as f32, color.1 as f32, color.2 as f32)
}

/// Canvas double that remembers what was drawn
#[cfg(test)]
pub struct RecordingCanvas {
    pub width: f32,
    pub height: f32,
    pub clears: usize,
    pub circles: Vec<Circle>,
    pub texts: Vec<(f32, f32, String, f32)>,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            clears: 0,
            circles: Vec::new(),
            texts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.circles.clear();
        self.texts.clear();
    }

    fn fill_circle(&mut self, circle: &Circle) {
        self.circles.push(*circle);
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, _color: Rgb, alpha: f32) {
        self.texts.push((x, y, text.to_string(), alpha));
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: f32, y: f32) -> Circle {
        Circle {
            x,
            y,
            radius: 2.0,
            color: (255, 0, 0),
            alpha: 1.0,
            glow: 0.0,
        }
    }

    #[test]
    fn size_is_in_logical_pixels() {
        let surface = Surface::new(80, 48, 8.0, (0, 0, 0));
        assert_eq!(surface.size(), (640.0, 384.0));
        assert_eq!(surface.cell_to_logical(0, 0), (4.0, 8.0));
    }

    #[test]
    fn small_circle_lights_its_pixel() {
        let mut surface = Surface::new(10, 10, 8.0, (0, 0, 0));
        surface.fill_circle(&dot(20.0, 20.0));
        assert_eq!(surface.pixel(2, 2), (255, 0, 0));
        assert_eq!(surface.pixel(5, 5), (0, 0, 0));

        surface.clear();
        assert_eq!(surface.pixel(2, 2), (0, 0, 0));
    }

    #[test]
    fn offscreen_circles_are_ignored() {
        let mut surface = Surface::new(10, 10, 8.0, (0, 0, 0));
        surface.fill_circle(&dot(-200.0, -200.0));
        surface.fill_circle(&dot(5000.0, 5000.0));
        assert!(surface.pixels.iter().all(|p| *p == (0.0, 0.0, 0.0)));
    }

    #[test]
    fn glow_spreads_beyond_the_disc() {
        let mut surface = Surface::new(20, 20, 1.0, (0, 0, 0));
        surface.fill_circle(&Circle {
            glow: 6.0,
            ..dot(10.0, 10.0)
        });
        let near = surface.pixel(13, 10);
        assert!(near.0 > 0 && near.0 < 255);
        assert_eq!(surface.pixel(19, 19), (0, 0, 0));
    }

    #[test]
    fn resize_changes_bounds_and_survives_drawing() {
        let mut surface = Surface::new(10, 10, 8.0, (0, 0, 0));
        surface.resize(4, 6);
        assert_eq!(surface.size(), (32.0, 48.0));
        surface.fill_circle(&dot(70.0, 70.0));
        surface.resize(0, 0);
        surface.fill_circle(&dot(1.0, 1.0));
        surface.clear();
    }

    #[test]
    fn present_writes_half_blocks_and_text() {
        let mut surface = Surface::new(4, 4, 1.0, (0, 0, 0));
        surface.draw_text(0.0, 2.0, "hello", (255, 255, 255), 1.0);
        let mut out = Vec::new();
        surface.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('▄').count(), 8);
        // Clipped to the four columns available
        assert!(text.contains("hell\x1b[0m"));
        assert!(text.contains("\x1b[2;1H"));
    }

    #[test]
    fn text_above_or_left_of_the_surface_is_pinned_to_the_edge() {
        let mut surface = Surface::new(20, 4, 8.0, (0, 0, 0));
        surface.draw_text(-30.0, -50.0, "wish", (255, 255, 255), 1.0);
        let mut out = Vec::new();
        surface.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[1;1H"));
        assert!(text.contains("wish\x1b[0m"));
    }
}
