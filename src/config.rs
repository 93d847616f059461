//! Scene configuration, loaded from an optional TOML file and overridden from the CLI

use crate::error::{Result, SkyError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub type Rgb = (u8, u8, u8);

const DEFAULT_MESSAGES: [&str; 6] = [
    "May your path shine with quiet strength.",
    "You carry light wherever you go.",
    "Peace in thoughts, fire in dreams.",
    "The brightest Diya is the one inside you.",
    "Keep rising, just like these lanterns.",
    "Wishing you endless light ✨",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Fixed RNG seed; a fresh seed is drawn per run when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub display: DisplayConfig,
    pub ambient: AmbientConfig,
    pub fireworks: FireworksConfig,
    pub lanterns: LanternConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Logical pixels per half-block pixel
    pub scale: f32,
    /// Background as RRGGBB hex
    pub background: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: 8.0,
            background: "000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmbientConfig {
    pub count: usize,
    pub color: Rgb,
    pub radius: [f32; 2],
    /// Maximum absolute drift per tick on each axis
    pub drift: f32,
    /// Width of the symmetric opacity jitter applied each tick
    pub twinkle: f32,
    pub opacity: [f32; 2],
    pub glow: [f32; 2],
    /// Blur radius in logical pixels per unit of glow
    pub blur_scale: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            count: 80,
            color: (255, 215, 0),
            radius: [1.0, 3.0],
            drift: 0.25,
            twinkle: 0.05,
            opacity: [0.1, 1.0],
            glow: [0.2, 1.0],
            blur_scale: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FireworksConfig {
    pub launch_period_ms: u64,
    pub ascent_step_ms: u64,
    pub ascent_rate: f32,
    pub burst_size: usize,
    pub speed: [f32; 2],
    pub gravity: f32,
    pub decay: f32,
    pub particle_radius: f32,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            launch_period_ms: 100,
            ascent_step_ms: 30,
            ascent_rate: 5.0,
            burst_size: 50,
            speed: [1.0, 4.0],
            gravity: 0.02,
            decay: 0.02,
            particle_radius: 2.0,
        }
    }
}

impl FireworksConfig {
    pub fn launch_period(&self) -> Duration {
        Duration::from_millis(self.launch_period_ms)
    }

    pub fn ascent_step(&self) -> Duration {
        Duration::from_millis(self.ascent_step_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanternConfig {
    pub count: usize,
    pub rise_secs: [f32; 2],
    /// How far below the bottom edge lanterns may start
    pub spawn_depth: f32,
    pub width: f32,
    pub reveal_after: u32,
    pub wish_secs: f32,
    pub wish_fade_secs: f32,
    pub messages: Vec<String>,
    pub final_message: String,
}

impl Default for LanternConfig {
    fn default() -> Self {
        Self {
            count: 12,
            rise_secs: [8.0, 13.0],
            spawn_depth: 200.0,
            width: 50.0,
            reveal_after: 6,
            wish_secs: 4.0,
            wish_fade_secs: 0.8,
            messages: DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect(),
            final_message: "✨ Happy Diwali ✨ May every light you kindle find its way back to you"
                .to_string(),
        }
    }
}

impl SkyConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Self::from_toml_str(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SkyConfig = toml::from_str(text)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Layer command-line values over whatever the file provided.
    /// Call `validate` afterwards; overrides are only checked for syntax here.
    pub fn apply_overrides(
        &mut self,
        bg_color: Option<&str>,
        launch_period_ms: Option<u64>,
        seed: Option<u64>,
    ) -> Result<()> {
        if let Some(hex) = bg_color {
            parse_hex_color(hex)?;
            self.display.background = hex.trim_start_matches('#').to_string();
        }
        if let Some(ms) = launch_period_ms {
            self.fireworks.launch_period_ms = ms;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        Ok(())
    }

    pub fn background(&self) -> Result<Rgb> {
        parse_hex_color(&self.display.background)
    }

    pub fn validate(&self) -> Result<()> {
        if !positive(self.display.scale) {
            return Err(SkyError::invalid("display.scale", "must be positive"));
        }
        self.background()?;

        let ambient = &self.ambient;
        check_range("ambient.radius", ambient.radius)?;
        check_range("ambient.glow", ambient.glow)?;
        check_range("ambient.opacity", ambient.opacity)?;
        if ambient.opacity[0] < 0.0 || ambient.opacity[1] > 1.0 {
            return Err(SkyError::invalid("ambient.opacity", "must lie within [0, 1]"));
        }
        if ambient.drift < 0.0 || ambient.twinkle < 0.0 || ambient.blur_scale < 0.0 {
            return Err(SkyError::invalid(
                "ambient",
                "drift, twinkle and blur_scale must not be negative",
            ));
        }

        let fw = &self.fireworks;
        if fw.launch_period_ms == 0 {
            return Err(SkyError::invalid("fireworks.launch_period_ms", "must be at least 1"));
        }
        if fw.ascent_step_ms == 0 {
            return Err(SkyError::invalid("fireworks.ascent_step_ms", "must be at least 1"));
        }
        if !positive(fw.ascent_rate) {
            return Err(SkyError::invalid("fireworks.ascent_rate", "must be positive"));
        }
        if fw.burst_size == 0 {
            return Err(SkyError::invalid("fireworks.burst_size", "must be at least 1"));
        }
        if !positive(fw.decay) {
            return Err(SkyError::invalid(
                "fireworks.decay",
                "must be positive or particles never fade",
            ));
        }
        check_range("fireworks.speed", fw.speed)?;

        let lanterns = &self.lanterns;
        if lanterns.count > 0 {
            check_range("lanterns.rise_secs", lanterns.rise_secs)?;
            if !positive(lanterns.rise_secs[0]) {
                return Err(SkyError::invalid("lanterns.rise_secs", "must be positive"));
            }
            if lanterns.messages.is_empty() {
                return Err(SkyError::invalid(
                    "lanterns.messages",
                    "must contain at least one message",
                ));
            }
            if lanterns.reveal_after == 0 {
                return Err(SkyError::invalid("lanterns.reveal_after", "must be at least 1"));
            }
            if lanterns.wish_secs < 0.0 || lanterns.wish_fade_secs < 0.0 {
                return Err(SkyError::invalid("lanterns", "wish timings must not be negative"));
            }
        }

        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn check_range(field: &str, range: [f32; 2]) -> Result<()> {
    if !range[0].is_finite() || !range[1].is_finite() || range[0] > range[1] {
        return Err(SkyError::invalid(field, format!("expected [min, max], got {:?}", range)));
    }
    Ok(())
}

pub fn parse_hex_color(hex: &str) -> Result<Rgb> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(SkyError::InvalidColor(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| SkyError::InvalidColor(hex.to_string()))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Uniform sample from an inclusive `[min, max]` pair.
pub fn sample(rng: &mut fastrand::Rng, range: [f32; 2]) -> f32 {
    range[0] + rng.f32() * (range[1] - range[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_constants() {
        let config = SkyConfig::default();
        assert_eq!(config.ambient.count, 80);
        assert_eq!(config.fireworks.burst_size, 50);
        assert_eq!(config.fireworks.launch_period(), Duration::from_millis(100));
        assert_eq!(config.fireworks.ascent_step(), Duration::from_millis(30));
        assert_eq!(config.lanterns.count, 12);
        assert_eq!(config.lanterns.reveal_after, 6);
        assert_eq!(config.lanterns.messages.len(), 6);
        config.validate().unwrap();
    }

    #[test]
    fn defaults_survive_toml() {
        let config = SkyConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = SkyConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = SkyConfig::from_toml_str(
            r#"
seed = 7

[fireworks]
launch_period_ms = 250
gravity = 0.05

[ambient]
count = 12
"#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.fireworks.launch_period_ms, 250);
        assert_eq!(config.fireworks.gravity, 0.05);
        assert_eq!(config.fireworks.decay, 0.02);
        assert_eq!(config.ambient.count, 12);
        assert_eq!(config.display.scale, 8.0);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = SkyConfig::from_toml_str("[fireworks]\nburst_size = \"lots\"").unwrap_err();
        assert!(matches!(err, SkyError::ConfigParse(_)));
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = SkyConfig::default();
        config.fireworks.launch_period_ms = 0;
        assert!(matches!(config.validate(), Err(SkyError::InvalidConfig { .. })));

        let mut config = SkyConfig::default();
        config.ambient.radius = [3.0, 1.0];
        assert!(matches!(config.validate(), Err(SkyError::InvalidConfig { .. })));

        let mut config = SkyConfig::default();
        config.fireworks.decay = 0.0;
        assert!(matches!(config.validate(), Err(SkyError::InvalidConfig { .. })));

        let mut config = SkyConfig::default();
        config.lanterns.messages.clear();
        assert!(matches!(config.validate(), Err(SkyError::InvalidConfig { .. })));

        // No lanterns means the message list is irrelevant
        config.lanterns.count = 0;
        config.validate().unwrap();
    }

    #[test]
    fn command_line_overrides_the_file() {
        let mut config = SkyConfig::from_toml_str(
            r#"
seed = 7

[display]
background = "101010"

[fireworks]
launch_period_ms = 250
"#,
        )
        .unwrap();

        config.apply_overrides(Some("#1a1b26"), Some(40), None).unwrap();
        assert_eq!(config.fireworks.launch_period_ms, 40);
        assert_eq!(config.display.background, "1a1b26");
        assert_eq!(config.background().unwrap(), (0x1a, 0x1b, 0x26));
        // Absent flags leave file values alone
        assert_eq!(config.seed, Some(7));
        config.validate().unwrap();

        config.apply_overrides(None, None, Some(99)).unwrap();
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.fireworks.launch_period_ms, 40);
    }

    #[test]
    fn bad_background_override_is_rejected() {
        let mut config = SkyConfig::default();
        let err = config.apply_overrides(Some("notahex"), None, None).unwrap_err();
        assert!(matches!(err, SkyError::InvalidColor(_)));
        assert_eq!(config.display.background, "000000");
    }

    #[test]
    fn overrides_are_validated_after_merging() {
        let mut config = SkyConfig::default();
        config.apply_overrides(None, Some(0), None).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SkyError::InvalidConfig { ref field, .. } if field == "fireworks.launch_period_ms"
        ));
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("1a1b26").unwrap(), (0x1a, 0x1b, 0x26));
        assert_eq!(parse_hex_color("#FFD700").unwrap(), (255, 215, 0));
        assert!(parse_hex_color("12345").is_err());
        assert!(parse_hex_color("zzzzzz").is_err());
        assert!(parse_hex_color("ééé").is_err());
    }
}
