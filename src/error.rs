//! Error types for diyasky

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Config serialization error: {0}")]
    ConfigSer(String),

    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, SkyError>;

impl SkyError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SkyError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for SkyError {
    fn from(err: toml::de::Error) -> Self {
        SkyError::ConfigParse(err.to_string())
    }
}

impl From<toml::ser::Error> for SkyError {
    fn from(err: toml::ser::Error) -> Self {
        SkyError::ConfigSer(err.to_string())
    }
}
