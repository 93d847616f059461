//! Festival sky for the terminal: fireworks over drifting gold sparkles, with
//! wish lanterns that answer a click.

pub mod config;
pub mod effects;
pub mod error;
pub mod surface;

pub use config::SkyConfig;
pub use error::{Result, SkyError};
