//! # sf-config — configuration snapshots for SpinForge
//!
//! Loads game configuration from JSON, validates it against the rules the
//! games and the RTP core rely on, and hands out immutable [`GameConfig`]
//! snapshots. Reloading or applying a difficulty preset constructs a new
//! snapshot; nothing mutates a live configuration in place.
//!
//! Validation runs before any math: a defective file is rejected with a
//! [`ConfigError`] naming the missing section, out-of-range value, or
//! unknown symbol.

pub mod config;
pub mod defaults;
pub mod error;
pub mod loader;

pub use config::*;
pub use defaults::default_config;
pub use error::ConfigError;
pub use loader::*;
