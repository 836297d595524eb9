//! Settings layer: file location + TOML loading.
pub mod path;
pub mod io;

pub use path::settings_path;
pub use io::{load_settings, load_settings_from, ConfigError, Paths, Settings};
