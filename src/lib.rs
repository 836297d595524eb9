//! Library root for nettune
pub mod error;
pub mod models;
pub mod util;

pub mod config;
pub mod sysctl;
pub mod system;
pub mod commands;

// Convenience re-exports
pub use commands::{restore, show, status, summary, tune};
pub use config::path as cfg_path;
pub use error::TuneError;
