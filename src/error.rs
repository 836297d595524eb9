use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use crate::config::ConfigError;
use crate::sysctl::document::ParseError;

/// Every failure the tuning pipeline can surface.
#[derive(Debug, Error)]
pub enum TuneError {
    #[error("this tool must be run as root (effective uid is {euid})")]
    NotRoot { euid: u32 },

    #[error("not a Debian system: {} is missing", marker.display())]
    NotDebian { marker: PathBuf },

    #[error("backup failed at {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot clean {}: {source}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sysctl reload exited with {status}: {stderr}")]
    Apply { status: ExitStatus, stderr: String },

    #[error("sysctl could not read {key}: {stderr}")]
    Query { key: String, stderr: String },

    #[error("invalid menu choice '{0}', expected 1, 2 or 3")]
    InvalidMenuChoice(String),

    #[error("no valid choice after {0} attempt(s)")]
    TooManyAttempts(usize),

    #[error("prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("invalid backup manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no backups found under {}", root.display())]
    NoBackups { root: PathBuf },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TuneError {
    /// Failures raised before anything on disk was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(self, TuneError::NotRoot { .. } | TuneError::NotDebian { .. })
    }
}

pub type Result<T> = std::result::Result<T, TuneError>;
