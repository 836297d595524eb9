//! Host-side steps: preflight, backup/restore, clean and write.
pub mod backup;
pub mod fs;
pub mod install;
pub mod preflight;
