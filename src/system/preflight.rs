use std::path::Path;

use tracing::debug;

use crate::error::{Result, TuneError};

/// Effective uid of this process.
pub fn effective_uid() -> u32 {
    nix::unistd::geteuid().as_raw()
}

/// Refuse to run unless `euid` is root and `debian_marker` exists.
/// Reads only; nothing is touched on failure.
pub fn check(euid: u32, debian_marker: &Path) -> Result<()> {
    if euid != 0 {
        return Err(TuneError::NotRoot { euid });
    }
    if !debian_marker.is_file() {
        return Err(TuneError::NotDebian { marker: debian_marker.to_path_buf() });
    }
    debug!(marker = %debian_marker.display(), "preflight passed");
    Ok(())
}
