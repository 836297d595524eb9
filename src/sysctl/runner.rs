use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, warn};

use crate::error::{Result, TuneError};

/// Access to the kernel parameter store.
pub trait SysctlRunner {
    /// Load every `key = value` in `file` (`sysctl -p <file>`).
    fn load_file(&self, file: &Path) -> Result<()>;

    /// Reload all system configuration (`sysctl --system`).
    fn load_system(&self) -> Result<()>;

    /// Current runtime value of `key` (`sysctl -n <key>`).
    fn read(&self, key: &str) -> Result<String>;
}

/// Runs the real `sysctl` binary.
#[derive(Debug, Clone)]
pub struct SysctlCommand {
    binary: PathBuf,
}

impl SysctlCommand {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        SysctlCommand { binary: binary.into() }
    }

    fn run(&self, args: &[&OsStr]) -> Result<Output> {
        debug!(binary = %self.binary.display(), ?args, "running sysctl");
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| TuneError::Spawn { program: self.binary.display().to_string(), source })
    }

    fn reload(&self, args: &[&OsStr]) -> Result<()> {
        let out = self.run(args)?;
        if out.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        warn!(status = %out.status, %stderr, "sysctl reload failed");
        Err(TuneError::Apply { status: out.status, stderr })
    }
}

impl SysctlRunner for SysctlCommand {
    fn load_file(&self, file: &Path) -> Result<()> {
        self.reload(&[OsStr::new("-p"), file.as_os_str()])
    }

    fn load_system(&self) -> Result<()> {
        self.reload(&[OsStr::new("--system")])
    }

    fn read(&self, key: &str) -> Result<String> {
        let out = self.run(&[OsStr::new("-n"), OsStr::new(key)])?;
        if !out.status.success() {
            return Err(TuneError::Query {
                key: key.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}
