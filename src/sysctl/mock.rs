//! In-memory [`SysctlRunner`] for tests: applies loaded files to a map instead
//! of the kernel.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::document::SysctlDocument;
use super::runner::SysctlRunner;
use crate::error::{Result, TuneError};

#[derive(Debug, Default)]
pub struct MockSysctl {
    values: RefCell<HashMap<String, String>>,
    loaded: RefCell<Vec<PathBuf>>,
    system_reloads: RefCell<usize>,
    fail_reload: bool,
    /// Keys whose runtime value ignores what was loaded.
    pinned: HashMap<String, String>,
}

impl MockSysctl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reload exits non-zero.
    pub fn failing() -> Self {
        MockSysctl { fail_reload: true, ..Self::default() }
    }

    /// Force `key` to report `value` regardless of what gets loaded, the way a
    /// kernel without the `bbr` module keeps `cubic`.
    pub fn pin(mut self, key: &str, value: &str) -> Self {
        self.pinned.insert(key.to_string(), value.to_string());
        self
    }

    pub fn loaded_files(&self) -> Vec<PathBuf> {
        self.loaded.borrow().clone()
    }

    pub fn system_reloads(&self) -> usize {
        *self.system_reloads.borrow()
    }

    fn failure() -> TuneError {
        TuneError::Apply {
            status: failed_status(),
            stderr: "sysctl: permission denied".to_string(),
        }
    }
}

#[cfg(unix)]
fn failed_status() -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(1 << 8)
}

impl SysctlRunner for MockSysctl {
    fn load_file(&self, file: &Path) -> Result<()> {
        self.loaded.borrow_mut().push(file.to_path_buf());
        if self.fail_reload {
            return Err(Self::failure());
        }
        let text = fs::read_to_string(file)
            .map_err(|source| TuneError::Read { path: file.to_path_buf(), source })?;
        let doc = SysctlDocument::parse(&text)?;
        let mut values = self.values.borrow_mut();
        for (k, v) in doc.entries() {
            values.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }

    fn load_system(&self) -> Result<()> {
        *self.system_reloads.borrow_mut() += 1;
        if self.fail_reload {
            return Err(Self::failure());
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Result<String> {
        if let Some(v) = self.pinned.get(key) {
            return Ok(v.clone());
        }
        self.values.borrow().get(key).cloned().ok_or_else(|| TuneError::Query {
            key: key.to_string(),
            stderr: format!("sysctl: cannot stat /proc/sys/{}: No such file or directory", key.replace('.', "/")),
        })
    }
}
