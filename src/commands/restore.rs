use std::path::{Path, PathBuf};

use tracing::info;

use super::prompt::{is_cancel, Prompter};
use crate::config::Settings;
use crate::error::{Result, TuneError};
use crate::sysctl::SysctlRunner;
use crate::system::{backup, preflight};
use crate::util;

#[derive(Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    Declined,
    Restored(PathBuf),
}

/// Put a backup back in place and reload everything with `sysctl --system`.
/// Without `dir`, the user picks one of the backups under the backup root.
pub fn restore(
    settings: &Settings,
    runner: &dyn SysctlRunner,
    prompter: &mut dyn Prompter,
    euid: u32,
    dir: Option<&Path>,
) -> Result<RestoreOutcome> {
    preflight::check(euid, &settings.paths.debian_marker)?;

    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => {
            let found = backup::list(&settings.paths.backup_root)?;
            if found.is_empty() {
                return Err(TuneError::NoBackups { root: settings.paths.backup_root.clone() });
            }
            let options: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
            match prompter.choose("Choose a backup to restore:", options) {
                Ok(choice) => PathBuf::from(choice),
                Err(e) if is_cancel(&e) => return Ok(RestoreOutcome::Declined),
                Err(e) => return Err(e),
            }
        }
    };

    let record = backup::open(&dir)?;
    let m = &record.manifest;
    util::info(format!(
        "Backup from {}: sysctl.conf {}, {} fragment file(s)",
        m.created_at.format("%Y-%m-%d %H:%M:%S"),
        if m.legacy_present { "present" } else { "absent" },
        m.fragment_files.len()
    ));
    match prompter.confirm(&format!(
        "Replace {} and {} with this backup?",
        m.legacy_conf.display(),
        m.fragment_dir.display()
    )) {
        Ok(true) => {}
        Ok(false) => return Ok(RestoreOutcome::Declined),
        Err(e) if is_cancel(&e) => return Ok(RestoreOutcome::Declined),
        Err(e) => return Err(e),
    }

    backup::restore(&record)?;
    util::ok(format!("Files restored from {}", dir.display()));
    runner.load_system()?;
    util::ok("System configuration reloaded");
    info!(dir = %dir.display(), "restore complete");
    Ok(RestoreOutcome::Restored(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::prompt::ScriptedPrompter;
    use crate::config::Paths;
    use crate::sysctl::mock::MockSysctl;
    use chrono::Local;
    use std::fs;
    use uuid::Uuid;

    fn host() -> (PathBuf, Settings) {
        let root = std::env::temp_dir().join(format!("nettune_restore_{}", Uuid::new_v4()));
        fs::create_dir_all(root.join("etc/sysctl.d")).unwrap();
        fs::write(root.join("etc/debian_version"), "12.5\n").unwrap();
        let settings = Settings { paths: Paths::rooted_at(&root), ..Settings::default() };
        (root, settings)
    }

    #[test]
    fn restore_without_backups_is_an_error() {
        let (root, s) = host();
        let mut p = ScriptedPrompter::new();
        let err = restore(&s, &MockSysctl::new(), &mut p, 0, None).unwrap_err();
        assert!(matches!(err, TuneError::NoBackups { .. }));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn chosen_backup_is_restored_and_reloaded() {
        let (root, s) = host();
        fs::write(&s.paths.legacy_conf, "vm.swappiness = 10\n").unwrap();
        let record = backup::create(&s.paths, Local::now()).unwrap();
        fs::remove_file(&s.paths.legacy_conf).unwrap();

        let runner = MockSysctl::new();
        let mut p = ScriptedPrompter::new()
            .answer(&record.dir.display().to_string())
            .confirm_with(true);

        let out = restore(&s, &runner, &mut p, 0, None).unwrap();

        assert_eq!(out, RestoreOutcome::Restored(record.dir.clone()));
        assert_eq!(fs::read_to_string(&s.paths.legacy_conf).unwrap(), "vm.swappiness = 10\n");
        assert_eq!(runner.system_reloads(), 1);
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn declining_restore_changes_nothing() {
        let (root, s) = host();
        let record = backup::create(&s.paths, Local::now()).unwrap();
        fs::write(s.paths.fragment_file(), "x = 1\n").unwrap();

        let runner = MockSysctl::new();
        let mut p = ScriptedPrompter::new().confirm_with(false);
        let out = restore(&s, &runner, &mut p, 0, Some(&record.dir)).unwrap();

        assert_eq!(out, RestoreOutcome::Declined);
        assert!(s.paths.fragment_file().exists());
        assert_eq!(runner.system_reloads(), 0);
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn restore_requires_root() {
        let (root, s) = host();
        let mut p = ScriptedPrompter::new();
        let err = restore(&s, &MockSysctl::new(), &mut p, 1000, Some(Path::new("/x"))).unwrap_err();
        assert!(err.is_precondition());
        fs::remove_dir_all(&root).ok();
    }
}
