//! The default command: preflight → confirm → backup → clean → write →
//! IPv6 choice → reload → verify.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{error, info};

use super::prompt::{ask_ipv6_policy, is_cancel, Prompter};
use super::summary;
use super::verify::verify_profile;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{BackupRecord, Ipv6Policy, RunOutcome};
use crate::sysctl::{profile, SysctlRunner};
use crate::system::{backup, install, preflight};
use crate::util;

/// Everything a run needs from the outside world.
pub struct Context<'a> {
    pub settings: &'a Settings,
    pub runner: &'a dyn SysctlRunner,
    pub prompter: &'a mut dyn Prompter,
    pub euid: u32,
    pub now: DateTime<Local>,
    /// Bound on IPv6 menu retries; `None` asks until answered.
    pub max_menu_attempts: Option<usize>,
}

pub fn run(ctx: Context<'_>) -> Result<RunOutcome> {
    let paths = &ctx.settings.paths;
    preflight::check(ctx.euid, &paths.debian_marker)?;

    util::info(format!(
        "This replaces {} and everything in {} with a network tuning profile.",
        paths.legacy_conf.display(),
        paths.fragment_dir.display()
    ));
    match ctx.prompter.confirm("Continue?") {
        Ok(true) => {}
        Ok(false) => return Ok(RunOutcome::Declined),
        Err(e) if is_cancel(&e) => return Ok(RunOutcome::Declined),
        Err(e) => return Err(e),
    }

    let record = backup::create(paths, ctx.now)?;
    util::ok(format!("Backup saved to {}", record.dir.display()));

    let Context { settings, runner, prompter, now, max_menu_attempts, .. } = ctx;
    install_and_apply(settings, runner, prompter, now, max_menu_attempts, record)
}

// Clean, write the base block, ask for the IPv6 policy and append it.
fn stage(
    settings: &Settings,
    prompter: &mut dyn Prompter,
    now: DateTime<Local>,
    max_menu_attempts: Option<usize>,
) -> Result<(Ipv6Policy, PathBuf)> {
    let paths = &settings.paths;
    install::clean(paths)?;
    util::ok("Old configuration cleared");

    let mut doc = profile::base(now);
    let file = install::write(paths, &doc)?;
    util::ok(format!("Base profile written to {}", file.display()));

    let policy = ask_ipv6_policy(prompter, max_menu_attempts)?;
    let block = profile::ipv6_block(policy);
    if !block.is_empty() {
        doc.extend(&block);
        install::write(paths, &doc)?;
    }
    util::ok(format!("IPv6: {policy}"));
    Ok((policy, file))
}

fn install_and_apply(
    settings: &Settings,
    runner: &dyn SysctlRunner,
    prompter: &mut dyn Prompter,
    now: DateTime<Local>,
    max_menu_attempts: Option<usize>,
    record: BackupRecord,
) -> Result<RunOutcome> {
    let (policy, file) = match stage(settings, prompter, now, max_menu_attempts) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, backup = %record.dir.display(), "aborted after backup");
            summary::print_aborted(&record, &settings.paths, &e);
            return Err(e);
        }
    };

    info!(file = %file.display(), "reloading sysctl");
    if let Err(e) = runner.load_file(&file) {
        error!(error = %e, "reload failed");
        util::error(&e);
        return Ok(RunOutcome::ApplyFailed { backup: record, policy, error: e });
    }
    util::ok("Settings applied");

    let checks = verify_profile(runner);
    Ok(RunOutcome::Completed { backup: record, policy, checks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use crate::error::TuneError;
    use crate::models::Check;
    use crate::sysctl::mock::MockSysctl;
    use crate::commands::prompt::ScriptedPrompter;
    use std::fs;
    use uuid::Uuid;

    fn host() -> (PathBuf, Settings) {
        let root = std::env::temp_dir().join(format!("nettune_tune_{}", Uuid::new_v4()));
        fs::create_dir_all(root.join("etc/sysctl.d")).unwrap();
        fs::write(root.join("etc/debian_version"), "12.5\n").unwrap();
        let settings = Settings { paths: Paths::rooted_at(&root), ..Settings::default() };
        (root, settings)
    }

    fn ctx<'a>(s: &'a Settings, r: &'a MockSysctl, p: &'a mut ScriptedPrompter, euid: u32) -> Context<'a> {
        Context { settings: s, runner: r, prompter: p, euid, now: Local::now(), max_menu_attempts: Some(5) }
    }

    #[test]
    fn decline_leaves_everything_alone() {
        let (root, s) = host();
        fs::write(&s.paths.legacy_conf, "a = 1\n").unwrap();
        let runner = MockSysctl::new();
        let mut p = ScriptedPrompter::new().confirm_with(false);

        let out = run(ctx(&s, &runner, &mut p, 0)).unwrap();

        assert!(matches!(out, RunOutcome::Declined));
        assert_eq!(out.exit_code(), 0);
        assert!(s.paths.legacy_conf.exists());
        assert!(!s.paths.backup_root.exists());
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn non_root_fails_before_prompting() {
        let (root, s) = host();
        let runner = MockSysctl::new();
        let mut p = ScriptedPrompter::new().confirm_with(true).answer("1");

        let err = run(ctx(&s, &runner, &mut p, 1000)).unwrap_err();

        assert!(matches!(err, TuneError::NotRoot { .. }));
        assert!(p.asked().is_empty());
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn cancelled_menu_aborts_but_keeps_backup() {
        let (root, s) = host();
        let runner = MockSysctl::new();
        let mut p = ScriptedPrompter::new().confirm_with(true);

        let err = run(ctx(&s, &runner, &mut p, 0)).unwrap_err();

        assert!(is_cancel(&err));
        assert_eq!(backup::list(&s.paths.backup_root).unwrap().len(), 1);
        assert!(runner.loaded_files().is_empty());
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn completed_run_verifies_three_values() {
        let (root, s) = host();
        let runner = MockSysctl::new();
        let mut p = ScriptedPrompter::new().confirm_with(true).answer("3");

        let out = run(ctx(&s, &runner, &mut p, 0)).unwrap();

        match out {
            RunOutcome::Completed { policy, checks, .. } => {
                assert_eq!(policy, Ipv6Policy::Skip);
                assert_eq!(checks.len(), 3);
                assert!(checks.iter().all(Check::is_match));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(runner.loaded_files(), vec![s.paths.fragment_file()]);
        fs::remove_dir_all(&root).ok();
    }
}
