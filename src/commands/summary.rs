use std::fmt::Write;

use crossterm::style::Color;

use crate::config::Paths;
use crate::error::TuneError;
use crate::models::{BackupRecord, Check, Ipv6Policy, RunOutcome};
use crate::system::backup;
use crate::util;

const RULE: &str = "==================================================";

fn mark(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// Plain-text summary of a finished run. `None` for a declined run.
pub fn render(outcome: &RunOutcome, paths: &Paths) -> Option<String> {
    let (backup, policy, applied, checks, failure) = match outcome {
        RunOutcome::Declined => return None,
        RunOutcome::Completed { backup, policy, checks } => (backup, *policy, true, checks.as_slice(), None),
        RunOutcome::ApplyFailed { backup, policy, error } => (backup, *policy, false, &[][..], Some(error)),
    };

    let mut s = header();
    let _ = writeln!(s, " {} Previous configuration backed up", mark(true));
    let _ = writeln!(
        s,
        " {} Old {} and {} fragments cleared",
        mark(true),
        paths.legacy_conf.display(),
        paths.fragment_dir.display()
    );
    let _ = writeln!(s, " {} Profile written to {}", mark(true), paths.fragment_file().display());
    let _ = writeln!(s, " {} IPv6: {}", mark(true), policy);
    let _ = writeln!(s, " {} Settings loaded into the running kernel", mark(applied));
    if applied {
        let _ = writeln!(s, " {} TCP congestion control: BBR", mark(true));
        let _ = writeln!(s, " {} Queue discipline: fq", mark(true));
        let _ = writeln!(s, " {} Explicit Congestion Notification: on", mark(true));
        let _ = writeln!(s, " {} Socket buffers up to 64 MiB, larger backlogs", mark(true));
        let _ = writeln!(s, " {} Shorter FIN timeout and keepalive", mark(true));
        let verified = checks.iter().filter(|c| c.is_match()).count();
        let _ = writeln!(s, " {} Runtime check: {}/{} values confirmed", mark(verified == checks.len()), verified, checks.len());
    }
    if let Some(e) = failure {
        let _ = writeln!(s, " Reload failed: {e}");
    }
    let _ = writeln!(s, "{RULE}");
    write_backup(&mut s, backup);
    if policy == Ipv6Policy::Disable && applied {
        let _ = writeln!(s, " A reboot is recommended so every interface drops IPv6.");
    }
    let _ = writeln!(s, "{RULE}");
    Some(s)
}

/// Summary for a run that stopped after the backup but before a reload: the
/// on-disk state is unknown, so only the failure and the way back are listed.
pub fn render_aborted(record: &BackupRecord, paths: &Paths, error: &TuneError) -> String {
    let mut s = header();
    let _ = writeln!(s, " {} Previous configuration backed up", mark(true));
    let _ = writeln!(s, " {} Profile installed in {}", mark(false), paths.fragment_dir.display());
    let _ = writeln!(s, " {} Settings loaded into the running kernel", mark(false));
    let _ = writeln!(s, " Aborted: {error}");
    let _ = writeln!(s, "{RULE}");
    write_backup(&mut s, record);
    let _ = writeln!(s, "{RULE}");
    s
}

fn header() -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{RULE}");
    let _ = writeln!(s, " Network tuning summary");
    let _ = writeln!(s, "{RULE}");
    s
}

fn write_backup(s: &mut String, record: &BackupRecord) {
    let _ = writeln!(s, " Backup: {}", record.dir.display());
    if backup::is_empty(record) {
        let _ = writeln!(s, "         (nothing existed to back up)");
    }
    let _ = writeln!(s, " Restore with: nettune restore {}", record.dir.display());
}

/// One line per runtime check: `[OK]` for a match, a warning otherwise.
pub fn print_checks(checks: &[Check]) {
    for c in checks {
        match c {
            Check::Match { key, value } => util::ok(format!("{key} = {value}")),
            Check::Mismatch { key, expected, actual } => {
                util::warn(format!("{key} is '{actual}', expected '{expected}'"))
            }
            Check::Unreadable { key, reason } => util::warn(format!("{key} could not be read: {reason}")),
        }
    }
}

pub fn print(outcome: &RunOutcome, paths: &Paths) {
    if let Some(text) = render(outcome, paths) {
        let color = if outcome.exit_code() == 0 { Color::Green } else { Color::Yellow };
        util::colored(color, text);
    }
}

pub fn print_aborted(record: &BackupRecord, paths: &Paths, error: &TuneError) {
    util::colored(Color::Yellow, render_aborted(record, paths, error));
}
