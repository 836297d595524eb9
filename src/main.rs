use std::env;
use std::process;

use anyhow::Context as _;
use chrono::Local;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use nettune::commands::prompt::InquirePrompter;
use nettune::config::{load_settings, settings_path, Settings};
use nettune::models::{Ipv6Policy, RunOutcome};
use nettune::sysctl::SysctlCommand;
use nettune::system::preflight::effective_uid;
use nettune::tune::Context;
use nettune::{restore, show, status, summary, tune, util, TuneError};

fn init_logging(default_level: &str) {
    // `RUST_LOG` wins over the settings file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn usage() {
    println!("Usage:");
    println!("  nettune                      # back up, clear and apply the tuning profile");
    println!("  nettune restore [<backup>]   # put a previous backup back");
    println!("  nettune status               # compare the written profile with the kernel");
    println!("  nettune show [disable|enable|skip]");
    println!("  nettune help");
    println!();
    println!("Settings: {}", settings_path().display());
}

fn run_tune(settings: &Settings) -> anyhow::Result<i32> {
    let runner = SysctlCommand::new(&settings.sysctl_binary);
    let mut prompter = InquirePrompter;
    let outcome = tune::run(Context {
        settings,
        runner: &runner,
        prompter: &mut prompter,
        euid: effective_uid(),
        now: Local::now(),
        max_menu_attempts: None,
    })?;

    match &outcome {
        RunOutcome::Declined => util::info("Nothing changed."),
        RunOutcome::Completed { checks, .. } => summary::print_checks(checks),
        RunOutcome::ApplyFailed { .. } => {}
    }
    summary::print(&outcome, &settings.paths);
    Ok(outcome.exit_code())
}

fn run_restore(settings: &Settings, dir: Option<&String>) -> anyhow::Result<i32> {
    let runner = SysctlCommand::new(&settings.sysctl_binary);
    let mut prompter = InquirePrompter;
    let dir = dir.map(|d| nettune::cfg_path::expand(d));
    match restore::restore(settings, &runner, &mut prompter, effective_uid(), dir.as_deref())? {
        restore::RestoreOutcome::Declined => util::info("Nothing changed."),
        restore::RestoreOutcome::Restored(from) => util::ok(format!("Restored from {}", from.display())),
    }
    Ok(0)
}

fn run_status(settings: &Settings) -> anyhow::Result<i32> {
    let runner = SysctlCommand::new(&settings.sysctl_binary);
    let all_match = status::print_status(&settings.paths, &runner)
        .with_context(|| format!("cannot check {}", settings.paths.fragment_file().display()))?;
    Ok(if all_match { 0 } else { 1 })
}

fn run_show(word: Option<&String>) -> anyhow::Result<i32> {
    let policy = match word {
        None => Ipv6Policy::Skip,
        Some(w) => Ipv6Policy::from_word(w)
            .with_context(|| format!("unknown IPv6 policy '{w}', expected disable, enable or skip"))?,
    };
    show::show(policy);
    Ok(0)
}

fn dispatch(args: &[String], settings: &Settings) -> anyhow::Result<i32> {
    match args.get(1).map(String::as_str) {
        None => run_tune(settings),
        Some("restore") => run_restore(settings, args.get(2)),
        Some("status") => run_status(settings),
        Some("show") => run_show(args.get(2)),
        Some("help") | Some("-h") | Some("--help") => {
            usage();
            Ok(0)
        }
        Some(other) => {
            util::error(format!("unknown command '{other}'"));
            usage();
            Ok(1)
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let settings = match load_settings() {
        Ok(s) => s,
        Err(e) => {
            init_logging("warn");
            util::error(&e);
            process::exit(1);
        }
    };
    init_logging(&settings.log_level);
    debug!(?settings, "settings loaded");

    let code = match dispatch(&args, &settings) {
        Ok(code) => code,
        Err(e) => {
            util::error(format!("{e:#}"));
            if let Some(err) = e.downcast_ref::<TuneError>() {
                if let TuneError::NotRoot { .. } = err {
                    util::info("Re-run with sudo.");
                }
                if err.is_precondition() {
                    util::info("Nothing was changed.");
                }
            }
            1
        }
    };
    process::exit(code);
}
