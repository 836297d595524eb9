use std::fs;

use prettytable::{row, Table};

use super::verify::check_one;
use crate::config::Paths;
use crate::error::{Result, TuneError};
use crate::models::Check;
use crate::sysctl::{SysctlDocument, SysctlRunner};

/// Compare every entry of the written profile with the running kernel.
pub fn collect(paths: &Paths, runner: &dyn SysctlRunner) -> Result<Vec<(String, Check)>> {
    let path = paths.fragment_file();
    let text = fs::read_to_string(&path).map_err(|source| TuneError::Read { path, source })?;
    let doc = SysctlDocument::parse(&text)?;
    Ok(doc
        .entries()
        .map(|(key, value)| (value.to_string(), check_one(runner, key, value)))
        .collect())
}

pub fn print_status(paths: &Paths, runner: &dyn SysctlRunner) -> Result<bool> {
    let rows = collect(paths, runner)?;
    if rows.is_empty() {
        println!("{} has no entries.", paths.fragment_file().display());
        return Ok(true);
    }

    let mut table = Table::new();
    table.add_row(row!["Key", "Configured", "Runtime", "OK"]);
    for (configured, check) in &rows {
        let (runtime, ok) = match check {
            Check::Match { value, .. } => (value.as_str(), "yes"),
            Check::Mismatch { actual, .. } => (actual.as_str(), "NO"),
            Check::Unreadable { .. } => ("?", "NO"),
        };
        table.add_row(row![check.key(), configured, runtime, ok]);
    }
    table.printstd();
    Ok(rows.iter().all(|(_, c)| c.is_match()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysctl::mock::MockSysctl;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn with_fragment(text: &str) -> (PathBuf, Paths) {
        let root = std::env::temp_dir().join(format!("nettune_status_{}", Uuid::new_v4()));
        let paths = Paths::rooted_at(&root);
        fs::create_dir_all(&paths.fragment_dir).unwrap();
        fs::write(paths.fragment_file(), text).unwrap();
        (root, paths)
    }

    #[test]
    fn collect_checks_each_entry() {
        let (root, paths) = with_fragment("# t\nnet.core.somaxconn = 4096\nnet.ipv4.tcp_ecn = 1\n");
        let runner = MockSysctl::new().pin("net.core.somaxconn", "4096").pin("net.ipv4.tcp_ecn", "2");

        let rows = collect(&paths, &runner).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].1.is_match());
        assert!(!rows[1].1.is_match());
        assert_eq!(rows[1].0, "1");
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_fragment_is_a_read_error() {
        let paths = Paths::rooted_at(&std::env::temp_dir().join(format!("nettune_none_{}", Uuid::new_v4())));
        let err = collect(&paths, &MockSysctl::new()).unwrap_err();
        assert!(matches!(err, TuneError::Read { .. }));
    }

    #[test]
    fn malformed_fragment_is_a_parse_error() {
        let (root, paths) = with_fragment("garbage line\n");
        let err = collect(&paths, &MockSysctl::new()).unwrap_err();
        assert!(matches!(err, TuneError::Parse(_)));
        fs::remove_dir_all(&root).ok();
    }
}
