use std::{fs, io};
use std::path::{Path, PathBuf};

/// Copy `src` into `dst` recursively. `dst` is created if needed. Returns the
/// copied file paths relative to `src`, sorted.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    copy_dir_into(src, dst, Path::new(""), &mut copied)?;
    copied.sort();
    Ok(copied)
}

fn copy_dir_into(src: &Path, dst: &Path, rel: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name();
        let from = entry.path();
        let to = dst.join(&name);
        let rel = rel.join(&name);
        if fs::symlink_metadata(&from)?.is_dir() {
            copy_dir_into(&from, &to, &rel, out)?;
        } else {
            copy_entry(&from, &to)?;
            out.push(rel);
        }
    }
    Ok(())
}

/// Copy a single file to `to`. A symlink is recreated as a symlink with the
/// same target, dangling or not.
pub fn copy_entry(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(from)?.file_type().is_symlink() {
        copy_symlink(from, to)
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

// sysctl.d commonly holds symlinks (99-sysctl.conf -> ../sysctl.conf); keep them as links.
#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)
}

/// Remove `path` whether it is a file, a symlink or a directory. Missing is fine.
pub fn remove_any(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// True if something (even a dangling symlink) exists at `path`.
pub fn present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// First free directory name `base`, `base-1`, `base-2`, … under `parent`,
/// created atomically so two runs in the same second cannot share it.
pub fn unique_dir(parent: &Path, base: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(parent)?;
    let mut n = 0usize;
    loop {
        let name = if n == 0 { base.to_string() } else { format!("{}-{}", base, n) };
        let candidate = parent.join(name);
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nettune_fs_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn copy_dir_copies_nested_files_and_reports_them() {
        let root = scratch();
        let src = root.join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("10-a.conf"), "a = 1\n").unwrap();
        fs::write(src.join("nested/b.conf"), "b = 2\n").unwrap();

        let copied = copy_dir(&src, &root.join("dst")).unwrap();

        assert_eq!(copied, vec![PathBuf::from("10-a.conf"), PathBuf::from("nested/b.conf")]);
        assert_eq!(fs::read_to_string(root.join("dst/nested/b.conf")).unwrap(), "b = 2\n");
        fs::remove_dir_all(&root).ok();
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_preserves_symlinks() {
        let root = scratch();
        let src = root.join("src");
        fs::create_dir_all(&src).unwrap();
        std::os::unix::fs::symlink("../sysctl.conf", src.join("99-sysctl.conf")).unwrap();

        copy_dir(&src, &root.join("dst")).unwrap();

        let link = fs::read_link(root.join("dst/99-sysctl.conf")).unwrap();
        assert_eq!(link, PathBuf::from("../sysctl.conf"));
        fs::remove_dir_all(&root).ok();
    }

    #[cfg(unix)]
    #[test]
    fn copy_entry_keeps_dangling_symlink() {
        let root = scratch();
        std::os::unix::fs::symlink("missing.conf", root.join("link.conf")).unwrap();

        copy_entry(&root.join("link.conf"), &root.join("copy.conf")).unwrap();

        assert_eq!(fs::read_link(root.join("copy.conf")).unwrap(), PathBuf::from("missing.conf"));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn unique_dir_appends_counter_on_collision() {
        let root = scratch();
        let first = unique_dir(&root, "sysctl-20260101-000000").unwrap();
        let second = unique_dir(&root, "sysctl-20260101-000000").unwrap();
        assert_eq!(first, root.join("sysctl-20260101-000000"));
        assert_eq!(second, root.join("sysctl-20260101-000000-1"));
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn remove_any_handles_files_dirs_and_absence() {
        let root = scratch();
        fs::write(root.join("f"), "x").unwrap();
        fs::create_dir_all(root.join("d/e")).unwrap();

        remove_any(&root.join("f")).unwrap();
        remove_any(&root.join("d")).unwrap();
        remove_any(&root.join("missing")).unwrap();

        assert!(!present(&root.join("f")));
        assert!(!present(&root.join("d")));
        fs::remove_dir_all(&root).ok();
    }
}
