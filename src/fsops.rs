use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Ensure every directory in the list exists, creating missing parents.
/// Succeeds silently for directories that are already there.
pub fn provision_dirs<P: AsRef<Path>>(dirs: &[P]) -> Result<()> {
    for dir in dirs {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create directory {}", dir.display()))?;
        tracing::debug!("Provisioned {}", dir.display());
    }
    Ok(())
}

/// Recursively copy `source` into `dest`, preserving relative structure and
/// overwriting files already present at the destination.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_dir() {
        anyhow::bail!("source tree {} does not exist", source.display());
    }

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("walked entry outside the source tree")?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("could not copy to {}", target.display()))?;
            tracing::debug!("Copied {}", target.display());
        }
    }
    Ok(())
}

/// Set mode 0755 on the given file so the front-end can invoke it directly.
pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .with_context(|| format!("{} not found after copy", path.display()))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    tracing::debug!("Marked {} executable", path.display());
    Ok(())
}

/// Delete every file in the list; absent files are fine.
pub fn remove_files<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => tracing::debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} already absent", path.display())
            }
            Err(e) => {
                return Err(e).with_context(|| format!("could not remove {}", path.display()))
            }
        }
    }
    Ok(())
}

/// Remove a directory tree if present. Returns whether anything was removed
/// so the uninstall path can warn instead of failing.
pub fn remove_tree_if_exists(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(dir)
        .with_context(|| format!("could not remove directory {}", dir.display()))?;
    Ok(true)
}

/// Remove a single file if present; same contract as `remove_tree_if_exists`.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("could not remove {}", path.display())),
    }
}
