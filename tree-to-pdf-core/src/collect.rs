//! Recursive file collection for a project folder.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, error, info};

#[derive(Debug)]
pub enum CollectError {
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io { source, .. } => Some(source),
        }
    }
}

/// Every file under `root`, depth first, siblings ordered by name.
///
/// Files and directories whose name matches one of `exclude` are skipped, as
/// is `skip` (typically the output file of a previous run). Symlinks to files
/// are collected; symlinked directories are never descended into.
pub fn collect_files(
    root: &Path,
    exclude: &[Regex],
    skip: Option<&Path>,
) -> Result<Vec<PathBuf>, CollectError> {
    info!(path = %root.display(), "Collecting files");

    fn visit_dir(
        dir: &Path,
        exclude: &[Regex],
        skip: Option<&Path>,
        results: &mut Vec<PathBuf>,
    ) -> Result<(), CollectError> {
        let io_err = |source| CollectError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = std::fs::read_dir(dir)
            .map_err(io_err)?
            .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        entries.sort_by(|(a, _), (b, _)| a.file_name().cmp(&b.file_name()));

        for (path, file_type) in entries {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if exclude.iter().any(|re| re.is_match(file_name)) {
                debug!(path = %path.display(), "Skipping excluded entry");
                continue;
            }
            if skip.is_some_and(|s| s == path) {
                debug!(path = %path.display(), "Skipping output file");
                continue;
            }
            if file_type.is_dir() {
                visit_dir(&path, exclude, skip, results)?;
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                results.push(path);
            } else if file_type.is_symlink() {
                debug!(path = %path.display(), "Not following symlinked directory");
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    if let Err(e) = visit_dir(root, exclude, skip, &mut files) {
        error!(error = %e, "Error occurred while collecting files");
        return Err(e);
    }

    info!(count = files.len(), "Completed collecting files");
    Ok(files)
}
