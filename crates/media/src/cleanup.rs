//! Best-effort removal of a finished job's files.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Remove each path, ignoring every failure (including "not found").
///
/// Returns the paths that were actually removed. Never fails, so it can run
/// after a job error without replacing it.
pub async fn remove_all<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut removed = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed job file");
                removed.push(path.to_path_buf());
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "job file not removed");
            },
        }
    }
    removed
}
