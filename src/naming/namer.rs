//! Collision-safe output paths
//!
//! The check is a plain existence test, not a reservation: two requests that
//! land on the same base name at the same moment can still race between the
//! check and the write.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// First 8 hex characters of an id, used as a disambiguating suffix
pub fn short_id(id: &Uuid) -> String {
    let mut s = id.simple().to_string();
    s.truncate(8);
    s
}

/// Pick `<dir>/<base>.<ext>`, or `<dir>/<base>_<shortid>.<ext>` when the
/// first one is taken. The suffixed name is not re-checked.
pub fn unique_path(dir: &Path, base: &str, ext: &str, id: &Uuid) -> PathBuf {
    let candidate = dir.join(format!("{}.{}", base, ext));
    if !candidate.exists() {
        return candidate;
    }

    let suffixed = dir.join(format!("{}_{}.{}", base, short_id(id), ext));
    tracing::debug!(
        "{} already exists, using {}",
        candidate.display(),
        suffixed.display()
    );
    suffixed
}
