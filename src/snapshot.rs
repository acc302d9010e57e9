use crate::error::Result;
use crate::model::Snapshot;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_SNAPSHOT_FILE: &str = "previous.json";

/// Durable home of the last saved snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Self {
        let path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => PathBuf::from(DEFAULT_SNAPSHOT_FILE),
        };
        Self { path }
    }

    /// Reads the stored snapshot. Any failure yields an empty snapshot; a
    /// missing file is the normal first-run case.
    pub fn load(&self) -> Snapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no previous snapshot, starting from zero");
                return Snapshot::new();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read snapshot, starting from zero"
                );
                return Snapshot::new();
            }
        };

        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snapshot) => {
                debug!(path = %self.path.display(), records = snapshot.len(), "loaded snapshot");
                snapshot
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to parse snapshot, starting from zero"
                );
                Snapshot::new()
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let content = serde_json::to_vec_pretty(snapshot)?;
        atomic_write(&self.path, &content)?;
        debug!(path = %self.path.display(), records = snapshot.len(), "saved snapshot");
        Ok(())
    }

    /// Saves only when at least one repository made it into `snapshot`, so a
    /// run where every fetch failed leaves the previous baseline in place.
    pub fn save_nonempty(&self, snapshot: &Snapshot) -> Result<bool> {
        if snapshot.is_empty() {
            warn!(path = %self.path.display(), "no valid data fetched, keeping previous snapshot");
            return Ok(false);
        }
        self.save(snapshot)?;
        Ok(true)
    }
}

/// Writes `content` to a sibling temp file, syncs it, then renames it over
/// `target`.
pub fn atomic_write(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = target.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    if let Err(e) = write_synced(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, target) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}
