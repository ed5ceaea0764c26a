// crates/basis-exchange/src/snapshot.rs
//
// JSON snapshots of the full exchange state.
//
// Writes go to a sibling temp file which is then renamed over the target, so
// a reader never observes a partially written snapshot.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use basis_core::BasisError;

use crate::exchange::Exchange;

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    exchange: Exchange,
}

fn io_error(action: &str, path: &Path, e: io::Error) -> BasisError {
    if e.kind() == io::ErrorKind::NotFound {
        BasisError::NotFound(format!("{} {}: {}", action, path.display(), e))
    } else {
        BasisError::Serialization(format!("{} {}: {}", action, path.display(), e))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `exchange` to `path`, creating parent directories as needed.
pub fn save(exchange: &Exchange, path: &Path) -> Result<(), BasisError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
        }
    }
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        exchange: exchange.clone(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| io_error("write", &tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error("rename", path, e))?;
    tracing::debug!("Snapshot saved to {}", path.display());
    Ok(())
}

/// Read a snapshot written by [`save`].
///
/// # Errors
/// `NotFound` if there is no file at `path`; `Serialization` if it cannot
/// be parsed, was written by an incompatible version, or its staker records
/// do not add up to the total staked.
pub fn load(path: &Path) -> Result<Exchange, BasisError> {
    let contents = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    let file: SnapshotFile = serde_json::from_str(&contents)?;
    if file.version != SNAPSHOT_VERSION {
        return Err(BasisError::Serialization(format!(
            "snapshot version {} is not supported (expected {})",
            file.version, SNAPSHOT_VERSION
        )));
    }
    let recorded = file.exchange.rewards().stakers().total_amount();
    let total = file.exchange.total_staked();
    if recorded != total {
        return Err(BasisError::Serialization(format!(
            "staker records hold {} but total staked is {}",
            recorded, total
        )));
    }
    tracing::debug!("Snapshot loaded from {}", path.display());
    Ok(file.exchange)
}
