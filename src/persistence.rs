// File: src/persistence.rs
use crate::core::key::CombinationKey;
use crate::daily_log::DailyLogEntry;
use crate::error::PersistenceError;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

const LEDGER_VERSION: u32 = 1;

/// On-disk form of the ledger.
#[derive(serde::Deserialize)]
struct LedgerSnapshot {
    version: u32,
    keys: BTreeSet<CombinationKey>,
}

#[derive(serde::Serialize)]
struct LedgerSnapshotRef<'a> {
    version: u32,
    keys: &'a BTreeSet<CombinationKey>,
}

/// Writes the full key set next to `path` and renames it into place, so a
/// reader sees either the previous snapshot or this one.
pub fn save_ledger(keys: &BTreeSet<CombinationKey>, path: &Path) -> Result<(), PersistenceError> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let snapshot = LedgerSnapshotRef {
        version: LEDGER_VERSION,
        keys,
    };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .map_err(|source| PersistenceError::Commit {
            path: path.display().to_string(),
            source,
        })?;
    Ok(())
}

/// A missing file is an empty ledger. A corrupt one is an error, never a reset.
pub fn load_ledger(path: &Path) -> Result<BTreeSet<CombinationKey>, PersistenceError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(e.into()),
    };
    let reader = BufReader::new(file);
    let snapshot: LedgerSnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != LEDGER_VERSION {
        return Err(PersistenceError::Version(snapshot.version));
    }
    Ok(snapshot.keys)
}

/// Appends one JSON line and syncs it before returning. A failed write is
/// cut back off, so the file never keeps a partial record.
pub fn append_log_entry(entry: &DailyLogEntry, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut line = serde_json::to_vec(entry)?;
    line.push(b'\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let start = file.metadata()?.len();
    if let Err(e) = file.write_all(&line).and_then(|()| file.sync_data()) {
        if let Err(undo) = file.set_len(start) {
            warn!(path = %path.display(), error = %undo, "could not drop partial log line");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Reads every entry in file order. Blank lines are skipped.
///
/// An unreadable last record is what a crash mid-append leaves behind: it is
/// dropped and cut from the file so later appends start on a clean line.
/// A bad record anywhere earlier is an error.
pub fn read_log(path: &Path) -> Result<Vec<DailyLogEntry>, PersistenceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let is_blank = |chunk: &[u8]| chunk.iter().all(u8::is_ascii_whitespace);

    let mut entries = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let end = bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| offset + i + 1);
        let line = &bytes[offset..end];
        if !is_blank(line) {
            match serde_json::from_slice(line) {
                Ok(entry) => entries.push(entry),
                Err(e) if is_blank(&bytes[end..]) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        dropped_bytes = bytes.len() - offset,
                        "dropping torn record at end of daily log"
                    );
                    truncate_file(path, offset as u64)?;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        offset = end;
    }
    Ok(entries)
}

fn truncate_file(path: &Path, len: u64) -> Result<(), PersistenceError> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(len)?;
    file.sync_data()?;
    Ok(())
}
