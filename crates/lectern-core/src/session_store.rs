//! Session snapshot persistence and recovery.
//!
//! Histories, pointers, the external-file log, and the active references are
//! written as one JSON document. Writes go through a temp file + rename with a
//! backup copy of the previous snapshot; recovery falls back to the backup and
//! re-establishes the history invariants on load.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::history::HistoryManager;
use crate::models::{Channel, Coordinate};
use crate::session::SessionState;

pub const SESSION_SCHEMA_VERSION: u32 = 1;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedLog {
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub saved_at: String,
    #[serde(default)]
    pub primary: PersistedLog,
    #[serde(default)]
    pub secondary: PersistedLog,
    #[serde(default)]
    pub external: PersistedLog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_primary: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_secondary: Option<Coordinate>,
}

fn default_schema_version() -> u32 {
    SESSION_SCHEMA_VERSION
}

impl PersistedSession {
    /// Capture the current histories and active references.
    #[must_use]
    pub fn capture(history: &HistoryManager, session: &SessionState) -> Self {
        let log = |channel: Channel| PersistedLog {
            entries: history.entries(channel).to_vec(),
            pointer: history.pointer(channel),
        };
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            primary: log(Channel::Primary),
            secondary: log(Channel::Secondary),
            external: PersistedLog {
                entries: history.entries(Channel::External).to_vec(),
                pointer: None,
            },
            active_primary: Some(session.active(Channel::Primary).clone()),
            active_secondary: Some(session.active(Channel::Secondary).clone()),
        }
    }

    /// Load the snapshot into live state. History invariants are enforced
    /// exactly as on live mutation.
    pub fn apply(self, history: &mut HistoryManager, session: &mut SessionState) {
        history.restore(Channel::Primary, self.primary.entries, self.primary.pointer);
        history.restore(
            Channel::Secondary,
            self.secondary.entries,
            self.secondary.pointer,
        );
        history.restore(Channel::External, self.external.entries, None);
        if let Some(primary) = self.active_primary {
            session.set_active(Channel::Primary, primary);
        }
        if let Some(secondary) = self.active_secondary {
            session.set_active(Channel::Secondary, secondary);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoverySource {
    #[default]
    None,
    Primary,
    Backup,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveryOutcome {
    pub snapshot: Option<PersistedSession>,
    pub source: RecoverySource,
    pub warnings: Vec<String>,
}

/// Write `snapshot` to `path`, keeping the previous file as `<path>.bak`.
///
/// The new contents are staged next to `path` and renamed into place, so a
/// crash leaves either the old or the new snapshot on disk.
pub fn persist_session(path: &Path, snapshot: &PersistedSession) -> Result<(), String> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|err| format!("encode session snapshot: {err}"))?;
    let dir = parent_dir(path);
    if let Some(dir) = dir {
        fs::create_dir_all(dir)
            .map_err(|err| format!("create session directory {}: {err}", dir.display()))?;
    }
    if path.exists() {
        let backup = sibling(path, ".bak");
        fs::copy(path, &backup)
            .map_err(|err| format!("back up {} to {}: {err}", path.display(), backup.display()))?;
    }

    let staged = sibling(
        path,
        &format!(
            ".tmp-{}-{}",
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
        ),
    );
    write_synced(&staged, json.as_bytes())?;
    fs::rename(&staged, path).map_err(|err| {
        let _ = fs::remove_file(&staged);
        format!("move {} into place: {err}", staged.display())
    })?;
    if let Some(handle) = dir.and_then(|dir| File::open(dir).ok()) {
        let _ = handle.sync_all();
    }

    log::debug!("session snapshot saved to {}", path.display());
    Ok(())
}

/// Load the snapshot at `path`, falling back to its `.bak` sibling.
/// Problems are reported as warnings, never as errors.
#[must_use]
pub fn recover_session(path: &Path) -> RecoveryOutcome {
    let mut warnings = Vec::new();
    let candidates = [
        (path.to_path_buf(), "primary session", RecoverySource::Primary),
        (sibling(path, ".bak"), "backup session", RecoverySource::Backup),
    ];
    for (candidate, label, source) in candidates {
        match read_snapshot(&candidate) {
            Ok(None) => {}
            Ok(Some(snapshot)) => {
                if snapshot.schema_version != SESSION_SCHEMA_VERSION {
                    warnings.push(format!(
                        "{label} has schema version {}; loading what can be read",
                        snapshot.schema_version
                    ));
                }
                if source == RecoverySource::Backup {
                    warnings.push("recovered session from backup snapshot".to_owned());
                }
                return RecoveryOutcome {
                    snapshot: Some(snapshot),
                    source,
                    warnings,
                };
            }
            Err(reason) => warnings.push(format!("{label} {reason}; ignored")),
        }
    }

    if warnings.is_empty() {
        warnings.push("no session snapshot found".to_owned());
    }
    for warning in &warnings {
        log::warn!("{warning}");
    }
    RecoveryOutcome {
        snapshot: None,
        source: RecoverySource::None,
        warnings,
    }
}

/// `Ok(None)` when the file does not exist.
fn read_snapshot(path: &Path) -> Result<Option<PersistedSession>, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("unreadable ({err})")),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| format!("invalid ({err})"))
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let mut file = File::create(path).map_err(|err| format!("create {}: {err}", path.display()))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|err| format!("write {}: {err}", path.display()))
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
