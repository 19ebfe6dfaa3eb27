use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info};

use crate::error::QuizError;
use crate::store::schema::{EXPORT_FILE, SNAPSHOT_FILE, SessionSnapshot};

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repaso");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Write through a temp file so a crash never leaves a half-written snapshot.
    fn write_atomic(path: &Path, json: &str) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        Self::write_atomic(&self.file_path(SNAPSHOT_FILE), &json)
    }

    /// `None` when nothing was saved yet. A snapshot that exists but cannot be
    /// read or parsed is logged and replaced by an empty one.
    pub fn load_snapshot(&self) -> Option<SessionSnapshot> {
        let path = self.file_path(SNAPSHOT_FILE);
        if !path.exists() {
            return None;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(|source| QuizError::FileRead {
                path: path.clone(),
                source,
            })
            .and_then(|content| {
                serde_json::from_str::<SessionSnapshot>(&content).map_err(QuizError::from)
            })
            .and_then(|snapshot| snapshot.validate().map(|()| snapshot));
        match parsed {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("discarding stored progress: {e}");
                Some(SessionSnapshot::default())
            }
        }
    }

    pub fn clear_snapshot(&self) -> Result<()> {
        let path = self.file_path(SNAPSHOT_FILE);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn has_snapshot(&self) -> bool {
        self.file_path(SNAPSHOT_FILE).exists()
    }
}

/// Where an export into `dir` ends up.
pub fn export_path(dir: &Path) -> PathBuf {
    dir.join(EXPORT_FILE)
}

/// Write a portable copy of the snapshot to `<dir>/quizProgress.json`.
pub fn export_to_file(snapshot: &SessionSnapshot, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = export_path(dir);
    let json = serde_json::to_string_pretty(snapshot)?;
    JsonStore::write_atomic(&path, &json)?;
    info!(path = %path.display(), "exported progress");
    Ok(path)
}

pub fn import_from_file(path: &Path) -> Result<SessionSnapshot, QuizError> {
    let content = fs::read_to_string(path).map_err(|source| QuizError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: SessionSnapshot = serde_json::from_str(&content)?;
    snapshot.validate()?;
    info!(path = %path.display(), "imported progress");
    Ok(snapshot)
}
