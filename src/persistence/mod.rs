//! Best-score persistence
//!
//! The only thing the game keeps between sessions is one integer. Stores are
//! written synchronously on every improvement; a failed write is reported to
//! the caller, which keeps the value in memory and tries again on the next
//! improvement.

/// Key used by key-value backends
pub const BEST_SCORE_KEY: &str = "colorCascadeBestScore";

/// Errors that can occur while reading or writing the best score.
#[derive(Debug)]
pub enum StoreError {
    /// Backend not reachable (no window, storage disabled, ...)
    Unavailable(&'static str),
    /// Backend refused the write
    Rejected(String),
    /// Stored value is not a score
    Corrupt(String),
    /// Standard I/O error.
    IoError(std::io::Error),
    /// JSON serialization/deserialization error.
    JsonError(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(what) => write!(f, "storage unavailable: {what}"),
            StoreError::Rejected(why) => write!(f, "storage rejected write: {why}"),
            StoreError::Corrupt(value) => write!(f, "stored best score is not a number: {value:?}"),
            StoreError::IoError(e) => write!(f, "IO error: {e}"),
            StoreError::JsonError(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(e) => Some(e),
            StoreError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::IoError(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::JsonError(e)
    }
}

/// Somewhere to keep the best score between sessions
pub trait ScoreStore {
    /// Read the stored best score; nothing stored yet reads as 0
    fn load_best(&mut self) -> Result<u64, StoreError>;
    /// Overwrite the stored best score
    fn save_best(&mut self, score: u64) -> Result<(), StoreError>;
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub best: Option<u64>,
    /// Make every write fail (exercises the retry path)
    pub fail_writes: bool,
    /// Successful writes so far
    pub writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u64) -> Self {
        Self {
            best: Some(best),
            ..Self::default()
        }
    }
}

impl ScoreStore for MemoryStore {
    fn load_best(&mut self) -> Result<u64, StoreError> {
        Ok(self.best.unwrap_or(0))
    }

    fn save_best(&mut self, score: u64) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Rejected("writes disabled".into()));
        }
        self.best = Some(score);
        self.writes += 1;
        Ok(())
    }
}

/// On-disk record
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BestScoreRecord {
    best_score: u64,
}

/// JSON file store: `{ "bestScore": n }`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for JsonFileStore {
    fn load_best(&mut self) -> Result<u64, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let record: BestScoreRecord = serde_json::from_str(&json)?;
        Ok(record.best_score)
    }

    fn save_best(&mut self, score: u64) -> Result<(), StoreError> {
        let json = serde_json::to_string(&BestScoreRecord { best_score: score })?;
        // Write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable("localStorage"))
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn load_best(&mut self) -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(BEST_SCORE_KEY) {
            Ok(Some(value)) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| StoreError::Corrupt(value)),
            Ok(None) => Ok(0),
            Err(_) => Err(StoreError::Unavailable("localStorage read")),
        }
    }

    fn save_best(&mut self, score: u64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(BEST_SCORE_KEY, &score.to_string())
            .map_err(|e| StoreError::Rejected(format!("{e:?}")))
    }
}
