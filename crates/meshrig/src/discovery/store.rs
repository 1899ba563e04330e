//! File-directory backed config store.
//!
//! Every `*.yaml`, `*.yml` and `*.json` file under the directory (recursively)
//! is parsed into [`ConfigEntry`] values. YAML files may hold several
//! documents. Each entry needs a `kind` and a `metadata.name`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config directory {path} does not exist")]
    MissingDir { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config entry in {path}: {reason}")]
    InvalidEntry { path: PathBuf, reason: String },
}

/// One config object loaded from the watched directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigEntry {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub spec: Value,
    pub source: PathBuf,
}

/// Size and modification time of every watched file.
pub type Fingerprint = BTreeMap<PathBuf, (u64, Option<SystemTime>)>;

/// An immutable view of the directory at one point in time.
#[derive(Debug, Default)]
pub struct ConfigSnapshot {
    pub entries: Vec<ConfigEntry>,
    pub fingerprint: Fingerprint,
}

impl ConfigSnapshot {
    pub fn of_kind<'a>(
        &'a self,
        kinds: &'a [&'a str],
    ) -> impl Iterator<Item = &'a ConfigEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| kinds.contains(&e.kind.as_str()))
    }
}

/// The watched directory and its current snapshot.
#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    namespace: String,
    snapshot: RwLock<Arc<ConfigSnapshot>>,
    version: AtomicU64,
}

impl ConfigStore {
    /// Load `dir`. Entries without a namespace land in `namespace`.
    pub fn open(dir: &Path, namespace: &str) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::MissingDir {
                path: dir.to_path_buf(),
            });
        }
        let snapshot = load(dir, namespace)?;
        debug!(dir = %dir.display(), entries = snapshot.entries.len(), "config store loaded");
        Ok(Self {
            dir: dir.to_path_buf(),
            namespace: namespace.to_string(),
            snapshot: RwLock::new(Arc::new(snapshot)),
            version: AtomicU64::new(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bumped on every successful reload.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Re-scan the directory and reload it if any file was added, removed or
    /// changed. Returns whether a reload happened. On error the current
    /// snapshot is kept.
    pub fn refresh(&self) -> Result<bool, StoreError> {
        let fingerprint = fingerprint(&self.dir)?;
        if fingerprint == self.snapshot.read().fingerprint {
            return Ok(false);
        }

        let snapshot = load(&self.dir, &self.namespace)?;
        *self.snapshot.write() = Arc::new(snapshot);
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(true)
    }
}

fn is_config_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

fn config_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        // Symlinked directories are not followed; symlinked files are.
        let file_type = entry.file_type().map_err(io_error)?;
        if file_type.is_dir() {
            config_files(&path, out)?;
        } else if is_config_file(&path) && (file_type.is_file() || path.is_file()) {
            out.push(path);
        }
    }
    Ok(())
}

fn fingerprint(dir: &Path) -> Result<Fingerprint, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::MissingDir {
            path: dir.to_path_buf(),
        });
    }
    let mut files = Vec::new();
    config_files(dir, &mut files)?;

    files
        .into_iter()
        .map(|path| {
            let meta = fs::metadata(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            Ok((path, (meta.len(), meta.modified().ok())))
        })
        .collect()
}

fn load(dir: &Path, namespace: &str) -> Result<ConfigSnapshot, StoreError> {
    let fingerprint = fingerprint(dir)?;
    let mut entries = Vec::new();
    for path in fingerprint.keys() {
        entries.extend(parse_file(path, namespace)?);
    }
    entries.sort_by(|a, b| {
        (&a.kind, &a.namespace, &a.name).cmp(&(&b.kind, &b.namespace, &b.name))
    });
    Ok(ConfigSnapshot {
        entries,
        fingerprint,
    })
}

/// Parse every document in `path`.
pub fn parse_file(path: &Path, namespace: &str) -> Result<Vec<ConfigEntry>, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |message: String| StoreError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let documents: Vec<Value> = if path.extension().is_some_and(|e| e == "json") {
        vec![serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?]
    } else {
        serde_yaml::Deserializer::from_str(&text)
            .map(|doc| Value::deserialize(doc).map_err(|e| parse_error(e.to_string())))
            .collect::<Result<_, _>>()?
    };

    documents
        .into_iter()
        .filter(|doc| !doc.is_null())
        .map(|doc| to_entry(doc, path, namespace))
        .collect()
}

fn to_entry(doc: Value, path: &Path, namespace: &str) -> Result<ConfigEntry, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidEntry {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let kind = doc
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing kind"))?;
    let metadata = doc.get("metadata");
    let name = metadata
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing metadata.name"))?;
    let entry_namespace = metadata
        .and_then(|m| m.get("namespace"))
        .and_then(Value::as_str)
        .unwrap_or(namespace);

    Ok(ConfigEntry {
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: entry_namespace.to_string(),
        spec: doc.get("spec").cloned().unwrap_or(Value::Null),
        source: path.to_path_buf(),
    })
}
