use std::collections::BTreeMap;

use crate::track::*;

/// A local store kept in a small JSON file. Every change is written through.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store. A missing file is an empty store.
    pub fn open(path: &Path) -> TrackResult<FileStore> {
        let display = path.display().to_string();
        let values = if path.exists() {
            let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
                path: display.clone(),
            })?;
            serde_json::from_str(&contents).context(ParsingJsonSnafu { path: display })?
        } else {
            debug!("open: no store at {:?}, starting empty", path);
            BTreeMap::new()
        };
        Ok(FileStore {
            path: path.to_path_buf(),
            values,
        })
    }

    fn flush(&self) -> Result<(), ServiceError> {
        let contents = serde_json::to_string_pretty(&self.values)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| ServiceError::Storage(e.to_string()))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), ServiceError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), ServiceError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
