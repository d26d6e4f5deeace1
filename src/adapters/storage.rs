use crate::domain::ports::SelectionStore;
use crate::utils::error::{Result, TechVaultError};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 以 JSON 物件檔案保存的 key-value 儲存，行程重啟後仍存在
#[derive(Debug)]
pub struct FileSelectionStore {
    path: PathBuf,
    // 同一行程內的讀-改-寫需串行化
    lock: Mutex<()>,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        serde_json::from_slice(&data).map_err(|e| TechVaultError::StoreError {
            message: format!("corrupt store file {}: {}", self.path.display(), e),
        })
    }

    /// 寫入前讀取；無法解析的檔案視為空並於寫入時覆蓋。回傳值第二項表示檔案已損毀
    fn entries_for_write(&self) -> Result<(BTreeMap<String, String>, bool)> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(TechVaultError::StoreError { message }) => {
                tracing::warn!("{}, starting from an empty store", message);
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // 先寫暫存檔再 rename，避免半寫入的檔案
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(entries)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| TechVaultError::StoreError {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl SelectionStore for FileSelectionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.locked()?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.locked()?;
        let (mut entries, _) = self.entries_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.locked()?;
        let (mut entries, corrupt) = self.entries_for_write()?;
        if entries.remove(key).is_none() && !corrupt {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

/// 行程內的儲存，用於測試與嵌入
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| TechVaultError::StoreError {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SELECTED_ORG_KEY;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("selection.json");

        let store = FileSelectionStore::new(&path);
        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap(), None);
        store.set(SELECTED_ORG_KEY, "7").unwrap();
        drop(store);

        let reopened = FileSelectionStore::new(&path);
        assert_eq!(reopened.get(SELECTED_ORG_KEY).unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn test_file_store_remove_keeps_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSelectionStore::new(temp_dir.path().join("selection.json"));

        store.set(SELECTED_ORG_KEY, "7").unwrap();
        store.set("theme", "dark").unwrap();
        store.remove(SELECTED_ORG_KEY).unwrap();
        // 移除不存在的鍵不算錯誤
        store.remove(SELECTED_ORG_KEY).unwrap();

        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap(), None);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_reports_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("selection.json");
        fs::write(&path, b"{not json").unwrap();

        let store = FileSelectionStore::new(&path);
        let err = store.get(SELECTED_ORG_KEY).unwrap_err();
        assert!(matches!(err, TechVaultError::StoreError { .. }));
    }

    #[test]
    fn test_file_store_set_replaces_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("selection.json");
        fs::write(&path, b"{not json").unwrap();

        let store = FileSelectionStore::new(&path);
        store.set(SELECTED_ORG_KEY, "9").unwrap();
        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap().as_deref(), Some("9"));

        let on_disk: BTreeMap<String, String> =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 1);
    }

    #[test]
    fn test_file_store_remove_resets_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("selection.json");
        fs::write(&path, b"[1, 2").unwrap();

        let store = FileSelectionStore::new(&path);
        store.remove(SELECTED_ORG_KEY).unwrap();
        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemorySelectionStore::with_entry(SELECTED_ORG_KEY, "3");
        store.set(SELECTED_ORG_KEY, "9").unwrap();
        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap().as_deref(), Some("9"));
        store.remove(SELECTED_ORG_KEY).unwrap();
        assert_eq!(store.get(SELECTED_ORG_KEY).unwrap(), None);
    }
}
