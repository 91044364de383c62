use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fd_lock::RwLock;
use pa_core::ports::{LocalStateError, LocalStatePort};
use tempfile::NamedTempFile;

type Entries = BTreeMap<String, String>;

/// Local state persisted as a flat JSON object in one file.
///
/// The file is re-read on every call so several processes on the same
/// device observe each other's writes, the way browser tabs share
/// `localStorage`. Every read-modify-write holds an exclusive lock on the
/// `<file>.lock` sidecar, and the new content lands through a unique temp
/// file renamed over the old one, so readers never see a partial file.
pub struct FileLocalStateStore {
    path: PathBuf,
}

impl FileLocalStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `apply` on the current entries under the lock; write back only
    /// when it reports a change.
    async fn update<F>(&self, apply: F) -> Result<(), LocalStateError>
    where
        F: FnOnce(&mut Entries) -> bool + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || locked_update(&path, apply))
            .await
            .map_err(|e| LocalStateError::Io(format!("state update task failed: {e}")))?
    }
}

fn state_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn parse_entries(path: &Path, content: &str) -> Result<Entries, LocalStateError> {
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    serde_json::from_str(content).map_err(|e| {
        LocalStateError::Corrupt(format!("{} is not a JSON object: {e}", path.display()))
    })
}

fn load_blocking(path: &Path) -> Result<Entries, LocalStateError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_entries(path, &content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
        Err(e) => Err(LocalStateError::Io(format!("read {} failed: {e}", path.display()))),
    }
}

fn locked_update<F>(path: &Path, apply: F) -> Result<(), LocalStateError>
where
    F: FnOnce(&mut Entries) -> bool,
{
    let dir = state_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| {
        LocalStateError::Io(format!("create state dir {} failed: {e}", dir.display()))
    })?;

    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(path))
        .map_err(|e| LocalStateError::Io(format!("open state lock failed: {e}")))?;
    let mut lock = RwLock::new(lock_file);
    let _guard = lock
        .write()
        .map_err(|e| LocalStateError::Io(format!("lock {} failed: {e}", path.display())))?;

    let mut entries = load_blocking(path)?;
    if !apply(&mut entries) {
        return Ok(());
    }

    let content = serde_json::to_string_pretty(&entries)
        .map_err(|e| LocalStateError::Corrupt(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(&dir)
        .map_err(|e| LocalStateError::Io(format!("create temp file in {} failed: {e}", dir.display())))?;
    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| LocalStateError::Io(format!("write {} failed: {e}", tmp.path().display())))?;
    tmp.persist(path).map_err(|e| {
        LocalStateError::Io(format!("replace {} failed: {}", path.display(), e.error))
    })?;
    Ok(())
}

#[async_trait]
impl LocalStatePort for FileLocalStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStateError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LocalStateError::Io(format!(
                    "read {} failed: {e}",
                    self.path.display()
                )))
            }
        };
        Ok(parse_entries(&self.path, &content)?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStateError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |entries| {
            entries.insert(key, value);
            true
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStateError> {
        let key = key.to_string();
        self.update(move |entries| entries.remove(&key).is_some())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileLocalStateStore::new(dir.path().join("state.json"));
        assert_eq!(store.get("userCode").await.unwrap(), None);
        store.remove("userCode").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let writer = FileLocalStateStore::new(&path);
        writer.set("userCode", "ABC-234-XYZ").await.unwrap();
        writer.set("currentLobby", "lobby-1-abc").await.unwrap();
        writer.remove("currentLobby").await.unwrap();

        let reader = FileLocalStateStore::new(&path);
        assert_eq!(reader.get("userCode").await.unwrap().as_deref(), Some("ABC-234-XYZ"));
        assert_eq!(reader.get("currentLobby").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileLocalStateStore::new(&path);
        let err = store.get("userCode").await.unwrap_err();
        assert!(matches!(err, LocalStateError::Corrupt(_)));
        let err = store.set("userCode", "ABC-234-XYZ").await.unwrap_err();
        assert!(matches!(err, LocalStateError::Corrupt(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_one_file_keep_every_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let handles = [
            Arc::new(FileLocalStateStore::new(&path)),
            Arc::new(FileLocalStateStore::new(&path)),
        ];

        let mut writes = Vec::new();
        for (h, store) in handles.iter().enumerate() {
            for i in 0..50 {
                let store = store.clone();
                writes.push(tokio::spawn(async move {
                    store.set(&format!("key-{h}-{i}"), &i.to_string()).await
                }));
            }
        }
        for write in writes {
            write.await.unwrap().unwrap();
        }

        let reader = FileLocalStateStore::new(&path);
        for h in 0..2 {
            for i in 0..50 {
                assert_eq!(
                    reader.get(&format!("key-{h}-{i}")).await.unwrap(),
                    Some(i.to_string()),
                    "key-{h}-{i} lost"
                );
            }
        }
    }
}
