use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bosun_core::{MemoryDocument, Task};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

pub const MEMORY_FILE: &str = "memory.json";
pub const TASKS_FILE: &str = "tasks.json";
pub const CONTACTS_FILE: &str = "contacts.json";

pub type ContactBook = BTreeMap<String, String>;

pub trait MemoryRepository: Send + Sync {
    fn load_memory(&self) -> Result<MemoryDocument>;
    fn save_memory(&self, memory: &MemoryDocument) -> Result<()>;
}

pub trait TaskRepository: Send + Sync {
    fn load_tasks(&self) -> Result<Vec<Task>>;
    fn save_tasks(&self, tasks: &[Task]) -> Result<()>;
}

pub trait ContactsRepository: Send + Sync {
    fn load_contacts(&self) -> Result<ContactBook>;
}

/// Process-local store, used by tests and by sessions that do not want
/// anything written to disk.
#[derive(Default)]
pub struct MemoryStore {
    memory: Arc<RwLock<MemoryDocument>>,
    tasks: Arc<RwLock<Vec<Task>>>,
    contacts: Arc<RwLock<ContactBook>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contacts(contacts: ContactBook) -> Self {
        let store = Self::default();
        *store.contacts.write() = contacts;
        store
    }
}

impl MemoryRepository for MemoryStore {
    fn load_memory(&self) -> Result<MemoryDocument> {
        Ok(self.memory.read().clone())
    }

    fn save_memory(&self, memory: &MemoryDocument) -> Result<()> {
        *self.memory.write() = memory.clone();
        Ok(())
    }
}

impl TaskRepository for MemoryStore {
    fn load_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.read().clone())
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        *self.tasks.write() = tasks.to_vec();
        Ok(())
    }
}

impl ContactsRepository for MemoryStore {
    fn load_contacts(&self) -> Result<ContactBook> {
        Ok(self.contacts.read().clone())
    }
}

/// Whole-document JSON persistence at fixed paths under one directory. Every
/// save rewrites the full document; a missing or corrupt file always reads as
/// the empty default, never as an error.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed creating storage dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return T::default(),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(file = %path.display(), %error, "corrupt document, using empty default");
                T::default()
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(&path, raw).with_context(|| format!("failed writing {}", path.display()))
    }
}

impl MemoryRepository for JsonFileStore {
    fn load_memory(&self) -> Result<MemoryDocument> {
        Ok(self.load_or_default(MEMORY_FILE))
    }

    fn save_memory(&self, memory: &MemoryDocument) -> Result<()> {
        self.save(MEMORY_FILE, memory)
    }
}

impl TaskRepository for JsonFileStore {
    fn load_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.load_or_default(TASKS_FILE))
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.save(TASKS_FILE, tasks)
    }
}

impl ContactsRepository for JsonFileStore {
    fn load_contacts(&self) -> Result<ContactBook> {
        Ok(self.load_or_default(CONTACTS_FILE))
    }
}

/// Backend selector, mirrored by every repository trait.
pub enum Store {
    Memory(MemoryStore),
    Json(JsonFileStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub fn json_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::Json(JsonFileStore::open(dir)?))
    }
}

impl MemoryRepository for Store {
    fn load_memory(&self) -> Result<MemoryDocument> {
        match self {
            Store::Memory(store) => store.load_memory(),
            Store::Json(store) => store.load_memory(),
        }
    }

    fn save_memory(&self, memory: &MemoryDocument) -> Result<()> {
        match self {
            Store::Memory(store) => store.save_memory(memory),
            Store::Json(store) => store.save_memory(memory),
        }
    }
}

impl TaskRepository for Store {
    fn load_tasks(&self) -> Result<Vec<Task>> {
        match self {
            Store::Memory(store) => store.load_tasks(),
            Store::Json(store) => store.load_tasks(),
        }
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        match self {
            Store::Memory(store) => store.save_tasks(tasks),
            Store::Json(store) => store.save_tasks(tasks),
        }
    }
}

impl ContactsRepository for Store {
    fn load_contacts(&self) -> Result<ContactBook> {
        match self {
            Store::Memory(store) => store.load_contacts(),
            Store::Json(store) => store.load_contacts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bosun_core::Role;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "bosun-storage-test-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ))
    }

    #[test]
    fn missing_files_read_as_defaults() {
        let store = JsonFileStore::open(scratch_dir()).unwrap();
        assert!(store.load_memory().unwrap().facts.is_empty());
        assert!(store.load_tasks().unwrap().is_empty());
        assert!(store.load_contacts().unwrap().is_empty());
    }

    #[test]
    fn corrupt_document_reads_as_default() {
        let dir = scratch_dir();
        let store = JsonFileStore::open(&dir).unwrap();
        fs::write(dir.join(MEMORY_FILE), "{not json").unwrap();
        assert!(store.load_memory().unwrap().facts.is_empty());
    }

    #[test]
    fn memory_round_trip() {
        let store = JsonFileStore::open(scratch_dir()).unwrap();

        let mut memory = MemoryDocument::default();
        memory.facts.insert("color".to_string(), "blue".to_string());
        memory.push_turn(Role::User, "what is color");
        store.save_memory(&memory).unwrap();

        let loaded = store.load_memory().unwrap();
        assert_eq!(loaded.facts.get("color").map(String::as_str), Some("blue"));
        assert_eq!(loaded.conversations.len(), 1);
    }

    #[test]
    fn tasks_round_trip() {
        let store = JsonFileStore::open(scratch_dir()).unwrap();
        store
            .save_tasks(&[Task {
                id: 1700000000000,
                text: "buy milk".to_string(),
                done: false,
            }])
            .unwrap();

        let tasks = store.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "buy milk");
        assert!(!tasks[0].done);
    }
}
