use std::collections::HashMap;
use std::sync::Mutex;

/// Which of the page's two key-value stores a key lives in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StorageArea {
    /// Persistent page storage (`localStorage`).
    Local,
    /// Per-tab page storage (`sessionStorage`).
    Session,
}

impl StorageArea {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageArea::Local => "localStorage",
            StorageArea::Session => "sessionStorage",
        }
    }
}

/// Synchronous view over one of the embedded page's web storage areas.
///
/// Embedders back this with whatever reaches into the page (an evaluated
/// script result cache, a devtools protocol session, etc.). Reads must not
/// fail: an unreadable key is reported as absent.
pub trait PageStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryPageStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryPageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = items
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageStorage for MemoryPageStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap().remove(key);
    }
}
