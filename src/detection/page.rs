use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::detection::storage::{MemoryPageStorage, PageStorage, StorageArea};

const EVENT_CAPACITY: usize = 64;

/// Something observable happened inside the embedded page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEvent {
    /// The document body subtree changed.
    Mutation,
    KeyDown { key: String },
    Click,
    /// An input element received focus.
    Focus {
        input_type: String,
        name: Option<String>,
    },
}

impl PageEvent {
    pub fn key_down(key: impl Into<String>) -> Self {
        PageEvent::KeyDown { key: key.into() }
    }

    pub fn focus(input_type: impl Into<String>) -> Self {
        PageEvent::Focus {
            input_type: input_type.into(),
            name: None,
        }
    }
}

/// Handle on the embedded page: its two storage areas, its event stream and
/// its current location. Clones share the same page.
#[derive(Clone)]
pub struct PageContext {
    local: Arc<dyn PageStorage>,
    session: Arc<dyn PageStorage>,
    events: broadcast::Sender<PageEvent>,
    location: Arc<watch::Sender<String>>,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("location", &*self.location.borrow())
            .finish()
    }
}

impl PageContext {
    pub fn new(
        local: Arc<dyn PageStorage>,
        session: Arc<dyn PageStorage>,
        location: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (location, _) = watch::channel(location.into());
        Self {
            local,
            session,
            events,
            location: Arc::new(location),
        }
    }

    /// A page backed by empty in-memory storage.
    pub fn in_memory(location: impl Into<String>) -> Self {
        Self::new(
            Arc::new(MemoryPageStorage::new()),
            Arc::new(MemoryPageStorage::new()),
            location,
        )
    }

    pub fn storage(&self, area: StorageArea) -> &dyn PageStorage {
        match area {
            StorageArea::Local => self.local.as_ref(),
            StorageArea::Session => self.session.as_ref(),
        }
    }

    pub fn local_storage(&self) -> &dyn PageStorage {
        self.storage(StorageArea::Local)
    }

    pub fn session_storage(&self) -> &dyn PageStorage {
        self.storage(StorageArea::Session)
    }

    /// Publishes an event to every armed listener. Events published while
    /// nothing listens are dropped.
    pub fn emit(&self, event: PageEvent) {
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    pub fn navigate(&self, url: impl Into<String>) {
        self.location.send_replace(url.into());
    }
}
