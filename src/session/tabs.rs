//! Editor tab manager.
//!
//! Each open tab is either `Clean` (content equals the last loaded or saved snapshot)
//! or `Dirty`. Opening an already-open file only moves focus; closing the focused tab
//! moves focus to the first remaining tab in list order.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::channel::{OpenFileChannel, OpenFileEvent, SubscriptionId};

/// Id of the tab every session starts with.
pub const WELCOME_TAB_ID: &str = "welcome";

const SCRATCH_PREFIX: &str = "untitled-";

const WELCOME_CONTENT: &str = "# Welcome to Workbench

## Getting Started

1. Create a new project from the Explorer panel
2. Add files and folders to your project
3. Open a file to edit it in a tab
4. Use the integrated terminal for commands
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TabState {
    Clean,
    Dirty,
}

/// What a tab's buffer is backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TabSource {
    /// A stored file node; the tab id is the file id
    File,
    /// An unsaved buffer with a synthetic `untitled-N` id
    Scratch,
    Welcome,
}

/// One open editor buffer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorTab {
    pub id: String,
    pub name: String,
    pub content: String,
    pub language: String,
    pub state: TabState,
    pub source: TabSource,
    #[serde(skip)]
    snapshot: String,
}

impl EditorTab {
    fn new(id: String, name: String, content: String, language: String, source: TabSource) -> Self {
        Self {
            id,
            name,
            snapshot: content.clone(),
            content,
            language,
            state: TabState::Clean,
            source,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state == TabState::Dirty
    }

    /// Content as of the last load or save.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

/// Ordered set of open tabs plus the focused one.
#[derive(Debug, Default)]
pub struct TabManager {
    tabs: Vec<EditorTab>,
    active: Option<String>,
    next_scratch: u32,
}

impl TabManager {
    /// A session with no tabs open.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that starts on the welcome tab.
    pub fn with_welcome() -> Self {
        let mut manager = Self::new();
        manager.tabs.push(EditorTab::new(
            WELCOME_TAB_ID.to_string(),
            "Welcome".to_string(),
            WELCOME_CONTENT.to_string(),
            "markdown".to_string(),
            TabSource::Welcome,
        ));
        manager.active = Some(WELCOME_TAB_ID.to_string());
        manager
    }

    /// Open a file, or focus it if it is already open. Returns whether a tab was created.
    pub fn open(&mut self, event: &OpenFileEvent) -> bool {
        let created = if self.position(&event.file_id).is_some() {
            false
        } else {
            self.tabs.push(EditorTab::new(
                event.file_id.clone(),
                event.name.clone(),
                event.content.clone(),
                event.language.clone().unwrap_or_else(|| "plaintext".to_string()),
                TabSource::File,
            ));
            true
        };
        self.active = Some(event.file_id.clone());
        created
    }

    /// Open an empty unsaved buffer and return its synthetic id.
    pub fn new_scratch(&mut self) -> String {
        self.next_scratch += 1;
        let id = format!("{}{}", SCRATCH_PREFIX, self.next_scratch);
        self.tabs.push(EditorTab::new(
            id.clone(),
            format!("Untitled-{}", self.next_scratch),
            String::new(),
            "plaintext".to_string(),
            TabSource::Scratch,
        ));
        self.active = Some(id.clone());
        id
    }

    /// Replace a tab's in-memory content. Any edit marks the tab dirty.
    pub fn edit(&mut self, id: &str, content: impl Into<String>) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        tab.content = content.into();
        tab.state = TabState::Dirty;
        true
    }

    /// Content that should be written through `updateContent`, if the tab is a dirty file.
    pub fn pending_save(&self, id: &str) -> Option<&str> {
        self.tab(id)
            .filter(|tab| tab.source == TabSource::File && tab.is_dirty())
            .map(|tab| tab.content.as_str())
    }

    /// Record a successful save of `content`.
    ///
    /// If the buffer was edited again while the save was in flight it stays dirty.
    pub fn mark_saved(&mut self, id: &str, content: &str) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        tab.snapshot = content.to_string();
        if tab.content == content {
            tab.state = TabState::Clean;
        }
        true
    }

    /// Close a tab, returning it. Focus moves to the first remaining tab if the closed
    /// one was focused.
    pub fn close(&mut self, id: &str) -> Option<EditorTab> {
        let index = self.position(id)?;
        let closed = self.tabs.remove(index);

        if self.active.as_deref() == Some(id) {
            self.active = self.tabs.first().map(|tab| tab.id.clone());
        }
        Some(closed)
    }

    /// Focus an open tab.
    pub fn focus(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    pub fn active(&self) -> Option<&EditorTab> {
        self.active.as_deref().and_then(|id| self.tab(id))
    }

    pub fn tabs(&self) -> &[EditorTab] {
        &self.tabs
    }

    pub fn tab(&self, id: &str) -> Option<&EditorTab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn dirty_tabs(&self) -> impl Iterator<Item = &EditorTab> {
        self.tabs.iter().filter(|tab| tab.is_dirty())
    }

    /// Subscribe a shared manager to an open-file channel.
    pub fn attach(manager: &Arc<Mutex<TabManager>>, channel: &OpenFileChannel) -> SubscriptionId {
        let manager = Arc::clone(manager);
        channel.subscribe(move |event| {
            manager
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .open(event);
        })
    }

    fn tab_mut(&mut self, id: &str) -> Option<&mut EditorTab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }
}
