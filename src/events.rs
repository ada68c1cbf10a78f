use anyhow::{bail, Result};
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    SceneOpened,
    SceneClosed,
    SceneSaved,
    SceneCreated,
    HierarchyChanged,
    SelectionChanged,
    PlayModeChanged,
    ScriptsReloaded,
}

impl ActivityKind {
    pub fn is_write(self) -> bool {
        self == ActivityKind::SceneSaved
    }
}

impl FromStr for ActivityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        use ActivityKind::*;

        Ok(match s {
            "scene-opened" => SceneOpened,
            "scene-closed" => SceneClosed,
            "scene-saved" => SceneSaved,
            "scene-created" => SceneCreated,
            "hierarchy-changed" => HierarchyChanged,
            "selection-changed" => SelectionChanged,
            "play-mode-changed" => PlayModeChanged,
            "scripts-reloaded" => ScriptsReloaded,
            _ => bail!("unknown activity \"{}\"", s),
        })
    }
}

/// An editor notification together with the path of the active scene, if
/// it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub entity: Option<String>,
}

impl Activity {
    pub fn new(kind: ActivityKind, entity: Option<impl Into<String>>) -> Self {
        Activity {
            kind,
            entity: entity.map(Into::into),
        }
    }
}

pub type Callback = Arc<dyn Fn(&Activity) + Send + Sync>;

/// Something that fires editor activity.
///
/// Subscribing twice under the same key replaces the earlier callback, and
/// unsubscribing an unknown key does nothing.
pub trait EventSource {
    fn on_activity(&self, key: &str, callback: Callback);

    /// Returns whether a callback was registered under `key`.
    fn off_activity(&self, key: &str) -> bool;
}

#[derive(Default)]
pub struct ActivityHub {
    listeners: Mutex<Vec<(String, Callback)>>,
}

impl ActivityHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, activity: &Activity) {
        let listeners: Vec<Callback> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for cb in listeners {
            cb(activity);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSource for ActivityHub {
    fn on_activity(&self, key: &str, callback: Callback) {
        let mut listeners = self.listeners.lock();

        match listeners.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = callback,
            None => listeners.push((key.to_owned(), callback)),
        }
    }

    fn off_activity(&self, key: &str) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(k, _)| k != key);
        listeners.len() != before
    }
}
