//src/theme.rs
use crate::store::{keys, RecordStore};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

pub const DARK: &str = "dark";
pub const LIGHT: &str = "light";

/// Side effect run on every theme change (e.g. restyling the root view).
pub type ThemeObserver = Arc<dyn Fn(bool) + Send + Sync>;

pub struct ThemeContainer {
    store: RecordStore,
    dark_mode: watch::Sender<bool>,
    observers: Mutex<Vec<ThemeObserver>>,
}

impl ThemeContainer {
    /// A stored "dark"/"light" wins; otherwise `system_prefers_dark` decides.
    pub fn new(store: RecordStore, system_prefers_dark: bool) -> Self {
        let saved = store.load_raw(keys::THEME);
        let dark = match saved.as_deref() {
            Some(value) => value == DARK,
            None => system_prefers_dark,
        };
        let (dark_mode, _) = watch::channel(dark);
        let container = Self {
            store,
            dark_mode,
            observers: Mutex::new(Vec::new()),
        };
        container.persist(dark);
        container
    }

    pub fn dark_mode(&self) -> bool {
        *self.dark_mode.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.dark_mode.subscribe()
    }

    /// Registers `observer` and runs it once with the current value.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let observer: ThemeObserver = Arc::new(observer);
        observer(self.dark_mode());
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Flips the preference and returns the new value.
    pub fn toggle_dark_mode(&self) -> bool {
        let dark = !self.dark_mode();
        self.set_dark_mode(dark);
        dark
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.dark_mode.send_replace(dark);
        self.persist(dark);
        // Clone the list so an observer may register another one
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer(dark);
        }
    }

    fn persist(&self, dark: bool) {
        let value = if dark { DARK } else { LIGHT };
        if let Err(e) = self.store.save_raw(keys::THEME, value) {
            tracing::error!(error = %e, "Error saving theme preference");
        }
    }
}
