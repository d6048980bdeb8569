use crate::storage::StateStorage;
use backoffice_error::StateError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// State held by a [`Store`].
///
/// Only the `Persisted` projection is written to storage. Everything else
/// (loading flags, last error) resets to its default on restore.
pub trait StoreState: Default + Clone + Send + 'static {
    type Persisted: Serialize + DeserializeOwned;

    /// Storage key, one per domain
    const KEY: &'static str;

    /// Stores that return `false` stay at their defaults until
    /// [`Store::rehydrate`] is called explicitly.
    const AUTO_REHYDRATE: bool = true;

    fn persisted(&self) -> Self::Persisted;

    fn restore(persisted: Self::Persisted) -> Self;

    fn set_loading(&mut self, _loading: bool) {}

    fn set_error(&mut self, _error: Option<String>) {}
}

/// Issued by [`Store::begin_fetch`]. Only the most recent ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

struct StoreInner<S> {
    state: S,
    latest_fetch: u64,
    hydrated: bool,
}

/// A named, persisted state container for one console domain.
///
/// Stores never talk to the network. Pages fetch through the api client and
/// write the result back with [`Store::commit`] or [`Store::update`].
pub struct Store<S: StoreState> {
    storage: Arc<dyn StateStorage>,
    inner: Mutex<StoreInner<S>>,
}

impl<S: StoreState> Store<S> {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        let store = Self {
            storage,
            inner: Mutex::new(StoreInner {
                state: S::default(),
                latest_fetch: 0,
                hydrated: false,
            }),
        };

        if S::AUTO_REHYDRATE {
            if let Err(e) = store.rehydrate() {
                warn!(store = S::KEY, "Failed to rehydrate store: {}", e);
            }
        }

        store
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner<S>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, state: &S) -> Result<(), StateError> {
        let contents = serde_json::to_string(&state.persisted())
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        self.storage.save(S::KEY, &contents)
    }

    pub fn key(&self) -> &'static str {
        S::KEY
    }

    pub fn is_hydrated(&self) -> bool {
        self.lock().hydrated
    }

    pub fn snapshot(&self) -> S {
        self.lock().state.clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().state)
    }

    /// Load the persisted fields, resetting everything else to defaults.
    /// Returns whether a persisted entry was found. An unreadable entry is
    /// logged and the store falls back to defaults.
    pub fn rehydrate(&self) -> Result<bool, StateError> {
        let contents = self.storage.load(S::KEY)?;
        let mut inner = self.lock();
        inner.hydrated = true;

        let Some(contents) = contents else {
            inner.state = S::default();
            return Ok(false);
        };

        match serde_json::from_str::<S::Persisted>(&contents) {
            Ok(persisted) => {
                inner.state = S::restore(persisted);
                debug!(store = S::KEY, "Rehydrated store");
                Ok(true)
            }
            Err(e) => {
                warn!(store = S::KEY, "Discarding unreadable persisted state: {}", e);
                inner.state = S::default();
                Ok(false)
            }
        }
    }

    /// Mutate the state and persist it. The change is only kept once the
    /// write succeeds
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, StateError> {
        let mut inner = self.lock();
        let mut next = inner.state.clone();
        let result = f(&mut next);
        self.persist(&next)?;
        inner.state = next;
        Ok(result)
    }

    /// Mark a fetch as started. Any ticket handed out earlier becomes stale
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut inner = self.lock();
        inner.latest_fetch += 1;
        inner.state.set_loading(true);
        FetchTicket(inner.latest_fetch)
    }

    fn is_current(inner: &StoreInner<S>, ticket: FetchTicket, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            debug!(store = S::KEY, "Dropping result of a cancelled fetch");
            return false;
        }
        if ticket.0 != inner.latest_fetch {
            debug!(store = S::KEY, "Dropping result of a superseded fetch");
            return false;
        }
        true
    }

    /// Apply the result of a fetch started with `ticket`.
    ///
    /// Returns `None` without touching the state when a newer fetch has been
    /// started since, or when `cancel` fired.
    pub fn commit<R>(
        &self,
        ticket: FetchTicket,
        cancel: &CancellationToken,
        f: impl FnOnce(&mut S) -> R,
    ) -> Result<Option<R>, StateError> {
        let mut inner = self.lock();
        if !Self::is_current(&inner, ticket, cancel) {
            return Ok(None);
        }

        let mut next = inner.state.clone();
        let result = f(&mut next);
        next.set_loading(false);
        next.set_error(None);
        self.persist(&next)?;
        inner.state = next;
        Ok(Some(result))
    }

    /// Record a failed fetch. Stale or cancelled tickets are ignored
    pub fn fail(&self, ticket: FetchTicket, cancel: &CancellationToken, error: &str) -> bool {
        let mut inner = self.lock();
        if !Self::is_current(&inner, ticket, cancel) {
            return false;
        }

        inner.state.set_loading(false);
        inner.state.set_error(Some(error.to_string()));
        true
    }

    /// Reset to defaults and drop the persisted entry
    pub fn clear(&self) -> Result<(), StateError> {
        let mut inner = self.lock();
        inner.state = S::default();
        self.storage.remove(S::KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        count: u32,
        loading: bool,
        error: Option<String>,
    }

    #[derive(Serialize, Deserialize)]
    struct PersistedCounter {
        count: u32,
    }

    impl StoreState for Counter {
        type Persisted = PersistedCounter;
        const KEY: &'static str = "counter";

        fn persisted(&self) -> PersistedCounter {
            PersistedCounter { count: self.count }
        }

        fn restore(persisted: PersistedCounter) -> Self {
            Counter {
                count: persisted.count,
                ..Default::default()
            }
        }

        fn set_loading(&mut self, loading: bool) {
            self.loading = loading;
        }

        fn set_error(&mut self, error: Option<String>) {
            self.error = error;
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Manual {
        value: String,
    }

    impl StoreState for Manual {
        type Persisted = String;
        const KEY: &'static str = "manual";
        const AUTO_REHYDRATE: bool = false;

        fn persisted(&self) -> String {
            self.value.clone()
        }

        fn restore(persisted: String) -> Self {
            Manual { value: persisted }
        }
    }

    #[test]
    fn test_update_persists_and_restores() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());

        let store = Store::<Counter>::new(storage.clone());
        assert!(store.is_hydrated());
        store.update(|s| s.count = 7).unwrap();
        store.begin_fetch();
        assert!(store.snapshot().loading);

        let reloaded = Store::<Counter>::new(storage);
        assert_eq!(
            reloaded.snapshot(),
            Counter {
                count: 7,
                loading: false,
                error: None
            }
        );
    }

    #[test]
    fn test_manual_rehydration() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());
        storage.save("manual", r#""weekly""#).unwrap();

        let store = Store::<Manual>::new(storage);
        assert!(!store.is_hydrated());
        assert_eq!(store.read(|s| s.value.clone()), "");

        assert!(store.rehydrate().unwrap());
        assert_eq!(store.read(|s| s.value.clone()), "weekly");
    }

    #[test]
    fn test_superseded_fetch_is_dropped() {
        let store = Store::<Counter>::new(Arc::new(MemoryStorage::new()));
        let cancel = CancellationToken::new();

        let first = store.begin_fetch();
        let second = store.begin_fetch();

        assert_eq!(store.commit(second, &cancel, |s| s.count = 2).unwrap(), Some(()));
        // the slower, older response resolves last
        assert_eq!(store.commit(first, &cancel, |s| s.count = 1).unwrap(), None);
        assert_eq!(store.read(|s| s.count), 2);
        assert!(!store.read(|s| s.loading));
    }

    #[test]
    fn test_cancelled_fetch_is_dropped() {
        let store = Store::<Counter>::new(Arc::new(MemoryStorage::new()));
        let cancel = CancellationToken::new();

        let ticket = store.begin_fetch();
        cancel.cancel();

        assert_eq!(store.commit(ticket, &cancel, |s| s.count = 9).unwrap(), None);
        assert!(!store.fail(ticket, &cancel, "gone"));
        assert_eq!(store.read(|s| s.count), 0);
    }

    #[test]
    fn test_fail_records_error() {
        let store = Store::<Counter>::new(Arc::new(MemoryStorage::new()));
        let cancel = CancellationToken::new();

        let ticket = store.begin_fetch();
        assert!(store.fail(ticket, &cancel, "request failed"));

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("request failed"));

        let ticket = store.begin_fetch();
        store.commit(ticket, &cancel, |s| s.count = 1).unwrap();
        assert_eq!(store.snapshot().error, None);
    }

    #[test]
    fn test_unreadable_entry_falls_back_to_default() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());
        storage.save("counter", "{not json").unwrap();

        let store = Store::<Counter>::new(storage.clone());
        assert_eq!(store.snapshot(), Counter::default());
        assert!(!store.rehydrate().unwrap());
    }

    struct ReadOnlyStorage;

    impl StateStorage for ReadOnlyStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StateError> {
            Ok(None)
        }

        fn save(&self, key: &str, _contents: &str) -> Result<(), StateError> {
            Err(StateError::Io(format!("Failed to write state for {}", key)))
        }

        fn remove(&self, _key: &str) -> Result<(), StateError> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let store = Store::<Counter>::new(Arc::new(ReadOnlyStorage));
        let cancel = CancellationToken::new();

        assert!(store.update(|s| s.count = 4).is_err());
        assert_eq!(store.read(|s| s.count), 0);

        let ticket = store.begin_fetch();
        assert!(store.commit(ticket, &cancel, |s| s.count = 5).is_err());
        assert_eq!(store.read(|s| s.count), 0);
    }

    #[test]
    fn test_clear() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());
        let store = Store::<Counter>::new(storage.clone());
        store.update(|s| s.count = 3).unwrap();

        store.clear().unwrap();
        assert_eq!(store.read(|s| s.count), 0);
        assert_eq!(storage.load("counter").unwrap(), None);
    }
}
