//! Profile directory contract and an in-memory implementation.
//!
//! The directory maps user identifiers to display names and carries a version
//! that increases whenever any name changes. Readers never lock: they take an
//! immutable `ProfileSnapshot` and use it for a whole resolution pass. A stale
//! snapshot is safe; it only delays a label update until the next pass.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only lookup used by the mention resolver.
pub trait ProfileLookup {
    /// Display name for `user_id`, or `None` when unknown.
    fn display_name(&self, user_id: &str) -> Option<&str>;
}

impl ProfileLookup for HashMap<String, String> {
    fn display_name(&self, user_id: &str) -> Option<&str> {
        self.get(user_id).map(String::as_str)
    }
}

/// Immutable view of the directory at one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    version: u64,
    names: HashMap<String, String>,
}

impl ProfileSnapshot {
    pub fn new(version: u64, names: HashMap<String, String>) -> Self {
        Self { version, names }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get_display_name(&self, user_id: &str) -> Option<&str> {
        self.names.get(user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ProfileLookup for ProfileSnapshot {
    fn display_name(&self, user_id: &str) -> Option<&str> {
        self.get_display_name(user_id)
    }
}

/// The directory contract consumed by the resolver.
pub trait ProfileDirectory {
    /// The latest published snapshot.
    fn snapshot(&self) -> Arc<ProfileSnapshot>;

    /// The latest published version. Never decreases.
    fn version(&self) -> u64 {
        self.snapshot().version()
    }
}

/// Handle returned by [`SharedProfileDirectory::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type VersionCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, VersionCallback)>,
}

/// Thread-safe in-memory directory.
///
/// Snapshots are published through an `ArcSwap`, so readers are lock-free.
/// Writers are serialised by a mutex and bump the version only when a name
/// actually changes. Subscribers are called with the new version after each
/// publication, outside any lock.
pub struct SharedProfileDirectory {
    current: ArcSwap<ProfileSnapshot>,
    write_lock: Mutex<()>,
    subscribers: Mutex<Subscribers>,
}

impl Default for SharedProfileDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedProfileDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("SharedProfileDirectory")
            .field("version", &snapshot.version())
            .field("entries", &snapshot.len())
            .finish()
    }
}

impl SharedProfileDirectory {
    /// An empty directory at version 0.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(ProfileSnapshot::default()),
            write_lock: Mutex::new(()),
            subscribers: Mutex::new(Subscribers::default()),
        }
    }

    /// Set (or replace) a user's display name.
    ///
    /// Returns the new version, or `None` if the name was already current.
    pub fn set_display_name(
        &self,
        user_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Option<u64> {
        self.apply_updates([(user_id.into(), Some(name.into()))])
    }

    /// Forget a user. Returns the new version, or `None` if the user was unknown.
    pub fn remove(&self, user_id: &str) -> Option<u64> {
        self.apply_updates([(user_id.to_string(), None)])
    }

    /// Apply a batch of updates as one version bump.
    ///
    /// `Some(name)` sets a name, `None` removes the entry. Returns the new
    /// version, or `None` when nothing changed.
    pub fn apply_updates<I>(&self, updates: I) -> Option<u64>
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let published = {
            let _guard = self.write_lock.lock();
            let current = self.current.load_full();
            let mut names = current.names.clone();
            let mut changed = false;

            for (user_id, name) in updates {
                match name {
                    Some(name) => {
                        if names.get(&user_id) != Some(&name) {
                            names.insert(user_id, name);
                            changed = true;
                        }
                    }
                    None => {
                        if names.remove(&user_id).is_some() {
                            changed = true;
                        }
                    }
                }
            }

            if !changed {
                return None;
            }

            let version = current.version + 1;
            self.current
                .store(Arc::new(ProfileSnapshot::new(version, names)));
            log::debug!("Published profile directory version {}", version);
            version
        };

        self.notify(published);
        Some(published)
    }

    /// Register a callback invoked with each newly published version.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.lock();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.callbacks.push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.callbacks.len();
        subscribers.callbacks.retain(|(sub_id, _)| *sub_id != id);
        subscribers.callbacks.len() != before
    }

    fn notify(&self, version: u64) {
        // Clone the callbacks out so a callback may subscribe/unsubscribe.
        let callbacks: Vec<VersionCallback> = self
            .subscribers
            .lock()
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(version);
        }
    }
}

impl ProfileDirectory for SharedProfileDirectory {
    fn snapshot(&self) -> Arc<ProfileSnapshot> {
        self.current.load_full()
    }

    fn version(&self) -> u64 {
        self.current.load().version()
    }
}
