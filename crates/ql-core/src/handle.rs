//! Shared references to market objects (translates `ql/handle.hpp`).
//!
//! | C++ | Rust |
//! |-----|------|
//! | `Handle<T>` | [`Handle<T>`] — an `Arc`, optionally null, never relinked |
//! | `RelinkableHandle<T>` | [`RelinkableHandle<T>`] — a versioned snapshot cell |
//!
//! A [`RelinkableHandle`] holds the *current snapshot* of an object.  Linking
//! publishes a new `Arc` atomically and bumps the handle's version; readers
//! that already cloned the previous snapshot keep using it unchanged.  There
//! is no observer list: dependants compare versions instead.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A shared, optionally-null reference to a value of type `T`.
pub struct Handle<T: ?Sized> {
    inner: Option<Arc<T>>,
}

impl<T> Handle<T> {
    /// Create a non-null handle wrapping `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Some(Arc::new(value)),
        }
    }
}

impl<T: ?Sized> Handle<T> {
    /// Create a handle from an existing `Arc`.
    pub fn from_arc(arc: Arc<T>) -> Self {
        Self { inner: Some(arc) }
    }

    /// Create a null (empty) handle.
    pub fn null() -> Self {
        Self { inner: None }
    }

    /// `true` if the handle contains no value.
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// The inner `Arc<T>`, or `None` if this handle is null.
    pub fn as_arc(&self) -> Option<&Arc<T>> {
        self.inner.as_ref()
    }

    /// Borrow the contained value.
    pub fn get(&self) -> Option<&T> {
        self.inner.as_deref()
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> Default for Handle<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> From<Arc<T>> for Handle<T> {
    fn from(arc: Arc<T>) -> Self {
        Self::from_arc(arc)
    }
}

impl<T: ?Sized> From<Option<Arc<T>>> for Handle<T> {
    fn from(inner: Option<Arc<T>>) -> Self {
        Self { inner }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(v) => write!(f, "Handle({v:?})"),
            None => write!(f, "Handle(null)"),
        }
    }
}

struct Slot<T: ?Sized> {
    current: RwLock<Option<Arc<T>>>,
    version: AtomicU64,
}

/// A versioned cell holding the current snapshot of a value.
///
/// Clones share the same cell.  Every [`link_to`](Self::link_to) swaps the
/// snapshot under a short write lock and increments the version, so a reader
/// always observes either the old or the new snapshot, never a mixture.
pub struct RelinkableHandle<T: ?Sized> {
    slot: Arc<Slot<T>>,
}

impl<T: ?Sized> RelinkableHandle<T> {
    /// A new, null handle at version 0.
    pub fn null() -> Self {
        Self {
            slot: Arc::new(Slot {
                current: RwLock::new(None),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// A new handle linked to `arc` at version 1.
    pub fn from_arc(arc: Arc<T>) -> Self {
        let handle = Self::null();
        handle.link_to(arc);
        handle
    }

    /// Publish a new snapshot and return the new version.
    pub fn link_to(&self, arc: Arc<T>) -> u64 {
        let mut guard = self.slot.current.write();
        *guard = Some(arc);
        self.slot.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drop the current snapshot and return the new version.
    pub fn unlink(&self) -> u64 {
        let mut guard = self.slot.current.write();
        *guard = None;
        self.slot.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// `true` if no snapshot is currently linked.
    pub fn is_empty(&self) -> bool {
        self.slot.current.read().is_none()
    }

    /// The current snapshot, if any.
    pub fn current(&self) -> Option<Arc<T>> {
        self.slot.current.read().clone()
    }

    /// The current snapshot wrapped in a read-only [`Handle`].
    pub fn handle(&self) -> Handle<T> {
        Handle::from(self.current())
    }

    /// Number of times the cell has been relinked.
    pub fn version(&self) -> u64 {
        self.slot.version.load(Ordering::Acquire)
    }
}

impl<T: ?Sized> Clone for RelinkableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: ?Sized> Default for RelinkableHandle<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> fmt::Debug for RelinkableHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelinkableHandle")
            .field("version", &self.version())
            .field("linked", &!self.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn null_handle_is_empty() {
        let h: Handle<f64> = Handle::null();
        assert!(h.is_empty());
        assert!(h.get().is_none());
    }

    #[test]
    fn handle_to_unsized() {
        let arc: Arc<dyn fmt::Debug + Send + Sync> = Arc::new(3.0_f64);
        let h = Handle::from_arc(arc);
        assert!(!h.is_empty());
    }

    #[test]
    fn relinking_bumps_version_and_keeps_old_snapshots() {
        let cell = RelinkableHandle::from_arc(Arc::new(1.0_f64));
        assert_eq!(cell.version(), 1);
        let old = cell.current().unwrap();
        let v = cell.link_to(Arc::new(2.0));
        assert_eq!(v, 2);
        assert_eq!(*old, 1.0);
        assert_eq!(*cell.current().unwrap(), 2.0);
        cell.unlink();
        assert!(cell.is_empty());
        assert_eq!(cell.version(), 3);
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        let cell = RelinkableHandle::from_arc(Arc::new(vec![0_u64; 64]));
        let writer = {
            let cell = cell.clone();
            thread::spawn(move || {
                for i in 1..200_u64 {
                    cell.link_to(Arc::new(vec![i; 64]));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = cell.current().unwrap();
                        assert!(snap.iter().all(|&x| x == snap[0]));
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(cell.version(), 200);
    }
}
