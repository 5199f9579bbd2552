// baton/src/core/metadata.rs

//! The one mutable slot of an argument bundle.

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared key-value state handed by reference to every handler of an execution
/// and to its terminal handler.
///
/// Cloning a `Metadata` clones the handle, not the data: writes made by one
/// handler are visible to every later handler holding a clone.
///
/// IMPORTANT: guards are blocking and MUST be dropped before any `.await`.
#[derive(Debug)]
pub struct Metadata<M>(Arc<RwLock<M>>);

impl<M: Send + Sync + 'static> Metadata<M> {
  pub fn new(data: M) -> Self {
    Metadata(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, M> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, M> {
    self.0.write()
  }

  pub fn try_read(&self) -> Option<RwLockReadGuard<'_, M>> {
    self.0.try_read()
  }

  pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, M>> {
    self.0.try_write()
  }

  /// Read guard narrowed to one part of the metadata, e.g. `meta.map_read(|m| &m.user)`.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&M) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  pub fn map_write<F, U: ?Sized>(&self, f: F) -> MappedRwLockWriteGuard<'_, U>
  where
    F: FnOnce(&mut M) -> &mut U,
  {
    RwLockWriteGuard::map(self.write(), f)
  }

  /// Runs `f` with exclusive access and returns its result, releasing the lock before returning.
  pub fn update<R>(&self, f: impl FnOnce(&mut M) -> R) -> R {
    f(&mut self.write())
  }

  /// True if both handles point at the same underlying metadata.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl<M: Clone + Send + Sync + 'static> Metadata<M> {
  /// Copy of the current value.
  pub fn snapshot(&self) -> M {
    self.read().clone()
  }
}

impl<M> Clone for Metadata<M> {
  fn clone(&self) -> Self {
    Metadata(Arc::clone(&self.0))
  }
}

impl<M: Send + Sync + 'static + Default> Default for Metadata<M> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}

impl<M: Send + Sync + 'static> From<M> for Metadata<M> {
  fn from(data: M) -> Self {
    Self::new(data)
  }
}
