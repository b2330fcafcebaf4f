// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::Isolate;
use crate::Local;
use crate::heap::HeapData;

/// A stack-allocated class that governs a number of local handles.
///
/// Creating a scope pushes a root frame on the isolate's heap; every local
/// created through the scope is recorded in that frame, keeping its object
/// alive across collections for as long as the scope exists. Dropping the
/// scope pops the frame, after which the borrow checker prevents the
/// isolate from collecting while any of the scope's locals remain usable.
///
/// Scopes nest: a new scope can be created from the isolate or from an
/// enclosing scope.
pub struct HandleScope<'s> {
  isolate: &'s mut Isolate,
}

impl<'s> HandleScope<'s> {
  pub fn new<P: AsMut<Isolate>>(parent: &'s mut P) -> Self {
    let isolate = parent.as_mut();
    isolate.heap_mut().push_frame();
    Self { isolate }
  }

  /// Roots a heap cell in this scope's frame and hands back a typed local.
  /// The caller guarantees the cell's runtime tag matches `T`.
  pub(crate) fn make_local<T>(&mut self, data: NonNull<HeapData>) -> Local<'s, T> {
    self.isolate.heap_mut().root(data);
    unsafe { Local::from_non_null(data.cast()) }
  }
}

impl Drop for HandleScope<'_> {
  fn drop(&mut self) {
    self.isolate.heap_mut().pop_frame();
  }
}

impl Deref for HandleScope<'_> {
  type Target = Isolate;
  fn deref(&self) -> &Self::Target {
    self.isolate
  }
}

impl DerefMut for HandleScope<'_> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    self.isolate
  }
}

impl AsMut<Isolate> for HandleScope<'_> {
  fn as_mut(&mut self) -> &mut Isolate {
    self.isolate
  }
}
