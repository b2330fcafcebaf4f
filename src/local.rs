// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use std::marker::PhantomData;
use std::mem::transmute;
use std::ops::Deref;
use std::ptr::NonNull;

/// An object reference managed by the engine's garbage collector.
///
/// All objects returned from the engine have to be tracked by the garbage
/// collector so that it knows that the objects are still alive. Locals are
/// managed by [`HandleScope`](crate::HandleScope)s: a scope must exist when
/// they are created, they are rooted in that scope's frame, and they are
/// only usable for the scope's lifetime. Handles should always be passed by
/// value; they are `Copy`.
///
/// Note: local handles here differ from the V8 C++ API in that they are
/// never empty. In situations where empty handles are needed, use
/// `Option<Local>`.
#[repr(transparent)]
pub struct Local<'s, T>(NonNull<T>, PhantomData<&'s ()>);

impl<'s, T> Copy for Local<'s, T> {}

impl<'s, T> Clone for Local<'s, T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<'s, T> Local<'s, T> {
  /// Create a local handle by downcasting from one of its super types.
  /// This function is unsafe because the cast is unchecked; prefer the
  /// `TryFrom` impls, which verify the runtime tag.
  pub unsafe fn cast<A>(other: Local<'s, A>) -> Self
  where
    Local<'s, A>: From<Self>,
  {
    unsafe { transmute(other) }
  }

  pub(crate) unsafe fn from_non_null(nn: NonNull<T>) -> Self {
    Self(nn, PhantomData)
  }

  pub(crate) fn as_non_null(self) -> NonNull<T> {
    self.0
  }
}

impl<'s, T> std::fmt::Debug for Local<'s, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Local").field(&self.0).finish()
  }
}

impl<'s, T> Deref for Local<'s, T> {
  type Target = T;
  fn deref(&self) -> &T {
    unsafe { self.0.as_ref() }
  }
}

#[test]
fn test_size_of_local() {
  use crate::Value;
  use std::mem::size_of;
  assert_eq!(size_of::<Local<Value>>(), size_of::<*const Value>());
  assert_eq!(size_of::<Option<Local<Value>>>(), size_of::<*const Value>());
}
