// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
//! External string resources and the finalizer bridge that connects them to
//! the engine's garbage collector.
//!
//! An external string borrows (two-byte case) or derives once from (one-byte
//! case) character data owned by the embedding application. The application
//! hands the engine a boxed resource; the engine keeps it alive exactly as
//! long as the string is reachable and, when the collector reclaims the
//! string, notifies the resource through [`dispose`] exactly once before
//! releasing it.
//!
//! [`dispose`]: ExternalStringResource::dispose

use crate::encoding;

/// An external, two-byte (UTF-16) string resource.
/// This corresponds with `v8::String::ExternalStringResource`.
///
/// The engine reads character data directly out of the buffer returned by
/// [`data`](Self::data); nothing is copied. The buffer therefore must not
/// move or shrink for as long as the resource is held by the engine.
pub trait ExternalStringResource {
  /// The UTF-16 code units backing the external string. Every call must
  /// return the same buffer with the same length.
  fn data(&self) -> &[u16];

  /// Reclamation notification. Called at most once, on the garbage
  /// collection that frees the string; the resource is dropped immediately
  /// afterwards. Not called if string construction fails, since no engine
  /// string exists to reclaim — the resource is simply dropped.
  fn dispose(&mut self) {}
}

/// An external, one-byte string resource.
/// This corresponds with `v8::String::ExternalOneByteStringResource`.
///
/// Note: the data contained in a one-byte string resource is guaranteed to
/// be Latin-1 data. It is not safe to assume that it is valid UTF-8, as
/// Latin-1 only has commonality with UTF-8 in the ASCII range and differs
/// beyond that.
pub trait ExternalOneByteStringResource {
  /// The Latin-1 bytes backing the external string. Every call must return
  /// the same buffer with the same length.
  fn data(&self) -> &[u8];

  /// Reclamation notification; same contract as
  /// [`ExternalStringResource::dispose`].
  fn dispose(&mut self) {}
}

/// Finalizer bridge for a two-byte external string.
///
/// One bridge exists per external string, owned by the string's heap cell.
/// It starts armed (resource present); the collector's sweep moves it to
/// disposed exactly once, after which the string cell (and the bridge with
/// it) is freed. The character buffer belongs to the resource, so disposal
/// frees nothing here.
pub(crate) struct TwoByteFinalizer {
  resource: Option<Box<dyn ExternalStringResource>>,
  len: usize,
}

impl TwoByteFinalizer {
  pub(crate) fn new(resource: Box<dyn ExternalStringResource>) -> Self {
    let len = resource.data().len();
    Self {
      resource: Some(resource),
      len,
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.len
  }

  /// The live character data, borrowed from the resource. Empty once
  /// disposed; the string is unreachable by then so nothing reads it.
  pub(crate) fn chars(&self) -> &[u16] {
    match &self.resource {
      Some(resource) => resource.data(),
      None => &[],
    }
  }

  /// Armed -> disposed. Notifies and releases the resource; a second call
  /// finds the slot empty and does nothing.
  pub(crate) fn finalize(&mut self) {
    if let Some(mut resource) = self.resource.take() {
      resource.dispose();
    }
  }
}

/// Finalizer bridge for a one-byte external string.
///
/// The engine has no one-byte string representation, so construction
/// inflates the resource's Latin-1 data into a two-byte copy. That derived
/// buffer is owned by the bridge, distinct from the resource's original
/// data, and is freed in the same transition that disposes the resource.
pub(crate) struct OneByteFinalizer {
  resource: Option<Box<dyn ExternalOneByteStringResource>>,
  derived: Option<Box<[u16]>>,
  len: usize,
}

impl OneByteFinalizer {
  /// Inflates the resource's data and arms the bridge. The derived buffer
  /// has `len + 1` units including the NUL terminator; the string itself is
  /// `len` units long.
  pub(crate) fn new(resource: Box<dyn ExternalOneByteStringResource>) -> Self {
    let derived = encoding::one_byte_to_two_byte(resource.data());
    let len = derived.len() - 1;
    Self {
      resource: Some(resource),
      derived: Some(derived),
      len,
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.len
  }

  pub(crate) fn chars(&self) -> &[u16] {
    match &self.derived {
      Some(derived) => &derived[..self.len],
      None => &[],
    }
  }

  /// Armed -> disposed. Both effects happen here: the resource is notified
  /// and released, and the derived two-byte buffer is freed. Idempotent for
  /// the same reason as the two-byte variant.
  pub(crate) fn finalize(&mut self) {
    if let Some(mut resource) = self.resource.take() {
      resource.dispose();
    }
    self.derived = None;
  }

  #[cfg(test)]
  pub(crate) fn derived_units(&self) -> Option<&[u16]> {
    self.derived.as_deref()
  }
}

/// Adapter giving `&'static` two-byte data the resource shape; disposal is
/// a no-op since nothing owns the buffer.
pub(crate) struct StaticTwoByteResource(pub(crate) &'static [u16]);

impl ExternalStringResource for StaticTwoByteResource {
  fn data(&self) -> &[u16] {
    self.0
  }
}

/// Adapter giving `&'static` Latin-1 data the resource shape.
pub(crate) struct StaticOneByteResource(pub(crate) &'static [u8]);

impl ExternalOneByteStringResource for StaticOneByteResource {
  fn data(&self) -> &[u8] {
    self.0
  }
}
