// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use std::cell::RefCell;
use std::ptr::NonNull;

use bitflags::bitflags;

use crate::HandleScope;
use crate::Isolate;
use crate::Local;
use crate::String;
use crate::Value;
use crate::encoding;
use crate::external::{
  ExternalOneByteStringResource, ExternalStringResource, OneByteFinalizer,
  StaticOneByteResource, StaticTwoByteResource, TwoByteFinalizer,
};
use crate::heap::{HeapData, HeapKind, StringRepr};

/// How a new string's characters should be stored by the engine.
///
/// Internalized (interned) strings are not supported by this shim; only
/// `Normal` may be passed to the construction operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NewStringType {
  #[default]
  Normal,
  Internalized,
}

bitflags! {
  #[derive(Clone, Copy, Default)]
  #[repr(transparent)]
  pub struct WriteFlags: u32 {
    /// Append a NUL byte after the written data. The terminator occupies
    /// buffer capacity but is not counted in the returned length.
    const NULL_TERMINATE = 1;
    /// Replace unpaired surrogate code units with the Unicode replacement
    /// character. Needs to be set to guarantee valid UTF-8 output.
    const REPLACE_INVALID_UTF8 = 2;
  }
}

impl String {
  /// The maximum length (in UTF-16 code units) of a string the engine can
  /// represent. Attempting to create a longer one fails with `None`.
  pub const MAX_LENGTH: usize = (1 << 29) - 24;

  /// The canonical zero-length string of this isolate. Infallible.
  #[inline(always)]
  pub fn empty<'s>(scope: &mut HandleScope<'s>) -> Local<'s, String> {
    let data = scope.empty_string();
    scope.make_local(data)
  }

  /// Allocates a new string from UTF-8 data. Invalid sequences become
  /// U+FFFD. Returns `None` when the input exceeds [`Self::MAX_LENGTH`] or
  /// the engine cannot allocate; never a truncated string.
  #[inline(always)]
  pub fn new_from_utf8<'s>(
    scope: &mut HandleScope<'s>,
    buffer: &[u8],
    new_type: NewStringType,
  ) -> Option<Local<'s, String>> {
    debug_assert_eq!(new_type, NewStringType::Normal);
    if buffer.is_empty() {
      return Some(Self::empty(scope));
    }
    if buffer.len() > Self::MAX_LENGTH {
      return None;
    }
    // A UTF-16 unit consumes at least one input byte, so the decoded length
    // is within MAX_LENGTH as well.
    let units = encoding::utf8_to_two_byte(buffer);
    Self::new_flat(scope, units)
  }

  /// Allocates a new string from Latin-1 data, copied and inflated into the
  /// engine's two-byte representation. Returns `None` when the input
  /// exceeds [`Self::MAX_LENGTH`] or the engine cannot allocate.
  #[inline(always)]
  pub fn new_from_one_byte<'s>(
    scope: &mut HandleScope<'s>,
    buffer: &[u8],
    new_type: NewStringType,
  ) -> Option<Local<'s, String>> {
    debug_assert_eq!(new_type, NewStringType::Normal);
    if buffer.is_empty() {
      return Some(Self::empty(scope));
    }
    if buffer.len() > Self::MAX_LENGTH {
      return None;
    }
    let units = buffer.iter().map(|&b| u16::from(b)).collect();
    Self::new_flat(scope, units)
  }

  /// Allocates a new string from UTF-16 data, copied verbatim (unpaired
  /// surrogates included). Returns `None` when the input exceeds
  /// [`Self::MAX_LENGTH`] or the engine cannot allocate.
  #[inline(always)]
  pub fn new_from_two_byte<'s>(
    scope: &mut HandleScope<'s>,
    buffer: &[u16],
    new_type: NewStringType,
  ) -> Option<Local<'s, String>> {
    debug_assert_eq!(new_type, NewStringType::Normal);
    if buffer.is_empty() {
      return Some(Self::empty(scope));
    }
    if buffer.len() > Self::MAX_LENGTH {
      return None;
    }
    Self::new_flat(scope, buffer.to_vec())
  }

  // Convenience function not present in the original V8 API.
  #[inline(always)]
  pub fn new<'s>(
    scope: &mut HandleScope<'s>,
    value: &str,
  ) -> Option<Local<'s, String>> {
    Self::new_from_utf8(scope, value.as_bytes(), NewStringType::Normal)
  }

  fn new_flat<'s>(
    scope: &mut HandleScope<'s>,
    units: Vec<u16>,
  ) -> Option<Local<'s, String>> {
    debug_assert!(units.len() <= Self::MAX_LENGTH);
    let data = scope.heap_mut().alloc(HeapKind::String(RefCell::new(
      StringRepr::Flat(units.into_boxed_slice()),
    )))?;
    Some(scope.make_local(data))
  }

  /// Creates a string over the resource's own UTF-16 buffer, without
  /// copying. The engine owns the resource from here on: when the string is
  /// garbage collected, the resource's `dispose` runs exactly once and the
  /// resource is released.
  ///
  /// Returns `None` when the resource is longer than [`Self::MAX_LENGTH`]
  /// or the engine cannot allocate; the resource is then dropped without a
  /// `dispose` call, since no string was created.
  pub fn new_external_twobyte<'s>(
    scope: &mut HandleScope<'s>,
    resource: Box<dyn ExternalStringResource>,
  ) -> Option<Local<'s, String>> {
    let fin = TwoByteFinalizer::new(resource);
    if fin.len() > Self::MAX_LENGTH {
      return None;
    }
    let data = scope.heap_mut().alloc(HeapKind::String(RefCell::new(
      StringRepr::ExternalTwoByte(fin),
    )))?;
    Some(scope.make_local(data))
  }

  /// Creates a string from a Latin-1 resource. The engine has no one-byte
  /// representation, so the resource's data is inflated once into a
  /// two-byte buffer owned by the string's finalizer; that copy is freed in
  /// the same collection that disposes the resource. Failure semantics are
  /// those of [`Self::new_external_twobyte`].
  pub fn new_external_onebyte<'s>(
    scope: &mut HandleScope<'s>,
    resource: Box<dyn ExternalOneByteStringResource>,
  ) -> Option<Local<'s, String>> {
    let fin = OneByteFinalizer::new(resource);
    if fin.len() > Self::MAX_LENGTH {
      return None;
    }
    let data = scope.heap_mut().alloc(HeapKind::String(RefCell::new(
      StringRepr::ExternalOneByte(fin),
    )))?;
    Some(scope.make_local(data))
  }

  /// Creates a string from a `&'static [u16]`.
  #[inline(always)]
  pub fn new_external_twobyte_static<'s>(
    scope: &mut HandleScope<'s>,
    buffer: &'static [u16],
  ) -> Option<Local<'s, String>> {
    Self::new_external_twobyte(scope, Box::new(StaticTwoByteResource(buffer)))
  }

  /// Creates a string from a `&'static [u8]`,
  /// must be Latin-1 or ASCII, not UTF-8!
  #[inline(always)]
  pub fn new_external_onebyte_static<'s>(
    scope: &mut HandleScope<'s>,
    buffer: &'static [u8],
  ) -> Option<Local<'s, String>> {
    Self::new_external_onebyte(scope, Box::new(StaticOneByteResource(buffer)))
  }

  /// Creates a new string logically equal to `left` followed by `right`.
  ///
  /// The characters are not copied; the result is a rope over its operands,
  /// flattened on first contiguous access. Never fails observably: on
  /// allocation failure or a combined length over [`Self::MAX_LENGTH`], the
  /// canonical empty string is returned.
  pub fn concat<'s>(
    scope: &mut HandleScope<'s>,
    left: Local<'_, String>,
    right: Local<'_, String>,
  ) -> Local<'s, String> {
    let left_len = left.length();
    let right_len = right.length();
    if left_len == 0 {
      return scope.make_local(right.as_non_null().cast());
    }
    if right_len == 0 {
      return scope.make_local(left.as_non_null().cast());
    }
    let len = left_len + right_len;
    if len > Self::MAX_LENGTH {
      return Self::empty(scope);
    }
    let repr = StringRepr::Rope {
      left: left.as_non_null().cast(),
      right: right.as_non_null().cast(),
      len,
    };
    match scope.heap_mut().alloc(HeapKind::String(RefCell::new(repr))) {
      Some(data) => scope.make_local(data),
      None => Self::empty(scope),
    }
  }

  /// Reinterprets a generic value as a string.
  ///
  /// # Safety
  ///
  /// The value's runtime tag must already be "string"; only a debug
  /// assertion checks this. Use the `TryFrom` impl for a checked cast.
  #[inline(always)]
  pub unsafe fn cast<'s>(value: Local<'s, Value>) -> Local<'s, String> {
    debug_assert!(value.is_string());
    unsafe { Local::cast(value) }
  }

  /// Returns the number of characters (UTF-16 code units) in this string.
  /// O(1) for every representation; ropes are not flattened.
  #[inline(always)]
  pub fn length(&self) -> usize {
    self.0.string_len()
  }

  /// Returns the number of bytes in the UTF-8 encoded representation of
  /// this string. Flattens the string; returns 0 if flattening fails.
  #[inline(always)]
  pub fn utf8_length(&self, scope: &Isolate) -> usize {
    scope
      .heap()
      .with_flat_chars(&self.0, encoding::two_byte_utf8_length)
      .unwrap_or(0)
  }

  /// Writes the contents of the string to an external buffer, as 16-bit
  /// (UTF-16) character codes, starting at code unit `offset`. Returns the
  /// number of units written; 0 if the string could not be flattened.
  pub fn write(
    &self,
    scope: &Isolate,
    offset: usize,
    buffer: &mut [u16],
  ) -> usize {
    scope
      .heap()
      .with_flat_chars(&self.0, |chars| {
        if offset >= chars.len() {
          return 0;
        }
        let n = buffer.len().min(chars.len() - offset);
        buffer[..n].copy_from_slice(&chars[offset..offset + n]);
        n
      })
      .unwrap_or(0)
  }

  /// Writes the contents of the string to an external buffer, as UTF-8.
  /// Only whole code points are written. Returns the number of data bytes
  /// written, not counting the optional NUL terminator; 0 if the string
  /// could not be flattened.
  pub fn write_utf8(
    &self,
    scope: &Isolate,
    buffer: &mut [u8],
    flags: WriteFlags,
  ) -> usize {
    scope
      .heap()
      .with_flat_chars(&self.0, |chars| {
        let reserve = usize::from(flags.contains(WriteFlags::NULL_TERMINATE));
        if buffer.len() < reserve {
          return 0;
        }
        let room = buffer.len() - reserve;
        let written = encoding::deflate_two_byte_to_utf8(
          chars,
          &mut buffer[..room],
          flags.contains(WriteFlags::REPLACE_INVALID_UTF8),
        );
        if reserve == 1 {
          buffer[written] = 0;
        }
        written
      })
      .unwrap_or(0)
  }

  /// True if string is external.
  #[inline(always)]
  pub fn is_external(&self) -> bool {
    self.is_external_onebyte() || self.is_external_twobyte()
  }

  /// True if string is external & one-byte
  /// (e.g: created with new_external_onebyte_static).
  #[inline(always)]
  pub fn is_external_onebyte(&self) -> bool {
    match self.0.kind() {
      HeapKind::String(repr) => {
        matches!(&*repr.borrow(), StringRepr::ExternalOneByte(_))
      }
      _ => false,
    }
  }

  /// True if string is external & two-byte
  /// (e.g: created with new_external_twobyte_static).
  #[inline(always)]
  pub fn is_external_twobyte(&self) -> bool {
    match self.0.kind() {
      HeapKind::String(repr) => {
        matches!(&*repr.borrow(), StringRepr::ExternalTwoByte(_))
      }
      _ => false,
    }
  }

  /// True if the string contains only one-byte data.
  /// Will read the entire string in some cases, but never flattens it.
  pub fn contains_only_onebyte(&self) -> bool {
    let mut pending: Vec<NonNull<HeapData>> = vec![NonNull::from(&self.0)];
    while let Some(ptr) = pending.pop() {
      // SAFETY: the receiver is live and rope children are kept alive by
      // their parent.
      let data = unsafe { ptr.as_ref() };
      let HeapKind::String(repr) = data.kind() else {
        continue;
      };
      match &*repr.borrow() {
        StringRepr::Flat(units) => {
          if units.iter().any(|&u| u > 0xFF) {
            return false;
          }
        }
        StringRepr::ExternalTwoByte(fin) => {
          if fin.chars().iter().any(|&u| u > 0xFF) {
            return false;
          }
        }
        // Derived from Latin-1, one-byte by construction.
        StringRepr::ExternalOneByte(_) => {}
        StringRepr::Rope { left, right, .. } => {
          pending.push(*left);
          pending.push(*right);
        }
      }
    }
    true
  }

  /// Creates a copy of this string in a [`std::string::String`].
  /// Unpaired surrogates are replaced with U+FFFD; a string that cannot be
  /// flattened comes back empty.
  /// Convenience function not present in the original V8 API.
  pub fn to_rust_string_lossy(&self, scope: &Isolate) -> std::string::String {
    scope
      .heap()
      .with_flat_chars(&self.0, std::string::String::from_utf16_lossy)
      .unwrap_or_default()
  }
}
