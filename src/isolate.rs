// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use std::cell::RefCell;
use std::ptr::NonNull;

use crate::CreateParams;
use crate::heap::{Heap, HeapData, HeapKind, PrimitiveKind, StringRepr};

/// Types of garbage collections that can be requested via
/// [`Isolate::request_garbage_collection_for_testing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarbageCollectionType {
  Full,
  Minor,
}

/// Heap usage figures filled in by [`Isolate::get_heap_statistics`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapStatistics {
  used_heap_size: usize,
  heap_size_limit: usize,
}

impl HeapStatistics {
  pub fn used_heap_size(&self) -> usize {
    self.used_heap_size
  }

  pub fn heap_size_limit(&self) -> usize {
    self.heap_size_limit
  }
}

/// An isolated instance of the engine.
///
/// Owns the string heap, the canonical empty string and the primitive
/// singletons. An isolate is used from one thread at a time; operations on
/// its heap objects go through [`HandleScope`](crate::HandleScope)s, which
/// root the handles they produce so that garbage collection never frees an
/// object with a live local.
///
/// Garbage collection runs only when explicitly requested (or on isolate
/// teardown), never implicitly during allocation, so external-string
/// finalization is deterministic for embedders that force it.
pub struct Isolate {
  heap: Heap,
  empty_string: NonNull<HeapData>,
  undefined: NonNull<HeapData>,
  null: NonNull<HeapData>,
  r#true: NonNull<HeapData>,
  r#false: NonNull<HeapData>,
}

impl Isolate {
  /// Creates a new isolate. The singletons are allocated outside the
  /// configured heap budget, so an isolate is functional even with a zero
  /// byte limit (every fallible construction then fails, and infallible
  /// ones degrade to the empty string).
  pub fn new(params: CreateParams) -> Self {
    let mut heap = Heap::new(params.max_heap_size());
    let empty_string = heap.alloc_persistent(HeapKind::String(RefCell::new(
      StringRepr::Flat(Box::from([])),
    )));
    let undefined =
      heap.alloc_persistent(HeapKind::Primitive(PrimitiveKind::Undefined));
    let null = heap.alloc_persistent(HeapKind::Primitive(PrimitiveKind::Null));
    let r#true =
      heap.alloc_persistent(HeapKind::Primitive(PrimitiveKind::Boolean(true)));
    let r#false =
      heap.alloc_persistent(HeapKind::Primitive(PrimitiveKind::Boolean(false)));
    Self {
      heap,
      empty_string,
      undefined,
      null,
      r#true,
      r#false,
    }
  }

  pub(crate) fn heap(&self) -> &Heap {
    &self.heap
  }

  pub(crate) fn heap_mut(&mut self) -> &mut Heap {
    &mut self.heap
  }

  pub(crate) fn empty_string(&self) -> NonNull<HeapData> {
    self.empty_string
  }

  pub(crate) fn undefined_singleton(&self) -> NonNull<HeapData> {
    self.undefined
  }

  pub(crate) fn null_singleton(&self) -> NonNull<HeapData> {
    self.null
  }

  pub(crate) fn boolean_singleton(&self, value: bool) -> NonNull<HeapData> {
    if value { self.r#true } else { self.r#false }
  }

  /// Fills `s` with current heap usage: bytes charged against the budget
  /// and the configured hard limit.
  pub fn get_heap_statistics(&self, s: &mut HeapStatistics) {
    s.used_heap_size = self.heap.bytes_used();
    s.heap_size_limit = self.heap.bytes_limit();
  }

  /// Synchronously performs a full collection, as if the engine had decided
  /// memory is tight. Finalizers of unreachable external strings run during
  /// the call.
  pub fn low_memory_notification(&mut self) {
    self.heap.collect();
  }

  /// Requests a garbage collection right now.
  ///
  /// This should only be used for testing purposes and not to enforce a
  /// garbage collection schedule. This engine has a single generation, so
  /// both collection types perform a full collection.
  pub fn request_garbage_collection_for_testing(
    &mut self,
    _type: GarbageCollectionType,
  ) {
    self.heap.collect();
  }
}

impl AsMut<Isolate> for Isolate {
  fn as_mut(&mut self) -> &mut Isolate {
    self
  }
}

impl Drop for Isolate {
  fn drop(&mut self) {
    // Tearing the isolate down reclaims every remaining string, so external
    // resources receive their one disposal signal even if no collection was
    // ever forced.
    self.heap.finalize_all();
  }
}
