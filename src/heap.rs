// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
//! The engine core: a non-moving mark/sweep heap of string and primitive
//! cells, with explicit root frames pushed by handle scopes.
//!
//! Facade operations translate into these primitives the way an embedding
//! shim translates into a foreign engine's JSAPI: allocate a cell over a
//! buffer, concatenate lazily as a rope, flatten on demand, and let the
//! collector run external-string finalizers at sweep time. Collection never
//! happens implicitly during allocation; it runs only when explicitly
//! requested through the isolate, so finalization timing is deterministic
//! for embedders that ask for it and "some time later" for everyone else.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use crate::external::{OneByteFinalizer, TwoByteFinalizer};

/// Fixed bookkeeping cost charged against the heap budget per cell, on top
/// of any character buffer the cell owns.
pub(crate) const CELL_OVERHEAD: usize = size_of::<HeapData>();

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum PrimitiveKind {
  Undefined,
  Null,
  Boolean(bool),
}

/// How a string cell stores its characters.
pub(crate) enum StringRepr {
  /// Engine-owned contiguous UTF-16 buffer.
  Flat(Box<[u16]>),
  /// Lazy concatenation; children are kept alive by the marker tracing
  /// through here. Flattened in place on first contiguous access.
  Rope {
    left: NonNull<HeapData>,
    right: NonNull<HeapData>,
    len: usize,
  },
  /// Zero-copy view over an application resource, plus its finalizer.
  ExternalTwoByte(TwoByteFinalizer),
  /// Bridge-owned two-byte copy of an application's Latin-1 resource.
  ExternalOneByte(OneByteFinalizer),
}

pub(crate) enum HeapKind {
  Primitive(PrimitiveKind),
  String(RefCell<StringRepr>),
}

/// A cell on the engine heap. Public handle types (`Data`, `Value`,
/// `String`, ...) are `#[repr(transparent)]` wrappers over this.
pub(crate) struct HeapData {
  mark: Cell<bool>,
  kind: HeapKind,
}

impl HeapData {
  pub(crate) fn kind(&self) -> &HeapKind {
    &self.kind
  }

  /// UTF-16 code-unit count. O(1) for every representation; ropes track
  /// their combined length.
  pub(crate) fn string_len(&self) -> usize {
    match &self.kind {
      HeapKind::Primitive(_) => 0,
      HeapKind::String(repr) => match &*repr.borrow() {
        StringRepr::Flat(units) => units.len(),
        StringRepr::Rope { len, .. } => *len,
        StringRepr::ExternalTwoByte(fin) => fin.len(),
        StringRepr::ExternalOneByte(fin) => fin.len(),
      },
    }
  }
}

pub(crate) struct Heap {
  /// Boxed so cell addresses stay stable across `cells` growth; the
  /// collector sweeps in place and never moves survivors.
  cells: Vec<Box<HeapData>>,
  /// One root frame per live handle scope, innermost last.
  frames: Vec<Vec<NonNull<HeapData>>>,
  /// Isolate-lifetime roots: singletons and the canonical empty string.
  persistent: Vec<NonNull<HeapData>>,
  bytes_used: Cell<usize>,
  bytes_limit: usize,
}

impl Heap {
  pub(crate) fn new(bytes_limit: usize) -> Self {
    Self {
      cells: Vec::new(),
      frames: Vec::new(),
      persistent: Vec::new(),
      bytes_used: Cell::new(0),
      bytes_limit,
    }
  }

  pub(crate) fn bytes_used(&self) -> usize {
    self.bytes_used.get()
  }

  pub(crate) fn bytes_limit(&self) -> usize {
    self.bytes_limit
  }

  fn try_charge(&self, bytes: usize) -> bool {
    let used = self.bytes_used.get();
    match used.checked_add(bytes) {
      Some(total) if total <= self.bytes_limit => {
        self.bytes_used.set(total);
        true
      }
      _ => false,
    }
  }

  fn uncharge(bytes_used: &Cell<usize>, bytes: usize) {
    bytes_used.set(bytes_used.get().saturating_sub(bytes));
  }

  /// Budget cost of a cell in its current representation.
  fn cell_cost(data: &HeapData) -> usize {
    let buffer = match &data.kind {
      HeapKind::Primitive(_) => 0,
      HeapKind::String(repr) => match &*repr.borrow() {
        StringRepr::Flat(units) => 2 * units.len(),
        // The rope itself owns no buffer; the derived one-byte buffer
        // includes its NUL terminator; the two-byte buffer is the
        // resource's, not the engine's.
        StringRepr::Rope { .. } => 0,
        StringRepr::ExternalTwoByte(_) => 0,
        StringRepr::ExternalOneByte(fin) => 2 * (fin.len() + 1),
      },
    };
    CELL_OVERHEAD + buffer
  }

  /// Allocates a cell outside the byte budget and roots it for the life of
  /// the isolate. Used for the singletons created before any user code runs.
  pub(crate) fn alloc_persistent(&mut self, kind: HeapKind) -> NonNull<HeapData> {
    let cell = Box::new(HeapData {
      mark: Cell::new(false),
      kind,
    });
    let ptr = NonNull::from(&*cell);
    self.cells.push(cell);
    self.persistent.push(ptr);
    ptr
  }

  /// Allocates a cell against the byte budget. Fails without side effects
  /// when the budget would be exceeded; the caller maps that onto its
  /// "maybe" result. The new cell is unrooted until a scope takes it, which
  /// is safe because collection only runs on explicit request.
  pub(crate) fn alloc(&mut self, kind: HeapKind) -> Option<NonNull<HeapData>> {
    let cell = Box::new(HeapData {
      mark: Cell::new(false),
      kind,
    });
    if !self.try_charge(Self::cell_cost(&cell)) {
      return None;
    }
    let ptr = NonNull::from(&*cell);
    self.cells.push(cell);
    Some(ptr)
  }

  pub(crate) fn push_frame(&mut self) {
    self.frames.push(Vec::new());
  }

  pub(crate) fn pop_frame(&mut self) {
    self.frames.pop();
  }

  /// Roots `data` in the innermost scope frame. Callers hold a live
  /// `HandleScope`, so a frame always exists.
  pub(crate) fn root(&mut self, data: NonNull<HeapData>) {
    self
      .frames
      .last_mut()
      .expect("no active handle scope")
      .push(data);
  }

  /// Forces a possibly-rope representation into one contiguous buffer,
  /// replacing the rope in place. Returns false only when the flat buffer
  /// does not fit the byte budget; the logical string is unchanged either
  /// way.
  pub(crate) fn ensure_flat(&self, data: &HeapData) -> bool {
    let HeapKind::String(repr) = &data.kind else {
      return false;
    };
    let (left, right, len) = match &*repr.borrow() {
      StringRepr::Rope { left, right, len } => (*left, *right, *len),
      _ => return true,
    };
    if !self.try_charge(2 * len) {
      return false;
    }
    let mut units = Vec::with_capacity(len);
    // Iterative leaf walk; rope trees from repeated concatenation can be
    // deep enough to overflow the stack if recursed.
    let mut pending = vec![right, left];
    while let Some(child) = pending.pop() {
      // SAFETY: rope children are traced by the marker, so they are live
      // for as long as their parent is.
      let child = unsafe { child.as_ref() };
      let HeapKind::String(child_repr) = &child.kind else {
        continue;
      };
      match &*child_repr.borrow() {
        StringRepr::Flat(u) => units.extend_from_slice(u),
        StringRepr::ExternalTwoByte(fin) => units.extend_from_slice(fin.chars()),
        StringRepr::ExternalOneByte(fin) => units.extend_from_slice(fin.chars()),
        StringRepr::Rope { left, right, .. } => {
          pending.push(*right);
          pending.push(*left);
        }
      }
    }
    debug_assert_eq!(units.len(), len);
    *repr.borrow_mut() = StringRepr::Flat(units.into_boxed_slice());
    true
  }

  /// Flattens `data` and passes its contiguous UTF-16 contents to `f`.
  /// `None` means flattening failed (budget); callers report empty/zero
  /// results in that case.
  pub(crate) fn with_flat_chars<R>(
    &self,
    data: &HeapData,
    f: impl FnOnce(&[u16]) -> R,
  ) -> Option<R> {
    if !self.ensure_flat(data) {
      return None;
    }
    let HeapKind::String(repr) = &data.kind else {
      return None;
    };
    let repr = repr.borrow();
    let chars = match &*repr {
      StringRepr::Flat(units) => &units[..],
      StringRepr::ExternalTwoByte(fin) => fin.chars(),
      StringRepr::ExternalOneByte(fin) => fin.chars(),
      // ensure_flat either replaced the rope or failed.
      StringRepr::Rope { .. } => return None,
    };
    Some(f(chars))
  }

  /// Full mark/sweep collection. Unreachable external strings have their
  /// finalizer bridge run exactly once, immediately before their cell (and
  /// the bridge with it) is freed.
  pub(crate) fn collect(&mut self) {
    for &root in &self.persistent {
      Self::mark_from(root);
    }
    for frame in &self.frames {
      for &root in frame {
        Self::mark_from(root);
      }
    }
    let bytes_used = &self.bytes_used;
    self.cells.retain(|cell| {
      if cell.mark.get() {
        cell.mark.set(false);
        return true;
      }
      Self::uncharge(bytes_used, Self::cell_cost(cell));
      if let HeapKind::String(repr) = &cell.kind {
        match &mut *repr.borrow_mut() {
          StringRepr::ExternalTwoByte(fin) => fin.finalize(),
          StringRepr::ExternalOneByte(fin) => fin.finalize(),
          _ => {}
        }
      }
      false
    });
  }

  fn mark_from(root: NonNull<HeapData>) {
    let mut pending = vec![root];
    while let Some(ptr) = pending.pop() {
      // SAFETY: roots and traced children point at live cells; the sweep
      // only frees cells no root can reach.
      let data = unsafe { ptr.as_ref() };
      if data.mark.get() {
        continue;
      }
      data.mark.set(true);
      if let HeapKind::String(repr) = &data.kind {
        if let StringRepr::Rope { left, right, .. } = &*repr.borrow() {
          pending.push(*left);
          pending.push(*right);
        }
      }
    }
  }

  /// Isolate teardown: every still-live external string is reclaimed now,
  /// so resources get their disposal signal even when the embedder never
  /// forced a collection.
  pub(crate) fn finalize_all(&mut self) {
    for cell in &self.cells {
      if let HeapKind::String(repr) = &cell.kind {
        match &mut *repr.borrow_mut() {
          StringRepr::ExternalTwoByte(fin) => fin.finalize(),
          StringRepr::ExternalOneByte(fin) => fin.finalize(),
          _ => {}
        }
      }
    }
    self.cells.clear();
    self.frames.clear();
    self.persistent.clear();
    self.bytes_used.set(0);
  }
}
