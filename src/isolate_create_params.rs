// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
/// Initial configuration parameters for a new [`Isolate`](crate::Isolate).
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct CreateParams {
  initial_heap_size: usize,
  max_heap_size: usize,
}

impl CreateParams {
  /// Configures the byte budget the engine heap may grow to.
  ///
  /// Allocation past `max` fails: construction operations return their
  /// empty/failed result instead of aborting. `initial` is accepted for
  /// API compatibility; this engine sizes its heap dynamically, so only
  /// the hard limit is observed.
  ///
  /// # Arguments
  ///
  /// * `initial` - The initial heap size or zero, in bytes.
  /// * `max` - The hard limit for the heap size, in bytes.
  pub fn heap_limits(mut self, initial: usize, max: usize) -> Self {
    self.initial_heap_size = initial;
    self.max_heap_size = max;
    self
  }

  pub(crate) fn max_heap_size(&self) -> usize {
    self.max_heap_size
  }
}

impl Default for CreateParams {
  fn default() -> Self {
    Self {
      initial_heap_size: 0,
      max_heap_size: usize::MAX,
    }
  }
}
