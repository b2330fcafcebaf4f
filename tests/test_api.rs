// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use std::cell::Cell;
use std::rc::Rc;

use v8shim as v8;

/// A two-byte resource that records how often it was disposed and dropped.
struct TrackedTwoByte {
  units: Vec<u16>,
  disposed: Rc<Cell<u32>>,
  dropped: Rc<Cell<u32>>,
}

impl v8::ExternalStringResource for TrackedTwoByte {
  fn data(&self) -> &[u16] {
    &self.units
  }
  fn dispose(&mut self) {
    self.disposed.set(self.disposed.get() + 1);
  }
}

impl Drop for TrackedTwoByte {
  fn drop(&mut self) {
    self.dropped.set(self.dropped.get() + 1);
  }
}

struct TrackedOneByte {
  bytes: Vec<u8>,
  disposed: Rc<Cell<u32>>,
}

impl v8::ExternalOneByteStringResource for TrackedOneByte {
  fn data(&self) -> &[u8] {
    &self.bytes
  }
  fn dispose(&mut self) {
    self.disposed.set(self.disposed.get() + 1);
  }
}

#[test]
fn string_new_from_utf8() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s = v8::String::new_from_utf8(
    scope,
    "日本語ｶﾀｶﾅ".as_bytes(),
    v8::NewStringType::Normal,
  )
  .unwrap();
  assert_eq!(s.length(), 7);
  assert_eq!(s.utf8_length(scope), "日本語ｶﾀｶﾅ".len());
  assert_eq!(s.to_rust_string_lossy(scope), "日本語ｶﾀｶﾅ");
  assert!(!s.is_external());
  assert!(!s.contains_only_onebyte());
}

#[test]
fn string_new_from_utf8_replaces_invalid() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s =
    v8::String::new_from_utf8(scope, &[0x61, 0xFF, 0x62], v8::NewStringType::Normal)
      .unwrap();
  assert_eq!(s.length(), 3);
  assert_eq!(s.to_rust_string_lossy(scope), "a\u{FFFD}b");
}

#[test]
fn string_empty_and_zero_length_inputs() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let empty = v8::String::empty(scope);
  assert_eq!(empty.length(), 0);
  assert_eq!(empty.utf8_length(scope), 0);
  assert_eq!(empty.to_rust_string_lossy(scope), "");
  let from_utf8 =
    v8::String::new_from_utf8(scope, b"", v8::NewStringType::Normal).unwrap();
  assert_eq!(from_utf8.length(), 0);
  let from_two_byte =
    v8::String::new_from_two_byte(scope, &[], v8::NewStringType::Normal).unwrap();
  assert_eq!(from_two_byte.length(), 0);
}

#[test]
fn string_new_from_one_byte_is_latin1() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  // 0xE9 is é in Latin-1, not a valid UTF-8 sequence.
  let s =
    v8::String::new_from_one_byte(scope, &[0xE9], v8::NewStringType::Normal)
      .unwrap();
  assert_eq!(s.length(), 1);
  assert_eq!(s.utf8_length(scope), 2);
  assert_eq!(s.to_rust_string_lossy(scope), "é");
  assert!(s.contains_only_onebyte());
}

#[test]
fn string_new_from_two_byte_keeps_surrogate_pairs() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let units: Vec<u16> = "a\u{1F600}b".encode_utf16().collect();
  assert_eq!(units.len(), 4);
  let s = v8::String::new_from_two_byte(scope, &units, v8::NewStringType::Normal)
    .unwrap();
  assert_eq!(s.length(), 4);
  assert_eq!(s.utf8_length(scope), 6);
  assert_eq!(s.to_rust_string_lossy(scope), "a\u{1F600}b");
}

#[test]
fn string_write() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s = v8::String::new(scope, "hello").unwrap();
  let mut buf = [0u16; 8];
  assert_eq!(s.write(scope, 0, &mut buf), 5);
  assert_eq!(&buf[..5], &[0x68, 0x65, 0x6C, 0x6C, 0x6F]);
  // Offset past the start, buffer smaller than the tail.
  let mut small = [0u16; 2];
  assert_eq!(s.write(scope, 3, &mut small), 2);
  assert_eq!(&small, &[0x6C, 0x6F]);
  assert_eq!(s.write(scope, 5, &mut buf), 0);
}

#[test]
fn string_write_utf8() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s = v8::String::new(scope, "héllo").unwrap();
  let mut buf = [0xAAu8; 16];
  let n = s.write_utf8(scope, &mut buf, v8::WriteFlags::empty());
  assert_eq!(n, 6);
  assert_eq!(&buf[..n], "héllo".as_bytes());

  let mut buf = [0xAAu8; 16];
  let n = s.write_utf8(scope, &mut buf, v8::WriteFlags::NULL_TERMINATE);
  assert_eq!(n, 6);
  assert_eq!(buf[n], 0);

  // The terminator reserves a byte, and only whole code points are written:
  // "h" plus "é" needs 3 bytes, so a 3-byte buffer with NUL holds just "h".
  let mut buf = [0xAAu8; 3];
  let n = s.write_utf8(scope, &mut buf, v8::WriteFlags::NULL_TERMINATE);
  assert_eq!(n, 1);
  assert_eq!(buf[0], b'h');
  assert_eq!(buf[1], 0);
}

#[test]
fn string_write_utf8_lone_surrogate() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s = v8::String::new_from_two_byte(
    scope,
    &[0x61, 0xD800, 0x62],
    v8::NewStringType::Normal,
  )
  .unwrap();
  let mut buf = [0u8; 8];
  let n = s.write_utf8(scope, &mut buf, v8::WriteFlags::REPLACE_INVALID_UTF8);
  assert_eq!(&buf[..n], "a\u{FFFD}b".as_bytes());
  let n = s.write_utf8(scope, &mut buf, v8::WriteFlags::empty());
  assert_eq!(&buf[..n], &[0x61, 0xED, 0xA0, 0x80, 0x62]);
  assert_eq!(s.utf8_length(scope), 5);
}

#[test]
fn string_concat() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let foo = v8::String::new(scope, "foo").unwrap();
  let bar = v8::String::new(scope, "bar").unwrap();
  let foobar = v8::String::concat(scope, foo, bar);
  assert_eq!(foobar.length(), 6);
  assert_eq!(foobar.to_rust_string_lossy(scope), "foobar");
  // Concatenating with the empty string hands back the other side.
  let empty = v8::String::empty(scope);
  let left = v8::String::concat(scope, empty, foobar);
  assert_eq!(left.to_rust_string_lossy(scope), "foobar");
  let right = v8::String::concat(scope, foobar, empty);
  assert_eq!(right.to_rust_string_lossy(scope), "foobar");
}

#[test]
fn string_concat_over_max_length_degrades_to_empty() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let seed = "x".repeat(1024);
  let mut s = v8::String::new(scope, &seed).unwrap();
  // Doubling by self-concatenation builds only rope cells, so crossing the
  // length ceiling takes a few dozen cheap allocations.
  while s.length() <= v8::String::MAX_LENGTH / 2 {
    s = v8::String::concat(scope, s, s);
    assert_ne!(s.length(), 0);
  }
  let over = v8::String::concat(scope, s, s);
  assert_eq!(over.length(), 0);
  // The operands are untouched.
  assert!(s.length() > v8::String::MAX_LENGTH / 2);
}

#[test]
fn string_concat_allocation_failure_degrades_to_empty() {
  // First measure how many bytes two small strings cost.
  let isolate = &mut v8::Isolate::new(Default::default());
  let budget = {
    let scope = &mut v8::HandleScope::new(isolate);
    let _foo = v8::String::new(scope, "foo").unwrap();
    let _bar = v8::String::new(scope, "bar").unwrap();
    let mut stats = v8::HeapStatistics::default();
    scope.get_heap_statistics(&mut stats);
    stats.used_heap_size()
  };
  // A budget that fits both strings exactly leaves no room for a rope cell.
  let params = v8::CreateParams::default().heap_limits(0, budget);
  let isolate = &mut v8::Isolate::new(params);
  let scope = &mut v8::HandleScope::new(isolate);
  let foo = v8::String::new(scope, "foo").unwrap();
  let bar = v8::String::new(scope, "bar").unwrap();
  let joined = v8::String::concat(scope, foo, bar);
  assert_eq!(joined.length(), 0);
  assert_eq!(foo.to_rust_string_lossy(scope), "foo");
}

#[test]
fn string_survives_forced_garbage_collection() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s = v8::String::new(scope, "still here").unwrap();
  scope
    .request_garbage_collection_for_testing(v8::GarbageCollectionType::Full);
  scope.request_garbage_collection_for_testing(v8::GarbageCollectionType::Minor);
  assert_eq!(s.to_rust_string_lossy(scope), "still here");
}

#[test]
fn unrooted_string_is_collected() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let baseline = {
    let mut stats = v8::HeapStatistics::default();
    isolate.get_heap_statistics(&mut stats);
    stats.used_heap_size()
  };
  {
    let scope = &mut v8::HandleScope::new(isolate);
    let _s = v8::String::new(scope, "transient").unwrap();
  }
  isolate.low_memory_notification();
  let mut stats = v8::HeapStatistics::default();
  isolate.get_heap_statistics(&mut stats);
  assert_eq!(stats.used_heap_size(), baseline);
}

#[test]
fn external_twobyte_zero_copy_and_dispose_once() {
  let disposed = Rc::new(Cell::new(0));
  let dropped = Rc::new(Cell::new(0));
  let isolate = &mut v8::Isolate::new(Default::default());
  {
    let scope = &mut v8::HandleScope::new(isolate);
    let resource = Box::new(TrackedTwoByte {
      units: "extern!".encode_utf16().collect(),
      disposed: disposed.clone(),
      dropped: dropped.clone(),
    });
    let s = v8::String::new_external_twobyte(scope, resource).unwrap();
    assert!(s.is_external());
    assert!(s.is_external_twobyte());
    assert!(!s.is_external_onebyte());
    assert_eq!(s.length(), 7);
    assert_eq!(s.to_rust_string_lossy(scope), "extern!");
    // Rooted in the live scope; collection must not touch it.
    scope
      .request_garbage_collection_for_testing(v8::GarbageCollectionType::Full);
    assert_eq!(disposed.get(), 0);
    assert_eq!(s.to_rust_string_lossy(scope), "extern!");
  }
  // Scope gone: the next collection reclaims the string and signals the
  // resource exactly once.
  isolate.request_garbage_collection_for_testing(v8::GarbageCollectionType::Full);
  assert_eq!(disposed.get(), 1);
  assert_eq!(dropped.get(), 1);
  isolate.request_garbage_collection_for_testing(v8::GarbageCollectionType::Full);
  assert_eq!(disposed.get(), 1);
}

#[test]
fn external_onebyte_inflates_and_finalizes() {
  let disposed = Rc::new(Cell::new(0));
  let isolate = &mut v8::Isolate::new(Default::default());
  {
    let scope = &mut v8::HandleScope::new(isolate);
    let resource = Box::new(TrackedOneByte {
      bytes: vec![b'h', b'i', 0xE9],
      disposed: disposed.clone(),
    });
    let s = v8::String::new_external_onebyte(scope, resource).unwrap();
    assert!(s.is_external_onebyte());
    assert_eq!(s.length(), 3);
    assert_eq!(s.utf8_length(scope), 4);
    assert_eq!(s.to_rust_string_lossy(scope), "hié");
    assert!(s.contains_only_onebyte());
  }
  isolate.low_memory_notification();
  assert_eq!(disposed.get(), 1);
}

#[test]
fn external_static() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let s =
    v8::String::new_external_onebyte_static(scope, b"external").unwrap();
  assert!(s.is_external_onebyte());
  assert_eq!(s.to_rust_string_lossy(scope), "external");
  const UNITS: &[u16] = &[0x77, 0x69, 0x64, 0x65];
  let s = v8::String::new_external_twobyte_static(scope, UNITS).unwrap();
  assert!(s.is_external_twobyte());
  assert_eq!(s.to_rust_string_lossy(scope), "wide");
}

#[test]
fn external_construction_failure_drops_without_dispose() {
  let disposed = Rc::new(Cell::new(0));
  let dropped = Rc::new(Cell::new(0));
  // A zero-byte budget rejects every cell allocation.
  let params = v8::CreateParams::default().heap_limits(0, 0);
  let isolate = &mut v8::Isolate::new(params);
  let scope = &mut v8::HandleScope::new(isolate);
  let resource = Box::new(TrackedTwoByte {
    units: vec![1, 2, 3],
    disposed: disposed.clone(),
    dropped: dropped.clone(),
  });
  assert!(v8::String::new_external_twobyte(scope, resource).is_none());
  // No engine string was created, so the resource is released without a
  // reclamation signal.
  assert_eq!(dropped.get(), 1);
  assert_eq!(disposed.get(), 0);
}

#[test]
fn isolate_teardown_disposes_externals() {
  let disposed = Rc::new(Cell::new(0));
  let dropped = Rc::new(Cell::new(0));
  {
    let isolate = &mut v8::Isolate::new(Default::default());
    let scope = &mut v8::HandleScope::new(isolate);
    let resource = Box::new(TrackedTwoByte {
      units: vec![9, 9],
      disposed: disposed.clone(),
      dropped: dropped.clone(),
    });
    let s = v8::String::new_external_twobyte(scope, resource).unwrap();
    assert_eq!(s.length(), 2);
    assert_eq!(disposed.get(), 0);
  }
  assert_eq!(disposed.get(), 1);
  assert_eq!(dropped.get(), 1);
}

#[test]
fn allocation_failure_returns_none() {
  let params = v8::CreateParams::default().heap_limits(0, 0);
  let isolate = &mut v8::Isolate::new(params);
  let scope = &mut v8::HandleScope::new(isolate);
  assert!(v8::String::new(scope, "nope").is_none());
  // The canonical empty string lives outside the budget.
  let empty =
    v8::String::new_from_utf8(scope, b"", v8::NewStringType::Normal).unwrap();
  assert_eq!(empty.length(), 0);
}

#[test]
fn value_checks_and_casts() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);

  let s = v8::String::new(scope, "text").unwrap();
  let value: v8::Local<v8::Value> = s.into();
  assert!(value.is_string());
  assert!(!value.is_null_or_undefined());
  let back: v8::Local<v8::String> = value.try_into().unwrap();
  assert_eq!(back.length(), 4);
  let recast = unsafe { v8::String::cast(value) };
  assert_eq!(recast.length(), 4);
  assert!(
    v8::Local::<v8::Boolean>::try_from(value).is_err()
  );

  let t = v8::Boolean::new(scope, true);
  assert!(t.is_boolean());
  assert!(t.is_true());
  let t_value: v8::Local<v8::Value> = t.into();
  let err = v8::Local::<v8::String>::try_from(t_value).unwrap_err();
  assert_eq!(err.to_string(), "expected type `String`, got `Boolean`");

  let u = v8::undefined(scope);
  assert!(u.is_undefined());
  assert!(u.is_null_or_undefined());
  let n = v8::null(scope);
  assert!(n.is_null());
  assert!(!n.is_undefined());
}

#[test]
fn heap_statistics_track_usage() {
  let params = v8::CreateParams::default().heap_limits(0, 1 << 20);
  let isolate = &mut v8::Isolate::new(params);
  let mut stats = v8::HeapStatistics::default();
  isolate.get_heap_statistics(&mut stats);
  assert_eq!(stats.heap_size_limit(), 1 << 20);
  let before = stats.used_heap_size();
  let scope = &mut v8::HandleScope::new(isolate);
  let _s = v8::String::new(scope, "take up some room").unwrap();
  scope.get_heap_statistics(&mut stats);
  assert!(stats.used_heap_size() >= before + 2 * 17);
}

#[test]
fn rope_flattens_once_and_stays_flat() {
  let isolate = &mut v8::Isolate::new(Default::default());
  let scope = &mut v8::HandleScope::new(isolate);
  let a = v8::String::new(scope, "ab").unwrap();
  let b = v8::String::new(scope, "cd").unwrap();
  let ab = v8::String::concat(scope, a, b);
  let abab = v8::String::concat(scope, ab, ab);
  assert_eq!(abab.length(), 8);
  // First contiguous access flattens; repeated access agrees.
  assert_eq!(abab.to_rust_string_lossy(scope), "abcdabcd");
  assert_eq!(abab.utf8_length(scope), 8);
  let mut buf = [0u16; 8];
  assert_eq!(abab.write(scope, 0, &mut buf), 8);
  assert_eq!(buf[0], 0x61);
  assert_eq!(buf[7], 0x64);
}
