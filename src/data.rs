// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use std::mem::transmute;
use std::ops::Deref;

use crate::Local;
use crate::heap::HeapData;

macro_rules! impl_deref {
  ($sub:ident, $sup:ident) => {
    impl Deref for $sub {
      type Target = $sup;
      fn deref(&self) -> &Self::Target {
        unsafe { &*(self as *const _ as *const Self::Target) }
      }
    }
  };
}

macro_rules! impl_from {
  ($sub:ident, $sup:ident) => {
    impl<'s> From<Local<'s, $sub>> for Local<'s, $sup> {
      fn from(l: Local<'s, $sub>) -> Self {
        unsafe { transmute(l) }
      }
    }
  };
}

/// The superclass of objects that can reside on the engine's heap.
///
/// All handle types are `#[repr(transparent)]` views over the same heap
/// cell; subtype relations are pointer reinterpretations guarded by the
/// cell's runtime tag.
#[repr(transparent)]
pub struct Data(pub(crate) HeapData);

/// The superclass of all JavaScript values.
#[repr(transparent)]
pub struct Value(pub(crate) HeapData);

impl_deref!(Value, Data);
impl_from!(Value, Data);

/// The superclass of primitive values. See ECMA-262 4.3.2.
#[repr(transparent)]
pub struct Primitive(pub(crate) HeapData);

impl_deref!(Primitive, Value);
impl_from!(Primitive, Value);
impl_from!(Primitive, Data);

/// A primitive boolean value.
#[repr(transparent)]
pub struct Boolean(pub(crate) HeapData);

impl_deref!(Boolean, Primitive);
impl_from!(Boolean, Primitive);
impl_from!(Boolean, Value);
impl_from!(Boolean, Data);

/// A superclass for symbols and strings.
#[repr(transparent)]
pub struct Name(pub(crate) HeapData);

impl_deref!(Name, Value);
impl_from!(Name, Value);
impl_from!(Name, Data);

/// A JavaScript string value (ECMA-262, 4.3.17).
#[repr(transparent)]
pub struct String(pub(crate) HeapData);

impl_deref!(String, Name);
impl_from!(String, Name);
impl_from!(String, Value);
impl_from!(String, Data);

/// The error produced by a failed fallible downcast.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataError {
  BadType {
    actual: &'static str,
    expected: &'static str,
  },
}

impl DataError {
  pub(crate) fn bad_type<T>(actual: &'static str) -> Self {
    Self::BadType {
      actual,
      expected: std::any::type_name::<T>().rsplit("::").next().unwrap(),
    }
  }
}

impl std::fmt::Display for DataError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::BadType { actual, expected } => {
        write!(f, "expected type `{expected}`, got `{actual}`")
      }
    }
  }
}

impl std::error::Error for DataError {}

impl<'s> TryFrom<Local<'s, Value>> for Local<'s, String> {
  type Error = DataError;
  fn try_from(value: Local<'s, Value>) -> Result<Self, Self::Error> {
    if value.is_string() {
      Ok(unsafe { transmute::<Local<'s, Value>, Self>(value) })
    } else {
      Err(DataError::bad_type::<String>(value.type_repr()))
    }
  }
}

impl<'s> TryFrom<Local<'s, Value>> for Local<'s, Boolean> {
  type Error = DataError;
  fn try_from(value: Local<'s, Value>) -> Result<Self, Self::Error> {
    if value.is_boolean() {
      Ok(unsafe { transmute::<Local<'s, Value>, Self>(value) })
    } else {
      Err(DataError::bad_type::<Boolean>(value.type_repr()))
    }
  }
}
