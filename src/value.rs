// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use crate::Value;
use crate::heap::{HeapKind, PrimitiveKind};

impl Value {
  /// Returns true if this value is the undefined value. See ECMA-262 4.3.10.
  pub fn is_undefined(&self) -> bool {
    matches!(
      self.0.kind(),
      HeapKind::Primitive(PrimitiveKind::Undefined)
    )
  }

  /// Returns true if this value is the null value. See ECMA-262 4.3.11.
  pub fn is_null(&self) -> bool {
    matches!(self.0.kind(), HeapKind::Primitive(PrimitiveKind::Null))
  }

  /// Returns true if this value is either the null or the undefined value.
  pub fn is_null_or_undefined(&self) -> bool {
    self.is_null() || self.is_undefined()
  }

  /// Returns true if this value is a boolean value.
  pub fn is_boolean(&self) -> bool {
    matches!(
      self.0.kind(),
      HeapKind::Primitive(PrimitiveKind::Boolean(_))
    )
  }

  /// Returns true if this value is true.
  pub fn is_true(&self) -> bool {
    matches!(
      self.0.kind(),
      HeapKind::Primitive(PrimitiveKind::Boolean(true))
    )
  }

  /// Returns true if this value is false.
  pub fn is_false(&self) -> bool {
    matches!(
      self.0.kind(),
      HeapKind::Primitive(PrimitiveKind::Boolean(false))
    )
  }

  /// Returns true if this value is an instance of the String type.
  /// See ECMA-262 8.4.
  pub fn is_string(&self) -> bool {
    matches!(self.0.kind(), HeapKind::String(_))
  }

  pub(crate) fn type_repr(&self) -> &'static str {
    match self.0.kind() {
      HeapKind::Primitive(PrimitiveKind::Undefined) => "Undefined",
      HeapKind::Primitive(PrimitiveKind::Null) => "Null",
      HeapKind::Primitive(PrimitiveKind::Boolean(_)) => "Boolean",
      HeapKind::String(_) => "String",
    }
  }
}
