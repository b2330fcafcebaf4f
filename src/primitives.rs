// Copyright 2026 the v8shim authors. All rights reserved. MIT license.
use crate::Boolean;
use crate::HandleScope;
use crate::Local;
use crate::Primitive;

#[inline(always)]
pub fn null<'s>(scope: &mut HandleScope<'s>) -> Local<'s, Primitive> {
  let data = scope.null_singleton();
  scope.make_local(data)
}

#[inline(always)]
pub fn undefined<'s>(scope: &mut HandleScope<'s>) -> Local<'s, Primitive> {
  let data = scope.undefined_singleton();
  scope.make_local(data)
}

impl Boolean {
  #[inline(always)]
  pub fn new<'s>(scope: &mut HandleScope<'s>, value: bool) -> Local<'s, Boolean> {
    let data = scope.boolean_singleton(value);
    scope.make_local(data)
  }
}
