// Copyright 2026 the v8shim authors. All rights reserved. MIT license.

//! A V8-style string embedding API over a small native string engine.
//!
//! The crate exposes the familiar shape of the `v8::String` surface: typed
//! [`Local`] handles rooted in [`HandleScope`]s, fallible constructors that
//! return `Option<Local>` instead of throwing, and external strings whose
//! character buffers stay owned by the application until the garbage
//! collector disposes of them.
//!
//! # Example
//!
//! ```rust
//! use v8shim as v8;
//!
//! let isolate = &mut v8::Isolate::new(Default::default());
//! let scope = &mut v8::HandleScope::new(isolate);
//!
//! let hello = v8::String::new(scope, "Hello, ").unwrap();
//! let world = v8::String::new(scope, "世界!").unwrap();
//! let greeting = v8::String::concat(scope, hello, world);
//!
//! assert_eq!(greeting.length(), 10);
//! assert_eq!(greeting.to_rust_string_lossy(scope), "Hello, 世界!");
//! ```
//!
//! # External strings
//!
//! An external string reads its characters straight out of an application
//! buffer. Ownership of the boxed resource transfers to the isolate; when
//! the string becomes unreachable and a collection runs (or the isolate is
//! dropped), the resource's `dispose` is called exactly once and the
//! resource is released. See [`ExternalStringResource`] and
//! [`ExternalOneByteStringResource`].

mod data;
mod encoding;
mod external;
mod handle_scope;
mod heap;
mod isolate;
mod isolate_create_params;
mod local;
mod primitives;
mod string;
mod value;

pub use crate::data::Boolean;
pub use crate::data::Data;
pub use crate::data::DataError;
pub use crate::data::Name;
pub use crate::data::Primitive;
pub use crate::data::String;
pub use crate::data::Value;
pub use crate::external::ExternalOneByteStringResource;
pub use crate::external::ExternalStringResource;
pub use crate::handle_scope::HandleScope;
pub use crate::isolate::GarbageCollectionType;
pub use crate::isolate::HeapStatistics;
pub use crate::isolate::Isolate;
pub use crate::isolate_create_params::CreateParams;
pub use crate::local::Local;
pub use crate::primitives::null;
pub use crate::primitives::undefined;
pub use crate::string::NewStringType;
pub use crate::string::WriteFlags;
