//! # Primea Objects Testkit
//!
//! Testing utilities for the object codecs.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known ids and encodings for cross-implementation checks
//! - **Generators**: Proptest strategies for every value kind
//! - **Fixtures**: A small actor tree with a known module
//!
//! ## Golden Vectors
//!
//! ```rust
//! use primea_objects_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, actual) in verify_all_vectors() {
//!     assert!(ok, "{name}: got {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use primea_objects::{cbor, Value};
//! use primea_objects_testkit::generators::value;
//!
//! proptest! {
//!     #[test]
//!     fn roundtrip(v in value()) {
//!         prop_assert_eq!(cbor::decode(&cbor::encode(&v)).unwrap(), v);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use primea_objects_testkit::fixtures::ActorFixture;
//!
//! let fixture = ActorFixture::new();
//! let func = fixture.func_ref(&[0, 1], "main");
//! assert_eq!(func.params.as_deref(), Some(&["i32".to_string()][..]));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::ActorFixture;
pub use generators::{actor_ref, function_ref, id, module_ref, value};
pub use vectors::{derivation_vectors, encoding_vectors, verify_all_vectors};
