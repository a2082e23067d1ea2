//! # Primea Objects
//!
//! The reference object model of an actor runtime: identifiers, function,
//! module and actor references, raw data, sequences and content links.
//!
//! This crate contains no I/O, no storage, no networking. It defines the
//! values and their two encodings.
//!
//! ## Key Types
//!
//! - [`Id`] - Opaque byte identifier, content-addressed when derived
//! - [`FunctionRef`], [`ModuleRef`], [`ActorRef`] - Reference records
//! - [`Value`] - The closed sum of everything a message can carry
//! - [`Kind`] - Discriminant shared by both codecs
//! - [`Message`] - Mutable message record with change observers
//!
//! ## Encodings
//!
//! - [`cbor`] - Canonical binary form with reserved tags 41-45. Lossless.
//! - [`json`] - Readable form with a verbose and a compact projection.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use primea_objects::{actor_path_to_id, cbor, ActorRef, Id, ModuleRef, Value};
//!
//! let mut exports = BTreeMap::new();
//! exports.insert("main".to_string(), vec!["i32".to_string()]);
//!
//! let actor_id = actor_path_to_id(&[0, 1]).unwrap();
//! let module = ModuleRef::new(Id::new(vec![0x01]), 0, exports);
//! let actor = ActorRef::new(actor_id, module);
//!
//! let func = Value::Func(actor.get_func_ref("main").unwrap());
//! let bytes = cbor::encode(&func);
//! assert_eq!(cbor::decode(&bytes).unwrap(), func);
//! ```

pub mod cbor;
pub mod derive;
pub mod error;
pub mod id;
pub mod json;
pub mod kind;
pub mod message;
pub mod refs;
pub mod value;

pub use cbor::{decode, decode_with, encode, CodecConfig};
pub use derive::actor_path_to_id;
pub use error::{ObjectError, Result};
pub use id::Id;
pub use json::{from_json, to_json, to_json_with, JsonOptions};
pub use kind::{classify_cbor, classify_json, Kind};
pub use message::{Message, MessageBuilder, MessageEvent, MessageField, ObserverId};
pub use refs::{ActorRef, FuncIdentifier, FunctionRef, ModuleCode, ModuleRef};
pub use value::{Link, Value};
