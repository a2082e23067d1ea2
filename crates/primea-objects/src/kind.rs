//! Type discrimination shared by both codecs.
//!
//! Constructed values know their [`Kind`] (see [`Value::kind`]). Foreign
//! input, a decoded CBOR item or a parsed JSON document, is classified by
//! shape with the same precedence in both formats:
//!
//! 1. raw bytes (CBOR byte string, JSON string) => `Data`
//! 2. array => `Sequence`
//! 3. a map whose only key is `"/"` => `Link`
//! 4. nominal identity (CBOR tag, JSON `"type"` field) => that variant
//! 5. anything else => `Invalid`
//!
//! [`Value::kind`]: crate::value::Value::kind

use bytes::Bytes;
use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::cbor::tags;
use crate::id::Id;
use crate::refs::{FuncIdentifier, FunctionRef, ModuleRef};
use crate::value::Value;

/// Key of the single field of a link record.
pub const LINK_KEY: &str = "/";

/// Discriminant of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Data,
    Sequence,
    Link,
    Id,
    FunctionRef,
    ModuleRef,
    ActorRef,
    Invalid,
}

impl Kind {
    /// Stable short name, also used as the JSON `"type"` of records.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Data => "data",
            Kind::Sequence => "elem",
            Kind::Link => "link",
            Kind::Id => "id",
            Kind::FunctionRef => "func",
            Kind::ModuleRef => "mod",
            Kind::ActorRef => "actor",
            Kind::Invalid => "invalid",
        }
    }

    /// Kind of a record from its JSON `"type"` name.
    pub fn from_record_name(name: &str) -> Kind {
        match name {
            "id" => Kind::Id,
            "func" => Kind::FunctionRef,
            "mod" => Kind::ModuleRef,
            "actor" => Kind::ActorRef,
            _ => Kind::Invalid,
        }
    }

    /// Kind of a CBOR tag from the reserved table.
    pub fn from_tag(tag: u64) -> Kind {
        match tag {
            tags::ID => Kind::Id,
            tags::LINK => Kind::Link,
            tags::FUNC => Kind::FunctionRef,
            tags::MODULE => Kind::ModuleRef,
            tags::ACTOR => Kind::ActorRef,
            _ => Kind::Invalid,
        }
    }

    /// Placeholder value of this kind, used to fill a typed argument the
    /// caller left out.
    ///
    /// Ids and references default to their empty forms: an empty id, a
    /// module with no exports, a function with an empty name. `Link` has no
    /// default since a link must point at some payload, and `ActorRef` has
    /// none since an actor needs a module. `Invalid` never has one.
    pub fn default_value(self) -> Option<Value> {
        let empty_id = || Id::new(Bytes::new());
        match self {
            Kind::Data => Some(Value::Data(Bytes::new())),
            Kind::Sequence => Some(Value::Sequence(Vec::new())),
            Kind::Id => Some(Value::Id(empty_id())),
            Kind::FunctionRef => Some(Value::Func(FunctionRef::new(
                FuncIdentifier::export(""),
                empty_id(),
                None,
            ))),
            Kind::ModuleRef => Some(Value::Module(ModuleRef::new(
                empty_id(),
                0,
                BTreeMap::new(),
            ))),
            Kind::Link | Kind::ActorRef | Kind::Invalid => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a decoded CBOR item.
pub fn classify_cbor(value: &CborValue) -> Kind {
    match value {
        CborValue::Bytes(_) => Kind::Data,
        CborValue::Array(_) => Kind::Sequence,
        CborValue::Map(entries) if is_cbor_link_map(entries) => Kind::Link,
        CborValue::Tag(tag, _) => Kind::from_tag(*tag),
        _ => Kind::Invalid,
    }
}

/// Classify a JSON document.
pub fn classify_json(value: &JsonValue) -> Kind {
    match value {
        JsonValue::String(_) => Kind::Data,
        JsonValue::Array(_) => Kind::Sequence,
        JsonValue::Object(map) if map.len() == 1 && map.contains_key(LINK_KEY) => Kind::Link,
        JsonValue::Object(map) => match map.get("type") {
            Some(JsonValue::String(name)) => Kind::from_record_name(name),
            _ => Kind::Invalid,
        },
        _ => Kind::Invalid,
    }
}

pub(crate) fn is_cbor_link_map(entries: &[(CborValue, CborValue)]) -> bool {
    matches!(entries, [(CborValue::Text(key), _)] if key == LINK_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_cbor_shapes() {
        assert_eq!(classify_cbor(&CborValue::Bytes(vec![])), Kind::Data);
        assert_eq!(classify_cbor(&CborValue::Array(vec![])), Kind::Sequence);
        assert_eq!(
            classify_cbor(&CborValue::Tag(tags::LINK, Box::new(CborValue::Null))),
            Kind::Link
        );
        assert_eq!(
            classify_cbor(&CborValue::Map(vec![(
                CborValue::Text("/".into()),
                CborValue::Bytes(vec![1])
            )])),
            Kind::Link
        );
        assert_eq!(
            classify_cbor(&CborValue::Tag(tags::ACTOR, Box::new(CborValue::Null))),
            Kind::ActorRef
        );
    }

    #[test]
    fn test_classify_cbor_invalid() {
        assert_eq!(classify_cbor(&CborValue::Null), Kind::Invalid);
        assert_eq!(classify_cbor(&CborValue::Bool(true)), Kind::Invalid);
        assert_eq!(classify_cbor(&CborValue::Integer(7.into())), Kind::Invalid);
        assert_eq!(
            classify_cbor(&CborValue::Tag(99, Box::new(CborValue::Null))),
            Kind::Invalid
        );
        // a map with more than the link key is not a link
        assert_eq!(
            classify_cbor(&CborValue::Map(vec![
                (CborValue::Text("/".into()), CborValue::Null),
                (CborValue::Text("x".into()), CborValue::Null),
            ])),
            Kind::Invalid
        );
    }

    #[test]
    fn test_classify_json() {
        assert_eq!(classify_json(&json!("0x00")), Kind::Data);
        assert_eq!(classify_json(&json!([])), Kind::Sequence);
        assert_eq!(classify_json(&json!({"/": "0x01"})), Kind::Link);
        assert_eq!(classify_json(&json!({"type": "func"})), Kind::FunctionRef);
        assert_eq!(classify_json(&json!({"type": "mod"})), Kind::ModuleRef);
        assert_eq!(classify_json(&json!({"type": "actor"})), Kind::ActorRef);
        assert_eq!(classify_json(&json!({"type": "id"})), Kind::Id);
        assert_eq!(classify_json(&json!({"type": "message"})), Kind::Invalid);
        assert_eq!(classify_json(&json!(null)), Kind::Invalid);
        assert_eq!(classify_json(&json!(true)), Kind::Invalid);
        assert_eq!(classify_json(&json!(12)), Kind::Invalid);
        assert_eq!(classify_json(&json!({})), Kind::Invalid);
    }

    #[test]
    fn test_kind_names() {
        for kind in [Kind::Id, Kind::FunctionRef, Kind::ModuleRef, Kind::ActorRef] {
            assert_eq!(Kind::from_record_name(kind.name()), kind);
        }
        assert_eq!(Kind::Sequence.to_string(), "elem");
    }

    #[test]
    fn test_default_values() {
        let with_default = [
            Kind::Data,
            Kind::Sequence,
            Kind::Id,
            Kind::FunctionRef,
            Kind::ModuleRef,
        ];
        for kind in with_default {
            let value = kind.default_value().unwrap();
            assert_eq!(value.kind(), kind);

            let bytes = crate::cbor::encode(&value);
            assert_eq!(crate::cbor::decode(&bytes).unwrap(), value, "{kind}");
            let strict = crate::cbor::CodecConfig::strict();
            assert_eq!(crate::cbor::decode_with(&bytes, &strict).unwrap(), value);
        }

        for kind in [Kind::Link, Kind::ActorRef, Kind::Invalid] {
            assert!(kind.default_value().is_none(), "{kind}");
        }
    }

    #[test]
    fn test_default_module_is_empty() {
        match Kind::ModuleRef.default_value() {
            Some(Value::Module(module)) => {
                assert!(module.exports.is_empty());
                assert!(module.id.as_bytes().is_empty());
                assert_eq!(*module.persist, Value::Sequence(Vec::new()));
            }
            other => panic!("unexpected default: {other:?}"),
        }
    }
}
