//! JSON codec.
//!
//! Records are flat objects discriminated by `"type"`:
//!
//! ```json
//! {"type": "func", "actor_id": "0x..", "private": false, "name": "main", "gas": 0, "params": ["i32"]}
//! {"type": "mod", "id": "0x..", "module_type": 0, "code": "0x..", "exports": {..}, "persist": [..]}
//! {"type": "actor", "id": "0x..", "module": {"type": "mod", ..}}
//! {"type": "id", "id": "0x.."}
//! ```
//!
//! Data is a `0x`-prefixed lowercase hex string, a Sequence is an array and
//! a Link is `{"/": payload}`.
//!
//! The non-verbose projection drops `params`, `exports` and `persist`.
//! Decoding it restores the absence values of those fields, so only the
//! fields that were rendered survive a round trip.

use bytes::Bytes;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;

use crate::error::{ObjectError, Result};
use crate::id::Id;
use crate::kind::{classify_json, Kind, LINK_KEY};
use crate::refs::{ActorRef, FuncIdentifier, FunctionRef, ModuleCode, ModuleRef};
use crate::value::{Link, Value};

/// Marker appended to truncated code previews.
pub const ELLIPSIS: &str = "...";

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Include `params`, `exports` and `persist`.
    pub verbose: bool,
    /// When not verbose, render at most this many bytes of inline code.
    pub code_preview: Option<usize>,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            code_preview: None,
        }
    }
}

impl JsonOptions {
    pub fn verbose(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }
}

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse hex, stripping a `0x` prefix if present.
pub fn from_prefixed_hex(s: &str) -> Result<Bytes> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(digits)?.into())
}

/// Render a value.
pub fn to_json(value: &Value, verbose: bool) -> JsonValue {
    to_json_with(value, &JsonOptions::verbose(verbose))
}

/// Render a value with explicit options.
pub fn to_json_with(value: &Value, options: &JsonOptions) -> JsonValue {
    match value {
        Value::Data(bytes) => JsonValue::String(to_prefixed_hex(bytes)),
        Value::Sequence(items) => {
            JsonValue::Array(items.iter().map(|v| to_json_with(v, options)).collect())
        }
        Value::Link(link) => link_to_json(link, options),
        Value::Id(id) => json!({ "type": Kind::Id.name(), "id": to_prefixed_hex(id.as_bytes()) }),
        Value::Func(func) => func_to_json(func, options),
        Value::Module(module) => module_to_json(module, options),
        Value::Actor(actor) => json!({
            "type": Kind::ActorRef.name(),
            "id": to_prefixed_hex(actor.id.as_bytes()),
            "module": module_to_json(&actor.module, options),
        }),
    }
}

fn link_to_json(link: &Link, options: &JsonOptions) -> JsonValue {
    let mut map = Map::new();
    map.insert(LINK_KEY.to_string(), to_json_with(link.payload(), options));
    JsonValue::Object(map)
}

fn func_to_json(func: &FunctionRef, options: &JsonOptions) -> JsonValue {
    let mut map = Map::new();
    map.insert("type".into(), Kind::FunctionRef.name().into());
    map.insert("actor_id".into(), to_prefixed_hex(func.actor_id.as_bytes()).into());
    map.insert("private".into(), func.identifier.private.into());
    map.insert("name".into(), func.identifier.name.clone().into());
    map.insert("gas".into(), func.gas.into());
    if options.verbose {
        if let Some(params) = &func.params {
            map.insert("params".into(), json!(params));
        }
    }
    JsonValue::Object(map)
}

fn module_to_json(module: &ModuleRef, options: &JsonOptions) -> JsonValue {
    let code = match &module.code {
        ModuleCode::Inline(bytes) => match options.code_preview {
            Some(limit) if !options.verbose && bytes.len() > limit => {
                JsonValue::String(format!("{}{}", to_prefixed_hex(&bytes[..limit]), ELLIPSIS))
            }
            _ => JsonValue::String(to_prefixed_hex(bytes)),
        },
        ModuleCode::Linked(link) => link_to_json(link, options),
    };

    let mut map = Map::new();
    map.insert("type".into(), Kind::ModuleRef.name().into());
    map.insert("id".into(), to_prefixed_hex(module.id.as_bytes()).into());
    map.insert("module_type".into(), module.module_type.into());
    map.insert("code".into(), code);
    if options.verbose {
        map.insert("exports".into(), json!(module.exports));
        map.insert("persist".into(), to_json_with(&module.persist, options));
    }
    JsonValue::Object(map)
}

/// Reconstruct a value from its JSON form.
pub fn from_json(json: &JsonValue) -> Result<Value> {
    match decode_value(json) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::debug!(error = %e, "json decode failed");
            Err(e)
        }
    }
}

fn decode_value(json: &JsonValue) -> Result<Value> {
    match (classify_json(json), json) {
        (Kind::Data, JsonValue::String(s)) => Ok(Value::Data(from_prefixed_hex(s)?)),
        (Kind::Sequence, JsonValue::Array(items)) => items
            .iter()
            .map(decode_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        (Kind::Link, JsonValue::Object(map)) => {
            let payload = field(map, LINK_KEY, "link")?;
            Ok(Value::link(decode_value(payload)?))
        }
        (Kind::Id, JsonValue::Object(map)) => Ok(Value::Id(id_field(map, "id", "id")?)),
        (Kind::FunctionRef, JsonValue::Object(map)) => Ok(Value::Func(decode_func(map)?)),
        (Kind::ModuleRef, JsonValue::Object(map)) => Ok(Value::Module(decode_module(map)?)),
        (Kind::ActorRef, JsonValue::Object(map)) => {
            let module = match decode_value(field(map, "module", "actor")?)? {
                Value::Module(module) => module,
                other => {
                    return Err(malformed(format!(
                        "actor module: expected mod, got {}",
                        other.kind()
                    )))
                }
            };
            Ok(Value::Actor(ActorRef {
                id: id_field(map, "id", "actor")?,
                module,
            }))
        }
        (kind, other) => Err(ObjectError::UnsupportedType(format!(
            "cannot decode {other} as {kind}"
        ))),
    }
}

fn decode_func(map: &Map<String, JsonValue>) -> Result<FunctionRef> {
    let private = match field(map, "private", "func")? {
        JsonValue::Bool(b) => *b,
        _ => return Err(malformed("func.private: expected bool")),
    };
    let name = match field(map, "name", "func")? {
        JsonValue::String(s) => s.clone(),
        _ => return Err(malformed("func.name: expected string")),
    };
    let params = match map.get("params") {
        None | Some(JsonValue::Null) => None,
        Some(params) => Some(string_list(params, "func.params")?),
    };
    let gas = match map.get("gas") {
        None => 0,
        Some(gas) => expect_u64(gas, "func.gas")?,
    };

    Ok(FunctionRef {
        identifier: FuncIdentifier { private, name },
        actor_id: id_field(map, "actor_id", "func")?,
        params,
        gas,
    })
}

fn decode_module(map: &Map<String, JsonValue>) -> Result<ModuleRef> {
    let code = match map.get("code") {
        None => ModuleCode::default(),
        // a truncated preview carries no usable code
        Some(JsonValue::String(s)) if s.ends_with(ELLIPSIS) => ModuleCode::default(),
        Some(JsonValue::String(s)) => ModuleCode::Inline(from_prefixed_hex(s)?),
        Some(other) => match decode_value(other)? {
            Value::Link(link) => ModuleCode::Linked(link),
            value => {
                return Err(malformed(format!(
                    "mod.code: expected hex or link, got {}",
                    value.kind()
                )))
            }
        },
    };

    let exports = match map.get("exports") {
        None => BTreeMap::new(),
        Some(JsonValue::Object(exports)) => exports
            .iter()
            .map(|(name, params)| Ok((name.clone(), string_list(params, "mod.exports")?)))
            .collect::<Result<_>>()?,
        Some(_) => return Err(malformed("mod.exports: expected object")),
    };

    let persist = match map.get("persist") {
        None => Value::Sequence(Vec::new()),
        Some(persist) => decode_value(persist)?,
    };

    Ok(ModuleRef {
        id: id_field(map, "id", "mod")?,
        module_type: expect_u64(field(map, "module_type", "mod")?, "mod.module_type")?,
        exports,
        persist: Box::new(persist),
        code,
    })
}

fn malformed(msg: impl Into<String>) -> ObjectError {
    ObjectError::MalformedEncoding(msg.into())
}

fn field<'a>(map: &'a Map<String, JsonValue>, key: &str, record: &str) -> Result<&'a JsonValue> {
    map.get(key)
        .ok_or_else(|| malformed(format!("{record}: missing field `{key}`")))
}

fn id_field(map: &Map<String, JsonValue>, key: &str, record: &str) -> Result<Id> {
    match field(map, key, record)? {
        JsonValue::String(s) => Ok(Id::new(from_prefixed_hex(s)?)),
        _ => Err(malformed(format!("{record}.{key}: expected hex string"))),
    }
}

fn expect_u64(value: &JsonValue, what: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| malformed(format!("{what}: expected unsigned integer")))
}

fn string_list(value: &JsonValue, what: &str) -> Result<Vec<String>> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s.clone()),
                _ => Err(malformed(format!("{what}: expected string"))),
            })
            .collect(),
        _ => Err(malformed(format!("{what}: expected array"))),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_json(self, true).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        from_json(&json).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> ModuleRef {
        let mut exports = BTreeMap::new();
        exports.insert("main".to_string(), vec!["i32".to_string(), "i64".to_string()]);
        ModuleRef::new(Id::new(vec![0xaa, 0xbb]), 3, exports)
            .with_persist(Value::Sequence(vec![Value::data(vec![0x01])]))
            .with_code(ModuleCode::Inline(Bytes::from_static(&[0x00, 0x61, 0x73, 0x6d])))
    }

    fn actor() -> ActorRef {
        ActorRef::new(Id::new(vec![0x02]), module())
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(to_prefixed_hex(&[0xde, 0xad]), "0xdead");
        assert_eq!(from_prefixed_hex("0xdead").unwrap().as_ref(), &[0xde, 0xad]);
        assert_eq!(from_prefixed_hex("dead").unwrap().as_ref(), &[0xde, 0xad]);
        assert_eq!(to_prefixed_hex(&[]), "0x");
        assert!(matches!(
            from_prefixed_hex("0xzz"),
            Err(ObjectError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_module_verbose_shape() {
        let json = to_json(&Value::Module(module()), true);
        assert_eq!(
            json,
            json!({
                "type": "mod",
                "id": "0xaabb",
                "module_type": 3,
                "code": "0x0061736d",
                "exports": {"main": ["i32", "i64"]},
                "persist": ["0x01"],
            })
        );
    }

    #[test]
    fn test_module_compact_shape() {
        let json = to_json(&Value::Module(module()), false);
        assert_eq!(
            json,
            json!({"type": "mod", "id": "0xaabb", "module_type": 3, "code": "0x0061736d"})
        );

        let decoded = match from_json(&json).unwrap() {
            Value::Module(m) => m,
            other => panic!("expected module, got {other:?}"),
        };
        assert_eq!(decoded.id, module().id);
        assert_eq!(decoded.code, module().code);
        assert!(decoded.exports.is_empty());
        assert_eq!(*decoded.persist, Value::Sequence(vec![]));
    }

    #[test]
    fn test_code_preview() {
        let options = JsonOptions {
            verbose: false,
            code_preview: Some(2),
        };
        let json = to_json_with(&Value::Module(module()), &options);
        assert_eq!(json["code"], "0x0061...");

        match from_json(&json).unwrap() {
            Value::Module(m) => assert_eq!(m.code, ModuleCode::default()),
            other => panic!("expected module, got {other:?}"),
        }

        // verbose output ignores the preview
        let verbose = JsonOptions {
            verbose: true,
            code_preview: Some(2),
        };
        assert_eq!(to_json_with(&Value::Module(module()), &verbose)["code"], "0x0061736d");
    }

    #[test]
    fn test_func_ref_projection() {
        let func = actor().get_func_ref("main").unwrap().with_gas(7);
        let verbose = to_json(&Value::Func(func.clone()), true);
        assert_eq!(verbose["params"], json!(["i32", "i64"]));
        assert_eq!(from_json(&verbose).unwrap(), Value::Func(func.clone()));

        let compact = to_json(&Value::Func(func.clone()), false);
        assert!(compact.get("params").is_none());
        assert_eq!(compact["gas"], 7);
        match from_json(&compact).unwrap() {
            Value::Func(decoded) => {
                assert_eq!(decoded.params, None);
                assert_eq!(decoded.identifier, func.identifier);
                assert_eq!(decoded.actor_id, func.actor_id);
                assert_eq!(decoded.gas, 7);
            }
            other => panic!("expected func, got {other:?}"),
        }
    }

    #[test]
    fn test_actor_roundtrip() {
        let value = Value::Actor(actor());
        assert_eq!(from_json(&to_json(&value, true)).unwrap(), value);
    }

    #[test]
    fn test_link_and_sequence() {
        let value = Value::Sequence(vec![
            Value::link(Value::Id(Id::new(vec![0x05]))),
            Value::data(vec![0x10, 0x20]),
        ]);
        let json = to_json(&value, true);
        assert_eq!(
            json,
            json!([{"/": {"type": "id", "id": "0x05"}}, "0x1020"])
        );
        assert_eq!(from_json(&json).unwrap(), value);
    }

    #[test]
    fn test_linked_code() {
        let code = ModuleCode::Linked(Link::new(Value::data(vec![0xff])));
        let value = Value::Module(module().with_code(code));
        let json = to_json(&value, false);
        assert_eq!(json["code"], json!({"/": "0xff"}));
        match from_json(&json).unwrap() {
            Value::Module(m) => {
                assert_eq!(m.code, ModuleCode::Linked(Link::new(Value::data(vec![0xff]))))
            }
            other => panic!("expected module, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_inputs() {
        for input in [json!(null), json!(true), json!(42), json!({"type": "message"})] {
            assert!(matches!(
                from_json(&input),
                Err(ObjectError::UnsupportedType(_))
            ));
        }
        assert!(matches!(
            from_json(&json!({"type": "func", "name": "x"})),
            Err(ObjectError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_serde_impls() {
        let value = Value::Actor(actor());
        let text = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);

        assert!(serde_json::from_str::<Value>("true").is_err());
    }
}
