//! Binary codec: deterministic CBOR with reserved tags.
//!
//! Every record is a positional array wrapped in its tag:
//!
//! | tag | record      | payload                                         |
//! |-----|-------------|-------------------------------------------------|
//! | 41  | Id          | byte string                                     |
//! | 42  | Link        | any value                                       |
//! | 43  | FunctionRef | `[[private, name], params \| null, actor_id, gas]` |
//! | 44  | ModuleRef   | `[id, module_type, exports, persist, code]`      |
//! | 45  | ActorRef    | `[id, module_ref]`                               |
//!
//! Data is a plain byte string and a Sequence a plain array.
//!
//! Output follows RFC 8949 Core Deterministic Encoding (smallest integer
//! heads, definite lengths, map keys sorted by encoded bytes). Field order
//! and tag numbers are part of the wire format and must never change.

use ciborium::value::Value as CborValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Cursor;

use crate::error::{ObjectError, Result};
use crate::id::Id;
use crate::kind::{classify_cbor, Kind};
use crate::refs::{ActorRef, FuncIdentifier, FunctionRef, ModuleCode, ModuleRef};
use crate::value::Value;

/// Reserved CBOR tags. New variants claim unused numbers.
pub mod tags {
    pub const ID: u64 = 41;
    pub const LINK: u64 = 42;
    pub const FUNC: u64 = 43;
    pub const MODULE: u64 = 44;
    pub const ACTOR: u64 = 45;
}

/// Default ceiling on encoded input (1 MiB).
pub const DEFAULT_MAX_SIZE: usize = 1024 * 1024;

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Inputs longer than this are rejected before parsing.
    pub max_size: usize,
    /// Reject input that is not byte-identical to its canonical encoding.
    pub strict: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            strict: false,
        }
    }
}

impl CodecConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Encode a value to canonical CBOR bytes.
pub fn encode(value: &Value) -> Vec<u8> {
    let bytes = canonical_bytes(&to_cbor(value));
    tracing::trace!(kind = %value.kind(), len = bytes.len(), "encoded value");
    bytes
}

/// Decode a value with the default configuration.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    decode_with(bytes, &CodecConfig::default())
}

/// Decode a value.
pub fn decode_with(bytes: &[u8], config: &CodecConfig) -> Result<Value> {
    match decode_inner(bytes, config) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::debug!(error = %e, len = bytes.len(), "cbor decode failed");
            Err(e)
        }
    }
}

fn decode_inner(bytes: &[u8], config: &CodecConfig) -> Result<Value> {
    if bytes.len() > config.max_size {
        return Err(ObjectError::SizeLimitExceeded {
            size: bytes.len(),
            limit: config.max_size,
        });
    }

    let mut cursor = Cursor::new(bytes);
    let item: CborValue = ciborium::from_reader(&mut cursor)
        .map_err(|e| ObjectError::MalformedEncoding(e.to_string()))?;
    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(ObjectError::MalformedEncoding(format!(
            "{} trailing bytes after item",
            bytes.len() - consumed
        )));
    }

    let value = Decoder {
        strict: config.strict,
    }
    .value(item)?;

    if config.strict && encode(&value) != bytes {
        return Err(ObjectError::NonCanonicalForm(
            "input differs from its canonical encoding".into(),
        ));
    }
    Ok(value)
}

// ─────────────────────────────────────────────────────────────────────────────
// Value -> CBOR
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn to_cbor(value: &Value) -> CborValue {
    match value {
        Value::Data(bytes) => CborValue::Bytes(bytes.to_vec()),
        Value::Sequence(items) => CborValue::Array(items.iter().map(to_cbor).collect()),
        Value::Link(link) => tagged(tags::LINK, to_cbor(link.payload())),
        Value::Id(id) => id_to_cbor(id),
        Value::Func(func) => func_to_cbor(func),
        Value::Module(module) => module_to_cbor(module),
        Value::Actor(actor) => tagged(
            tags::ACTOR,
            CborValue::Array(vec![id_to_cbor(&actor.id), module_to_cbor(&actor.module)]),
        ),
    }
}

fn tagged(tag: u64, inner: CborValue) -> CborValue {
    CborValue::Tag(tag, Box::new(inner))
}

fn id_to_cbor(id: &Id) -> CborValue {
    tagged(tags::ID, CborValue::Bytes(id.as_bytes().to_vec()))
}

fn text_array(items: &[String]) -> CborValue {
    CborValue::Array(items.iter().cloned().map(CborValue::Text).collect())
}

fn func_to_cbor(func: &FunctionRef) -> CborValue {
    let identifier = CborValue::Array(vec![
        CborValue::Bool(func.identifier.private),
        CborValue::Text(func.identifier.name.clone()),
    ]);
    let params = match &func.params {
        Some(params) => text_array(params),
        None => CborValue::Null,
    };
    tagged(
        tags::FUNC,
        CborValue::Array(vec![
            identifier,
            params,
            id_to_cbor(&func.actor_id),
            CborValue::Integer(func.gas.into()),
        ]),
    )
}

fn module_to_cbor(module: &ModuleRef) -> CborValue {
    let exports = module
        .exports
        .iter()
        .map(|(name, params)| (CborValue::Text(name.clone()), text_array(params)))
        .collect();
    let code = match &module.code {
        ModuleCode::Inline(bytes) => CborValue::Bytes(bytes.to_vec()),
        ModuleCode::Linked(link) => tagged(tags::LINK, to_cbor(link.payload())),
    };
    tagged(
        tags::MODULE,
        CborValue::Array(vec![
            id_to_cbor(&module.id),
            CborValue::Integer(module.module_type.into()),
            CborValue::Map(exports),
            to_cbor(&module.persist),
            code,
        ]),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// CBOR -> Value
// ─────────────────────────────────────────────────────────────────────────────

struct Decoder {
    strict: bool,
}

impl Decoder {
    fn value(&self, item: CborValue) -> Result<Value> {
        match (classify_cbor(&item), item) {
            (Kind::Data, CborValue::Bytes(bytes)) => Ok(Value::Data(bytes.into())),
            (Kind::Sequence, CborValue::Array(items)) => items
                .into_iter()
                .map(|item| self.value(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            (Kind::Link, CborValue::Tag(_, payload)) => Ok(Value::link(self.value(*payload)?)),
            (Kind::Link, CborValue::Map(entries)) => {
                if self.strict {
                    return Err(ObjectError::NonCanonicalForm(
                        "link encoded as a map instead of tag 42".into(),
                    ));
                }
                let payload = entries
                    .into_iter()
                    .next()
                    .map(|(_, payload)| payload)
                    .ok_or_else(|| malformed("empty link map"))?;
                Ok(Value::link(self.value(payload)?))
            }
            (Kind::Id, CborValue::Tag(_, payload)) => Ok(Value::Id(id_bytes(*payload)?)),
            (Kind::FunctionRef, CborValue::Tag(_, payload)) => {
                Ok(Value::Func(self.func(*payload)?))
            }
            (Kind::ModuleRef, CborValue::Tag(_, payload)) => {
                Ok(Value::Module(self.module(*payload)?))
            }
            (Kind::ActorRef, CborValue::Tag(_, payload)) => {
                Ok(Value::Actor(self.actor(*payload)?))
            }
            (Kind::Invalid, CborValue::Tag(tag, _)) => Err(ObjectError::UnknownTag(tag)),
            (kind, item) => Err(ObjectError::UnsupportedType(format!(
                "cannot decode {item:?} as {kind}"
            ))),
        }
    }

    fn func(&self, payload: CborValue) -> Result<FunctionRef> {
        let [identifier, params, actor_id, gas] = record::<4>(payload, "function ref")?;
        let [private, name] = record::<2>(identifier, "function identifier")?;

        let params = match params {
            CborValue::Null => None,
            other => Some(text_list(other, "params")?),
        };

        Ok(FunctionRef {
            identifier: FuncIdentifier {
                private: expect_bool(private, "private")?,
                name: expect_text(name, "name")?,
            },
            actor_id: expect_id(actor_id, "actor_id")?,
            params,
            gas: expect_u64(gas, "gas")?,
        })
    }

    fn module(&self, payload: CborValue) -> Result<ModuleRef> {
        let [id, module_type, exports, persist, code] = record::<5>(payload, "module ref")?;

        let exports = match exports {
            CborValue::Map(entries) => entries
                .into_iter()
                .map(|(name, params)| {
                    Ok((
                        expect_text(name, "export name")?,
                        text_list(params, "export params")?,
                    ))
                })
                .collect::<Result<BTreeMap<_, _>>>()?,
            _ => return Err(malformed("exports: expected map")),
        };

        let code = match self.value(code)? {
            Value::Data(bytes) => ModuleCode::Inline(bytes),
            Value::Link(link) => ModuleCode::Linked(link),
            other => {
                return Err(malformed(format!(
                    "code: expected data or link, got {}",
                    other.kind()
                )))
            }
        };

        Ok(ModuleRef {
            id: expect_id(id, "module id")?,
            module_type: expect_u64(module_type, "module_type")?,
            exports,
            persist: Box::new(self.value(persist)?),
            code,
        })
    }

    fn actor(&self, payload: CborValue) -> Result<ActorRef> {
        let [id, module] = record::<2>(payload, "actor ref")?;
        let module = match self.value(module)? {
            Value::Module(module) => module,
            other => {
                return Err(malformed(format!(
                    "actor module: expected mod, got {}",
                    other.kind()
                )))
            }
        };
        Ok(ActorRef {
            id: expect_id(id, "actor id")?,
            module,
        })
    }
}

fn malformed(msg: impl Into<String>) -> ObjectError {
    ObjectError::MalformedEncoding(msg.into())
}

/// Split a positional record into exactly `N` fields.
fn record<const N: usize>(item: CborValue, name: &str) -> Result<[CborValue; N]> {
    match item {
        CborValue::Array(fields) => {
            let len = fields.len();
            fields
                .try_into()
                .map_err(|_| malformed(format!("{name}: expected {N} fields, got {len}")))
        }
        _ => Err(malformed(format!("{name}: expected array"))),
    }
}

fn id_bytes(item: CborValue) -> Result<Id> {
    match item {
        CborValue::Bytes(bytes) => Ok(Id::new(bytes)),
        _ => Err(malformed("id: expected byte string")),
    }
}

fn expect_id(item: CborValue, field: &str) -> Result<Id> {
    match item {
        CborValue::Tag(tags::ID, payload) => id_bytes(*payload),
        _ => Err(malformed(format!("{field}: expected tagged id"))),
    }
}

fn expect_u64(item: CborValue, field: &str) -> Result<u64> {
    match item {
        CborValue::Integer(i) => u64::try_from(i128::from(i))
            .map_err(|_| malformed(format!("{field}: out of range"))),
        _ => Err(malformed(format!("{field}: expected unsigned integer"))),
    }
}

fn expect_bool(item: CborValue, field: &str) -> Result<bool> {
    match item {
        CborValue::Bool(b) => Ok(b),
        _ => Err(malformed(format!("{field}: expected bool"))),
    }
}

fn expect_text(item: CborValue, field: &str) -> Result<String> {
    match item {
        CborValue::Text(s) => Ok(s),
        _ => Err(malformed(format!("{field}: expected text"))),
    }
}

fn text_list(item: CborValue, field: &str) -> Result<Vec<String>> {
    match item {
        CborValue::Array(items) => items
            .into_iter()
            .map(|item| expect_text(item, field))
            .collect(),
        _ => Err(malformed(format!("{field}: expected array of text"))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Canonical writer
// ─────────────────────────────────────────────────────────────────────────────

/// Encode a CBOR item deterministically.
pub(crate) fn canonical_bytes(item: &CborValue) -> Vec<u8> {
    let mut writer = CanonicalWriter::default();
    writer.item(item);
    writer.buf
}

#[derive(Default)]
struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    fn item(&mut self, item: &CborValue) {
        match item {
            CborValue::Integer(i) => {
                let n = i128::from(*i);
                if n >= 0 {
                    self.head(0, n as u64);
                } else {
                    // -1 encodes as 0, -2 as 1, ...
                    self.head(1, (-1 - n) as u64);
                }
            }
            CborValue::Bytes(bytes) => {
                self.head(2, bytes.len() as u64);
                self.buf.extend_from_slice(bytes);
            }
            CborValue::Text(text) => {
                self.head(3, text.len() as u64);
                self.buf.extend_from_slice(text.as_bytes());
            }
            CborValue::Array(items) => {
                self.head(4, items.len() as u64);
                for item in items {
                    self.item(item);
                }
            }
            CborValue::Map(entries) => self.map(entries),
            CborValue::Tag(tag, inner) => {
                self.head(6, *tag);
                self.item(inner);
            }
            CborValue::Bool(b) => self.buf.push(if *b { 0xf5 } else { 0xf4 }),
            CborValue::Null => self.buf.push(0xf6),
            other => unreachable!("object model never produces {other:?}"),
        }
    }

    /// Write a major type with the smallest argument encoding.
    fn head(&mut self, major: u8, n: u64) {
        let mt = major << 5;
        if n < 24 {
            self.buf.push(mt | n as u8);
        } else if n <= u8::MAX as u64 {
            self.buf.push(mt | 24);
            self.buf.push(n as u8);
        } else if n <= u16::MAX as u64 {
            self.buf.push(mt | 25);
            self.buf.extend_from_slice(&(n as u16).to_be_bytes());
        } else if n <= u32::MAX as u64 {
            self.buf.push(mt | 26);
            self.buf.extend_from_slice(&(n as u32).to_be_bytes());
        } else {
            self.buf.push(mt | 27);
            self.buf.extend_from_slice(&n.to_be_bytes());
        }
    }

    /// Maps are written with keys sorted by their encoded bytes.
    fn map(&mut self, entries: &[(CborValue, CborValue)]) {
        let mut sorted: Vec<(Vec<u8>, &CborValue)> = entries
            .iter()
            .map(|(key, value)| (canonical_bytes(key), value))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        self.head(5, sorted.len() as u64);
        for (key, value) in sorted {
            self.buf.extend_from_slice(&key);
            self.item(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Link;

    fn module() -> ModuleRef {
        let mut exports = BTreeMap::new();
        exports.insert("name".to_string(), vec!["i32".to_string()]);
        ModuleRef::new(Id::new(vec![0x01]), 1, exports)
    }

    #[test]
    fn test_id_roundtrip() {
        let id = Value::Id(Id::new(vec![0x01]));
        let bytes = encode(&id);
        assert_eq!(bytes, vec![0xd8, 41, 0x41, 0x01]);

        match decode(&bytes).unwrap() {
            Value::Id(decoded) => assert_eq!(decoded.to_string(), "01"),
            other => panic!("expected id, got {other:?}"),
        }
    }

    #[test]
    fn test_module_roundtrip() {
        let value = Value::Module(module());
        let decoded = decode(&encode(&value)).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.kind(), Kind::ModuleRef);
    }

    #[test]
    fn test_func_ref_from_actor_roundtrip() {
        let actor = ActorRef::new(Id::new(vec![0x02]), module());
        let func = actor.get_func_ref("name").unwrap().with_gas(1000);

        let decoded = decode(&encode(&Value::Func(func.clone()))).unwrap();
        assert_eq!(decoded, Value::Func(func));
        assert_eq!(decoded.kind(), Kind::FunctionRef);
    }

    #[test]
    fn test_link_roundtrip() {
        let link = Value::link(Value::data(b"data".to_vec()));
        let bytes = encode(&link);
        assert_eq!(&bytes[..2], &[0xd8, 42]);
        assert_eq!(decode(&bytes).unwrap(), link);
    }

    #[test]
    fn test_linked_code_roundtrip() {
        let code = ModuleCode::Linked(Link::new(Value::Id(Id::from([7; 20]))));
        let value = Value::Actor(ActorRef::new(Id::zero(), module().with_code(code)));
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn test_unknown_tag() {
        // tag 99 over null
        let err = decode(&[0xd8, 99, 0xf6]).unwrap_err();
        assert!(matches!(err, ObjectError::UnknownTag(99)));
    }

    #[test]
    fn test_invalid_item() {
        let err = decode(&[0xf5]).unwrap_err();
        assert!(matches!(err, ObjectError::UnsupportedType(_)));
    }

    #[test]
    fn test_size_limit() {
        let bytes = encode(&Value::data(vec![0u8; 64]));
        let config = CodecConfig {
            max_size: 16,
            ..CodecConfig::default()
        };
        let err = decode_with(&bytes, &config).unwrap_err();
        assert!(matches!(
            err,
            ObjectError::SizeLimitExceeded { size: 66, limit: 16 }
        ));
    }

    #[test]
    fn test_truncated_input() {
        let bytes = encode(&Value::Module(module()));
        let err = decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ObjectError::MalformedEncoding(_)));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&Value::data(vec![1, 2]));
        bytes.push(0x00);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ObjectError::MalformedEncoding(_)));
    }

    #[test]
    fn test_wrong_record_arity() {
        // tag 45 over a one element array
        let bytes = canonical_bytes(&tagged(
            tags::ACTOR,
            CborValue::Array(vec![id_to_cbor(&Id::zero())]),
        ));
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ObjectError::MalformedEncoding(_)));
    }

    #[test]
    fn test_link_map_lenient_and_strict() {
        // {"/": h'01'}
        let bytes = [0xa1, 0x61, b'/', 0x41, 0x01];
        assert_eq!(
            decode(&bytes).unwrap(),
            Value::link(Value::data(vec![0x01]))
        );
        let err = decode_with(&bytes, &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, ObjectError::NonCanonicalForm(_)));
    }

    #[test]
    fn test_strict_rejects_wide_integer() {
        // tag 41 written with a one byte argument is canonical, a two byte one is not
        let canonical = [0xd8, 41, 0x41, 0x01];
        let wide = [0xd9, 0x00, 41, 0x41, 0x01];
        assert!(decode_with(&canonical, &CodecConfig::strict()).is_ok());
        assert!(decode(&wide).is_ok());
        let err = decode_with(&wide, &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, ObjectError::NonCanonicalForm(_)));
    }

    /// `44([41(h'01'), 0, exports, [], h''])` around a raw exports map.
    fn module_with_exports(exports: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xd8, 44, 0x85, 0xd8, 41, 0x41, 0x01, 0x00];
        bytes.extend_from_slice(exports);
        bytes.extend_from_slice(&[0x80, 0x40]);
        bytes
    }

    #[test]
    fn test_strict_rejects_duplicate_export_keys() {
        // {"a": [], "a": []}
        let bytes = module_with_exports(&[0xa2, 0x61, b'a', 0x80, 0x61, b'a', 0x80]);

        match decode(&bytes).unwrap() {
            Value::Module(module) => {
                assert_eq!(module.exports.len(), 1);
                assert_eq!(module.exports["a"], Vec::<String>::new());
            }
            other => panic!("expected module, got {other:?}"),
        }

        let err = decode_with(&bytes, &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, ObjectError::NonCanonicalForm(_)));
    }

    #[test]
    fn test_strict_rejects_unsorted_export_keys() {
        // {"bb": [], "a": []}; canonical order puts "a" first
        let bytes = module_with_exports(&[0xa2, 0x62, b'b', b'b', 0x80, 0x61, b'a', 0x80]);

        match decode(&bytes).unwrap() {
            Value::Module(module) => {
                let names: Vec<_> = module.exports.keys().map(String::as_str).collect();
                assert_eq!(names, vec!["a", "bb"]);
            }
            other => panic!("expected module, got {other:?}"),
        }

        let err = decode_with(&bytes, &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, ObjectError::NonCanonicalForm(_)));

        // the same module with sorted keys is accepted
        let sorted = module_with_exports(&[0xa2, 0x61, b'a', 0x80, 0x62, b'b', b'b', 0x80]);
        assert!(decode_with(&sorted, &CodecConfig::strict()).is_ok());
    }

    #[test]
    fn test_map_keys_sorted() {
        let item = CborValue::Map(vec![
            (CborValue::Text("bb".into()), CborValue::Integer(2.into())),
            (CborValue::Text("a".into()), CborValue::Integer(1.into())),
        ]);
        let bytes = canonical_bytes(&item);
        assert_eq!(bytes, vec![0xa2, 0x61, b'a', 0x01, 0x62, b'b', b'b', 0x02]);
    }

    #[test]
    fn test_config_from_json() {
        let config: CodecConfig = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert!(config.strict);
        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
    }
}
