//! Golden test vectors for deterministic verification.
//!
//! These vectors ensure that id derivation and canonical encoding produce
//! identical results across all implementations.

use std::collections::BTreeMap;

use primea_objects::{
    actor_path_to_id, encode, ActorRef, FuncIdentifier, FunctionRef, Id, ModuleRef, Value,
};

/// An actor id derivation vector.
#[derive(Debug, Clone)]
pub struct DerivationVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Ancestry nonces, root first.
    pub path: &'static [u64],
    /// Expected id (hex).
    pub expected_id: &'static str,
}

/// An encoding vector.
#[derive(Debug, Clone)]
pub struct EncodingVector {
    pub name: &'static str,
    pub value: Value,
    /// Expected canonical CBOR (hex).
    pub expected_cbor: &'static str,
}

/// Get all derivation vectors.
pub fn derivation_vectors() -> Vec<DerivationVector> {
    vec![
        DerivationVector {
            name: "root actor 0",
            path: &[0],
            expected_id: "372a08b828598122fc64c4aa94735c770f25bbbc",
        },
        DerivationVector {
            name: "first child of root 0",
            path: &[0, 0],
            expected_id: "10d7d4be8663c37d8ea7cff89b7c01c059ebbc80",
        },
        DerivationVector {
            name: "second child of root 0",
            path: &[0, 1],
            expected_id: "0ca311b75efd27e7daf6eec8b51b5c1fe33ff233",
        },
    ]
}

fn name_module() -> ModuleRef {
    let mut exports = BTreeMap::new();
    exports.insert("name".to_string(), vec!["i32".to_string()]);
    ModuleRef::new(Id::new(vec![0x01]), 0, exports)
}

/// Get all encoding vectors.
pub fn encoding_vectors() -> Vec<EncodingVector> {
    vec![
        EncodingVector {
            name: "short id",
            value: Value::Id(Id::new(vec![0x01])),
            expected_cbor: "d8294101",
        },
        EncodingVector {
            name: "empty data",
            value: Value::data(Vec::new()),
            expected_cbor: "40",
        },
        EncodingVector {
            name: "link to data",
            value: Value::link(Value::data(b"data".to_vec())),
            expected_cbor: "d82a4464617461",
        },
        EncodingVector {
            name: "exported function with gas",
            value: Value::Func(
                FunctionRef::new(
                    FuncIdentifier::export("name"),
                    Id::new(vec![0x01]),
                    Some(vec!["i32".to_string()]),
                )
                .with_gas(1000),
            ),
            expected_cbor: "d82b8482f4646e616d658163693332d82941011903e8",
        },
        EncodingVector {
            name: "module with one export",
            value: Value::Module(name_module()),
            // 44([41(h'01'), 0, {"name": ["i32"]}, [], h''])
            expected_cbor: "d82c85d829410100a1646e616d6581636933328040",
        },
        EncodingVector {
            name: "actor with module",
            value: Value::Actor(ActorRef::new(Id::new(vec![0x02]), name_module())),
            expected_cbor: "d82d82d8294102d82c85d829410100a1646e616d6581636933328040",
        },
    ]
}

/// Verify all vectors, returning (name, matches, actual hex) per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let derivations = derivation_vectors().into_iter().map(|v| {
        let actual = actor_path_to_id(v.path)
            .map(|id| id.to_hex())
            .unwrap_or_default();
        (v.name.to_string(), actual == v.expected_id, actual)
    });
    let encodings = encoding_vectors().into_iter().map(|v| {
        let actual = hex::encode(encode(&v.value));
        (v.name.to_string(), actual == v.expected_cbor, actual)
    });
    derivations.chain(encodings).collect()
}
