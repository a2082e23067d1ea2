//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use primea_objects::{
    actor_path_to_id, ActorRef, FuncIdentifier, FunctionRef, Id, Link, ModuleCode, ModuleRef,
    Value,
};

/// Generate an identifier of up to 20 bytes.
pub fn id() -> impl Strategy<Value = Id> {
    prop::collection::vec(any::<u8>(), 0..=Id::LEN).prop_map(|bytes| Id::new(bytes))
}

/// Generate a non-empty derivation path.
pub fn path() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), 1..6)
}

/// Generate a content-addressed identifier.
pub fn derived_id() -> impl Strategy<Value = Id> {
    path().prop_map(|path| actor_path_to_id(&path).expect("path is non-empty"))
}

/// Generate a raw byte payload.
pub fn data(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(Bytes::from)
}

/// Generate a parameter type tag.
pub fn type_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("i32".to_string()),
        Just("i64".to_string()),
        Just("f32".to_string()),
        Just("f64".to_string()),
        Just("func".to_string()),
        Just("mod".to_string()),
    ]
}

/// Generate a function or export name.
pub fn name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,15}".prop_map(String::from)
}

fn params() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(type_tag(), 0..4)
}

/// Generate a function reference.
pub fn function_ref() -> impl Strategy<Value = FunctionRef> {
    (any::<bool>(), name(), id(), prop::option::of(params()), any::<u64>()).prop_map(
        |(private, name, actor_id, params, gas)| FunctionRef {
            identifier: FuncIdentifier { private, name },
            actor_id,
            params,
            gas,
        },
    )
}

fn module_code() -> impl Strategy<Value = ModuleCode> {
    prop_oneof![
        data(64).prop_map(ModuleCode::Inline),
        derived_id().prop_map(|id| ModuleCode::Linked(Link::new(Value::Id(id)))),
    ]
}

/// Generate a module reference with flat persisted state.
pub fn module_ref() -> impl Strategy<Value = ModuleRef> {
    (
        id(),
        any::<u64>(),
        prop::collection::btree_map(name(), params(), 0..4),
        prop::collection::vec(data(8).prop_map(Value::Data), 0..3),
        module_code(),
    )
        .prop_map(|(id, module_type, exports, persist, code)| ModuleRef {
            id,
            module_type,
            exports,
            persist: Box::new(Value::Sequence(persist)),
            code,
        })
}

/// Generate an actor reference.
pub fn actor_ref() -> impl Strategy<Value = ActorRef> {
    (derived_id(), module_ref()).prop_map(|(id, module)| ActorRef::new(id, module))
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        data(32).prop_map(Value::Data),
        id().prop_map(Value::Id),
        function_ref().prop_map(Value::Func),
        module_ref().prop_map(Value::Module),
        actor_ref().prop_map(Value::Actor),
    ]
}

/// Generate any value, nesting sequences and links a few levels deep.
pub fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            inner.prop_map(Value::link),
        ]
    })
}
