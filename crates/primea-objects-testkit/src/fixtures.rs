//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use bytes::Bytes;
use std::collections::BTreeMap;

use primea_objects::{
    actor_path_to_id, ActorRef, FunctionRef, Id, Message, ModuleCode, ModuleRef, Value,
};

/// A module shared by every actor of a small actor tree.
pub struct ActorFixture {
    pub module: ModuleRef,
}

impl ActorFixture {
    /// Create a fixture whose module exports `main(i32)` and `store(i64, i64)`.
    pub fn new() -> Self {
        let mut exports = BTreeMap::new();
        exports.insert("main".to_string(), vec!["i32".to_string()]);
        exports.insert(
            "store".to_string(),
            vec!["i64".to_string(), "i64".to_string()],
        );

        let module = ModuleRef::new(Id::new(b"fixture-module".to_vec()), 0, exports)
            .with_persist(Value::Sequence(vec![Value::data(vec![0x00])]))
            .with_code(ModuleCode::Inline(Bytes::from_static(b"\0asm\x01\0\0\0")));

        Self { module }
    }

    /// The actor at `path`. Panics on an empty path.
    pub fn actor(&self, path: &[u64]) -> ActorRef {
        let id = actor_path_to_id(path).expect("fixture paths are non-empty");
        ActorRef::new(id, self.module.clone())
    }

    /// A reference to an export of the actor at `path`.
    pub fn func_ref(&self, path: &[u64], name: &str) -> FunctionRef {
        self.actor(path)
            .get_func_ref(name)
            .expect("fixture module exports the function")
    }

    /// A message calling `name` on the actor at `path`, sent by the root actor.
    pub fn message(&self, path: &[u64], name: &str, arguments: Vec<Value>) -> Message {
        Message::builder()
            .func_ref(self.func_ref(path, name))
            .func_arguments(arguments)
            .origin(self.actor(&[0]).id, 0)
            .build()
    }
}

impl Default for ActorFixture {
    fn default() -> Self {
        Self::new()
    }
}
