//! Function, module and actor references.
//!
//! These are plain values: cloning shares the immutable byte buffers but
//! every clone owns its own fields.

use bytes::Bytes;
use std::collections::BTreeMap;

use crate::error::{ObjectError, Result};
use crate::id::Id;
use crate::value::{Link, Value};

/// Names a function on an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncIdentifier {
    /// Private functions are only callable by the owning actor.
    pub private: bool,
    /// Export name, or table index rendered as text for private functions.
    pub name: String,
}

impl FuncIdentifier {
    /// An exported (public) function.
    pub fn export(name: impl Into<String>) -> Self {
        Self {
            private: false,
            name: name.into(),
        }
    }

    /// A private function.
    pub fn private(name: impl Into<String>) -> Self {
        Self {
            private: true,
            name: name.into(),
        }
    }
}

/// A callable function of a specific actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub identifier: FuncIdentifier,
    pub actor_id: Id,
    /// Parameter type tags in call-signature order. `None` when unknown.
    pub params: Option<Vec<String>>,
    pub gas: u64,
}

impl FunctionRef {
    /// Create a function reference with zero gas.
    pub fn new(identifier: FuncIdentifier, actor_id: Id, params: Option<Vec<String>>) -> Self {
        Self {
            identifier,
            actor_id,
            params,
            gas: 0,
        }
    }

    /// Set the gas carried by this reference.
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Duplicate this reference. The copy's fields can be changed freely.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

/// Module code, either inline or behind a content link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleCode {
    Inline(Bytes),
    Linked(Link),
}

impl Default for ModuleCode {
    fn default() -> Self {
        ModuleCode::Inline(Bytes::new())
    }
}

/// The static definition of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub id: Id,
    pub module_type: u64,
    /// Export name to parameter type tags.
    pub exports: BTreeMap<String, Vec<String>>,
    /// Initial persisted state.
    pub persist: Box<Value>,
    pub code: ModuleCode,
}

impl ModuleRef {
    /// Create a module with no persisted state and empty inline code.
    pub fn new(id: Id, module_type: u64, exports: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            id,
            module_type,
            exports,
            persist: Box::new(Value::Sequence(Vec::new())),
            code: ModuleCode::default(),
        }
    }

    pub fn with_persist(mut self, persist: Value) -> Self {
        self.persist = Box::new(persist);
        self
    }

    pub fn with_code(mut self, code: ModuleCode) -> Self {
        self.code = code;
        self
    }

    /// Parameter types of an exported function.
    pub fn export_params(&self, name: &str) -> Result<&[String]> {
        self.exports
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ObjectError::FunctionNotFound(name.to_string()))
    }
}

/// An addressable actor bound to a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRef {
    pub id: Id,
    pub module: ModuleRef,
}

impl ActorRef {
    pub fn new(id: Id, module: ModuleRef) -> Self {
        Self { id, module }
    }

    /// Build a reference to an exported function of this actor.
    ///
    /// Fails with [`ObjectError::FunctionNotFound`] if the module does not
    /// export `name`.
    pub fn get_func_ref(&self, name: &str) -> Result<FunctionRef> {
        let params = self.module.export_params(name)?;
        Ok(FunctionRef::new(
            FuncIdentifier::export(name),
            self.id.clone(),
            Some(params.to_vec()),
        ))
    }

    /// Legacy lookup that never fails: a missing export yields `params: None`.
    #[deprecated(note = "use `get_func_ref`, which reports missing exports")]
    pub fn get_func_ref_lenient(&self, name: &str) -> FunctionRef {
        FunctionRef::new(
            FuncIdentifier::export(name),
            self.id.clone(),
            self.module.exports.get(name).cloned(),
        )
    }
}
