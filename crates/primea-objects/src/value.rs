//! The closed set of values carried by messages.

use bytes::Bytes;

use crate::id::Id;
use crate::kind::Kind;
use crate::refs::{ActorRef, FunctionRef, ModuleRef};

/// A content-addressed pointer to externally stored data.
///
/// Renders as `{"/": payload}` in JSON and as tag 42 in CBOR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link(pub Box<Value>);

impl Link {
    pub fn new(payload: Value) -> Self {
        Self(Box::new(payload))
    }

    /// The linked payload.
    pub fn payload(&self) -> &Value {
        &self.0
    }
}

/// Any value of the object model.
///
/// The variant is fixed at construction; codecs dispatch on it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw bytes.
    Data(Bytes),
    /// Ordered list of values.
    Sequence(Vec<Value>),
    Link(Link),
    Id(Id),
    Func(FunctionRef),
    Module(ModuleRef),
    Actor(ActorRef),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Data(_) => Kind::Data,
            Value::Sequence(_) => Kind::Sequence,
            Value::Link(_) => Kind::Link,
            Value::Id(_) => Kind::Id,
            Value::Func(_) => Kind::FunctionRef,
            Value::Module(_) => Kind::ModuleRef,
            Value::Actor(_) => Kind::ActorRef,
        }
    }

    pub fn data(bytes: impl Into<Bytes>) -> Self {
        Value::Data(bytes.into())
    }

    pub fn link(payload: Value) -> Self {
        Value::Link(Link::new(payload))
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        Value::Id(id)
    }
}

impl From<FunctionRef> for Value {
    fn from(func: FunctionRef) -> Self {
        Value::Func(func)
    }
}

impl From<ModuleRef> for Value {
    fn from(module: ModuleRef) -> Self {
        Value::Module(module)
    }
}

impl From<ActorRef> for Value {
    fn from(actor: ActorRef) -> Self {
        Value::Actor(actor)
    }
}

impl From<Link> for Value {
    fn from(link: Link) -> Self {
        Value::Link(link)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}
