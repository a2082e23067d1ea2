//! Messages passed between actors.
//!
//! A [`Message`] is a mutable record. Observers registered with
//! [`Message::subscribe`] are called synchronously after every setter.
//! Access to a message is not synchronized; callers sharing one across
//! threads must serialize access themselves.

use std::fmt;

use crate::id::Id;
use crate::refs::FunctionRef;
use crate::value::Value;

/// The message field that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageField {
    Ticks,
    FuncRef,
    FuncArguments,
    FuncParameters,
    OriginId,
    OriginTicks,
}

/// Notification passed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageEvent {
    pub field: MessageField,
}

/// Handle returned by [`Message::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Listener = Box<dyn Fn(&Message, &MessageEvent) + Send + Sync>;

/// A message.
pub struct Message {
    ticks: u64,
    func_ref: Option<FunctionRef>,
    func_arguments: Vec<Value>,
    func_parameters: Vec<String>,
    origin_id: Id,
    origin_ticks: u64,
    observers: Vec<(ObserverId, Listener)>,
    next_observer: u64,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            ticks: 0,
            func_ref: None,
            func_arguments: Vec::new(),
            func_parameters: Vec::new(),
            origin_id: Id::zero(),
            origin_ticks: 0,
            observers: Vec::new(),
            next_observer: 0,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("ticks", &self.ticks)
            .field("func_ref", &self.func_ref)
            .field("func_arguments", &self.func_arguments)
            .field("func_parameters", &self.func_parameters)
            .field("origin_id", &self.origin_id)
            .field("origin_ticks", &self.origin_ticks)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Message {
    /// A message with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn func_ref(&self) -> Option<&FunctionRef> {
        self.func_ref.as_ref()
    }

    pub fn func_arguments(&self) -> &[Value] {
        &self.func_arguments
    }

    pub fn func_parameters(&self) -> &[String] {
        &self.func_parameters
    }

    /// Id of the sending actor.
    pub fn origin_id(&self) -> &Id {
        &self.origin_id
    }

    /// Ticks of the sending actor when the message was sent.
    pub fn origin_ticks(&self) -> u64 {
        self.origin_ticks
    }

    pub fn set_ticks(&mut self, ticks: u64) {
        self.ticks = ticks;
        self.notify(MessageField::Ticks);
    }

    pub fn set_func_ref(&mut self, func_ref: Option<FunctionRef>) {
        self.func_ref = func_ref;
        self.notify(MessageField::FuncRef);
    }

    pub fn set_func_arguments(&mut self, arguments: Vec<Value>) {
        self.func_arguments = arguments;
        self.notify(MessageField::FuncArguments);
    }

    pub fn set_func_parameters(&mut self, parameters: Vec<String>) {
        self.func_parameters = parameters;
        self.notify(MessageField::FuncParameters);
    }

    pub fn set_origin_id(&mut self, id: Id) {
        self.origin_id = id;
        self.notify(MessageField::OriginId);
    }

    pub fn set_origin_ticks(&mut self, ticks: u64) {
        self.origin_ticks = ticks;
        self.notify(MessageField::OriginTicks);
    }

    /// Register a listener called after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> ObserverId
    where
        F: Fn(&Message, &MessageEvent) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    fn notify(&self, field: MessageField) {
        let event = MessageEvent { field };
        for (_, listener) in &self.observers {
            listener(self, &event);
        }
    }
}

/// Builder applying caller overrides on top of [`Message`] defaults.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn ticks(mut self, ticks: u64) -> Self {
        self.message.ticks = ticks;
        self
    }

    pub fn func_ref(mut self, func_ref: FunctionRef) -> Self {
        self.message.func_ref = Some(func_ref);
        self
    }

    pub fn func_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.message.func_arguments = arguments;
        self
    }

    pub fn func_parameters(mut self, parameters: Vec<String>) -> Self {
        self.message.func_parameters = parameters;
        self
    }

    pub fn origin(mut self, id: Id, ticks: u64) -> Self {
        self.message.origin_id = id;
        self.message.origin_ticks = ticks;
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}
