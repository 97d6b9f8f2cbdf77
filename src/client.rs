//! Client surface consumed by the conformance runner.
//!
//! A generated client publishes a static table of [`MethodDescriptor`]s
//! (internal member names plus keyword-only parameter slots) and the
//! [`TypeRegistry`] its parameter annotations refer to. Calls go through
//! [`ServiceClient::invoke`] with arguments already coerced to typed values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{TypeDescriptor, TypeRegistry, TypedValue};

/// A keyword parameter declared by a client method.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSlot {
    /// Internal (escaped, snake-case) parameter name.
    pub name: String,
    pub descriptor: TypeDescriptor,
    /// The method supplies its own default when the parameter is not bound.
    pub has_default: bool,
}

impl ParameterSlot {
    pub fn new(name: &str, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            descriptor,
            has_default: false,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Statically declared invocable member of a client.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    /// Internal member name, e.g. `get_widget`.
    pub name: String,
    pub parameters: Vec<ParameterSlot>,
}

impl MethodDescriptor {
    pub fn new(name: &str, parameters: Vec<ParameterSlot>) -> Self {
        Self {
            name: name.to_string(),
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSlot> {
        self.parameters.iter().find(|slot| slot.name == name)
    }
}

/// Value bound to a parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Value(TypedValue),
    /// Explicit "no value" marker.
    NoValue,
}

/// Keyword arguments for one call, in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    entries: Vec<(String, Argument)>,
}

impl BoundArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing an earlier binding of the same slot.
    pub fn bind(&mut self, name: &str, argument: Argument) {
        match self.entries.iter_mut().find(|(slot, _)| slot == name) {
            Some(entry) => entry.1 = argument,
            None => self.entries.push((name.to_string(), argument)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.entries
            .iter()
            .find(|(slot, _)| slot == name)
            .and_then(|(_, argument)| match argument {
                Argument::Value(value) => Some(value),
                Argument::NoValue => None,
            })
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.entries.iter().any(|(slot, _)| slot == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.entries
            .iter()
            .map(|(slot, argument)| (slot.as_str(), argument))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Application-level error returned by a service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "innerError",
        skip_serializing_if = "Option::is_none"
    )]
    pub inner_error: Option<Box<ServiceError>>,
}

impl ServiceError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: Some(message.to_string()),
            details: None,
            inner_error: None,
        }
    }

    /// Error carrying only a code.
    pub fn code_only(code: &str) -> Self {
        Self {
            code: code.to_string(),
            message: None,
            details: None,
            inner_error: None,
        }
    }

    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Outcome of a service call: a value or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResult {
    Value(TypedValue),
    Error(ServiceError),
}

/// The invocation itself faulted (transport failure, panic, poisoned state).
#[derive(Debug, Clone, PartialEq)]
pub struct CallFailure {
    pub details: String,
}

impl CallFailure {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.details)
    }
}

impl std::error::Error for CallFailure {}

/// Surface a generated client exposes to the conformance runner.
pub trait ServiceClient {
    /// Invocable members, built once.
    fn methods(&self) -> &[MethodDescriptor];

    /// Descriptors referenced by parameter annotations and returned values.
    fn types(&self) -> &TypeRegistry;

    /// Call `method` with keyword arguments.
    fn invoke(
        &self,
        method: &MethodDescriptor,
        arguments: &BoundArguments,
    ) -> Result<ServiceResult, CallFailure>;
}
