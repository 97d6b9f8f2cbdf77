//! Registry of named type descriptors.
//!
//! Built once at startup from the descriptors a client publishes and read-only
//! afterwards. Field types are stored as written, so references inside a
//! record are only looked up when a value is coerced; registering a cyclic
//! record graph never walks the cycle.

use std::collections::{HashMap, HashSet};

use super::descriptor::{FieldDescriptor, RecordDescriptor, TypeDescriptor};
use crate::error::ConformanceError;

/// Name of the built-in error record every client shares.
pub const ERROR_TYPE_NAME: &str = "Error";

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
    error: RecordDescriptor,
}

impl TypeRegistry {
    /// Registry holding only the built-in `Error` record.
    pub fn new() -> Self {
        let error = error_descriptor();
        let mut types = HashMap::new();
        types.insert(
            ERROR_TYPE_NAME.to_string(),
            TypeDescriptor::Record(error.clone()),
        );
        Self { types, error }
    }

    /// Bulk registration of a client's published descriptors.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, ConformanceError>
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        let mut registry = Self::new();
        let mut seen = HashSet::new();
        for descriptor in descriptors {
            let name = match descriptor.name() {
                Some(name) => name.to_string(),
                None => {
                    return Err(ConformanceError::InvalidDescriptor {
                        name: descriptor.to_string(),
                        reason: "only records and enums can be registered by name".into(),
                    })
                }
            };
            if !seen.insert(name.clone()) {
                return Err(ConformanceError::InvalidDescriptor {
                    name,
                    reason: "duplicate type name".into(),
                });
            }
            validate(&name, &descriptor)?;
            registry.types.insert(name, descriptor);
        }
        log::info!("[TypeRegistry] Registered {} descriptors", registry.types.len());
        Ok(registry)
    }

    /// Look up a named descriptor.
    pub fn resolve(&self, name: &str) -> Result<&TypeDescriptor, ConformanceError> {
        self.types
            .get(name)
            .ok_or_else(|| ConformanceError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Follow a forward reference; any other descriptor is returned as is.
    ///
    /// Registered descriptors are always records or enums, so one hop is
    /// enough.
    pub fn resolve_descriptor<'a>(
        &'a self,
        descriptor: &'a TypeDescriptor,
    ) -> Result<&'a TypeDescriptor, ConformanceError> {
        match descriptor {
            TypeDescriptor::Reference(name) => self.resolve(name),
            other => Ok(other),
        }
    }

    pub fn record(&self, name: &str) -> Result<&RecordDescriptor, ConformanceError> {
        match self.resolve(name)? {
            TypeDescriptor::Record(record) => Ok(record),
            other => Err(ConformanceError::InvalidDescriptor {
                name: name.to_string(),
                reason: format!("expected a record, found {}", other),
            }),
        }
    }

    pub fn error_record(&self) -> &RecordDescriptor {
        &self.error
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn error_descriptor() -> RecordDescriptor {
    RecordDescriptor::new(
        ERROR_TYPE_NAME,
        vec![
            FieldDescriptor::new("code", TypeDescriptor::string()),
            FieldDescriptor::new("message", TypeDescriptor::string()),
            FieldDescriptor::new("details", TypeDescriptor::json()),
            FieldDescriptor::new("innerError", TypeDescriptor::reference(ERROR_TYPE_NAME)),
        ],
    )
}

fn validate(name: &str, descriptor: &TypeDescriptor) -> Result<(), ConformanceError> {
    let invalid = |reason: String| ConformanceError::InvalidDescriptor {
        name: name.to_string(),
        reason,
    };
    if name.trim().is_empty() {
        return Err(invalid("type name cannot be empty".into()));
    }
    if name == ERROR_TYPE_NAME {
        return Err(invalid("Error is built in and cannot be redefined".into()));
    }
    match descriptor {
        TypeDescriptor::Record(record) => {
            let mut field_names = HashSet::new();
            let mut wire_names = HashSet::new();
            for field in &record.fields {
                if !field_names.insert(field.field_name.as_str()) {
                    return Err(invalid(format!("duplicate field {}", field.field_name)));
                }
                if !wire_names.insert(field.wire_name.as_str()) {
                    return Err(invalid(format!("duplicate wire name {}", field.wire_name)));
                }
            }
        }
        TypeDescriptor::Enum(enumeration) => {
            let mut symbols = HashSet::new();
            for symbol in &enumeration.symbols {
                if !symbols.insert(symbol.as_str()) {
                    return Err(invalid(format!("duplicate enum symbol {}", symbol)));
                }
            }
        }
        _ => {}
    }
    Ok(())
}
