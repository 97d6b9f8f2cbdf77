//! Structural type descriptors published by a generated client.
//!
//! Descriptors form a closed set of variants matched exhaustively by the
//! coercer. Named descriptors (records and enumerations) live in the
//! [`TypeRegistry`](super::TypeRegistry); everything else refers to them
//! through [`TypeDescriptor::Reference`], which is resolved lazily so record
//! graphs may be self- or mutually recursive.

use std::fmt;

/// Primitive wire kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Float,
    String,
    /// Base64 string on the wire, bytes in memory.
    Binary,
    /// ISO-8601 string on the wire.
    Timestamp,
    /// Any JSON value, passed through untouched.
    OpaqueJson,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Binary => "binary",
            PrimitiveKind::Timestamp => "timestamp",
            PrimitiveKind::OpaqueJson => "object",
        }
    }
}

/// A single declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Identifier used in serialized JSON.
    pub wire_name: String,
    /// Identifier used by the implementation; the field's identity.
    pub field_name: String,
    pub descriptor: TypeDescriptor,
    pub required: bool,
}

impl FieldDescriptor {
    /// Optional field whose implementation name is derived from the wire name.
    pub fn new(wire_name: &str, descriptor: TypeDescriptor) -> Self {
        Self {
            wire_name: wire_name.to_string(),
            field_name: crate::naming::snake_case(wire_name),
            descriptor,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: &str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.field_name == field_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    /// Symbol wire names.
    pub symbols: Vec<String>,
}

impl EnumDescriptor {
    pub fn new(name: &str, symbols: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            symbols: symbols.iter().map(|symbol| symbol.to_string()).collect(),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|candidate| candidate == symbol)
    }
}

/// Closed set of structural type descriptors.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Record(RecordDescriptor),
    Enum(EnumDescriptor),
    List(Box<TypeDescriptor>),
    /// String-keyed map; only the value type is described.
    Map(Box<TypeDescriptor>),
    /// Variants tried in declaration order.
    Union(Vec<TypeDescriptor>),
    /// Forward reference to a registered descriptor.
    Reference(String),
}

impl TypeDescriptor {
    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Boolean)
    }

    pub fn integer() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Integer)
    }

    pub fn float() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Float)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub fn binary() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Binary)
    }

    pub fn timestamp() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Timestamp)
    }

    pub fn json() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::OpaqueJson)
    }

    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn map(value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(value))
    }

    pub fn reference(name: &str) -> Self {
        TypeDescriptor::Reference(name.to_string())
    }

    /// Registry key for named descriptors.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Record(record) => Some(&record.name),
            TypeDescriptor::Enum(enumeration) => Some(&enumeration.name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => f.write_str(kind.name()),
            TypeDescriptor::Record(record) => write!(f, "record {}", record.name),
            TypeDescriptor::Enum(enumeration) => write!(f, "enum {}", enumeration.name),
            TypeDescriptor::List(element) => write!(f, "list<{}>", element),
            TypeDescriptor::Map(value) => write!(f, "map<string, {}>", value),
            TypeDescriptor::Union(variants) => {
                f.write_str("union<")?;
                for (idx, variant) in variants.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", variant)?;
                }
                f.write_str(">")
            }
            TypeDescriptor::Reference(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_derives_from_wire_name() {
        let field = FieldDescriptor::new("innerError", TypeDescriptor::reference("Error"));
        assert_eq!(field.field_name, "inner_error");
        assert!(!field.required);
        assert!(field.clone().required().required);
    }

    #[test]
    fn display_renders_nested_descriptors() {
        let descriptor = TypeDescriptor::map(TypeDescriptor::list(TypeDescriptor::Union(vec![
            TypeDescriptor::reference("Widget"),
            TypeDescriptor::integer(),
        ])));
        assert_eq!(
            descriptor.to_string(),
            "map<string, list<union<Widget | integer>>>"
        );
    }
}
