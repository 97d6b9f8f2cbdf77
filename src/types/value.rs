//! Typed values produced by coercion and returned by client calls.
//!
//! Record fields keep an explicit unset state in memory. On the wire an
//! unset field and a null field collapse into the same thing: the key is
//! simply omitted.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::{Map, Number, Value};

use super::descriptor::RecordDescriptor;

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    Json(Value),
    Enum { type_name: String, symbol: String },
    List(Vec<TypedValue>),
    Map(BTreeMap<String, TypedValue>),
    Record(RecordValue),
}

impl TypedValue {
    /// Canonical wire form used for equality checks and diagnostics.
    pub fn to_wire(&self) -> Value {
        match self {
            TypedValue::Boolean(value) => Value::Bool(*value),
            TypedValue::Integer(value) => Value::from(*value),
            TypedValue::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            TypedValue::String(value) => Value::String(value.clone()),
            TypedValue::Binary(bytes) => Value::String(BASE64_STANDARD.encode(bytes)),
            TypedValue::Timestamp(timestamp) => {
                Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            TypedValue::Json(value) => value.clone(),
            TypedValue::Enum { symbol, .. } => Value::String(symbol.clone()),
            TypedValue::List(items) => Value::Array(items.iter().map(TypedValue::to_wire).collect()),
            TypedValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_wire()))
                    .collect(),
            ),
            TypedValue::Record(record) => record.to_wire(),
        }
    }

    /// Compact JSON rendering of the wire form.
    pub fn repr(&self) -> String {
        self.to_wire().to_string()
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            TypedValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(value) => Some(value),
            TypedValue::Enum { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

/// One declared field of a record value.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub field_name: String,
    pub wire_name: String,
    pub value: Option<TypedValue>,
}

/// Value of a record type; every declared field is present, set or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    pub type_name: String,
    pub fields: Vec<RecordField>,
}

impl RecordValue {
    /// A value of `descriptor` with every field unset.
    pub fn empty(descriptor: &RecordDescriptor) -> Self {
        Self {
            type_name: descriptor.name.clone(),
            fields: descriptor
                .fields
                .iter()
                .map(|field| RecordField {
                    field_name: field.field_name.clone(),
                    wire_name: field.wire_name.clone(),
                    value: None,
                })
                .collect(),
        }
    }

    pub fn get(&self, field_name: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|field| field.field_name == field_name)
            .and_then(|field| field.value.as_ref())
    }

    /// Set a declared field; returns false when the record has no such field.
    pub fn set(&mut self, field_name: &str, value: Option<TypedValue>) -> bool {
        match self
            .fields
            .iter_mut()
            .find(|field| field.field_name == field_name)
        {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    /// Builder form of [`RecordValue::set`]; undeclared fields are ignored.
    pub fn with(mut self, field_name: &str, value: TypedValue) -> Self {
        self.set(field_name, Some(value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|field| field.value.is_none())
    }

    /// Required fields of `descriptor` that are unset in this value.
    pub fn missing_required<'a>(&self, descriptor: &'a RecordDescriptor) -> Vec<&'a str> {
        descriptor
            .fields
            .iter()
            .filter(|field| field.required && self.get(&field.field_name).is_none())
            .map(|field| field.wire_name.as_str())
            .collect()
    }

    pub fn to_wire(&self) -> Value {
        let mut object = Map::new();
        for field in &self.fields {
            if let Some(value) = &field.value {
                object.insert(field.wire_name.clone(), value.to_wire());
            }
        }
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::descriptor::{FieldDescriptor, TypeDescriptor};

    fn widget() -> RecordDescriptor {
        RecordDescriptor::new(
            "Widget",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::string()),
                FieldDescriptor::new("name", TypeDescriptor::string()).required(),
                FieldDescriptor::new("unitPrice", TypeDescriptor::float()),
            ],
        )
    }

    #[test]
    fn unset_fields_are_omitted_on_the_wire() {
        let value = RecordValue::empty(&widget()).with("name", TypedValue::String("shoe".into()));
        assert_eq!(value.to_wire(), serde_json::json!({"name": "shoe"}));
        assert!(!value.is_empty());
        assert!(RecordValue::empty(&widget()).is_empty());
    }

    #[test]
    fn wire_names_are_used_for_output() {
        let value = RecordValue::empty(&widget()).with("unit_price", TypedValue::Float(2.5));
        assert_eq!(value.to_wire(), serde_json::json!({"unitPrice": 2.5}));
    }

    #[test]
    fn set_rejects_undeclared_fields() {
        let mut value = RecordValue::empty(&widget());
        assert!(!value.set("colour", Some(TypedValue::Boolean(true))));
        assert!(value.set("id", Some(TypedValue::String("1".into()))));
        assert_eq!(value.get("id").and_then(TypedValue::as_str), Some("1"));
    }

    #[test]
    fn missing_required_lists_wire_names() {
        let descriptor = widget();
        let value = RecordValue::empty(&descriptor);
        assert_eq!(value.missing_required(&descriptor), vec!["name"]);
    }

    #[test]
    fn binary_and_timestamps_use_canonical_strings() {
        assert_eq!(
            TypedValue::Binary(b"hi".to_vec()).to_wire(),
            Value::String("aGk=".into())
        );
        let timestamp = DateTime::parse_from_rfc3339("2021-03-04T05:06:07+00:00").unwrap();
        assert_eq!(
            TypedValue::Timestamp(timestamp).to_wire(),
            Value::String("2021-03-04T05:06:07Z".into())
        );
    }

    #[test]
    fn non_finite_floats_serialize_as_null() {
        assert_eq!(TypedValue::Float(f64::NAN).to_wire(), Value::Null);
    }
}
