//! Coercion of untyped JSON into typed values.
//!
//! The coercer dispatches on the descriptor kind and recurses through
//! containers, unions and nested records. Forward references are looked up
//! in the [`TypeRegistry`] only when a value actually reaches them, so a
//! cyclic descriptor graph is walked no deeper than the input data.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

use crate::error::ConformanceError;
use crate::naming::field_key_candidates;
use crate::types::{
    EnumDescriptor, PrimitiveKind, RecordDescriptor, RecordValue, TypeDescriptor, TypeRegistry,
    TypedValue,
};

/// Root path used in coercion diagnostics.
pub const ROOT_PATH: &str = "$";

pub struct Coercer<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Coercer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Coerce `raw` against `descriptor`.
    pub fn coerce(
        &self,
        raw: &Value,
        descriptor: &TypeDescriptor,
    ) -> Result<TypedValue, ConformanceError> {
        self.coerce_at(raw, descriptor, ROOT_PATH)
    }

    /// Like [`Coercer::coerce`] but maps a top-level `null` to "no value".
    pub fn coerce_optional(
        &self,
        raw: &Value,
        descriptor: &TypeDescriptor,
        path: &str,
    ) -> Result<Option<TypedValue>, ConformanceError> {
        if raw.is_null() {
            return Ok(None);
        }
        self.coerce_at(raw, descriptor, path).map(Some)
    }

    /// Coerce a raw mapping into a value of `record`.
    pub fn coerce_record(
        &self,
        raw: &Value,
        record: &RecordDescriptor,
    ) -> Result<RecordValue, ConformanceError> {
        self.record_at(raw, record, ROOT_PATH)
    }

    fn coerce_at(
        &self,
        raw: &Value,
        descriptor: &TypeDescriptor,
        path: &str,
    ) -> Result<TypedValue, ConformanceError> {
        match descriptor {
            TypeDescriptor::Primitive(kind) => coerce_primitive(raw, *kind, path),
            TypeDescriptor::Record(record) => {
                self.record_at(raw, record, path).map(TypedValue::Record)
            }
            TypeDescriptor::Enum(enumeration) => coerce_enum(raw, enumeration, path),
            TypeDescriptor::List(element) => {
                let items = raw.as_array().ok_or_else(|| {
                    ConformanceError::coercion(path, descriptor.to_string(), mismatch("array", raw))
                })?;
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.coerce_at(item, element, &format!("{path}[{idx}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(TypedValue::List)
            }
            TypeDescriptor::Map(value) => {
                let entries = raw.as_object().ok_or_else(|| {
                    ConformanceError::coercion(path, descriptor.to_string(), mismatch("object", raw))
                })?;
                let mut map = BTreeMap::new();
                for (key, item) in entries {
                    let typed = self.coerce_at(item, value, &format!("{path}[{key:?}]"))?;
                    map.insert(key.clone(), typed);
                }
                Ok(TypedValue::Map(map))
            }
            TypeDescriptor::Union(variants) => {
                let variant = self.select_variant(raw, variants)?.ok_or_else(|| {
                    ConformanceError::coercion(
                        path,
                        descriptor.to_string(),
                        format!("no variant accepts {}", json_kind(raw)),
                    )
                })?;
                self.coerce_at(raw, variant, path)
            }
            TypeDescriptor::Reference(name) => {
                let resolved = self.registry.resolve(name)?;
                self.coerce_at(raw, resolved, path)
            }
        }
    }

    fn record_at(
        &self,
        raw: &Value,
        record: &RecordDescriptor,
        path: &str,
    ) -> Result<RecordValue, ConformanceError> {
        let object = raw.as_object().ok_or_else(|| {
            ConformanceError::coercion(path, format!("record {}", record.name), mismatch("object", raw))
        })?;
        let mut value = RecordValue::empty(record);
        for (field, slot) in record.fields.iter().zip(value.fields.iter_mut()) {
            let entry = field_key_candidates(field)
                .iter()
                .find_map(|key| object.get(key.as_str()));
            if let Some(entry) = entry {
                let field_path = format!("{path}.{}", field.wire_name);
                slot.value = self.coerce_optional(entry, &field.descriptor, &field_path)?;
            }
        }
        Ok(value)
    }

    /// First variant, in declaration order, whose shape accepts `raw`.
    fn select_variant<'d>(
        &self,
        raw: &Value,
        variants: &'d [TypeDescriptor],
    ) -> Result<Option<&'d TypeDescriptor>, ConformanceError> {
        for variant in variants {
            if self.matches_shape(raw, variant)? {
                return Ok(Some(variant));
            }
        }
        Ok(None)
    }

    fn matches_shape(&self, raw: &Value, descriptor: &TypeDescriptor) -> Result<bool, ConformanceError> {
        Ok(match descriptor {
            TypeDescriptor::Primitive(kind) => primitive_matches(raw, *kind),
            TypeDescriptor::Record(_) | TypeDescriptor::Map(_) => raw.is_object(),
            TypeDescriptor::Enum(enumeration) => {
                raw.as_str().is_some_and(|symbol| enumeration.contains(symbol))
            }
            TypeDescriptor::List(_) => raw.is_array(),
            TypeDescriptor::Union(variants) => self.select_variant(raw, variants)?.is_some(),
            TypeDescriptor::Reference(name) => {
                let resolved = self.registry.resolve(name)?;
                self.matches_shape(raw, resolved)?
            }
        })
    }
}

fn coerce_primitive(raw: &Value, kind: PrimitiveKind, path: &str) -> Result<TypedValue, ConformanceError> {
    let fail = |expected: &str| ConformanceError::coercion(path, kind.name(), mismatch(expected, raw));
    match kind {
        PrimitiveKind::Boolean => raw.as_bool().map(TypedValue::Boolean).ok_or_else(|| fail("boolean")),
        PrimitiveKind::Integer => raw
            .as_i64()
            .map(TypedValue::Integer)
            .ok_or_else(|| fail("64-bit integer")),
        PrimitiveKind::Float => raw.as_f64().map(TypedValue::Float).ok_or_else(|| fail("number")),
        PrimitiveKind::String => raw
            .as_str()
            .map(|text| TypedValue::String(text.to_string()))
            .ok_or_else(|| fail("string")),
        PrimitiveKind::Binary => {
            let text = raw.as_str().ok_or_else(|| fail("base64 string"))?;
            BASE64_STANDARD
                .decode(text)
                .map(TypedValue::Binary)
                .map_err(|err| ConformanceError::coercion(path, kind.name(), format!("invalid base64: {err}")))
        }
        PrimitiveKind::Timestamp => {
            let text = raw.as_str().ok_or_else(|| fail("ISO-8601 string"))?;
            parse_timestamp(text).map(TypedValue::Timestamp).ok_or_else(|| {
                ConformanceError::coercion(path, kind.name(), format!("invalid ISO-8601 timestamp {text:?}"))
            })
        }
        PrimitiveKind::OpaqueJson => Ok(TypedValue::Json(raw.clone())),
    }
}

fn coerce_enum(
    raw: &Value,
    enumeration: &EnumDescriptor,
    path: &str,
) -> Result<TypedValue, ConformanceError> {
    let symbol = raw.as_str().ok_or_else(|| {
        ConformanceError::coercion(path, format!("enum {}", enumeration.name), mismatch("string", raw))
    })?;
    if !enumeration.contains(symbol) {
        return Err(ConformanceError::UnknownEnumSymbol {
            path: path.to_string(),
            enum_name: enumeration.name.clone(),
            symbol: symbol.to_string(),
        });
    }
    Ok(TypedValue::Enum {
        type_name: enumeration.name.clone(),
        symbol: symbol.to_string(),
    })
}

fn primitive_matches(raw: &Value, kind: PrimitiveKind) -> bool {
    match kind {
        PrimitiveKind::Boolean => raw.is_boolean(),
        PrimitiveKind::Integer => raw.as_i64().is_some(),
        PrimitiveKind::Float => raw.is_number(),
        PrimitiveKind::String => raw.is_string(),
        PrimitiveKind::Binary => raw
            .as_str()
            .is_some_and(|text| BASE64_STANDARD.decode(text).is_ok()),
        PrimitiveKind::Timestamp => raw.as_str().and_then(parse_timestamp).is_some(),
        PrimitiveKind::OpaqueJson => true,
    }
}

/// RFC 3339 first, then an offset-less date-time or bare date taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp);
    }
    let utc = FixedOffset::east_opt(0)?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| utc.from_utc_datetime(&naive))
}

fn json_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, raw: &Value) -> String {
    format!("expected {expected}, found {}", json_kind(raw))
}

#[cfg(test)]
#[path = "coerce_tests.rs"]
mod tests;
