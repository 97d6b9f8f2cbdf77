//! Structural comparison of typed values.
//!
//! [`diff`] walks two values in parallel by declared field identity and
//! yields one [`FieldDiff`] per divergent leaf. Records present on both sides
//! are descended into; anything else is compared as a whole through its
//! canonical wire form. The walk is lazy: callers that only need the first
//! divergence pay for nothing more.

use std::fmt;

use serde::Serialize;

use crate::types::TypedValue;

/// Placeholder used for an unset field in diagnostics.
pub const UNSET_REPR: &str = "<unset>";

/// One divergent field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} expected: {} actual: {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Lazily diff `expected` against `actual`, rooted at `root`.
pub fn diff<'a>(root: &str, expected: &'a TypedValue, actual: &'a TypedValue) -> Diff<'a> {
    Diff {
        pending: vec![(root.to_string(), Some(expected), Some(actual))],
    }
}

/// Iterator returned by [`diff`].
pub struct Diff<'a> {
    pending: Vec<(String, Option<&'a TypedValue>, Option<&'a TypedValue>)>,
}

impl<'a> Iterator for Diff<'a> {
    type Item = FieldDiff;

    fn next(&mut self) -> Option<FieldDiff> {
        while let Some((path, expected, actual)) = self.pending.pop() {
            if let (Some(TypedValue::Record(left)), Some(TypedValue::Record(right))) =
                (expected, actual)
            {
                // Fields only the actual record declares go last.
                for field in right.fields.iter().rev() {
                    let shared = left
                        .fields
                        .iter()
                        .any(|candidate| candidate.field_name == field.field_name);
                    if field.value.is_some() && !shared {
                        self.pending.push((
                            format!("{path}.{}", field.field_name),
                            None,
                            field.value.as_ref(),
                        ));
                    }
                }
                // Reversed so fields come out in declaration order.
                for field in left.fields.iter().rev() {
                    let other = right
                        .fields
                        .iter()
                        .find(|candidate| candidate.field_name == field.field_name)
                        .and_then(|candidate| candidate.value.as_ref());
                    self.pending.push((
                        format!("{path}.{}", field.field_name),
                        field.value.as_ref(),
                        other,
                    ));
                }
                continue;
            }
            if expected.map(TypedValue::to_wire) != actual.map(TypedValue::to_wire) {
                return Some(FieldDiff {
                    path,
                    expected: repr(expected),
                    actual: repr(actual),
                });
            }
        }
        None
    }
}

fn repr(value: Option<&TypedValue>) -> String {
    value
        .map(TypedValue::repr)
        .unwrap_or_else(|| UNSET_REPR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDescriptor, RecordDescriptor, RecordValue, TypeDescriptor};

    fn widget_descriptor() -> RecordDescriptor {
        RecordDescriptor::new(
            "Widget",
            vec![
                FieldDescriptor::new("id", TypeDescriptor::string()),
                FieldDescriptor::new("name", TypeDescriptor::string()),
                FieldDescriptor::new("owner", TypeDescriptor::reference("Widget")),
                FieldDescriptor::new("tags", TypeDescriptor::list(TypeDescriptor::string())),
            ],
        )
    }

    fn widget(id: &str, name: &str) -> RecordValue {
        RecordValue::empty(&widget_descriptor())
            .with("id", TypedValue::String(id.into()))
            .with("name", TypedValue::String(name.into()))
    }

    #[test]
    fn equal_values_produce_no_diagnostics() {
        let left = TypedValue::Record(widget("1", "shoe"));
        let right = TypedValue::Record(widget("1", "shoe"));
        assert_eq!(diff("value", &left, &right).count(), 0);
    }

    #[test]
    fn leaf_differences_report_path_and_reprs() {
        let left = TypedValue::Record(widget("1", "shoe"));
        let right = TypedValue::Record(widget("1", "boot"));
        let diffs: Vec<_> = diff("value", &left, &right).collect();
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].to_string(),
            "value.name expected: \"shoe\" actual: \"boot\""
        );
    }

    #[test]
    fn nested_records_are_descended_in_field_order() {
        let left = TypedValue::Record(
            widget("1", "shoe").with("owner", TypedValue::Record(widget("2", "ann"))),
        );
        let right = TypedValue::Record(
            widget("9", "shoe").with("owner", TypedValue::Record(widget("2", "bob"))),
        );
        let paths: Vec<_> = diff("value", &left, &right).map(|d| d.path).collect();
        assert_eq!(paths, vec!["value.id", "value.owner.name"]);
    }

    #[test]
    fn unset_fields_are_rendered_explicitly() {
        let left = TypedValue::Record(widget("1", "shoe"));
        let right = TypedValue::Record(
            widget("1", "shoe").with("tags", TypedValue::List(vec![TypedValue::String("a".into())])),
        );
        let diffs: Vec<_> = diff("value", &left, &right).collect();
        assert_eq!(diffs[0].expected, UNSET_REPR);
        assert_eq!(diffs[0].actual, "[\"a\"]");
    }

    #[test]
    fn non_record_values_compare_whole() {
        let left = TypedValue::List(vec![TypedValue::Integer(1)]);
        let right = TypedValue::List(vec![TypedValue::Integer(2)]);
        let diffs: Vec<_> = diff("value", &left, &right).collect();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, "value");
    }

    #[test]
    fn diff_is_lazy() {
        let left = TypedValue::Record(widget("1", "shoe"));
        let right = TypedValue::Record(widget("2", "boot"));
        let first = diff("value", &left, &right).next().unwrap();
        assert_eq!(first.path, "value.id");
    }
}
