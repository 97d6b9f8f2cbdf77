//! Naming-convention reconciliation between fixtures and the client.
//!
//! Fixtures name methods and parameters in camel/Pascal case; the generated
//! client declares snake-case members and appends [`ESCAPE_MARKER`] to any
//! name that collides with a reserved word. Resolution tries an ordered list
//! of candidate spellings against an index built once per client.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::client::{MethodDescriptor, ParameterSlot};
use crate::error::ConformanceError;
use crate::types::FieldDescriptor;

/// Appended to internal names that collide with a reserved word.
pub const ESCAPE_MARKER: char = '_';

/// Reserved words of the generated client's implementation language.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "as", "assert", "bool", "break", "bytes", "class", "continue", "decimal", "def",
        "del", "dict", "elif", "else", "enum", "except", "exec", "facility", "finally", "float",
        "for", "from", "global", "id", "if", "import", "in", "int", "is", "lambda", "list", "map",
        "next", "not", "object", "or", "pass", "print", "raise", "return", "self", "set", "str",
        "try", "tuple", "type", "typing", "while", "with", "yield",
    ]
    .into_iter()
    .collect()
});

/// Insert `_` at every ASCII lowercase→uppercase transition, then lower-case.
pub fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev_lower = false;
    for ch in text.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.extend(ch.to_lowercase());
    }
    out
}

/// `widget_id` / `widgetId` → `WidgetId`.
pub fn pascal_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut upper_next = true;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '_' && chars.peek().is_some_and(|next| next.is_alphabetic()) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Upper-case the first character only; the rest is left as written.
fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `widget_id` / `WidgetId` → `widgetId`.
pub fn camel_case(text: &str) -> String {
    let pascal = pascal_case(text);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(name)
}

pub fn escaped(name: &str) -> String {
    format!("{name}{ESCAPE_MARKER}")
}

/// Internal member name the code generator emits for an external name.
pub fn internal_name(external: &str) -> String {
    let converted = snake_case(external);
    if is_reserved(&converted) {
        escaped(&converted)
    } else {
        converted
    }
}

/// Candidate member names for a fixture method, in priority order.
pub fn method_candidates(fixture_name: &str) -> Vec<String> {
    let converted = snake_case(&upper_first(fixture_name));
    let escaped = escaped(&converted);
    vec![converted, escaped]
}

/// Candidate parameter names for a fixture request key, in priority order.
pub fn parameter_candidates(key: &str) -> Vec<String> {
    let converted = snake_case(key);
    let escaped = escaped(&converted);
    let mut candidates = vec![key.to_string()];
    for candidate in [converted, escaped] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Raw JSON keys accepted for a record field, in priority order.
pub fn field_key_candidates(field: &FieldDescriptor) -> Vec<String> {
    let mut candidates = vec![field.wire_name.clone()];
    for candidate in [
        field.field_name.clone(),
        pascal_case(&field.wire_name),
        camel_case(&field.wire_name),
    ] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Index from internal member names to a client's method descriptors.
pub struct MethodResolver<'a> {
    methods: &'a [MethodDescriptor],
    index: HashMap<&'a str, usize>,
}

impl<'a> MethodResolver<'a> {
    pub fn new(methods: &'a [MethodDescriptor]) -> Self {
        let index = methods
            .iter()
            .enumerate()
            .map(|(idx, method)| (method.name.as_str(), idx))
            .collect();
        Self { methods, index }
    }

    /// Map a fixture method name onto an invocable member.
    pub fn resolve_method(
        &self,
        fixture_name: &str,
    ) -> Result<&'a MethodDescriptor, ConformanceError> {
        let methods = self.methods;
        let candidates = method_candidates(fixture_name);
        for candidate in &candidates {
            if let Some(&idx) = self.index.get(candidate.as_str()) {
                return Ok(&methods[idx]);
            }
        }
        Err(ConformanceError::MethodNotFound {
            method: fixture_name.to_string(),
            tried: candidates,
        })
    }

    /// Map a fixture request key onto one of `method`'s keyword parameters.
    pub fn resolve_parameter(
        &self,
        method: &'a MethodDescriptor,
        fixture_key: &str,
    ) -> Result<&'a ParameterSlot, ConformanceError> {
        parameter_candidates(fixture_key)
            .iter()
            .find_map(|candidate| method.parameter(candidate))
            .ok_or_else(|| ConformanceError::UnknownParameter {
                method: method.name.clone(),
                parameter: fixture_key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConformanceErrorCodes, ErrorCode};
    use crate::types::TypeDescriptor;

    #[test]
    fn snake_case_splits_on_lower_upper_transitions() {
        assert_eq!(snake_case("CreateWidget"), "create_widget");
        assert_eq!(snake_case("getWidgetBatch"), "get_widget_batch");
        assert_eq!(snake_case("ifNotETag"), "if_not_etag");
        assert_eq!(snake_case("int32"), "int32");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn snake_case_only_splits_ascii_transitions() {
        assert_eq!(snake_case("caféÉtat"), "caféétat");
        assert_eq!(snake_case("éTat"), "état");
        assert_eq!(snake_case("getÜber"), "getüber");
    }

    #[test]
    fn method_candidates_keep_underscores() {
        assert_eq!(method_candidates("getV2_beta"), vec!["get_v2_beta", "get_v2_beta_"]);
        assert_eq!(method_candidates("get_Widget"), vec!["get_widget", "get_widget_"]);
        assert_eq!(method_candidates("createWidget"), vec!["create_widget", "create_widget_"]);
        assert_eq!(method_candidates(""), vec!["", "_"]);
    }

    #[test]
    fn pascal_and_camel_case() {
        assert_eq!(pascal_case("getWidget"), "GetWidget");
        assert_eq!(pascal_case("inner_error"), "InnerError");
        assert_eq!(camel_case("InnerError"), "innerError");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn internal_names_escape_reserved_words() {
        assert_eq!(internal_name("id"), "id_");
        assert_eq!(internal_name("enum"), "enum_");
        assert_eq!(internal_name("widgetId"), "widget_id");
        assert!(!is_reserved("widget"));
    }

    #[test]
    fn parameter_candidates_are_ordered_and_unique() {
        assert_eq!(parameter_candidates("id"), vec!["id", "id_"]);
        assert_eq!(
            parameter_candidates("ifNotETag"),
            vec!["ifNotETag", "if_not_etag", "if_not_etag_"]
        );
    }

    #[test]
    fn field_candidates_cover_casing_variants() {
        let field = FieldDescriptor::new("innerError", TypeDescriptor::string());
        assert_eq!(
            field_key_candidates(&field),
            vec!["innerError", "inner_error", "InnerError"]
        );
    }

    fn methods() -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new(
                "create_widget",
                vec![ParameterSlot::new("widget", TypeDescriptor::reference("Widget"))],
            ),
            MethodDescriptor::new(
                "import_",
                vec![ParameterSlot::new("id_", TypeDescriptor::string())],
            ),
            MethodDescriptor::new("get_v2_beta", Vec::new()),
        ]
    }

    #[test]
    fn resolves_plain_and_escaped_methods() {
        let methods = methods();
        let resolver = MethodResolver::new(&methods);
        assert_eq!(resolver.resolve_method("CreateWidget").unwrap().name, "create_widget");
        assert_eq!(resolver.resolve_method("createWidget").unwrap().name, "create_widget");
        assert_eq!(resolver.resolve_method("import").unwrap().name, "import_");
        assert_eq!(resolver.resolve_method("getV2_beta").unwrap().name, "get_v2_beta");
    }

    #[test]
    fn unknown_method_and_parameter_fail() {
        let methods = methods();
        let resolver = MethodResolver::new(&methods);
        let err = resolver.resolve_method("DeleteWidget").unwrap_err();
        assert_eq!(err.code(), ConformanceErrorCodes::METHOD_NOT_FOUND);

        let method = resolver.resolve_method("import").unwrap();
        assert_eq!(resolver.resolve_parameter(method, "id").unwrap().name, "id_");
        let err = resolver.resolve_parameter(method, "bogus").unwrap_err();
        assert_eq!(err.code(), ConformanceErrorCodes::UNKNOWN_PARAMETER);
    }
}
