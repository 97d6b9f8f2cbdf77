//! In-process implementation of the conformance API.
//!
//! Stateless: every call reads the seeded widget catalogue and builds a fresh
//! response, so fixture order never changes an outcome.

use std::collections::HashMap;

use super::types::{self, ANY, ANSWER, WIDGET};
use crate::client::{
    BoundArguments, CallFailure, MethodDescriptor, ParameterSlot, ServiceClient, ServiceError,
    ServiceResult,
};
use crate::error::ConformanceError;
use crate::naming::internal_name;
use crate::types::{RecordDescriptor, RecordValue, TypeDescriptor, TypeRegistry, TypedValue};

pub const SERVICE_NAME: &str = "ConformanceApi";
pub const SERVICE_VERSION: &str = "1.0.0";

/// Error codes the service reports.
pub struct ErrorCodes {}

impl ErrorCodes {
    pub const INVALID_REQUEST: &'static str = "InvalidRequest";
    pub const NOT_FOUND: &'static str = "NotFound";
}

/// Seeded catalogue: (id, name, price).
const CATALOGUE: [(&str, &str, f64); 3] = [("1", "shoe", 9.99), ("2", "hat", 14.5), ("3", "scarf", 20.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    GetApiInfo,
    GetWidgets,
    CreateWidget,
    GetWidget,
    DeleteWidget,
    MirrorFields,
    CheckQuery,
}

impl Operation {
    const ALL: [Operation; 7] = [
        Operation::GetApiInfo,
        Operation::GetWidgets,
        Operation::CreateWidget,
        Operation::GetWidget,
        Operation::DeleteWidget,
        Operation::MirrorFields,
        Operation::CheckQuery,
    ];

    fn external_name(self) -> &'static str {
        match self {
            Operation::GetApiInfo => "getApiInfo",
            Operation::GetWidgets => "getWidgets",
            Operation::CreateWidget => "createWidget",
            Operation::GetWidget => "getWidget",
            Operation::DeleteWidget => "deleteWidget",
            Operation::MirrorFields => "mirrorFields",
            Operation::CheckQuery => "checkQuery",
        }
    }

    /// External parameter names with their descriptors and default flags.
    fn parameters(self) -> Vec<(&'static str, TypeDescriptor, bool)> {
        match self {
            Operation::GetApiInfo => Vec::new(),
            Operation::GetWidgets => vec![
                ("query", TypeDescriptor::string(), true),
                ("limit", TypeDescriptor::integer(), true),
            ],
            Operation::CreateWidget => vec![("widget", TypeDescriptor::reference(WIDGET), false)],
            Operation::GetWidget => vec![
                ("id", TypeDescriptor::string(), false),
                ("ifNotETag", TypeDescriptor::string(), true),
            ],
            Operation::DeleteWidget => vec![("id", TypeDescriptor::string(), false)],
            Operation::MirrorFields => vec![
                ("field", TypeDescriptor::reference(ANY), false),
                (
                    "matrix",
                    TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::float())),
                    true,
                ),
            ],
            Operation::CheckQuery => vec![
                ("string", TypeDescriptor::string(), false),
                ("boolean", TypeDescriptor::boolean(), false),
                ("double", TypeDescriptor::float(), false),
                ("int32", TypeDescriptor::integer(), false),
                ("int64", TypeDescriptor::integer(), false),
                ("enum", TypeDescriptor::reference(ANSWER), false),
                ("datetime", TypeDescriptor::timestamp(), false),
            ],
        }
    }

    fn descriptor(self) -> MethodDescriptor {
        let parameters = self
            .parameters()
            .into_iter()
            .map(|(name, descriptor, has_default)| {
                let slot = ParameterSlot::new(&internal_name(name), descriptor);
                if has_default {
                    slot.with_default()
                } else {
                    slot
                }
            })
            .collect();
        MethodDescriptor::new(&internal_name(self.external_name()), parameters)
    }
}

/// Reference client for the conformance API.
pub struct ConformanceApiClient {
    methods: Vec<MethodDescriptor>,
    operations: HashMap<String, Operation>,
    registry: TypeRegistry,
}

impl ConformanceApiClient {
    pub fn new() -> Result<Self, ConformanceError> {
        let registry = TypeRegistry::from_descriptors(types::descriptors())?;
        let methods: Vec<_> = Operation::ALL.iter().map(|op| op.descriptor()).collect();
        let operations = Operation::ALL
            .iter()
            .zip(&methods)
            .map(|(op, method)| (method.name.clone(), *op))
            .collect();
        Ok(Self {
            methods,
            operations,
            registry,
        })
    }

    fn record(&self, name: &str) -> Result<&RecordDescriptor, CallFailure> {
        self.registry
            .record(name)
            .map_err(|err| CallFailure::new(err.to_string()))
    }

    fn response(&self, name: &str) -> Result<RecordValue, CallFailure> {
        self.record(name).map(RecordValue::empty)
    }

    fn widget(&self, id: &str, name: &str, price: f64) -> Result<TypedValue, CallFailure> {
        let widget = RecordValue::empty(self.record(WIDGET)?)
            .with("id", TypedValue::String(id.to_string()))
            .with("name", TypedValue::String(name.to_string()))
            .with("price", TypedValue::Float(price));
        Ok(TypedValue::Record(widget))
    }

    fn get_api_info(&self) -> Result<ServiceResult, CallFailure> {
        let info = self
            .response(types::GET_API_INFO_RESPONSE)?
            .with("service", TypedValue::String(SERVICE_NAME.to_string()))
            .with("version", TypedValue::String(SERVICE_VERSION.to_string()));
        Ok(ServiceResult::Value(TypedValue::Record(info)))
    }

    fn get_widgets(&self, arguments: &BoundArguments) -> Result<ServiceResult, CallFailure> {
        let query = arguments.get("query").and_then(TypedValue::as_str).unwrap_or("");
        let limit = arguments.get("limit").and_then(TypedValue::as_i64);
        if limit.is_some_and(|limit| limit < 0) {
            return Ok(invalid_request("limit must not be negative"));
        }
        let matches: Vec<_> = CATALOGUE
            .iter()
            .filter(|(_, name, _)| name.contains(query))
            .collect();
        let take = limit.map_or(matches.len(), |limit| {
            usize::try_from(limit).unwrap_or(usize::MAX)
        });
        let widgets = matches
            .iter()
            .take(take)
            .map(|(id, name, price)| self.widget(id, name, *price))
            .collect::<Result<Vec<_>, _>>()?;
        let total = i64::try_from(matches.len()).unwrap_or(i64::MAX);
        let response = self
            .response(types::GET_WIDGETS_RESPONSE)?
            .with("widgets", TypedValue::List(widgets))
            .with("total", TypedValue::Integer(total));
        Ok(ServiceResult::Value(TypedValue::Record(response)))
    }

    fn create_widget(&self, arguments: &BoundArguments) -> Result<ServiceResult, CallFailure> {
        let Some(widget) = arguments.get("widget").and_then(TypedValue::as_record) else {
            return Ok(invalid_request("widget is required"));
        };
        let missing = widget.missing_required(self.record(WIDGET)?);
        if !missing.is_empty() {
            return Ok(invalid_request(&format!(
                "widget is missing {}",
                missing.join(", ")
            )));
        }
        let id = (CATALOGUE.len() + 1).to_string();
        let mut created = widget.clone();
        created.set("id", Some(TypedValue::String(id)));
        let response = self
            .response(types::CREATE_WIDGET_RESPONSE)?
            .with("widget", TypedValue::Record(created));
        Ok(ServiceResult::Value(TypedValue::Record(response)))
    }

    fn get_widget(&self, arguments: &BoundArguments) -> Result<ServiceResult, CallFailure> {
        let Some(id) = arguments.get("id_").and_then(TypedValue::as_str) else {
            return Ok(invalid_request("id is required"));
        };
        let Some((id, name, price)) = CATALOGUE.iter().find(|(known, _, _)| *known == id) else {
            return Ok(not_found(id));
        };
        let etag = format!("\"{id}\"");
        let mut response = self.response(types::GET_WIDGET_RESPONSE)?;
        if arguments.get("if_not_etag").and_then(TypedValue::as_str) == Some(etag.as_str()) {
            response.set("not_modified", Some(TypedValue::Boolean(true)));
        } else {
            response.set("widget", Some(self.widget(id, name, *price)?));
            response.set("e_tag", Some(TypedValue::String(etag)));
        }
        Ok(ServiceResult::Value(TypedValue::Record(response)))
    }

    fn delete_widget(&self, arguments: &BoundArguments) -> Result<ServiceResult, CallFailure> {
        let Some(id) = arguments.get("id_").and_then(TypedValue::as_str) else {
            return Ok(invalid_request("id is required"));
        };
        if !CATALOGUE.iter().any(|(known, _, _)| *known == id) {
            return Ok(not_found(id));
        }
        let response = self.response(types::DELETE_WIDGET_RESPONSE)?;
        Ok(ServiceResult::Value(TypedValue::Record(response)))
    }

    fn mirror_fields(&self, arguments: &BoundArguments) -> Result<ServiceResult, CallFailure> {
        let mut response = self.response(types::MIRROR_FIELDS_RESPONSE)?;
        response.set("field", arguments.get("field").cloned());
        response.set("matrix", arguments.get("matrix").cloned());
        Ok(ServiceResult::Value(TypedValue::Record(response)))
    }

    fn check_query(&self, arguments: &BoundArguments) -> Result<ServiceResult, CallFailure> {
        let missing: Vec<_> = Operation::CheckQuery
            .parameters()
            .into_iter()
            .map(|(name, _, _)| name)
            .filter(|name| arguments.get(&internal_name(name)).is_none())
            .collect();
        if !missing.is_empty() {
            return Ok(invalid_request(&format!(
                "query is missing {}",
                missing.join(", ")
            )));
        }
        let response = self.response(types::CHECK_QUERY_RESPONSE)?;
        Ok(ServiceResult::Value(TypedValue::Record(response)))
    }
}

impl ServiceClient for ConformanceApiClient {
    fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    fn types(&self) -> &TypeRegistry {
        &self.registry
    }

    fn invoke(
        &self,
        method: &MethodDescriptor,
        arguments: &BoundArguments,
    ) -> Result<ServiceResult, CallFailure> {
        let operation = self
            .operations
            .get(&method.name)
            .copied()
            .ok_or_else(|| CallFailure::new(format!("no operation named {}", method.name)))?;
        match operation {
            Operation::GetApiInfo => self.get_api_info(),
            Operation::GetWidgets => self.get_widgets(arguments),
            Operation::CreateWidget => self.create_widget(arguments),
            Operation::GetWidget => self.get_widget(arguments),
            Operation::DeleteWidget => self.delete_widget(arguments),
            Operation::MirrorFields => self.mirror_fields(arguments),
            Operation::CheckQuery => self.check_query(arguments),
        }
    }
}

fn invalid_request(message: &str) -> ServiceResult {
    ServiceResult::Error(ServiceError::new(ErrorCodes::INVALID_REQUEST, message))
}

fn not_found(id: &str) -> ServiceResult {
    ServiceResult::Error(ServiceError::new(
        ErrorCodes::NOT_FOUND,
        &format!("Widget {id} not found."),
    ))
}
