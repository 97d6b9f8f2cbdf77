//! Descriptors published by the demo conformance service.

use crate::types::{EnumDescriptor, FieldDescriptor, RecordDescriptor, TypeDescriptor};

pub const WIDGET: &str = "Widget";
pub const ANSWER: &str = "Answer";
pub const ANY: &str = "Any";
pub const GET_API_INFO_RESPONSE: &str = "GetApiInfoResponse";
pub const GET_WIDGETS_RESPONSE: &str = "GetWidgetsResponse";
pub const CREATE_WIDGET_RESPONSE: &str = "CreateWidgetResponse";
pub const GET_WIDGET_RESPONSE: &str = "GetWidgetResponse";
pub const DELETE_WIDGET_RESPONSE: &str = "DeleteWidgetResponse";
pub const MIRROR_FIELDS_RESPONSE: &str = "MirrorFieldsResponse";
pub const CHECK_QUERY_RESPONSE: &str = "CheckQueryResponse";

fn field(wire_name: &str, descriptor: TypeDescriptor) -> FieldDescriptor {
    FieldDescriptor::new(wire_name, descriptor)
}

pub fn widget() -> RecordDescriptor {
    RecordDescriptor::new(
        WIDGET,
        vec![
            field("id", TypeDescriptor::string()),
            field("name", TypeDescriptor::string()).required(),
            field("price", TypeDescriptor::float()),
        ],
    )
}

pub fn answer() -> EnumDescriptor {
    EnumDescriptor::new(ANSWER, &["yes", "no", "maybe"])
}

/// One field of every kind, nesting itself through `dto`.
pub fn any() -> RecordDescriptor {
    RecordDescriptor::new(
        ANY,
        vec![
            field("string", TypeDescriptor::string()),
            field("boolean", TypeDescriptor::boolean()),
            field("double", TypeDescriptor::float()),
            field("int32", TypeDescriptor::integer()),
            field("int64", TypeDescriptor::integer()),
            field("bytes", TypeDescriptor::binary()),
            field("datetime", TypeDescriptor::timestamp()),
            field("object", TypeDescriptor::json()),
            field("error", TypeDescriptor::reference(crate::types::ERROR_TYPE_NAME)),
            field("dto", TypeDescriptor::reference(ANY)),
            field("enum", TypeDescriptor::reference(ANSWER)),
            field("array", TypeDescriptor::list(TypeDescriptor::integer())),
            field("map", TypeDescriptor::map(TypeDescriptor::string())),
            field(
                "choice",
                TypeDescriptor::Union(vec![
                    TypeDescriptor::integer(),
                    TypeDescriptor::string(),
                    TypeDescriptor::reference(WIDGET),
                ]),
            ),
        ],
    )
}

fn response(name: &str, fields: Vec<FieldDescriptor>) -> TypeDescriptor {
    TypeDescriptor::Record(RecordDescriptor::new(name, fields))
}

/// Every named descriptor the service publishes.
pub fn descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::Record(widget()),
        TypeDescriptor::Enum(answer()),
        TypeDescriptor::Record(any()),
        response(
            GET_API_INFO_RESPONSE,
            vec![
                field("service", TypeDescriptor::string()),
                field("version", TypeDescriptor::string()),
            ],
        ),
        response(
            GET_WIDGETS_RESPONSE,
            vec![
                field("widgets", TypeDescriptor::list(TypeDescriptor::reference(WIDGET))),
                field("total", TypeDescriptor::integer()),
            ],
        ),
        response(
            CREATE_WIDGET_RESPONSE,
            vec![field("widget", TypeDescriptor::reference(WIDGET))],
        ),
        response(
            GET_WIDGET_RESPONSE,
            vec![
                field("widget", TypeDescriptor::reference(WIDGET)),
                field("eTag", TypeDescriptor::string()),
                field("notModified", TypeDescriptor::boolean()),
            ],
        ),
        response(DELETE_WIDGET_RESPONSE, Vec::new()),
        response(
            MIRROR_FIELDS_RESPONSE,
            vec![
                field("field", TypeDescriptor::reference(ANY)),
                field(
                    "matrix",
                    TypeDescriptor::list(TypeDescriptor::list(TypeDescriptor::float())),
                ),
            ],
        ),
        response(CHECK_QUERY_RESPONSE, Vec::new()),
    ]
}
