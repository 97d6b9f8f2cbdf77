//! Type descriptors, the registry that owns them, and the typed values they
//! describe.

pub mod descriptor;
pub mod registry;
pub mod value;

pub use descriptor::{EnumDescriptor, FieldDescriptor, PrimitiveKind, RecordDescriptor, TypeDescriptor};
pub use registry::{TypeRegistry, ERROR_TYPE_NAME};
pub use value::{RecordField, RecordValue, TypedValue};
