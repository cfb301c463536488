//! The built-in value serializers.

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod container;
mod enumeration;
mod object;
mod primitive;
mod resource;

// -----------------------------------------------------------------------------
// Exports

pub use collection::CollectionSerializer;
pub use container::ContainerSerializer;
pub use enumeration::EnumSerializer;
pub use object::{ComponentSerializer, DefaultSerializer};
pub use primitive::PrimitiveSerializer;
pub use resource::ResourceManagerSerializer;

pub(crate) use object::{creation_of, deserialize_sequence, reset_defaults};
