//! Type metadata: keys, capabilities, members and the registry.

// -----------------------------------------------------------------------------
// Modules

mod assembly;
mod flags;
mod key;
mod member;
mod registry;
mod type_desc;

// -----------------------------------------------------------------------------
// Exports

pub use assembly::{Assembly, AssemblyCatalog};
pub use flags::{MemberFlags, TypeFlags, Visibility};
pub use key::TypeKey;
pub use member::{ConstructorDescriptor, EnumVariant, EventDescriptor, PropertyDescriptor};
pub use registry::TypeRegistry;
pub use type_desc::TypeDescriptor;
