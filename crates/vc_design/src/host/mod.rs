//! The design host: the container of designed objects and the services
//! serialization consumes.

// -----------------------------------------------------------------------------
// Modules

mod ident;
mod memory;
mod services;

// -----------------------------------------------------------------------------
// Exports

pub use ident::ObjectId;
pub use memory::MemoryHost;
pub use services::{EventBindingService, MemberRelationship, NameCreationService};
pub use services::{ReferenceService, RelationshipService, ResourceStore};
pub use services::{TypeResolutionService, UiService, parent_culture};

use alloc::string::String;
use alloc::vec::Vec;

use crate::Value;
use crate::descriptor::{TypeKey, TypeRegistry};
use crate::error::HostError;

// -----------------------------------------------------------------------------
// DesignHost

/// The component model serialization runs against.
///
/// Methods take `&self`; hosts keep their state behind interior
/// mutability. Optional services default to absent.
pub trait DesignHost {
    fn registry(&self) -> &TypeRegistry;

    /// The object whose initialization code is generated.
    fn root(&self) -> Option<ObjectId>;

    /// The component container object, passed to constructors of types
    /// flagged [`NEEDS_CONTAINER`](crate::descriptor::TypeFlags::NEEDS_CONTAINER).
    fn container(&self) -> Option<ObjectId> {
        None
    }

    /// Sited components in siting order, the root included.
    fn components(&self) -> Vec<ObjectId>;

    /// Returns `true` when `object` is sited in the container.
    fn contains(&self, object: ObjectId) -> bool;

    fn component_name(&self, object: ObjectId) -> Option<String>;

    fn component(&self, name: &str) -> Option<ObjectId>;

    fn type_of(&self, object: ObjectId) -> Option<TypeKey>;

    fn get_value(&self, object: ObjectId, member: &str) -> Result<Value, HostError>;

    fn set_value(&self, object: ObjectId, member: &str, value: Value) -> Result<(), HostError>;

    /// Reads a property `provider` attaches to `target`.
    fn get_extended(
        &self,
        provider: ObjectId,
        target: ObjectId,
        member: &str,
    ) -> Result<Value, HostError>;

    fn set_extended(
        &self,
        provider: ObjectId,
        target: ObjectId,
        member: &str,
        value: Value,
    ) -> Result<(), HostError>;

    /// Creates an instance of `ty`.
    ///
    /// With `add_to_container` set, component types are sited under
    /// `name`, or under a generated name when `name` is `None`.
    fn create_instance(
        &self,
        ty: TypeKey,
        args: &[Value],
        name: Option<&str>,
        add_to_container: bool,
    ) -> Result<ObjectId, HostError>;

    fn invoke(&self, object: ObjectId, method: &str, args: &[Value]) -> Result<Value, HostError>;

    fn references(&self) -> Option<&dyn ReferenceService> {
        None
    }

    fn event_bindings(&self) -> Option<&dyn EventBindingService> {
        None
    }

    fn relationships(&self) -> Option<&dyn RelationshipService> {
        None
    }

    fn resources(&self) -> Option<&dyn ResourceStore> {
        None
    }

    fn name_creation(&self) -> Option<&dyn NameCreationService> {
        None
    }

    fn type_resolver(&self) -> Option<&dyn TypeResolutionService> {
        None
    }

    fn ui(&self) -> Option<&dyn UiService> {
        None
    }
}

// -----------------------------------------------------------------------------
// ChangeNotification

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Changing,
    Changed,
    Removing,
    Removed,
    Rename,
}

/// A component-change event queued by the host.
///
/// The type and siting of the object are captured when the event is
/// raised, so they stay available after a removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    pub object: ObjectId,
    pub ty: Option<TypeKey>,
    pub component: bool,
}
