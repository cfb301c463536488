use alloc::string::String;
use alloc::vec::Vec;

use crate::Value;
use crate::descriptor::{TypeDescriptor, TypeKey};
use crate::host::ObjectId;

/// Maps objects that are not components to a dotted name rooted at
/// their owning component, e.g. `button1.FlatAppearance`.
pub trait ReferenceService {
    fn name_of(&self, object: ObjectId) -> Option<String>;

    /// The top-level component that owns `object`.
    fn owner_of(&self, object: ObjectId) -> Option<ObjectId>;
}

/// Records which handler method is bound to an event.
pub trait EventBindingService {
    fn handler(&self, object: ObjectId, event: &str) -> Option<String>;

    /// Binds `handler`, or unbinds the event when `None`.
    fn bind(&self, object: ObjectId, event: &str, handler: Option<&str>);
}

/// A property whose value mirrors another object's property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRelationship {
    pub owner: ObjectId,
    pub member: String,
}

pub trait RelationshipService {
    fn relationship(&self, owner: ObjectId, member: &str) -> Option<MemberRelationship>;

    fn set_relationship(&self, owner: ObjectId, member: &str, target: Option<MemberRelationship>);
}

/// Culture-aware resource sets plus design-time metadata.
///
/// The invariant culture is the empty string.
pub trait ResourceStore {
    /// The culture resources are currently read from and written to.
    fn culture(&self) -> String;

    fn set_culture(&self, culture: &str);

    fn get(&self, culture: &str, name: &str) -> Option<Value>;

    fn set(&self, culture: &str, name: &str, value: Value);

    fn remove(&self, culture: &str, name: &str);

    /// All entries of one culture, ordered by name.
    fn entries(&self, culture: &str) -> Vec<(String, Value)>;

    fn metadata(&self, name: &str) -> Option<Value>;

    fn set_metadata(&self, name: &str, value: Value);
}

pub trait NameCreationService {
    /// A name for a new instance of `ty` that is free in the container.
    fn create_name(&self, ty: &TypeDescriptor) -> String;
}

pub trait TypeResolutionService {
    fn resolve(&self, name: &str) -> Option<TypeKey>;
}

pub trait UiService {
    fn show_error(&self, message: &str);
}

/// The parent of a culture name: `fr-FR` to `fr`, `fr` to the invariant
/// culture. The invariant culture has no parent.
pub fn parent_culture(culture: &str) -> Option<&str> {
    if culture.is_empty() {
        return None;
    }
    Some(match culture.rfind('-') {
        Some(index) => &culture[..index],
        None => "",
    })
}

#[cfg(test)]
mod tests {
    use super::parent_culture;

    #[test]
    fn culture_chain() {
        assert_eq!(parent_culture("fr-FR"), Some("fr"));
        assert_eq!(parent_culture("fr"), Some(""));
        assert_eq!(parent_culture(""), None);
    }
}
