//! Member serializers: properties, extender properties and events.

// -----------------------------------------------------------------------------
// Modules

mod event;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub use event::EventSerializer;
pub use property::PropertySerializer;

use alloc::format;
use alloc::vec::Vec;

use vc_codedom::Statement;

use crate::Value;
use crate::context::AbsoluteContext;
use crate::descriptor::{EventDescriptor, PropertyDescriptor, TypeFlags};
use crate::error::{HostError, SerializeError};
use crate::host::ObjectId;
use crate::manager::SerializationManager;

// -----------------------------------------------------------------------------
// MemberSerializer

pub trait MemberSerializer {
    type Member;

    fn should_serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        member: &Self::Member,
    ) -> Result<bool, SerializeError>;

    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        owner: ObjectId,
        member: &Self::Member,
        statements: &mut Vec<Statement>,
    ) -> Result<(), SerializeError>;
}

// -----------------------------------------------------------------------------
// BoundProperty

/// A property of one object: its own, or one contributed by an extender
/// provider component.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundProperty {
    descriptor: PropertyDescriptor,
    provider: Option<ObjectId>,
}

impl BoundProperty {
    pub fn own(descriptor: PropertyDescriptor) -> Self {
        Self {
            descriptor,
            provider: None,
        }
    }

    pub fn extended(descriptor: PropertyDescriptor, provider: ObjectId) -> Self {
        Self {
            descriptor,
            provider: Some(provider),
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The extender provider component, for extended properties.
    #[inline]
    pub fn provider(&self) -> Option<ObjectId> {
        self.provider
    }
}

/// The properties of `owner` sorted by name, extended ones included.
pub fn properties_of(
    manager: &SerializationManager<'_>,
    owner: ObjectId,
) -> Result<Vec<BoundProperty>, SerializeError> {
    let host = manager.host();
    let registry = manager.registry();
    let ty = manager.type_of(owner)?;
    let desc = registry
        .get(ty)
        .ok_or_else(|| HostError::UnknownType(registry.path_of(ty).into()))?;

    let mut properties: Vec<BoundProperty> =
        desc.properties().iter().cloned().map(BoundProperty::own).collect();

    if host.contains(owner) {
        for provider in host.components() {
            if provider == owner {
                continue;
            }
            let Some(provider_desc) = host.type_of(provider).and_then(|ty| registry.get(ty)) else {
                continue;
            };
            if !provider_desc.has(TypeFlags::EXTENDER_PROVIDER) {
                continue;
            }
            properties.extend(
                provider_desc
                    .provides()
                    .iter()
                    .cloned()
                    .map(|p| BoundProperty::extended(p, provider)),
            );
        }
    }

    properties.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(properties)
}

/// The current value of `property` on `owner`.
pub fn property_value(
    manager: &SerializationManager<'_>,
    owner: ObjectId,
    property: &BoundProperty,
) -> Result<Value, HostError> {
    match property.provider {
        Some(provider) => manager.host().get_extended(provider, owner, property.name()),
        None => manager.host().get_value(owner, property.name()),
    }
}

fn events_of(
    manager: &SerializationManager<'_>,
    owner: ObjectId,
) -> Result<Vec<EventDescriptor>, SerializeError> {
    let registry = manager.registry();
    let ty = manager.type_of(owner)?;
    let desc = registry
        .get(ty)
        .ok_or_else(|| HostError::UnknownType(registry.path_of(ty).into()))?;
    Ok(desc.events().to_vec())
}

// -----------------------------------------------------------------------------
// Walks

/// Serializes the properties of `owner`, skipping hidden and design-only
/// ones. A failing property is reported and skipped.
pub(crate) fn serialize_properties(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    statements: &mut Vec<Statement>,
) {
    let properties = match properties_of(manager, owner) {
        Ok(properties) => properties,
        Err(err) => return manager.report(err),
    };
    for property in properties {
        if property.descriptor.is_design_only() {
            continue;
        }
        serialize_member(manager, &PropertySerializer, owner, &property, statements);
    }
}

pub(crate) fn serialize_events(
    manager: &mut SerializationManager<'_>,
    owner: ObjectId,
    statements: &mut Vec<Statement>,
) {
    let events = match events_of(manager, owner) {
        Ok(events) => events,
        Err(err) => return manager.report(err),
    };
    for event in events {
        serialize_member(manager, &EventSerializer, owner, &event, statements);
    }
}

/// Runs one member serializer, reporting its failure.
pub(crate) fn serialize_member<S: MemberSerializer>(
    manager: &mut SerializationManager<'_>,
    serializer: &S,
    owner: ObjectId,
    member: &S::Member,
    statements: &mut Vec<Statement>,
) {
    let result = serializer
        .should_serialize(manager, owner, member)
        .and_then(|should| match should {
            true => serializer.serialize(manager, owner, member, statements),
            false => Ok(()),
        });
    if let Err(err) = result {
        manager.report(err);
    }
}

/// Writes design-only properties of `owner` to the metadata store.
pub(crate) fn serialize_design_time(manager: &mut SerializationManager<'_>, owner: ObjectId) {
    if manager.host().resources().is_none() {
        return;
    }
    let properties = match properties_of(manager, owner) {
        Ok(properties) => properties,
        Err(err) => return manager.report(err),
    };
    let Some(prefix) = manager.resource_owner_name(owner) else {
        return;
    };
    for property in properties {
        let descriptor = &property.descriptor;
        if !descriptor.is_design_only() || descriptor.is_hidden() || property.provider.is_some() {
            continue;
        }
        let value = match property_value(manager, owner, &property) {
            Ok(value) if value.is_detached() => value,
            Ok(_) => continue,
            Err(err) => {
                manager.report(SerializeError::from(err));
                continue;
            }
        };
        let absolute = manager
            .context()
            .get::<AbsoluteContext>()
            .is_some_and(|a| a.applies_to(descriptor.name()));
        let should = absolute || descriptor.should_serialize_value(&value);
        let name = format!("{prefix}.{}", descriptor.name());
        manager.write_metadata(&name, value, should);
    }
}
