//! Serializer selection.
//!
//! Every value is handled by one of a fixed set of serializers, chosen
//! from the capability flags of its type.

use alloc::vec::Vec;

use vc_codedom::{Expression, Statement};

use crate::Value;
use crate::context::AbsoluteContext;
use crate::descriptor::{TypeFlags, TypeKey, TypeRegistry};
use crate::error::{DeserializeError, SerializeError};
use crate::manager::SerializationManager;
use crate::serializers::{CollectionSerializer, ComponentSerializer, ContainerSerializer};
use crate::serializers::{DefaultSerializer, EnumSerializer, PrimitiveSerializer};
use crate::serializers::{ResourceManagerSerializer, deserialize_sequence};

// -----------------------------------------------------------------------------
// Serialized

/// The result of serializing one value.
#[derive(Clone, Debug, PartialEq)]
pub enum Serialized {
    /// The value is fully described by an expression.
    Expression(Expression),
    /// The value needs statements, e.g. a declaration and member
    /// assignments. Its expression is bound in the manager.
    Statements(Vec<Statement>),
}

/// What a serializer turns back into a value.
#[derive(Clone, Copy, Debug)]
pub enum DeserializeInput<'a> {
    Expression(&'a Expression),
    Statements(&'a [Statement]),
}

// -----------------------------------------------------------------------------
// CodeSerializer

pub trait CodeSerializer: Sync {
    fn serialize(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError>;

    /// Serializes `value` with every member forced, defaults included.
    fn serialize_absolute(
        &self,
        manager: &mut SerializationManager<'_>,
        value: &Value,
    ) -> Result<Serialized, SerializeError> {
        manager.with_context(AbsoluteContext::all(), |m| self.serialize(m, value))
    }

    fn deserialize(
        &self,
        manager: &mut SerializationManager<'_>,
        input: DeserializeInput<'_>,
    ) -> Result<Value, DeserializeError> {
        match input {
            DeserializeInput::Expression(expression) => {
                manager.deserialize_expression(None, expression)
            }
            DeserializeInput::Statements(statements) => deserialize_sequence(manager, statements),
        }
    }
}

// -----------------------------------------------------------------------------
// SerializerKind

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SerializerKind {
    Primitive,
    Component,
    Enum,
    Collection,
    Container,
    ResourceManager,
    Default,
}

impl SerializerKind {
    /// Picks the serializer for values of `ty`. Untyped values are
    /// primitives.
    ///
    /// ```
    /// use vc_design::descriptor::{TypeKey, TypeRegistry};
    /// use vc_design::dispatch::SerializerKind;
    ///
    /// let registry = TypeRegistry::new();
    /// assert_eq!(SerializerKind::select(&registry, None), SerializerKind::Primitive);
    /// assert_eq!(
    ///     SerializerKind::select(&registry, Some(TypeKey::LIST)),
    ///     SerializerKind::Collection,
    /// );
    /// ```
    pub fn select(registry: &TypeRegistry, ty: Option<TypeKey>) -> Self {
        let Some(ty) = ty else {
            return Self::Primitive;
        };
        let flags = registry.flags(ty);
        if flags.contains(TypeFlags::COMPONENT) {
            Self::Component
        } else if flags.contains(TypeFlags::ENUM) {
            Self::Enum
        } else if flags.contains(TypeFlags::PRIMITIVE) {
            Self::Primitive
        } else if flags.contains(TypeFlags::COLLECTION) {
            Self::Collection
        } else if flags.contains(TypeFlags::CONTAINER) {
            Self::Container
        } else if flags.contains(TypeFlags::RESOURCE_MANAGER) {
            Self::ResourceManager
        } else {
            Self::Default
        }
    }

    pub fn serializer(self) -> &'static dyn CodeSerializer {
        match self {
            Self::Primitive => &PrimitiveSerializer,
            Self::Component => &ComponentSerializer,
            Self::Enum => &EnumSerializer,
            Self::Collection => &CollectionSerializer,
            Self::Container => &ContainerSerializer,
            Self::ResourceManager => &ResourceManagerSerializer,
            Self::Default => &DefaultSerializer,
        }
    }
}
