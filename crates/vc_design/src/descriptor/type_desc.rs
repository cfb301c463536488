use alloc::string::String;
use alloc::vec::Vec;

use vc_codedom::TypeRef;

use crate::descriptor::{ConstructorDescriptor, EnumVariant, EventDescriptor};
use crate::descriptor::{PropertyDescriptor, TypeFlags, TypeKey};

// -----------------------------------------------------------------------------
// TypeDescriptor

/// Metadata of a designable type.
///
/// Built with the `with_*` methods and handed to
/// [`TypeRegistry::register`](crate::descriptor::TypeRegistry::register),
/// which assigns its [`TypeKey`].
///
/// # Example
///
/// ```
/// use vc_design::descriptor::{PropertyDescriptor, TypeDescriptor, TypeFlags, TypeKey, TypeRegistry};
///
/// let mut registry = TypeRegistry::new();
/// let button = registry.register(
///     TypeDescriptor::new("Demo.Button", TypeFlags::COMPONENT)
///         .with_property(PropertyDescriptor::new("Text", TypeKey::STRING).with_default("")),
/// );
///
/// let info = registry.get(button).unwrap();
/// assert_eq!(info.short_name(), "Button");
/// assert!(info.property("Text").is_some());
/// ```
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    key: TypeKey,
    path: String,
    flags: TypeFlags,
    assembly: Option<String>,
    element: Option<TypeKey>,
    properties: Vec<PropertyDescriptor>,
    provides: Vec<PropertyDescriptor>,
    events: Vec<EventDescriptor>,
    variants: Vec<EnumVariant>,
    constructor: Option<ConstructorDescriptor>,
    default_constructor: bool,
}

impl TypeDescriptor {
    pub fn new(path: impl Into<String>, flags: TypeFlags) -> Self {
        Self {
            key: TypeKey::new(u32::MAX),
            path: path.into(),
            flags,
            assembly: None,
            element: None,
            properties: Vec::new(),
            provides: Vec::new(),
            events: Vec::new(),
            variants: Vec::new(),
            constructor: None,
            default_constructor: true,
        }
    }

    /// An enum type; `flags` makes its values combinable.
    pub fn enumeration(path: impl Into<String>, flags: bool) -> Self {
        let mut bits = TypeFlags::ENUM | TypeFlags::SERIALIZABLE;
        if flags {
            bits |= TypeFlags::FLAGS;
        }
        Self::new(path, bits)
    }

    pub fn with_variant(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant::new(name, value));
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a property this type attaches to other components, and marks
    /// the type as an extender provider.
    pub fn with_extender(mut self, property: PropertyDescriptor) -> Self {
        self.flags |= TypeFlags::EXTENDER_PROVIDER;
        self.provides.push(property);
        self
    }

    pub fn with_event(mut self, event: EventDescriptor) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// The type can only be built through its constructor descriptor.
    pub fn without_default_constructor(mut self) -> Self {
        self.default_constructor = false;
        self
    }

    pub fn with_assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = Some(assembly.into());
        self
    }

    /// Element type of a collection.
    pub fn with_element(mut self, element: TypeKey) -> Self {
        self.element = Some(element);
        self
    }

    pub(crate) fn assign_key(&mut self, key: TypeKey) {
        self.key = key;
        let provides = core::mem::take(&mut self.provides);
        self.provides = provides.into_iter().map(|p| p.provided_by(key)).collect();
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last segment of the path.
    pub fn short_name(&self) -> &str {
        match self.path.rfind(['.', '+']) {
            Some(index) => &self.path[index + 1..],
            None => &self.path,
        }
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.path.clone())
    }

    #[inline]
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    #[inline]
    pub fn has(&self, flags: TypeFlags) -> bool {
        self.flags.contains(flags)
    }

    #[inline]
    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    #[inline]
    pub fn element(&self) -> Option<TypeKey> {
        self.element
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Properties attached to other components by this extender provider.
    #[inline]
    pub fn provides(&self) -> &[PropertyDescriptor] {
        &self.provides
    }

    pub fn provided(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.provides.iter().find(|p| p.name() == name)
    }

    #[inline]
    pub fn events(&self) -> &[EventDescriptor] {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.name() == name)
    }

    #[inline]
    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name() == name)
    }

    pub fn variant_by_value(&self, value: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value() == value)
    }

    #[inline]
    pub fn constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructor.as_ref()
    }

    #[inline]
    pub fn has_default_constructor(&self) -> bool {
        self.default_constructor
    }
}
