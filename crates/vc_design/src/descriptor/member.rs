use alloc::string::String;
use alloc::vec::Vec;

use vc_codedom::TypeRef;

use crate::Value;
use crate::descriptor::{MemberFlags, TypeKey, Visibility};

// -----------------------------------------------------------------------------
// PropertyDescriptor

/// Describes a property of a type, or a property an extender provider
/// attaches to other components.
///
/// A property without a default value always has a value worth
/// serializing, and cannot be reset.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDescriptor {
    name: String,
    ty: TypeKey,
    default: Option<Value>,
    visibility: Visibility,
    flags: MemberFlags,
    provider: Option<TypeKey>,
}

impl PropertyDescriptor {
    /// Creates a browsable, visible property with no default value.
    pub fn new(name: impl Into<String>, ty: TypeKey) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            visibility: Visibility::Visible,
            flags: MemberFlags::BROWSABLE,
            provider: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Serialized in place, member by member. Content properties are
    /// usually read-only.
    pub fn content(mut self) -> Self {
        self.visibility = Visibility::Content;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = Visibility::Hidden;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.flags |= MemberFlags::READ_ONLY;
        self
    }

    pub fn localizable(mut self) -> Self {
        self.flags |= MemberFlags::LOCALIZABLE;
        self
    }

    pub fn design_only(mut self) -> Self {
        self.flags |= MemberFlags::DESIGN_ONLY;
        self
    }

    pub fn not_browsable(mut self) -> Self {
        self.flags.remove(MemberFlags::BROWSABLE);
        self
    }

    #[inline]
    pub(crate) fn provided_by(mut self, provider: TypeKey) -> Self {
        self.provider = Some(provider);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    #[inline]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    /// The extender provider type that attaches this property.
    #[inline]
    pub fn provider(&self) -> Option<TypeKey> {
        self.provider
    }

    #[inline]
    pub fn is_content(&self) -> bool {
        self.visibility == Visibility::Content
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    #[inline]
    pub fn is_browsable(&self) -> bool {
        self.flags.contains(MemberFlags::BROWSABLE)
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(MemberFlags::READ_ONLY)
    }

    #[inline]
    pub fn is_localizable(&self) -> bool {
        self.flags.contains(MemberFlags::LOCALIZABLE)
    }

    #[inline]
    pub fn is_design_only(&self) -> bool {
        self.flags.contains(MemberFlags::DESIGN_ONLY)
    }

    #[inline]
    pub fn is_extender(&self) -> bool {
        self.provider.is_some()
    }

    #[inline]
    pub fn can_reset(&self) -> bool {
        self.default.is_some()
    }

    /// Returns `true` when `value` differs from the default, or when no
    /// default is declared.
    pub fn should_serialize_value(&self, value: &Value) -> bool {
        self.default.as_ref() != Some(value)
    }
}

// -----------------------------------------------------------------------------
// EventDescriptor

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDescriptor {
    name: String,
    delegate: TypeRef,
}

impl EventDescriptor {
    /// Creates an event with the `System.EventHandler` delegate type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delegate: TypeRef::new("System.EventHandler"),
        }
    }

    pub fn with_delegate(mut self, delegate: impl Into<TypeRef>) -> Self {
        self.delegate = delegate.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn delegate(&self) -> &TypeRef {
        &self.delegate
    }
}

// -----------------------------------------------------------------------------
// ConstructorDescriptor

/// Maps constructor arguments onto properties.
///
/// A complete constructor recreates the whole value, so nothing is left
/// to assign after it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    params: Vec<String>,
    complete: bool,
}

impl ConstructorDescriptor {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            complete: false,
        }
    }

    pub fn complete(mut self) -> Self {
        self.complete = true;
        self
    }

    #[inline]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

// -----------------------------------------------------------------------------
// EnumVariant

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    name: String,
    value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> i64 {
        self.value
    }
}
