use bitflags::bitflags;

bitflags! {
    /// Capabilities of a described type, consulted by serializer dispatch.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u16 {
        /// Sited in the design container and named by it.
        const COMPONENT         = 1 << 0;
        const ENUM              = 1 << 1;
        /// Enum whose values combine with bitwise or.
        const FLAGS             = 1 << 2;
        const PRIMITIVE         = 1 << 3;
        const COLLECTION        = 1 << 4;
        /// Owns child components, or is the component container itself.
        const CONTAINER         = 1 << 5;
        const RESOURCE_MANAGER  = 1 << 6;
        /// Values of this type may be written to a resource store.
        const SERIALIZABLE      = 1 << 7;
        const EXTENDER_PROVIDER = 1 << 8;
        /// Constructed with the component container as its only argument.
        const NEEDS_CONTAINER   = 1 << 9;
    }
}

bitflags! {
    /// Attributes of a property descriptor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u8 {
        const BROWSABLE   = 1 << 0;
        const READ_ONLY   = 1 << 1;
        const LOCALIZABLE = 1 << 2;
        /// Exists only at design time, persisted as resource metadata.
        const DESIGN_ONLY = 1 << 3;
    }
}

/// How a property takes part in code generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Serialized as an assignment of its value.
    #[default]
    Visible,
    /// Never serialized.
    Hidden,
    /// The value is serialized in place, member by member.
    Content,
}
