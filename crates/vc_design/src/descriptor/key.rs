use core::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// TypeKey

/// Index of a [`TypeDescriptor`](crate::descriptor::TypeDescriptor) in a
/// [`TypeRegistry`](crate::descriptor::TypeRegistry).
///
/// Keys of the builtin types are constants, every registry created with
/// [`TypeRegistry::new`](crate::descriptor::TypeRegistry::new) assigns them
/// in the same order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TypeKey(u32);

impl TypeKey {
    pub const BOOL: Self = Self(0);
    pub const CHAR: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const FLOAT: Self = Self(3);
    pub const DOUBLE: Self = Self(4);
    pub const STRING: Self = Self(5);
    pub const TYPE: Self = Self(6);
    pub const OBJECT: Self = Self(7);
    pub const LIST: Self = Self(8);
    pub const CONTAINER: Self = Self(9);
    pub const RESOURCE_MANAGER: Self = Self(10);

    pub(crate) const BUILTIN_COUNT: u32 = 11;

    #[inline(always)]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
