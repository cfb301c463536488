use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// TypeRef

/// A reference to a type by its full path.
///
/// Nested types use `+` as the separator between the declaring type
/// and the nested one (`Demo.Outer+Inner`). Array types carry a rank
/// instead of a decorated path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    path: String,
    #[serde(default)]
    array_rank: u32,
}

impl TypeRef {
    /// Creates a reference to a non-array type.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            array_rank: 0,
        }
    }

    /// Creates a one-dimensional array of `element`.
    pub fn array_of(element: TypeRef) -> Self {
        Self {
            path: element.path,
            array_rank: element.array_rank + 1,
        }
    }

    /// The full path of the type, or of the element type for arrays.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn array_rank(&self) -> u32 {
        self.array_rank
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// Returns the element type of an array, or `self` for a non-array.
    pub fn element(&self) -> TypeRef {
        Self {
            path: self.path.clone(),
            array_rank: self.array_rank.saturating_sub(1),
        }
    }

    /// The last segment of the path, ignoring namespaces and declaring types.
    ///
    /// ```
    /// # use vc_codedom::TypeRef;
    /// assert_eq!(TypeRef::new("Demo.Outer+Inner").short_name(), "Inner");
    /// assert_eq!(TypeRef::new("Button").short_name(), "Button");
    /// ```
    pub fn short_name(&self) -> &str {
        match self.path.rfind(['.', '+']) {
            Some(index) => &self.path[index + 1..],
            None => &self.path,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.path.chars() {
            if ch == '+' {
                f.write_str(".")?;
            } else {
                fmt::Write::write_char(f, ch)?;
            }
        }
        for _ in 0..self.array_rank {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::TypeRef;

    #[test]
    fn nested_and_array_display() {
        let nested = TypeRef::new("Demo.Outer+Inner");
        assert_eq!(nested.to_string(), "Demo.Outer.Inner");

        let array = TypeRef::array_of(nested.clone());
        assert!(array.is_array());
        assert_eq!(array.to_string(), "Demo.Outer.Inner[]");
        assert_eq!(array.element(), nested);
    }
}
