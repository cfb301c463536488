use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use vc_codedom::Literal;

use crate::descriptor::TypeKey;
use crate::host::ObjectId;

// -----------------------------------------------------------------------------
// Value

/// A value held by a designed object.
///
/// Objects are referenced by identity; everything else is held by value
/// and compared structurally.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Enum {
        ty: TypeKey,
        bits: i64,
    },
    Object(ObjectId),
    List(Vec<Value>),
    Type(TypeKey),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of integral values, including enum bits and chars.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Enum { bits, .. } => Some(*bits),
            Self::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The type of a value that carries it inline. Objects need a host to
    /// answer, `Null` has no type.
    pub fn builtin_type(&self) -> Option<TypeKey> {
        match self {
            Self::Null | Self::Object(_) => None,
            Self::Bool(_) => Some(TypeKey::BOOL),
            Self::Char(_) => Some(TypeKey::CHAR),
            Self::Int(_) => Some(TypeKey::INT),
            Self::Float(_) => Some(TypeKey::FLOAT),
            Self::Double(_) => Some(TypeKey::DOUBLE),
            Self::Str(_) => Some(TypeKey::STRING),
            Self::Enum { ty, .. } => Some(*ty),
            Self::List(_) => Some(TypeKey::LIST),
            Self::Type(_) => Some(TypeKey::TYPE),
        }
    }

    /// Returns `true` when no object identity is reachable from this value.
    pub fn is_detached(&self) -> bool {
        match self {
            Self::Object(_) => false,
            Self::List(items) => items.iter().all(Self::is_detached),
            _ => true,
        }
    }

    pub fn to_literal(&self) -> Option<Literal> {
        Some(match self {
            Self::Null => Literal::Null,
            Self::Bool(v) => Literal::Bool(*v),
            Self::Char(v) => Literal::Char(*v),
            Self::Int(v) => Literal::Int(*v),
            Self::Float(v) => Literal::Float(*v),
            Self::Double(v) => Literal::Double(*v),
            Self::Str(v) => Literal::Str(v.clone()),
            _ => return None,
        })
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Self::Null,
            Literal::Bool(v) => Self::Bool(*v),
            Literal::Char(v) => Self::Char(*v),
            Literal::Int(v) => Self::Int(*v),
            Literal::Float(v) => Self::Float(*v),
            Literal::Double(v) => Self::Double(*v),
            Literal::Str(v) => Self::Str(v.clone()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    char => Char,
    i64 => Int,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    String => Str,
    &str => Str,
    ObjectId => Object,
    Vec<Value> => List,
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::Value;
    use crate::descriptor::TypeKey;

    #[test]
    fn builtin_types() {
        assert_eq!(Value::from("x").builtin_type(), Some(TypeKey::STRING));
        assert_eq!(Value::from(3_i64).builtin_type(), Some(TypeKey::INT));
        assert_eq!(Value::Null.builtin_type(), None);
        let ty = TypeKey::new(42);
        assert_eq!(Value::Enum { ty, bits: 1 }.builtin_type(), Some(ty));
    }

    #[test]
    fn detached_values() {
        assert!(Value::List(vec![Value::from(1_i64), Value::from("a")]).is_detached());
        assert!(Value::from(true).is_detached());
    }
}
