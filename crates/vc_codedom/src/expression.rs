use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::TypeRef;

// -----------------------------------------------------------------------------
// Literal

/// A primitive constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f32),
    Double(f64),
    Str(String),
}

// -----------------------------------------------------------------------------
// BinaryOp

/// Operators of a [`Expression::Binary`] node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    BitwiseOr,
    BitwiseAnd,
    BooleanOr,
    BooleanAnd,
    ValueEquality,
    IdentityEquality,
    IdentityInequality,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl BinaryOp {
    /// The C#-like token of this operator.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulus => "%",
            Self::BitwiseOr => "|",
            Self::BitwiseAnd => "&",
            Self::BooleanOr => "||",
            Self::BooleanAnd => "&&",
            Self::ValueEquality | Self::IdentityEquality => "==",
            Self::IdentityInequality => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

// -----------------------------------------------------------------------------
// Expression

/// An expression node of the statement tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// The object whose initialization method is being generated.
    This,
    /// A local variable.
    Variable(String),
    /// A field of `target`. A [`TypeReference`](Expression::TypeReference)
    /// target makes this a static field, which is how enum members are
    /// referenced.
    Field {
        target: Box<Expression>,
        name: String,
    },
    Property {
        target: Box<Expression>,
        name: String,
    },
    /// A type used as the target of a static member access.
    TypeReference(TypeRef),
    ObjectCreate {
        ty: TypeRef,
        args: Vec<Expression>,
    },
    /// A one-dimensional array of `ty` elements.
    ArrayCreate {
        ty: TypeRef,
        items: Vec<Expression>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expression>,
    },
    Primitive(Literal),
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },
    MethodInvoke {
        target: Box<Expression>,
        method: String,
        args: Vec<Expression>,
    },
    /// A delegate of type `ty` bound to `target.method`.
    DelegateCreate {
        ty: TypeRef,
        target: Box<Expression>,
        method: String,
    },
    TypeOf(TypeRef),
}

impl Expression {
    #[inline]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn field(target: Expression, name: impl Into<String>) -> Self {
        Self::Field {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn property(target: Expression, name: impl Into<String>) -> Self {
        Self::Property {
            target: Box::new(target),
            name: name.into(),
        }
    }

    /// A static field of `ty`, e.g. `Anchor.Top`.
    pub fn static_field(ty: TypeRef, name: impl Into<String>) -> Self {
        Self::field(Self::TypeReference(ty), name)
    }

    pub fn create(ty: TypeRef, args: Vec<Expression>) -> Self {
        Self::ObjectCreate { ty, args }
    }

    pub fn cast(ty: TypeRef, expr: Expression) -> Self {
        Self::Cast {
            ty,
            expr: Box::new(expr),
        }
    }

    pub fn binary(left: Expression, op: BinaryOp, right: Expression) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn invoke(target: Expression, method: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::MethodInvoke {
            target: Box::new(target),
            method: method.into(),
            args,
        }
    }

    pub fn delegate(ty: TypeRef, target: Expression, method: impl Into<String>) -> Self {
        Self::DelegateCreate {
            ty,
            target: Box::new(target),
            method: method.into(),
        }
    }

    #[inline]
    pub const fn null() -> Self {
        Self::Primitive(Literal::Null)
    }

    #[inline]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Primitive(Literal::Str(value.into()))
    }

    #[inline]
    pub const fn int(value: i64) -> Self {
        Self::Primitive(Literal::Int(value))
    }

    #[inline]
    pub const fn bool(value: bool) -> Self {
        Self::Primitive(Literal::Bool(value))
    }

    /// Returns the member name when this is a field, property or
    /// method access.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Field { name, .. } | Self::Property { name, .. } => Some(name),
            Self::MethodInvoke { method, .. } => Some(method),
            _ => None,
        }
    }

    /// Folds `items` into a left-associative chain of `op`.
    ///
    /// Returns `None` for an empty input.
    pub fn chain(op: BinaryOp, items: impl IntoIterator<Item = Expression>) -> Option<Self> {
        items
            .into_iter()
            .reduce(|left, right| Self::binary(left, op, right))
    }
}

impl From<Literal> for Expression {
    #[inline]
    fn from(value: Literal) -> Self {
        Self::Primitive(value)
    }
}
