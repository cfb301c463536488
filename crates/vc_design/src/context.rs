//! The serialization context stack.
//!
//! Serializers communicate through typed frames pushed for the duration
//! of a nested call: the expression a value is being assigned to, the
//! root object, the statement table of a document pass, absolute mode and
//! the member being serialized.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use vc_codedom::{Expression, Statement};

use crate::Value;
use crate::descriptor::{PropertyDescriptor, TypeKey};
use crate::error::ContextError;
use crate::host::ObjectId;

// -----------------------------------------------------------------------------
// ExpressionContext

/// The expression a value is being serialized for, e.g. the property
/// reference on the left side of an assignment.
///
/// A preset value marks the expression as already naming that object, so
/// its serializer fills it in instead of creating a new instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionContext {
    expression: Expression,
    ty: Option<TypeKey>,
    owner: Option<ObjectId>,
    preset: Option<Value>,
}

impl ExpressionContext {
    pub fn new(expression: Expression, ty: Option<TypeKey>, owner: Option<ObjectId>) -> Self {
        Self {
            expression,
            ty,
            owner,
            preset: None,
        }
    }

    pub fn with_preset(mut self, value: Value) -> Self {
        self.preset = Some(value);
        self
    }

    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    #[inline]
    pub fn ty(&self) -> Option<TypeKey> {
        self.ty
    }

    #[inline]
    pub fn owner(&self) -> Option<ObjectId> {
        self.owner
    }

    #[inline]
    pub fn preset(&self) -> Option<&Value> {
        self.preset.as_ref()
    }

    /// Returns `true` when this frame was pushed for exactly `value`.
    pub fn is_preset(&self, value: &Value) -> bool {
        self.preset.as_ref() == Some(value)
    }
}

// -----------------------------------------------------------------------------
// RootContext

#[derive(Clone, Debug, PartialEq)]
pub struct RootContext {
    expression: Expression,
    value: ObjectId,
}

impl RootContext {
    pub fn new(expression: Expression, value: ObjectId) -> Self {
        Self { expression, value }
    }

    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    #[inline]
    pub fn value(&self) -> ObjectId {
        self.value
    }
}

// -----------------------------------------------------------------------------
// StatementContext

/// Per-owner statement slots of a document or store pass.
///
/// Statements produced for a declared owner land in its slot no matter
/// where in the object graph the owner was first reached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementContext {
    slots: Vec<(ObjectId, Option<Vec<Statement>>)>,
}

impl StatementContext {
    pub fn new(owners: impl IntoIterator<Item = ObjectId>) -> Self {
        Self {
            slots: owners.into_iter().map(|owner| (owner, None)).collect(),
        }
    }

    pub fn contains(&self, owner: ObjectId) -> bool {
        self.slots.iter().any(|(id, _)| *id == owner)
    }

    /// The slot of a declared owner, created empty on first access.
    pub fn statements_mut(&mut self, owner: ObjectId) -> Option<&mut Vec<Statement>> {
        self.slots
            .iter_mut()
            .find(|(id, _)| *id == owner)
            .map(|(_, slot)| slot.get_or_insert_with(Vec::new))
    }

    pub fn statements(&self, owner: ObjectId) -> Option<&[Statement]> {
        self.slots
            .iter()
            .find(|(id, _)| *id == owner)
            .and_then(|(_, slot)| slot.as_deref())
    }

    /// Fills the slot of `owner`, declaring it when needed.
    ///
    /// A slot may be populated again only with identical content.
    pub fn populate(
        &mut self,
        owner: ObjectId,
        statements: Vec<Statement>,
    ) -> Result<(), ContextError> {
        match self.slots.iter_mut().find(|(id, _)| *id == owner) {
            Some((_, Some(existing))) if *existing != statements => {
                Err(ContextError::StatementsRepopulated(owner))
            }
            Some((_, slot)) => {
                *slot = Some(statements);
                Ok(())
            }
            None => {
                self.slots.push((owner, Some(statements)));
                Ok(())
            }
        }
    }

    pub fn take(&mut self, owner: ObjectId) -> Option<Vec<Statement>> {
        self.slots
            .iter_mut()
            .find(|(id, _)| *id == owner)
            .and_then(|(_, slot)| slot.take())
    }

    pub fn owners(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots.iter().map(|(id, _)| *id)
    }

    /// Consumes the table in declaration order, skipping untouched slots.
    pub fn into_statements(self) -> impl Iterator<Item = (ObjectId, Vec<Statement>)> {
        self.slots
            .into_iter()
            .filter_map(|(id, slot)| slot.map(|statements| (id, statements)))
    }
}

// -----------------------------------------------------------------------------
// AbsoluteContext

/// Serialize members regardless of their default values, either every
/// member or a single one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbsoluteContext {
    member: Option<String>,
}

impl AbsoluteContext {
    pub const fn all() -> Self {
        Self { member: None }
    }

    pub fn member(name: impl Into<String>) -> Self {
        Self {
            member: Some(name.into()),
        }
    }

    pub fn applies_to(&self, member: &str) -> bool {
        self.member.as_deref().is_none_or(|name| name == member)
    }
}

// -----------------------------------------------------------------------------
// MemberContext

/// The property currently being serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberContext {
    owner: ObjectId,
    property: PropertyDescriptor,
}

impl MemberContext {
    pub fn new(owner: ObjectId, property: PropertyDescriptor) -> Self {
        Self { owner, property }
    }

    #[inline]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    #[inline]
    pub fn property(&self) -> &PropertyDescriptor {
        &self.property
    }
}

// -----------------------------------------------------------------------------
// ContextFrame

#[derive(Clone, Debug, PartialEq)]
pub enum ContextFrame {
    Expression(ExpressionContext),
    Root(RootContext),
    Statements(StatementContext),
    Absolute(AbsoluteContext),
    Member(MemberContext),
}

impl fmt::Display for ContextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(ctx) => write!(f, "expression `{}`", ctx.expression),
            Self::Root(ctx) => write!(f, "root `{}`", ctx.expression),
            Self::Statements(ctx) => write!(f, "statement table of {} owners", ctx.slots.len()),
            Self::Absolute(ctx) => match &ctx.member {
                Some(member) => write!(f, "absolute `{member}`"),
                None => f.write_str("absolute"),
            },
            Self::Member(ctx) => write!(f, "member `{}`", ctx.property.name()),
        }
    }
}

/// A frame type that can be looked up on a [`ContextStack`].
pub trait ContextItem: Sized + Into<ContextFrame> {
    fn from_frame(frame: &ContextFrame) -> Option<&Self>;

    fn from_frame_mut(frame: &mut ContextFrame) -> Option<&mut Self>;

    fn from_frame_owned(frame: ContextFrame) -> Option<Self>;
}

macro_rules! impl_context_item {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ContextFrame {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl ContextItem for $ty {
                #[inline]
                fn from_frame(frame: &ContextFrame) -> Option<&Self> {
                    match frame {
                        ContextFrame::$variant(item) => Some(item),
                        _ => None,
                    }
                }

                #[inline]
                fn from_frame_mut(frame: &mut ContextFrame) -> Option<&mut Self> {
                    match frame {
                        ContextFrame::$variant(item) => Some(item),
                        _ => None,
                    }
                }

                #[inline]
                fn from_frame_owned(frame: ContextFrame) -> Option<Self> {
                    match frame {
                        ContextFrame::$variant(item) => Some(item),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_context_item! {
    ExpressionContext => Expression,
    RootContext => Root,
    StatementContext => Statements,
    AbsoluteContext => Absolute,
    MemberContext => Member,
}

// -----------------------------------------------------------------------------
// ContextStack

/// A stack of [`ContextFrame`]s, searched from the top.
#[derive(Default, Clone)]
pub struct ContextStack {
    frames: Vec<ContextFrame>,
}

impl ContextStack {
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Pushes a frame and returns the depth to hand back to
    /// [`restore`](Self::restore).
    pub fn push(&mut self, frame: impl Into<ContextFrame>) -> usize {
        self.frames.push(frame.into());
        self.frames.len() - 1
    }

    /// Pops back to `depth` and returns the frame pushed at that depth.
    ///
    /// Frames left above it by an unbalanced callee are discarded.
    pub fn restore(&mut self, depth: usize) -> Option<ContextFrame> {
        debug_assert_eq!(self.frames.len(), depth + 1, "unbalanced context stack");
        self.frames.truncate(depth + 1);
        self.frames.pop()
    }

    #[inline]
    pub fn current(&self) -> Option<&ContextFrame> {
        self.frames.last()
    }

    /// The topmost frame of type `T`.
    pub fn get<T: ContextItem>(&self) -> Option<&T> {
        self.frames.iter().rev().find_map(T::from_frame)
    }

    pub fn get_mut<T: ContextItem>(&mut self) -> Option<&mut T> {
        self.frames.iter_mut().rev().find_map(T::from_frame_mut)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in the order they were pushed.
    pub fn iter(&self) -> core::slice::Iter<'_, ContextFrame> {
        self.frames.iter()
    }
}

impl fmt::Debug for ContextStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();

        if let Some(first) = iter.next() {
            writeln!(f, "`{first}`")?;
        }

        for frame in iter {
            writeln!(f, " -> `{frame}`")?;
        }

        Ok(())
    }
}
