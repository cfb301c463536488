use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Expression, TypeRef};

// -----------------------------------------------------------------------------
// LinePragma

/// A source position attached to a statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinePragma {
    pub file: String,
    pub line: u32,
}

impl LinePragma {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for LinePragma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// -----------------------------------------------------------------------------
// OrderHint

/// Ordering tag the statement assembler honors before looking at the
/// shape of a statement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderHint {
    #[default]
    Default,
    /// Creation of the component container.
    Container,
    /// Opens a bracket, e.g. suspending layout.
    Begin,
    /// Closes a bracket opened by a [`Begin`](OrderHint::Begin) statement.
    End,
}

// -----------------------------------------------------------------------------
// Statement

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    VariableDeclaration {
        ty: TypeRef,
        name: String,
        init: Option<Expression>,
    },
    Assign {
        left: Expression,
        right: Expression,
    },
    Expression(Expression),
    AttachEvent {
        target: Expression,
        event: String,
        listener: Expression,
    },
    RemoveEvent {
        target: Expression,
        event: String,
        listener: Expression,
    },
    Comment(String),
}

/// A statement plus its ordering tag and optional source position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    kind: StatementKind,
    #[serde(default)]
    order: OrderHint,
    #[serde(default)]
    line: Option<LinePragma>,
}

impl Statement {
    pub const fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            order: OrderHint::Default,
            line: None,
        }
    }

    pub fn declare(ty: TypeRef, name: impl Into<String>, init: Option<Expression>) -> Self {
        Self::new(StatementKind::VariableDeclaration {
            ty,
            name: name.into(),
            init,
        })
    }

    pub const fn assign(left: Expression, right: Expression) -> Self {
        Self::new(StatementKind::Assign { left, right })
    }

    pub const fn expression(expr: Expression) -> Self {
        Self::new(StatementKind::Expression(expr))
    }

    pub fn attach_event(target: Expression, event: impl Into<String>, listener: Expression) -> Self {
        Self::new(StatementKind::AttachEvent {
            target,
            event: event.into(),
            listener,
        })
    }

    pub fn remove_event(target: Expression, event: impl Into<String>, listener: Expression) -> Self {
        Self::new(StatementKind::RemoveEvent {
            target,
            event: event.into(),
            listener,
        })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(StatementKind::Comment(text.into()))
    }

    #[inline]
    pub fn with_order(mut self, order: OrderHint) -> Self {
        self.order = order;
        self
    }

    #[inline]
    pub fn with_line(mut self, line: LinePragma) -> Self {
        self.line = Some(line);
        self
    }

    #[inline]
    pub fn kind(&self) -> &StatementKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> StatementKind {
        self.kind
    }

    #[inline]
    pub fn order(&self) -> OrderHint {
        self.order
    }

    #[inline]
    pub fn line(&self) -> Option<&LinePragma> {
        self.line.as_ref()
    }
}

impl From<StatementKind> for Statement {
    #[inline]
    fn from(kind: StatementKind) -> Self {
        Self::new(kind)
    }
}
