use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use thiserror::Error;
use vc_codedom::LinePragma;

use crate::host::ObjectId;

// -----------------------------------------------------------------------------
// HostError

/// Failures reported by a [`DesignHost`](crate::host::DesignHost).
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum HostError {
    #[error("Object {0} does not exist in the design host")]
    UnknownObject(ObjectId),

    #[error("Type `{0}` is not registered")]
    UnknownType(String),

    #[error("Type `{ty}` has no member named `{member}`")]
    UnknownMember { ty: String, member: String },

    #[error("Type `{ty}` has no method named `{method}`")]
    UnknownMethod { ty: String, method: String },

    #[error("No constructor of `{ty}` accepts {args} argument(s)")]
    NoMatchingConstructor { ty: String, args: usize },

    #[error("The name `{0}` is already used by another component")]
    DuplicateName(String),
}

// -----------------------------------------------------------------------------
// ManagerError

/// Violations of the session naming and instance rules.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ManagerError {
    #[error("The name `{0}` is already bound to another object in this session")]
    NameInUse(String),

    #[error("Object is already named `{existing}`, cannot rename it to `{name}`")]
    AlreadyNamed { name: String, existing: String },

    #[error("The name `{0}` is already declared in this session")]
    DuplicateDeclaration(String),

    #[error("Recycled instance `{name}` is a `{actual}`, expected `{expected}`")]
    RecycledTypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

// -----------------------------------------------------------------------------
// ContextError

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContextError {
    #[error("Statements of object {0} were already populated with different content")]
    StatementsRepopulated(ObjectId),
}

// -----------------------------------------------------------------------------
// SerializeError

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SerializeError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("No expression could be resolved for the owner of member `{0}`")]
    UnresolvedTarget(String),

    #[error("The value of member `{0}` could not be turned into an expression")]
    UnserializableValue(String),

    #[error("Type `{0}` has neither a default constructor nor a constructor descriptor")]
    NoCreationExpression(String),
}

// -----------------------------------------------------------------------------
// DeserializeError

/// Failures while turning statements back into objects.
///
/// Errors raised while interpreting a statement that carries a source
/// position are wrapped in [`DeserializeError::At`].
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DeserializeError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("Type `{0}` could not be resolved")]
    TypeNotFound(String),

    #[error("The name `{0}` is not declared")]
    UndeclaredName(String),

    #[error("There is no root object to resolve `this` against")]
    NoRootObject,

    #[error("Type `{ty}` has no event named `{event}`")]
    UnknownEvent { ty: String, event: String },

    #[error("Expected an object, found {0}")]
    NotAnObject(String),

    #[error("Operator `{op}` cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unsupported expression: {0}")]
    Unsupported(String),

    #[error("No statement in the sequence creates an instance")]
    NoInstance,

    #[error("{error} (at {line})")]
    At {
        line: LinePragma,
        error: Box<DeserializeError>,
    },
}

impl DeserializeError {
    /// Attaches a source position, unless one is already attached.
    pub fn at(self, line: Option<&LinePragma>) -> Self {
        match (self, line) {
            (err @ Self::At { .. }, _) | (err, None) => err,
            (err, Some(line)) => Self::At {
                line: line.clone(),
                error: Box::new(err),
            },
        }
    }

    pub fn line(&self) -> Option<&LinePragma> {
        match self {
            Self::At { line, .. } => Some(line),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// StoreError

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("The store is closed and can no longer capture objects")]
    Closed,

    #[error("The store must be closed before it can be loaded")]
    NotClosed,

    #[error("Object {0} is not a named component of the design host")]
    Unnamed(ObjectId),
}

// -----------------------------------------------------------------------------
// Diagnostic

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiagnosticError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
}

/// A non-fatal failure collected during a pass.
///
/// With the `debug` feature in debug builds, the context stack at the
/// time of the failure is appended to the message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    error: DiagnosticError,
    context: Option<String>,
}

impl Diagnostic {
    pub fn new(error: impl Into<DiagnosticError>) -> Self {
        Self {
            error: error.into(),
            context: None,
        }
    }

    pub(crate) fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }

    #[inline]
    pub fn error(&self) -> &DiagnosticError {
        &self.error
    }

    /// The context stack dump, when captured.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} (stack:\n{context})", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl core::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<SerializeError> for Diagnostic {
    #[inline]
    fn from(error: SerializeError) -> Self {
        Self::new(error)
    }
}

impl From<DeserializeError> for Diagnostic {
    #[inline]
    fn from(error: DeserializeError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use vc_codedom::LinePragma;

    use super::DeserializeError;

    #[test]
    fn line_is_attached_once() {
        let line = LinePragma::new("Form1.Designer.cs", 12);
        let err = DeserializeError::UndeclaredName("button9".into())
            .at(Some(&line))
            .at(Some(&LinePragma::new("Other.cs", 1)));

        assert_eq!(err.line(), Some(&line));
        assert_eq!(
            err.to_string(),
            "The name `button9` is not declared (at Form1.Designer.cs:12)"
        );
    }
}
