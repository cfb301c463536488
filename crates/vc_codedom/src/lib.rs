#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod declaration;
mod expression;
mod print;
mod statement;
mod type_ref;

// -----------------------------------------------------------------------------
// Exports

pub use declaration::{MemberField, TypeDeclaration};
pub use expression::{BinaryOp, Expression, Literal};
pub use statement::{LinePragma, OrderHint, Statement, StatementKind};
pub use type_ref::TypeRef;
