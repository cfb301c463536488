use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{Statement, TypeRef};

/// A field of the generated class, one per named component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberField {
    pub ty: TypeRef,
    pub name: String,
}

impl MemberField {
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// The generated class of a design document.
///
/// `base` is the type of the root object, `fields` hold the named
/// components and `initialize` is the body of the initialization method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub base: TypeRef,
    pub fields: Vec<MemberField>,
    pub initialize: Vec<Statement>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, base: TypeRef) -> Self {
        Self {
            name: name.into(),
            base,
            fields: Vec::new(),
            initialize: Vec::new(),
        }
    }

    /// Looks up the declared type of a field.
    pub fn field_type(&self, name: &str) -> Option<&TypeRef> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }
}
