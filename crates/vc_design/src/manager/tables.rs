use alloc::string::String;
use alloc::vec::Vec;

use vc_codedom::{Expression, Statement};

use crate::descriptor::TypeKey;
use crate::hash::HashMap;
use crate::host::ObjectId;
use crate::store::ObjectState;

// -----------------------------------------------------------------------------
// ExpressionTable

/// Object to expression bindings of one pass.
///
/// The first binding of an object wins; later attempts are ignored.
#[derive(Default)]
pub(crate) struct ExpressionTable {
    entries: HashMap<ObjectId, (Expression, bool)>,
}

impl ExpressionTable {
    #[inline]
    pub fn get(&self, object: ObjectId) -> Option<&Expression> {
        self.entries.get(&object).map(|(expression, _)| expression)
    }

    /// Whether the binding of `object` came from a preset context.
    #[inline]
    pub fn is_preset(&self, object: ObjectId) -> Option<bool> {
        self.entries.get(&object).map(|(_, preset)| *preset)
    }

    /// Returns `false` when `object` was already bound.
    pub fn insert(&mut self, object: ObjectId, expression: Expression, preset: bool) -> bool {
        if self.entries.contains_key(&object) {
            return false;
        }
        self.entries.insert(object, (expression, preset));
        true
    }
}

// -----------------------------------------------------------------------------
// NameTable

/// Session names, kept in both directions.
#[derive(Default)]
pub(crate) struct NameTable {
    by_name: HashMap<String, ObjectId>,
    by_object: HashMap<ObjectId, String>,
}

impl NameTable {
    #[inline]
    pub fn object(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn name(&self, object: ObjectId) -> Option<&str> {
        self.by_object.get(&object).map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, object: ObjectId) {
        self.by_name.insert(name.into(), object);
        self.by_object.entry(object).or_insert_with(|| name.into());
    }
}

// -----------------------------------------------------------------------------
// DeferredTable

/// Statements of an object that is materialized on first lookup.
pub(crate) struct DeferredObject {
    pub ty: Option<TypeKey>,
    pub statements: Vec<Statement>,
    pub state: Option<ObjectState>,
}

/// Names awaiting materialization during a load.
///
/// An entry is removed before its statements run, so a lookup of the
/// same name from inside them falls through to already created objects.
pub(crate) struct DeferredTable {
    entries: HashMap<String, DeferredObject>,
    apply_defaults: bool,
}

impl DeferredTable {
    pub fn new(apply_defaults: bool) -> Self {
        Self {
            entries: HashMap::default(),
            apply_defaults,
        }
    }

    pub fn insert(&mut self, name: String, object: DeferredObject) {
        self.entries.insert(name, object);
    }

    #[inline]
    pub fn take(&mut self, name: &str) -> Option<DeferredObject> {
        self.entries.remove(name)
    }

    #[inline]
    pub fn apply_defaults(&self) -> bool {
        self.apply_defaults
    }
}
