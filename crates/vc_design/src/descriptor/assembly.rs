use alloc::string::String;
use alloc::vec::Vec;

use crate::hash::HashMap;

// -----------------------------------------------------------------------------
// Assembly

/// A named unit of types and the units it references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    name: String,
    references: Vec<String>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        self.references.push(name.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn references(&self) -> &[String] {
        &self.references
    }
}

// -----------------------------------------------------------------------------
// AssemblyCatalog

#[derive(Default, Debug)]
pub struct AssemblyCatalog {
    assemblies: Vec<Assembly>,
    by_name: HashMap<String, usize>,
}

impl AssemblyCatalog {
    pub const fn new() -> Self {
        Self {
            assemblies: Vec::new(),
            by_name: HashMap::with_hasher(crate::hash::FixedHashState),
        }
    }

    /// Adds an assembly, replacing a previous one with the same name.
    pub fn register(&mut self, assembly: Assembly) {
        match self.by_name.get(assembly.name()) {
            Some(&index) => self.assemblies[index] = assembly,
            None => {
                self.by_name
                    .insert(assembly.name().into(), self.assemblies.len());
                self.assemblies.push(assembly);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Assembly> {
        self.by_name.get(name).map(|&index| &self.assemblies[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assembly> {
        self.assemblies.iter()
    }
}
