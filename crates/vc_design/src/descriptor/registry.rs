use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use log::warn;

use crate::Value;
use crate::descriptor::{Assembly, AssemblyCatalog, ConstructorDescriptor, PropertyDescriptor};
use crate::descriptor::{TypeDescriptor, TypeFlags, TypeKey};
use crate::hash::{FixedHashState, HashMap, HashSet};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of designable types.
///
/// Types are looked up by key, by full path, or by short name. A short
/// name shared by several types is ambiguous and no longer resolves.
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    type_path_to_key: HashMap<String, TypeKey>,
    type_name_to_key: HashMap<String, TypeKey>,
    ambiguous_names: HashSet<String>,
    assemblies: AssemblyCatalog,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    const fn empty() -> Self {
        Self {
            types: Vec::new(),
            type_path_to_key: HashMap::with_hasher(FixedHashState),
            type_name_to_key: HashMap::with_hasher(FixedHashState),
            ambiguous_names: HashSet::with_hasher(FixedHashState),
            assemblies: AssemblyCatalog::new(),
        }
    }

    /// Create a type registry with the builtin types, in the order of the
    /// [`TypeKey`] constants.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        let primitive = TypeFlags::PRIMITIVE | TypeFlags::SERIALIZABLE;
        registry.register(TypeDescriptor::new("System.Boolean", primitive));
        registry.register(TypeDescriptor::new("System.Char", primitive));
        registry.register(TypeDescriptor::new("System.Int64", primitive));
        registry.register(TypeDescriptor::new("System.Single", primitive));
        registry.register(TypeDescriptor::new("System.Double", primitive));
        registry.register(TypeDescriptor::new("System.String", primitive));
        registry.register(TypeDescriptor::new("System.Type", TypeFlags::PRIMITIVE));
        registry.register(TypeDescriptor::new("System.Object", TypeFlags::empty()));
        registry.register(
            TypeDescriptor::new("System.Collections.ArrayList", TypeFlags::COLLECTION)
                .with_element(TypeKey::OBJECT),
        );
        registry.register(TypeDescriptor::new(
            "System.ComponentModel.Container",
            TypeFlags::CONTAINER,
        ));
        registry.register(
            TypeDescriptor::new(
                "System.ComponentModel.ComponentResourceManager",
                TypeFlags::RESOURCE_MANAGER,
            )
            .with_property(
                PropertyDescriptor::new("ResourceSource", TypeKey::TYPE)
                    .with_default(Value::Null)
                    .hidden(),
            )
            .with_constructor(ConstructorDescriptor::new(["ResourceSource"])),
        );
        debug_assert_eq!(registry.types.len() as u32, TypeKey::BUILTIN_COUNT);
        registry
    }

    /// Registers a type and returns its key.
    ///
    /// Registering a path twice keeps the first descriptor.
    pub fn register(&mut self, mut descriptor: TypeDescriptor) -> TypeKey {
        if let Some(&key) = self.type_path_to_key.get(descriptor.path()) {
            warn!("type `{}` is already registered", descriptor.path());
            return key;
        }

        let key = TypeKey::new(self.types.len() as u32);
        descriptor.assign_key(key);

        let name = descriptor.short_name();
        if !self.ambiguous_names.contains(name) {
            if self.type_name_to_key.contains_key(name) {
                self.type_name_to_key.remove(name);
                self.ambiguous_names.insert(name.into());
            } else {
                self.type_name_to_key.insert(name.into(), key);
            }
        }

        self.type_path_to_key.insert(descriptor.path().into(), key);
        self.types.push(descriptor);
        key
    }

    pub fn register_assembly(&mut self, assembly: Assembly) {
        self.assemblies.register(assembly);
    }

    #[inline]
    pub fn assemblies(&self) -> &AssemblyCatalog {
        &self.assemblies
    }

    #[inline]
    pub fn get(&self, key: TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(key.index())
    }

    pub fn get_with_type_path(&self, path: &str) -> Option<&TypeDescriptor> {
        self.type_path_to_key.get(path).and_then(|&k| self.get(k))
    }

    /// Looks up a type by its short name. Ambiguous names return `None`.
    pub fn get_with_type_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.type_name_to_key.get(name).and_then(|&k| self.get(k))
    }

    #[inline]
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.ambiguous_names.contains(name)
    }

    /// The capabilities of `key`, empty for an unknown key.
    pub fn flags(&self, key: TypeKey) -> TypeFlags {
        self.get(key).map_or(TypeFlags::empty(), TypeDescriptor::flags)
    }

    /// The full path of `key`, for messages.
    pub fn path_of(&self, key: TypeKey) -> &str {
        self.get(key).map_or("<unknown>", TypeDescriptor::path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    /// Resolves a type name.
    ///
    /// Tries the full path, then the short name. A dotted name that still
    /// fails is retried with its trailing dots turned into nested-type
    /// separators, one at a time from the right, so `Demo.Outer.Inner`
    /// finds `Demo.Outer+Inner`.
    pub fn resolve(&self, name: &str) -> Option<TypeKey> {
        if let Some(&key) = self.type_path_to_key.get(name) {
            return Some(key);
        }
        if let Some(&key) = self.type_name_to_key.get(name) {
            return Some(key);
        }

        let mut candidate = String::from(name);
        while let Some(index) = candidate.rfind('.') {
            candidate.replace_range(index..index + 1, "+");
            if let Some(&key) = self.type_path_to_key.get(candidate.as_str()) {
                return Some(key);
            }
        }
        None
    }

    /// Resolves `name` against the types of the listed assemblies, then
    /// against the assemblies they reference, transitively.
    pub fn resolve_in_assemblies(&self, name: &str, assemblies: &[String]) -> Option<TypeKey> {
        let key = self.resolve(name)?;
        let owner = self.get(key)?.assembly()?;

        let mut visited: HashSet<&str> = HashSet::default();
        let mut queue: VecDeque<&str> = assemblies.iter().map(String::as_str).collect();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if current == owner {
                return Some(key);
            }
            if let Some(assembly) = self.assemblies.get(current) {
                queue.extend(assembly.references().iter().map(String::as_str));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::TypeRegistry;
    use crate::descriptor::{Assembly, TypeDescriptor, TypeFlags, TypeKey};

    #[test]
    fn builtin_keys() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.path_of(TypeKey::STRING), "System.String");
        assert_eq!(registry.path_of(TypeKey::LIST), "System.Collections.ArrayList");
        assert!(registry.flags(TypeKey::RESOURCE_MANAGER).contains(TypeFlags::RESOURCE_MANAGER));
        assert_eq!(registry.resolve("Int64"), Some(TypeKey::INT));
    }

    #[test]
    fn ambiguous_short_names() {
        let mut registry = TypeRegistry::new();
        let a = registry.register(TypeDescriptor::new("A.Widget", TypeFlags::COMPONENT));
        registry.register(TypeDescriptor::new("B.Widget", TypeFlags::COMPONENT));

        assert!(registry.is_ambiguous("Widget"));
        assert!(registry.get_with_type_name("Widget").is_none());
        assert_eq!(registry.resolve("A.Widget"), Some(a));
    }

    #[test]
    fn nested_type_fallback() {
        let mut registry = TypeRegistry::new();
        let inner = registry.register(TypeDescriptor::new("Demo.Outer+Inner", TypeFlags::empty()));
        registry.register(TypeDescriptor::new("Demo.Inner", TypeFlags::empty()));

        assert_eq!(registry.resolve("Demo.Outer.Inner"), Some(inner));
        assert_eq!(registry.resolve("Demo.Missing.Inner"), None);
    }

    #[test]
    fn transitive_assembly_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register_assembly(Assembly::new("App").with_reference("Controls"));
        registry.register_assembly(Assembly::new("Controls"));
        let button = registry.register(
            TypeDescriptor::new("Demo.Button", TypeFlags::COMPONENT).with_assembly("Controls"),
        );

        let app = vec![String::from("App")];
        assert_eq!(registry.resolve_in_assemblies("Demo.Button", &app), Some(button));

        let other = vec![String::from("Other")];
        assert_eq!(registry.resolve_in_assemblies("Demo.Button", &other), None);
    }
}
