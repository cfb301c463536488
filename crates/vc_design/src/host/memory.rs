use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use log::warn;
use slotmap::SlotMap;

use crate::Value;
use crate::descriptor::{PropertyDescriptor, TypeDescriptor, TypeFlags, TypeKey, TypeRegistry};
use crate::error::HostError;
use crate::hash::HashMap;
use crate::host::{ChangeKind, ChangeNotification, DesignHost, EventBindingService, ObjectId};
use crate::host::{MemberRelationship, NameCreationService, ReferenceService};
use crate::host::{RelationshipService, ResourceStore, TypeResolutionService, UiService};

// -----------------------------------------------------------------------------
// MemoryHost

/// An in-memory [`DesignHost`] backed by a slot map arena.
///
/// It implements every host service. Each mutation of a sited component
/// queues a [`ChangeNotification`], drained with
/// [`drain_changes`](MemoryHost::drain_changes).
pub struct MemoryHost {
    registry: TypeRegistry,
    state: RefCell<HostState>,
    resolve_types: bool,
}

#[derive(Default)]
struct HostState {
    objects: SlotMap<ObjectId, ObjectNode>,
    root: Option<ObjectId>,
    container: Option<ObjectId>,
    sited: Vec<ObjectId>,
    names: HashMap<String, ObjectId>,
    handlers: HashMap<(ObjectId, String), String>,
    relationships: HashMap<(ObjectId, String), MemberRelationship>,
    culture: String,
    resources: BTreeMap<String, BTreeMap<String, Value>>,
    metadata: BTreeMap<String, Value>,
    changes: Vec<ChangeNotification>,
    ui_messages: Vec<String>,
    invocations: Vec<(ObjectId, String)>,
}

struct ObjectNode {
    ty: TypeKey,
    name: Option<String>,
    owner: Option<(ObjectId, String)>,
    values: HashMap<String, Value>,
    extended: HashMap<(ObjectId, String), Value>,
}

impl ObjectNode {
    fn new(ty: TypeKey) -> Self {
        Self {
            ty,
            name: None,
            owner: None,
            values: HashMap::default(),
            extended: HashMap::default(),
        }
    }
}

impl HostState {
    fn notify(&mut self, kind: ChangeKind, object: ObjectId) {
        let component = self.sited.contains(&object);
        self.notify_as(kind, object, component);
    }

    fn notify_as(&mut self, kind: ChangeKind, object: ObjectId, component: bool) {
        let ty = self.objects.get(object).map(|node| node.ty);
        self.changes.push(ChangeNotification {
            kind,
            object,
            ty,
            component,
        });
    }

    fn node(&self, object: ObjectId) -> Result<&ObjectNode, HostError> {
        self.objects
            .get(object)
            .ok_or(HostError::UnknownObject(object))
    }

    fn fresh_name(&self, ty: &TypeDescriptor) -> String {
        let short = ty.short_name();
        let mut chars = short.chars();
        let base = match chars.next() {
            Some(first) => format!("{}{}", first.to_lowercase(), chars.as_str()),
            None => String::from("object"),
        };
        (1..)
            .map(|n| format!("{base}{n}"))
            .find(|name| !self.names.contains_key(name.as_str()))
            .unwrap_or_else(|| String::from("object"))
    }

    /// Inserts an object and, recursively, the sub-objects of its content
    /// properties.
    fn instantiate(&mut self, registry: &TypeRegistry, ty: TypeKey) -> ObjectId {
        let id = self.objects.insert(ObjectNode::new(ty));
        let Some(desc) = registry.get(ty) else {
            return id;
        };
        for property in desc.properties().iter().filter(|p| p.is_content()) {
            let flags = registry.flags(property.ty());
            let by_value = TypeFlags::COLLECTION
                | TypeFlags::PRIMITIVE
                | TypeFlags::COMPONENT
                | TypeFlags::ENUM;
            if property.default_value().is_some() || flags.intersects(by_value) {
                continue;
            }
            let child = self.instantiate(registry, property.ty());
            self.objects[child].owner = Some((id, property.name().into()));
            self.objects[id]
                .values
                .insert(property.name().into(), Value::Object(child));
        }
        id
    }
}

fn default_of(registry: &TypeRegistry, property: &PropertyDescriptor) -> Value {
    match property.default_value() {
        Some(value) => value.clone(),
        None if registry.flags(property.ty()).contains(TypeFlags::COLLECTION) => {
            Value::List(vec![])
        }
        None => Value::Null,
    }
}

impl MemoryHost {
    /// Creates an empty host with its component container object.
    pub fn new(registry: TypeRegistry) -> Self {
        let mut state = HostState::default();
        let container = state.objects.insert(ObjectNode::new(TypeKey::CONTAINER));
        state.container = Some(container);
        Self {
            registry,
            state: RefCell::new(state),
            resolve_types: false,
        }
    }

    /// Exposes the registry through [`TypeResolutionService`].
    pub fn with_type_resolution(mut self) -> Self {
        self.resolve_types = true;
        self
    }

    /// Creates and sites the root component.
    pub fn create_root(&self, ty: TypeKey, name: &str) -> Result<ObjectId, HostError> {
        let id = self.create_instance(ty, &[], Some(name), true)?;
        self.state.borrow_mut().root = Some(id);
        Ok(id)
    }

    pub fn add_component(&self, ty: TypeKey, name: &str) -> Result<ObjectId, HostError> {
        self.create_instance(ty, &[], Some(name), true)
    }

    /// Unsites a component. The object itself stays readable.
    pub fn remove_component(&self, object: ObjectId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if !state.sited.contains(&object) {
            return Err(HostError::UnknownObject(object));
        }
        state.notify_as(ChangeKind::Removing, object, true);
        state.sited.retain(|&id| id != object);
        let old = state.objects[object].name.take();
        if let Some(name) = old {
            state.names.remove(name.as_str());
        }
        state.notify_as(ChangeKind::Removed, object, true);
        Ok(())
    }

    pub fn rename(&self, object: ObjectId, name: &str) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if state.names.contains_key(name) {
            return Err(HostError::DuplicateName(name.into()));
        }
        let old = state
            .objects
            .get_mut(object)
            .ok_or(HostError::UnknownObject(object))?
            .name
            .replace(name.into());
        if let Some(old) = old {
            state.names.remove(old.as_str());
        }
        state.names.insert(name.into(), object);
        state.notify(ChangeKind::Rename, object);
        Ok(())
    }

    /// Takes the queued change notifications.
    pub fn drain_changes(&self) -> Vec<ChangeNotification> {
        core::mem::take(&mut self.state.borrow_mut().changes)
    }

    pub fn ui_messages(&self) -> Vec<String> {
        self.state.borrow().ui_messages.clone()
    }

    /// Methods invoked through [`DesignHost::invoke`], in call order.
    pub fn invocations(&self) -> Vec<(ObjectId, String)> {
        self.state.borrow().invocations.clone()
    }
}

impl DesignHost for MemoryHost {
    #[inline]
    fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    fn root(&self) -> Option<ObjectId> {
        self.state.borrow().root
    }

    fn container(&self) -> Option<ObjectId> {
        self.state.borrow().container
    }

    fn components(&self) -> Vec<ObjectId> {
        self.state.borrow().sited.clone()
    }

    fn contains(&self, object: ObjectId) -> bool {
        self.state.borrow().sited.contains(&object)
    }

    fn component_name(&self, object: ObjectId) -> Option<String> {
        self.state.borrow().objects.get(object)?.name.clone()
    }

    fn component(&self, name: &str) -> Option<ObjectId> {
        self.state.borrow().names.get(name).copied()
    }

    fn type_of(&self, object: ObjectId) -> Option<TypeKey> {
        self.state.borrow().objects.get(object).map(|node| node.ty)
    }

    fn get_value(&self, object: ObjectId, member: &str) -> Result<Value, HostError> {
        let state = self.state.borrow();
        let node = state.node(object)?;
        if let Some(value) = node.values.get(member) {
            return Ok(value.clone());
        }
        let desc = self
            .registry
            .get(node.ty)
            .ok_or_else(|| HostError::UnknownType(node.ty.to_string()))?;
        match desc.property(member) {
            Some(property) => Ok(default_of(&self.registry, property)),
            None => Err(HostError::UnknownMember {
                ty: desc.path().into(),
                member: member.into(),
            }),
        }
    }

    fn set_value(&self, object: ObjectId, member: &str, value: Value) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let ty = state.node(object)?.ty;
        let desc = self
            .registry
            .get(ty)
            .ok_or_else(|| HostError::UnknownType(ty.to_string()))?;
        if desc.property(member).is_none() {
            return Err(HostError::UnknownMember {
                ty: desc.path().into(),
                member: member.into(),
            });
        }
        state.objects[object].values.insert(member.into(), value);
        state.notify(ChangeKind::Changed, object);
        Ok(())
    }

    fn get_extended(
        &self,
        provider: ObjectId,
        target: ObjectId,
        member: &str,
    ) -> Result<Value, HostError> {
        let state = self.state.borrow();
        let node = state.node(provider)?;
        let property = self
            .registry
            .get(node.ty)
            .and_then(|desc| desc.provided(member))
            .ok_or_else(|| HostError::UnknownMember {
                ty: self.registry.path_of(node.ty).into(),
                member: member.into(),
            })?;
        Ok(match node.extended.get(&(target, String::from(member))) {
            Some(value) => value.clone(),
            None => default_of(&self.registry, property),
        })
    }

    fn set_extended(
        &self,
        provider: ObjectId,
        target: ObjectId,
        member: &str,
        value: Value,
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let ty = state.node(provider)?.ty;
        if self
            .registry
            .get(ty)
            .and_then(|desc| desc.provided(member))
            .is_none()
        {
            return Err(HostError::UnknownMember {
                ty: self.registry.path_of(ty).into(),
                member: member.into(),
            });
        }
        state.objects[provider]
            .extended
            .insert((target, member.into()), value);
        state.notify(ChangeKind::Changed, target);
        Ok(())
    }

    fn create_instance(
        &self,
        ty: TypeKey,
        args: &[Value],
        name: Option<&str>,
        add_to_container: bool,
    ) -> Result<ObjectId, HostError> {
        let desc = self
            .registry
            .get(ty)
            .ok_or_else(|| HostError::UnknownType(ty.to_string()))?;
        let mut state = self.state.borrow_mut();

        let container = state.container.map(Value::Object);
        let args = match args {
            [only] if desc.has(TypeFlags::NEEDS_CONTAINER) && container.as_ref() == Some(only) => {
                &[][..]
            }
            _ => args,
        };

        let mut assigned: Vec<(String, Value)> = Vec::new();
        if args.is_empty() {
            if !desc.has_default_constructor() {
                return Err(HostError::NoMatchingConstructor {
                    ty: desc.path().into(),
                    args: 0,
                });
            }
        } else {
            match desc.constructor() {
                Some(ctor) if ctor.params().len() == args.len() => {
                    assigned.extend(ctor.params().iter().cloned().zip(args.iter().cloned()));
                }
                _ => {
                    return Err(HostError::NoMatchingConstructor {
                        ty: desc.path().into(),
                        args: args.len(),
                    });
                }
            }
        }

        let site = add_to_container && desc.has(TypeFlags::COMPONENT);
        let site_name = match name {
            Some(name) if site && state.names.contains_key(name) => {
                return Err(HostError::DuplicateName(name.into()));
            }
            Some(name) if site => Some(name.to_string()),
            None if site => Some(state.fresh_name(desc)),
            _ => None,
        };

        let id = state.instantiate(&self.registry, ty);
        let node = &mut state.objects[id];
        node.values.extend(assigned);
        node.name = site_name.clone();
        if let Some(name) = site_name {
            state.names.insert(name, id);
            state.sited.push(id);
        }
        Ok(id)
    }

    fn invoke(&self, object: ObjectId, method: &str, _args: &[Value]) -> Result<Value, HostError> {
        let mut state = self.state.borrow_mut();
        let ty = state.node(object)?.ty;
        match method {
            "SuspendLayout" | "ResumeLayout" | "PerformLayout" | "BeginInit" | "EndInit" => {
                state.invocations.push((object, method.into()));
                Ok(Value::Null)
            }
            _ => Err(HostError::UnknownMethod {
                ty: self.registry.path_of(ty).into(),
                method: method.into(),
            }),
        }
    }

    fn references(&self) -> Option<&dyn ReferenceService> {
        Some(self)
    }

    fn event_bindings(&self) -> Option<&dyn EventBindingService> {
        Some(self)
    }

    fn relationships(&self) -> Option<&dyn RelationshipService> {
        Some(self)
    }

    fn resources(&self) -> Option<&dyn ResourceStore> {
        Some(self)
    }

    fn name_creation(&self) -> Option<&dyn NameCreationService> {
        Some(self)
    }

    fn type_resolver(&self) -> Option<&dyn TypeResolutionService> {
        if self.resolve_types { Some(self) } else { None }
    }

    fn ui(&self) -> Option<&dyn UiService> {
        Some(self)
    }
}

// -----------------------------------------------------------------------------
// Services

impl ReferenceService for MemoryHost {
    fn name_of(&self, object: ObjectId) -> Option<String> {
        let state = self.state.borrow();
        let mut parts: Vec<&str> = Vec::new();
        let mut current = object;
        loop {
            let node = state.objects.get(current)?;
            if let Some(name) = &node.name {
                parts.push(name);
                break;
            }
            let (owner, member) = node.owner.as_ref()?;
            parts.push(member);
            current = *owner;
        }
        parts.reverse();
        Some(parts.join("."))
    }

    fn owner_of(&self, object: ObjectId) -> Option<ObjectId> {
        let state = self.state.borrow();
        let mut current = object;
        loop {
            let node = state.objects.get(current)?;
            if node.name.is_some() {
                return Some(current);
            }
            current = node.owner.as_ref()?.0;
        }
    }
}

impl EventBindingService for MemoryHost {
    fn handler(&self, object: ObjectId, event: &str) -> Option<String> {
        self.state
            .borrow()
            .handlers
            .get(&(object, String::from(event)))
            .cloned()
    }

    fn bind(&self, object: ObjectId, event: &str, handler: Option<&str>) {
        let mut state = self.state.borrow_mut();
        let key = (object, String::from(event));
        match handler {
            Some(handler) => {
                state.handlers.insert(key, handler.into());
            }
            None => {
                state.handlers.remove(&key);
            }
        }
        state.notify(ChangeKind::Changed, object);
    }
}

impl RelationshipService for MemoryHost {
    fn relationship(&self, owner: ObjectId, member: &str) -> Option<MemberRelationship> {
        self.state
            .borrow()
            .relationships
            .get(&(owner, String::from(member)))
            .cloned()
    }

    fn set_relationship(&self, owner: ObjectId, member: &str, target: Option<MemberRelationship>) {
        let mut state = self.state.borrow_mut();
        let key = (owner, String::from(member));
        match target {
            Some(target) => {
                state.relationships.insert(key, target);
            }
            None => {
                state.relationships.remove(&key);
            }
        }
    }
}

impl ResourceStore for MemoryHost {
    fn culture(&self) -> String {
        self.state.borrow().culture.clone()
    }

    fn set_culture(&self, culture: &str) {
        self.state.borrow_mut().culture = culture.into();
    }

    fn get(&self, culture: &str, name: &str) -> Option<Value> {
        self.state.borrow().resources.get(culture)?.get(name).cloned()
    }

    fn set(&self, culture: &str, name: &str, value: Value) {
        self.state
            .borrow_mut()
            .resources
            .entry(culture.into())
            .or_default()
            .insert(name.into(), value);
    }

    fn remove(&self, culture: &str, name: &str) {
        if let Some(set) = self.state.borrow_mut().resources.get_mut(culture) {
            set.remove(name);
        }
    }

    fn entries(&self, culture: &str) -> Vec<(String, Value)> {
        self.state
            .borrow()
            .resources
            .get(culture)
            .map(|set| set.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn metadata(&self, name: &str) -> Option<Value> {
        self.state.borrow().metadata.get(name).cloned()
    }

    fn set_metadata(&self, name: &str, value: Value) {
        self.state.borrow_mut().metadata.insert(name.into(), value);
    }
}

impl NameCreationService for MemoryHost {
    fn create_name(&self, ty: &TypeDescriptor) -> String {
        self.state.borrow().fresh_name(ty)
    }
}

impl TypeResolutionService for MemoryHost {
    fn resolve(&self, name: &str) -> Option<TypeKey> {
        self.registry.resolve(name)
    }
}

impl UiService for MemoryHost {
    fn show_error(&self, message: &str) {
        warn!("{message}");
        self.state.borrow_mut().ui_messages.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use crate::Value;
    use crate::fixtures;
    use crate::host::{ChangeKind, DesignHost, ReferenceService};

    #[test]
    fn content_sub_objects_are_owned() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);

        let appearance = demo.host.get_value(button, "FlatAppearance").unwrap();
        let sub = appearance.as_object().unwrap();
        assert!(!demo.host.contains(sub));
        assert_eq!(demo.host.name_of(sub).as_deref(), Some("button1.FlatAppearance"));
        assert_eq!(demo.host.owner_of(sub), Some(button));
    }

    #[test]
    fn generated_names_and_defaults() {
        let demo = fixtures::demo();
        demo.add("button1", demo.types.button);
        let second = demo
            .host
            .create_instance(demo.types.button, &[], None, true)
            .unwrap();

        assert_eq!(demo.host.component_name(second).as_deref(), Some("button2"));
        assert_eq!(demo.host.get_value(second, "Enabled"), Ok(Value::Bool(true)));
        assert!(demo.host.get_value(second, "Missing").is_err());
    }

    #[test]
    fn mutations_queue_notifications() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.host.drain_changes();

        demo.host.set_value(button, "Text", Value::from("Hi")).unwrap();
        demo.host.remove_component(button).unwrap();

        let kinds: alloc::vec::Vec<_> = demo.host.drain_changes().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            [ChangeKind::Changed, ChangeKind::Removing, ChangeKind::Removed]
        );
    }
}
