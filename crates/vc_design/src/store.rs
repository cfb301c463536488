//! Snapshots of objects, or of single members of them, restored later
//! into the same or another host.
//!
//! A [`SerializationStore`] is filled with
//! [`add_object`](SerializationStore::add_object) and
//! [`add_member`](SerializationStore::add_member) and serialized at once
//! by [`close`](SerializationStore::close). A closed store is a plain
//! serde value; it carries the names of the assemblies its types came
//! from so it can be loaded without the host that produced it.

use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use vc_codedom::{Expression, Statement};

use crate::Value;
use crate::context::{AbsoluteContext, RootContext, StatementContext};
use crate::descriptor::TypeKey;
use crate::error::{DeserializeError, Diagnostic, HostError, SerializeError, StoreError};
use crate::hash::HashMap;
use crate::host::{DesignHost, ObjectId};
use crate::manager::{DeferredObject, DeferredTable, SerializationManager};
use crate::members::{EventSerializer, PropertySerializer, properties_of, property_value};
use crate::members::serialize_member;
use crate::options::DesignerOptions;
use crate::statement_table::{fill_statement_table, local_type};

// -----------------------------------------------------------------------------
// ObjectState

/// The captured state of one object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub name: String,
    pub type_path: String,
    /// Statements recreating the object, or assigning the captured members.
    pub statements: Vec<Statement>,
    /// Captured properties that held their default value.
    pub default_properties: Vec<String>,
    /// Captured events without a handler.
    pub unbound_events: Vec<String>,
    /// Design-only property values.
    pub design_time: Vec<(String, Value)>,
    pub entire_object: bool,
}

// -----------------------------------------------------------------------------
// Capture records

#[derive(Clone, Debug)]
struct ObjectData {
    object: ObjectId,
    name: String,
    entire: bool,
    absolute: bool,
    members: Vec<MemberData>,
}

#[derive(Clone, Debug)]
struct MemberData {
    member: String,
    absolute: bool,
}

impl ObjectData {
    fn captures(&self, member: &str) -> bool {
        self.entire || self.members.iter().any(|m| m.member == member)
    }
}

// -----------------------------------------------------------------------------
// RestoreOptions

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Names to restore, every captured object when `None`.
    pub names: Option<Vec<String>>,
    /// Reset properties that were at their default when captured.
    pub apply_defaults: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            names: None,
            apply_defaults: true,
        }
    }
}

/// The outcome of [`SerializationStore::load`].
#[derive(Debug, Default)]
pub struct Restored {
    /// Restored objects by captured name, in restore order.
    pub objects: Vec<(String, ObjectId)>,
    pub diagnostics: Vec<Diagnostic>,
}

// -----------------------------------------------------------------------------
// SerializationStore

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SerializationStore {
    #[serde(skip)]
    objects: Vec<ObjectData>,
    #[serde(skip)]
    errors: Vec<Diagnostic>,
    closed: bool,
    class_name: String,
    assemblies: Vec<String>,
    prologue: Vec<Statement>,
    states: Vec<ObjectState>,
}

impl SerializationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures `objects` entirely and closes the store.
    pub fn capture(
        host: &dyn DesignHost,
        objects: impl IntoIterator<Item = ObjectId>,
        options: &DesignerOptions,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for object in objects {
            store.add_object(host, object, false)?;
        }
        store.close(host, options);
        Ok(store)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn states(&self) -> &[ObjectState] {
        &self.states
    }

    /// Assemblies owning the captured types.
    #[inline]
    pub fn assemblies(&self) -> &[String] {
        &self.assemblies
    }

    /// Failures reported while closing.
    #[inline]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Captures the whole of `object`. Members added before are dropped.
    pub fn add_object(
        &mut self,
        host: &dyn DesignHost,
        object: ObjectId,
        absolute: bool,
    ) -> Result<(), StoreError> {
        let index = self.entry(host, object)?;
        let data = &mut self.objects[index];
        data.entire = true;
        data.absolute |= absolute;
        data.members.clear();
        Ok(())
    }

    /// Captures a single property or event of `object`.
    ///
    /// Ignored when the whole object is already captured.
    pub fn add_member(
        &mut self,
        host: &dyn DesignHost,
        object: ObjectId,
        member: &str,
        absolute: bool,
    ) -> Result<(), StoreError> {
        let index = self.entry(host, object)?;
        let data = &mut self.objects[index];
        if data.entire {
            return Ok(());
        }
        match data.members.iter_mut().find(|m| m.member == member) {
            Some(existing) => existing.absolute |= absolute,
            None => data.members.push(MemberData {
                member: member.into(),
                absolute,
            }),
        }
        Ok(())
    }

    fn entry(&mut self, host: &dyn DesignHost, object: ObjectId) -> Result<usize, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        if let Some(index) = self.objects.iter().position(|data| data.object == object) {
            return Ok(index);
        }
        let name = host
            .component_name(object)
            .or_else(|| host.references().and_then(|r| r.name_of(object)))
            .ok_or(StoreError::Unnamed(object))?;
        self.objects.push(ObjectData {
            object,
            name,
            entire: false,
            absolute: false,
            members: Vec::new(),
        });
        Ok(self.objects.len() - 1)
    }

    // -------------------------------------------------------------------------
    // Closing

    /// Serializes everything captured. Closing twice does nothing.
    ///
    /// The component cache is never consulted. Failures are collected in
    /// [`errors`](Self::errors).
    pub fn close(&mut self, host: &dyn DesignHost, options: &DesignerOptions) {
        if self.closed {
            return;
        }
        self.closed = true;

        let options = options.clone().with_cache(false);
        let mut manager = SerializationManager::new(host, &options);
        let registry = host.registry();
        let root = host.root();
        self.class_name = root
            .and_then(|root| manager.get_name(root))
            .unwrap_or_default();

        let objects = core::mem::take(&mut self.objects);
        let depth = root.map(|root| manager.push_context(RootContext::new(Expression::This, root)));
        let owners = objects.iter().map(|data| data.object);
        let (loose, table) = manager.with_frame(StatementContext::new(owners), |m| {
            let mut loose = Vec::new();
            for data in &objects {
                capture(m, data, &mut loose);
            }
            loose
        });
        let mut table = table.unwrap_or_default();

        let mut states = Vec::with_capacity(objects.len());
        for data in &objects {
            let Some(desc) = host.type_of(data.object).and_then(|ty| registry.get(ty)) else {
                manager.report(SerializeError::from(HostError::UnknownObject(data.object)));
                continue;
            };
            if let Some(assembly) = desc.assembly()
                && !self.assemblies.iter().any(|known| known == assembly)
            {
                self.assemblies.push(assembly.into());
            }
            let mut state = ObjectState {
                name: data.name.clone(),
                type_path: desc.path().into(),
                statements: table.take(data.object).unwrap_or_default(),
                default_properties: Vec::new(),
                unbound_events: Vec::new(),
                design_time: Vec::new(),
                entire_object: data.entire,
            };
            if let Err(err) = record_members(&manager, data, &mut state) {
                manager.report(err);
            }
            states.push(state);
        }
        if let Some(depth) = depth {
            manager.pop_context(depth);
        }

        let mut prologue = manager.take_prologue();
        if !loose.is_empty() {
            warn!("{} statements were captured without an owner", loose.len());
            prologue.extend(loose);
        }
        self.prologue = prologue;
        self.states = states;
        self.errors = manager.into_diagnostics();
        debug!(
            "closed store: {} objects, {} errors",
            self.states.len(),
            self.errors.len()
        );
    }

    // -------------------------------------------------------------------------
    // Loading

    /// Restores the captured objects into `host`.
    ///
    /// An object whose type cannot be resolved is reported and skipped.
    /// Every name is materialized at most once: objects of `host` sharing a
    /// captured name are never reused before their statements ran.
    pub fn load(
        &self,
        host: &dyn DesignHost,
        options: &DesignerOptions,
        restore: &RestoreOptions,
    ) -> Result<Restored, StoreError> {
        if !self.closed {
            return Err(StoreError::NotClosed);
        }
        let mut manager = SerializationManager::new(host, options);
        let root = host.root();
        if let Some(root) = root
            && !self.class_name.is_empty()
        {
            manager.bind_name(root, &self.class_name);
        }
        let depth = root.map(|root| manager.push_context(RootContext::new(Expression::This, root)));

        let mut pending: HashMap<String, DeferredObject> = HashMap::default();
        let mut resolved: Vec<&ObjectState> = Vec::with_capacity(self.states.len());
        for state in &self.states {
            let Some(ty) = self.resolve_type(&manager, &state.type_path) else {
                warn!("type `{}` of `{}` could not be resolved", state.type_path, state.name);
                manager.report(DeserializeError::TypeNotFound(state.type_path.clone()));
                continue;
            };
            pending.insert(state.name.clone(), DeferredObject {
                ty: Some(ty),
                statements: Vec::new(),
                state: Some(state.clone()),
            });
            resolved.push(state);
        }

        // Statements are filed under the object they act on, which is not
        // always the object whose capture produced them.
        let mut extras: Vec<String> = Vec::new();
        let groups = fill_statement_table(&self.prologue, &self.class_name)
            .into_iter()
            .chain(
                resolved
                    .iter()
                    .flat_map(|state| fill_statement_table(&state.statements, &self.class_name)),
            );
        for (name, statements) in groups {
            if !pending.contains_key(&name) {
                let ty = local_type(&statements, &name).and_then(|ty| manager.resolve_type(ty.path()));
                extras.push(name.clone());
                pending.insert(name.clone(), DeferredObject {
                    ty,
                    statements: Vec::new(),
                    state: None,
                });
            }
            if let Some(entry) = pending.get_mut(&name) {
                entry.statements.extend(statements);
            }
        }

        let mut table = DeferredTable::new(restore.apply_defaults);
        for (name, object) in pending {
            table.insert(name, object);
        }
        manager.begin_restore(table);

        let requested: Vec<String> = match &restore.names {
            Some(names) => names.clone(),
            None => resolved.iter().map(|state| state.name.clone()).collect(),
        };
        let mut objects = Vec::with_capacity(requested.len());
        for name in requested {
            if !resolved.iter().any(|state| state.name == name) {
                if !self.states.iter().any(|state| state.name == name) {
                    manager.report(DeserializeError::UndeclaredName(name));
                }
                continue;
            }
            match manager.get_instance(&name) {
                Some(object) => objects.push((name, object)),
                None => manager.report(DeserializeError::UndeclaredName(name)),
            }
        }
        for name in &extras {
            if manager.get_instance(name).is_none() {
                trace!("`{name}` did not resolve to an object");
            }
        }

        manager.end_restore();
        if let Some(depth) = depth {
            manager.pop_context(depth);
        }
        debug!("restored {} of {} objects", objects.len(), self.states.len());
        Ok(Restored {
            objects,
            diagnostics: manager.into_diagnostics(),
        })
    }

    /// Resolves through the host's resolver when it has one, otherwise
    /// through the recorded assemblies and the assemblies they reference.
    /// Types outside of any assembly resolve by name.
    fn resolve_type(&self, manager: &SerializationManager<'_>, path: &str) -> Option<TypeKey> {
        if let Some(resolver) = manager.host().type_resolver() {
            return resolver.resolve(path);
        }
        let registry = manager.registry();
        registry.resolve_in_assemblies(path, &self.assemblies).or_else(|| {
            registry
                .resolve(path)
                .filter(|&key| registry.get(key).is_some_and(|desc| desc.assembly().is_none()))
        })
    }
}

// -----------------------------------------------------------------------------
// Capture

fn capture(manager: &mut SerializationManager<'_>, data: &ObjectData, loose: &mut Vec<Statement>) {
    let value = Value::Object(data.object);
    if data.entire {
        let result = match data.absolute {
            true => manager.serialize_to_expression_absolute(&value, loose),
            false => manager.serialize_to_expression(&value, loose),
        };
        if let Err(err) = result {
            manager.report(err);
        }
        return;
    }

    // Members are assigned on the live object, referenced by its name.
    if manager.get_expression(data.object).is_none() {
        let mut path = data.name.split('.');
        let base = path.next().unwrap_or_default();
        let mut expression = match manager.host().component(base) {
            Some(_) => Expression::field(manager.root_expression(), base),
            None => Expression::variable(base),
        };
        for member in path {
            expression = Expression::property(expression, member);
        }
        manager.set_expression(data.object, expression, false);
    }

    let properties = match properties_of(manager, data.object) {
        Ok(properties) => properties,
        Err(err) => return manager.report(err),
    };
    let registry = manager.registry();
    let desc = manager.type_of(data.object).ok().and_then(|ty| registry.get(ty));

    let mut statements = Vec::new();
    for member in &data.members {
        if let Some(property) = properties.iter().find(|p| p.name() == member.member) {
            if property.descriptor().is_design_only() {
                continue;
            }
            match member.absolute || data.absolute {
                true => manager.with_context(AbsoluteContext::member(member.member.as_str()), |m| {
                    serialize_member(m, &PropertySerializer, data.object, property, &mut statements);
                }),
                false => {
                    serialize_member(manager, &PropertySerializer, data.object, property, &mut statements);
                }
            }
        } else if let Some(event) = desc.and_then(|desc| desc.event(&member.member)) {
            serialize_member(manager, &EventSerializer, data.object, event, &mut statements);
        } else {
            let ty = desc.map(|desc| desc.path()).unwrap_or_default();
            manager.report(SerializeError::from(HostError::UnknownMember {
                ty: ty.into(),
                member: member.member.clone(),
            }));
        }
    }

    if statements.is_empty() {
        return;
    }
    let Some(table) = manager.context_mut().get_mut::<StatementContext>() else {
        return loose.extend(statements);
    };
    if let Err(err) = table.populate(data.object, statements) {
        manager.report(SerializeError::from(err));
    }
}

/// Records the captured members that restore resets or applies directly.
fn record_members(
    manager: &SerializationManager<'_>,
    data: &ObjectData,
    state: &mut ObjectState,
) -> Result<(), SerializeError> {
    for property in properties_of(manager, data.object)? {
        let descriptor = property.descriptor();
        if property.provider().is_some()
            || !data.captures(descriptor.name())
            || descriptor.is_hidden()
            || descriptor.is_read_only()
            || !descriptor.is_browsable()
        {
            continue;
        }
        let value = property_value(manager, data.object, &property)?;
        if descriptor.is_design_only() {
            if value.is_detached() {
                state.design_time.push((descriptor.name().into(), value));
            }
        } else if descriptor.can_reset() && !descriptor.should_serialize_value(&value) {
            state.default_properties.push(descriptor.name().into());
        }
    }

    let host = manager.host();
    let registry = manager.registry();
    if let Some(bindings) = host.event_bindings()
        && let Some(desc) = host.type_of(data.object).and_then(|ty| registry.get(ty))
    {
        for event in desc.events() {
            if data.captures(event.name()) && bindings.handler(data.object, event.name()).is_none() {
                state.unbound_events.push(event.name().into());
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Restore

/// Applies the non-statement part of `state` to a materialized object.
pub(crate) fn apply_state(
    manager: &mut SerializationManager<'_>,
    object: ObjectId,
    state: &ObjectState,
    apply_defaults: bool,
) {
    let host = manager.host();
    let registry = manager.registry();
    let desc = host.type_of(object).and_then(|ty| registry.get(ty));

    if apply_defaults {
        for name in &state.default_properties {
            let Some(default) = desc.and_then(|d| d.property(name)).and_then(|p| p.default_value())
            else {
                continue;
            };
            if let Err(err) = host.set_value(object, name, default.clone()) {
                manager.report(DeserializeError::from(err));
            }
        }
    }
    if let Some(bindings) = host.event_bindings() {
        for event in &state.unbound_events {
            bindings.bind(object, event, None);
        }
    }
    for (name, value) in &state.design_time {
        if let Err(err) = host.set_value(object, name, value.clone()) {
            manager.report(DeserializeError::from(err));
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{ObjectState, RestoreOptions, SerializationStore};
    use crate::Value;
    use crate::error::{ContextError, DeserializeError, DiagnosticError, SerializeError, StoreError};
    use crate::fixtures;
    use crate::host::{DesignHost, EventBindingService, MemoryHost};
    use crate::options::DesignerOptions;

    #[test]
    fn closed_stores_restore_into_another_host() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let label = demo.add("label1", demo.types.label);
        demo.set(button, "Text", "OK");
        demo.set(label, "Text", "Name");
        demo.host.bind(button, "Click", Some("button1_Click"));

        let options = DesignerOptions::default();
        let store = SerializationStore::capture(&demo.host, [button, label], &options).unwrap();
        assert!(store.errors().is_empty(), "{:?}", store.errors());
        assert_eq!(store.assemblies(), [String::from(fixtures::CONTROLS)]);
        assert_eq!(store.states()[0].unbound_events, ["MouseEnter"]);
        assert_eq!(store.states()[0].design_time, [(String::from("Locked"), Value::Bool(false))]);

        let persisted = ron::to_string(&store).unwrap();
        let store: SerializationStore = ron::from_str(&persisted).unwrap();
        assert!(store.is_closed());

        let target = fixtures::demo();
        let restored = store.load(&target.host, &options, &RestoreOptions::default()).unwrap();
        assert!(restored.diagnostics.is_empty(), "{:?}", restored.diagnostics);
        let names: Vec<&str> = restored.objects.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["button1", "label1"]);

        let copy = target.host.component("button1").unwrap();
        assert_eq!(target.host.get_value(copy, "Text"), Ok(Value::from("OK")));
        assert_eq!(target.host.handler(copy, "Click").as_deref(), Some("button1_Click"));
        let caption = target.host.component("label1").unwrap();
        assert_eq!(target.host.get_value(caption, "Text"), Ok(Value::from("Name")));
    }

    #[test]
    fn loading_into_the_source_host_creates_copies() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "OK");
        let options = DesignerOptions::default();
        let store = SerializationStore::capture(&demo.host, [button], &options).unwrap();
        demo.set(button, "Text", "Changed");

        let restored = store.load(&demo.host, &options, &RestoreOptions::default()).unwrap();
        let (_, copy) = restored.objects[0];
        assert_ne!(copy, button);
        assert_eq!(demo.host.component_name(copy).as_deref(), Some("button2"));
        assert_eq!(demo.host.get_value(copy, "Text"), Ok(Value::from("OK")));
        assert_eq!(demo.host.get_value(button, "Text"), Ok(Value::from("Changed")));
    }

    #[test]
    fn member_snapshots_restore_only_their_members() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Before");

        let options = DesignerOptions::default();
        let mut store = SerializationStore::new();
        store.add_member(&demo.host, button, "Text", false).unwrap();
        store.add_member(&demo.host, button, "TabIndex", false).unwrap();
        store.add_member(&demo.host, button, "Enabled", true).unwrap();
        store.close(&demo.host, &options);

        let state = &store.states()[0];
        assert!(!state.entire_object);
        let printed: Vec<String> = state.statements.iter().map(ToString::to_string).collect();
        assert_eq!(printed, [
            "this.button1.Text = \"Before\";",
            "this.button1.Enabled = true;",
        ]);
        assert_eq!(state.default_properties, ["Enabled", "TabIndex"]);
        assert!(state.unbound_events.is_empty());

        demo.set(button, "Text", "After");
        demo.set(button, "TabIndex", 7_i64);
        let restored = store.load(&demo.host, &options, &RestoreOptions::default()).unwrap();
        assert_eq!(restored.objects, [(String::from("button1"), button)]);
        assert_eq!(demo.host.get_value(button, "Text"), Ok(Value::from("Before")));
        assert_eq!(demo.host.get_value(button, "TabIndex"), Ok(Value::from(0_i64)));

        demo.set(button, "TabIndex", 7_i64);
        let keep = RestoreOptions {
            names: None,
            apply_defaults: false,
        };
        store.load(&demo.host, &options, &keep).unwrap();
        assert_eq!(demo.host.get_value(button, "TabIndex"), Ok(Value::from(7_i64)));
    }

    #[test]
    fn unresolvable_types_skip_their_objects() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let label = demo.add("label1", demo.types.label);
        demo.set(label, "Text", "Name");
        let options = DesignerOptions::default();
        let mut store = SerializationStore::capture(&demo.host, [button, label], &options).unwrap();
        store.states[0].type_path = "Demo.Missing".into();

        let target = fixtures::demo();
        let restored = store.load(&target.host, &options, &RestoreOptions::default()).unwrap();
        assert_eq!(restored.objects.len(), 1);
        assert_eq!(restored.objects[0].0, "label1");
        assert!(target.host.component("button1").is_none());
        assert_eq!(restored.diagnostics.len(), 1);
        assert!(matches!(
            restored.diagnostics[0].error(),
            DiagnosticError::Deserialize(DeserializeError::TypeNotFound(path)) if path == "Demo.Missing"
        ));
    }

    #[test]
    fn types_resolve_through_the_host_before_assemblies() {
        let demo = fixtures::demo();
        let label = demo.add("label1", demo.types.label);
        let options = DesignerOptions::default();
        let mut store = SerializationStore::capture(&demo.host, [label], &options).unwrap();
        store.assemblies = vec![String::from("Other")];

        let plain = fixtures::demo();
        let restored = store.load(&plain.host, &options, &RestoreOptions::default()).unwrap();
        assert!(restored.objects.is_empty());

        let resolving = fixtures::demo_with(MemoryHost::with_type_resolution);
        let restored = store.load(&resolving.host, &options, &RestoreOptions::default()).unwrap();
        assert_eq!(restored.objects.len(), 1);

        // Referenced assemblies are searched too.
        store.assemblies = vec![String::from(fixtures::APP)];
        let restored = store.load(&plain.host, &options, &RestoreOptions::default()).unwrap();
        assert_eq!(restored.objects.len(), 1);
    }

    #[test]
    fn member_snapshots_do_not_overwrite_entire_captures() {
        let demo = fixtures::demo();
        let panel = demo.add("panel1", demo.types.panel);
        let button = demo.add("button1", demo.types.button);
        demo.set(button, "Text", "Go");
        demo.set(panel, "Controls", Value::List(vec![Value::Object(button)]));

        let options = DesignerOptions::default();
        let mut store = SerializationStore::new();
        store.add_object(&demo.host, panel, false).unwrap();
        store.add_member(&demo.host, button, "Text", false).unwrap();
        store.close(&demo.host, &options);

        let button_state = &store.states()[1];
        assert_eq!(button_state.name, "button1");
        assert_eq!(button_state.statements[0].to_string(), "this.button1 = new Demo.Button();");
        assert!(store.errors().iter().any(|diagnostic| matches!(
            diagnostic.error(),
            DiagnosticError::Serialize(SerializeError::Context(
                ContextError::StatementsRepopulated(object)
            )) if *object == button
        )));
    }

    #[test]
    fn lifecycle() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let options = DesignerOptions::default();
        let mut store = SerializationStore::new();
        assert_eq!(
            store.load(&demo.host, &options, &RestoreOptions::default()).err(),
            Some(StoreError::NotClosed)
        );

        let orphan = demo
            .host
            .create_instance(demo.types.point, &[Value::from(1_i64), Value::from(2_i64)], None, false)
            .unwrap();
        assert_eq!(store.add_object(&demo.host, orphan, false), Err(StoreError::Unnamed(orphan)));

        let appearance = demo.host.get_value(button, "FlatAppearance").unwrap();
        store
            .add_member(&demo.host, appearance.as_object().unwrap(), "BorderSize", true)
            .unwrap();
        store.close(&demo.host, &options);
        assert_eq!(store.states()[0].name, "button1.FlatAppearance");
        assert_eq!(
            store.states()[0].statements[0].to_string(),
            "this.button1.FlatAppearance.BorderSize = 1;"
        );
        assert_eq!(store.add_object(&demo.host, button, false), Err(StoreError::Closed));

        let json = serde_json::to_string(store.states()).unwrap();
        let states: Vec<ObjectState> = serde_json::from_str(&json).unwrap();
        assert_eq!(states, store.states());
    }
}
