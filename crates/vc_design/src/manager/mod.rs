//! The serialization manager: per-pass session state shared by every
//! serializer.
//!
//! A manager lives for one serialization or deserialization pass. It
//! owns the context stack, the object to expression bindings, session
//! names and the diagnostics collected along the way, and borrows the
//! design host plus an optional [`ComponentCache`] that outlives it.

// -----------------------------------------------------------------------------
// Modules

mod resources;
mod restore;
mod tables;

// -----------------------------------------------------------------------------
// Exports

pub use resources::ResourcePolicy;

pub(crate) use resources::ResourceState;
pub(crate) use tables::{DeferredObject, DeferredTable};

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::{trace, warn};
use vc_codedom::{Expression, Statement};

use crate::Value;
use crate::cache::{CacheEntry, ComponentCache};
use crate::context::{AbsoluteContext, ContextFrame, ContextItem, ContextStack};
use crate::context::{ExpressionContext, RootContext, StatementContext};
use crate::descriptor::{TypeFlags, TypeKey, TypeRegistry};
use crate::dispatch::{DeserializeInput, Serialized, SerializerKind};
use crate::error::{DeserializeError, Diagnostic, HostError, ManagerError, SerializeError};
use crate::hash::HashSet;
use crate::host::{DesignHost, ObjectId};
use crate::interpret::{CodeInterpreter, StatementInterpreter};
use crate::localization::LocalizationEngine;
use crate::options::DesignerOptions;
use tables::{ExpressionTable, NameTable};

static CODE_INTERPRETER: CodeInterpreter = CodeInterpreter;

// -----------------------------------------------------------------------------
// PassStatistics

/// Counters of one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStatistics {
    /// Property and event serializer invocations.
    pub members_serialized: usize,
    /// Components whose statements were replayed from the cache.
    pub cache_hits: usize,
    pub cache_misses: usize,
}

// -----------------------------------------------------------------------------
// SerializationManager

pub struct SerializationManager<'a> {
    host: &'a dyn DesignHost,
    options: DesignerOptions,
    cache: Option<&'a mut ComponentCache>,
    interpreter: &'a dyn StatementInterpreter,
    localization: LocalizationEngine,
    context: ContextStack,
    expressions: ExpressionTable,
    names: NameTable,
    prologue: Vec<Statement>,
    resources: ResourceState,
    localized: HashSet<ObjectId>,
    building: Vec<CacheEntry>,
    deferred: Option<DeferredTable>,
    diagnostics: Vec<Diagnostic>,
    stats: PassStatistics,
}

impl<'a> SerializationManager<'a> {
    pub fn new(host: &'a dyn DesignHost, options: &DesignerOptions) -> Self {
        Self {
            host,
            options: options.clone(),
            cache: None,
            interpreter: &CODE_INTERPRETER,
            localization: LocalizationEngine::new(options.localization),
            context: ContextStack::new(),
            expressions: ExpressionTable::default(),
            names: NameTable::default(),
            prologue: Vec::new(),
            resources: ResourceState::default(),
            localized: HashSet::default(),
            building: Vec::new(),
            deferred: None,
            diagnostics: Vec::new(),
            stats: PassStatistics::default(),
        }
    }

    /// Reuses and fills `cache` during this pass.
    pub fn with_cache(mut self, cache: &'a mut ComponentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the statement interpreter used while deserializing.
    pub fn with_interpreter(mut self, interpreter: &'a dyn StatementInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    #[inline]
    pub fn host(&self) -> &'a dyn DesignHost {
        self.host
    }

    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        let host = self.host;
        host.registry()
    }

    #[inline]
    pub fn options(&self) -> &DesignerOptions {
        &self.options
    }

    #[inline]
    pub fn localization(&self) -> LocalizationEngine {
        self.localization
    }

    #[inline]
    pub fn statistics(&self) -> PassStatistics {
        self.stats
    }

    pub(crate) fn count_member(&mut self) {
        self.stats.members_serialized += 1;
    }

    // -------------------------------------------------------------------------
    // Context

    #[inline]
    pub fn context(&self) -> &ContextStack {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut ContextStack {
        &mut self.context
    }

    pub fn push_context(&mut self, frame: impl Into<ContextFrame>) -> usize {
        self.context.push(frame)
    }

    pub fn pop_context(&mut self, depth: usize) -> Option<ContextFrame> {
        self.context.restore(depth)
    }

    /// Runs `f` with `frame` pushed on the context stack.
    pub fn with_context<R>(
        &mut self,
        frame: impl Into<ContextFrame>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let depth = self.context.push(frame);
        let result = f(self);
        self.context.restore(depth);
        result
    }

    /// Like [`with_context`](Self::with_context), also handing back the
    /// frame as `f` left it.
    pub fn with_frame<T: ContextItem, R>(
        &mut self,
        frame: T,
        f: impl FnOnce(&mut Self) -> R,
    ) -> (R, Option<T>) {
        let depth = self.context.push(frame);
        let result = f(self);
        let frame = self.context.restore(depth).and_then(T::from_frame_owned);
        (result, frame)
    }

    // -------------------------------------------------------------------------
    // Diagnostics

    /// Records a non-fatal failure and keeps going.
    pub fn report(&mut self, error: impl Into<Diagnostic>) {
        let diagnostic: Diagnostic = error.into();
        warn!("{diagnostic}");

        #[cfg(all(debug_assertions, feature = "debug"))]
        let diagnostic = diagnostic.with_context(format!("{:?}", self.context));

        self.diagnostics.push(diagnostic);
    }

    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // -------------------------------------------------------------------------
    // Objects and types

    /// The object `this` refers to.
    pub fn root(&self) -> Option<ObjectId> {
        match self.context.get::<RootContext>() {
            Some(root) => Some(root.value()),
            None => self.host.root(),
        }
    }

    /// The expression `this` is written as.
    pub fn root_expression(&self) -> Expression {
        match self.context.get::<RootContext>() {
            Some(root) => root.expression().clone(),
            None => Expression::This,
        }
    }

    pub fn type_of(&self, object: ObjectId) -> Result<TypeKey, HostError> {
        self.host
            .type_of(object)
            .ok_or(HostError::UnknownObject(object))
    }

    /// The type serializers are selected by for `value`.
    ///
    /// Lists take the collection type of the expression they are
    /// serialized for, when it names one.
    pub fn value_type(&self, value: &Value) -> Option<TypeKey> {
        match value {
            Value::Object(id) => self.host.type_of(*id),
            Value::List(_) => {
                let expected = self.context.get::<ExpressionContext>().and_then(|c| c.ty());
                match expected {
                    Some(ty) if self.registry().flags(ty).contains(TypeFlags::COLLECTION) => Some(ty),
                    _ => Some(TypeKey::LIST),
                }
            }
            other => other.builtin_type(),
        }
    }

    /// Resolves a type name through the host resolver, then the registry.
    pub fn resolve_type(&self, name: &str) -> Option<TypeKey> {
        self.host
            .type_resolver()
            .and_then(|resolver| resolver.resolve(name))
            .or_else(|| self.registry().resolve(name))
    }

    // -------------------------------------------------------------------------
    // Names and instances

    /// The session name of `object`, or its name in the container.
    pub fn get_name(&self, object: ObjectId) -> Option<String> {
        match self.names.name(object) {
            Some(name) => Some(name.into()),
            None => self.host.component_name(object),
        }
    }

    pub fn set_name(&mut self, object: ObjectId, name: &str) -> Result<(), ManagerError> {
        if let Some(existing) = self.names.object(name) {
            if existing == object {
                return Ok(());
            }
            return Err(ManagerError::NameInUse(name.into()));
        }
        if let Some(existing) = self.names.name(object) {
            return Err(ManagerError::AlreadyNamed {
                name: name.into(),
                existing: existing.into(),
            });
        }
        self.names.insert(name, object);
        Ok(())
    }

    /// Names `object` unless it or `name` is already taken.
    pub(crate) fn bind_name(&mut self, object: ObjectId, name: &str) {
        if let Err(err) = self.set_name(object, name) {
            trace!("name `{name}` left unbound: {err}");
        }
    }

    /// Looks an object up by name.
    ///
    /// Deferred statements are materialized first, then session names, the
    /// container and finally dotted `owner.Member` paths are consulted.
    pub fn get_instance(&mut self, name: &str) -> Option<ObjectId> {
        if let Some(object) = self.resolve_deferred(name) {
            return Some(object);
        }
        if let Some(object) = self.names.object(name) {
            return Some(object);
        }
        if let Some(object) = self.host.component(name) {
            return Some(object);
        }
        let (base, member) = name.rsplit_once('.')?;
        let owner = self.get_instance(base)?;
        self.host.get_value(owner, member).ok()?.as_object()
    }

    /// Creates an object through the host and binds `name` to it.
    ///
    /// With instance recycling on, a component already sited under `name`
    /// is returned instead of creating a new one.
    pub fn create_instance(
        &mut self,
        ty: TypeKey,
        args: &[Value],
        name: Option<&str>,
        add_to_container: bool,
    ) -> Result<ObjectId, DeserializeError> {
        if let Some(name) = name
            && self.names.object(name).is_some()
        {
            return Err(ManagerError::DuplicateDeclaration(name.into()).into());
        }

        if self.options.recycle_instances
            && let Some(name) = name
            && let Some(existing) = self.host.component(name)
        {
            if self.options.validate_recycled_types
                && let Some(actual) = self.host.type_of(existing)
                && actual != ty
            {
                let registry = self.registry();
                return Err(ManagerError::RecycledTypeMismatch {
                    name: name.into(),
                    expected: registry.path_of(ty).into(),
                    actual: registry.path_of(actual).into(),
                }
                .into());
            }
            trace!("recycled `{name}`");
            return Ok(existing);
        }

        let site_name = match name {
            Some(name)
                if add_to_container
                    && !self.options.preserve_names
                    && self.host.component(name).is_some() =>
            {
                None
            }
            other => other,
        };
        let object = self
            .host
            .create_instance(ty, args, site_name, add_to_container)?;
        if let Some(name) = name {
            self.names.insert(name, object);
        }
        Ok(object)
    }

    /// Returns the name of `object`, generating a fresh local one when it
    /// has none.
    ///
    /// Fresh names avoid session names, container names and the local
    /// names of cached components.
    pub fn unique_name(&mut self, object: ObjectId) -> Result<String, SerializeError> {
        if let Some(name) = self.get_name(object) {
            return Ok(name);
        }
        let registry = self.registry();
        let ty = self.type_of(object)?;
        let desc = registry
            .get(ty)
            .ok_or_else(|| HostError::UnknownType(ty.to_string()))?;

        let base = match self.host.name_creation() {
            Some(service) => {
                let name = service.create_name(desc);
                String::from(name.trim_end_matches(|c: char| c.is_ascii_digit()))
            }
            None => desc.short_name().to_lowercase(),
        };

        let mut suffix = 1usize;
        let name = loop {
            let candidate = format!("{base}{suffix}");
            let taken = self.names.object(&candidate).is_some()
                || self.host.component(&candidate).is_some()
                || self
                    .cache
                    .as_deref()
                    .is_some_and(|cache| cache.contains_local_name(&candidate))
                || self
                    .building
                    .iter()
                    .any(|entry| entry.local_names().contains(&candidate));
            if !taken {
                break candidate;
            }
            suffix += 1;
        };

        self.set_name(object, &name)?;
        if let Some(entry) = self.building.last_mut() {
            entry.add_local_name(name.clone());
        }
        Ok(name)
    }

    // -------------------------------------------------------------------------
    // Expressions

    /// Returns `true` when an expression is bound to `object`.
    ///
    /// Bindings made through a preset context only count when
    /// `honor_preset` is set.
    pub fn is_serialized(&self, object: ObjectId, honor_preset: bool) -> bool {
        self.expressions
            .is_preset(object)
            .is_some_and(|preset| honor_preset || !preset)
    }

    /// The expression referring to `object`.
    ///
    /// Looks at bindings of this pass, the root, the owner chain of dotted
    /// reference names and finally a preset expression context.
    pub fn get_expression(&mut self, object: ObjectId) -> Option<Expression> {
        let expression = self.lookup_expression(object);
        if expression.is_some()
            && let Some(entry) = self.building.last_mut()
            && entry.component() != object
        {
            entry.add_dependency(object);
        }
        expression
    }

    fn lookup_expression(&self, object: ObjectId) -> Option<Expression> {
        if let Some(expression) = self.expressions.get(object) {
            return Some(expression.clone());
        }
        if let Some(root) = self.context.get::<RootContext>()
            && root.value() == object
        {
            return Some(root.expression().clone());
        }

        let reference = match self.names.name(object) {
            Some(name) => name.contains('.').then(|| String::from(name)),
            None => self.host.references().and_then(|r| r.name_of(object)),
        };
        if let Some(reference) = reference
            && let Some((base, path)) = reference.split_once('.')
            && let Some(owner) = self.names.object(base).or_else(|| self.host.component(base))
            && let Some(mut expression) = self.lookup_expression(owner)
        {
            for member in path.split('.') {
                expression = Expression::property(expression, member);
            }
            return Some(expression);
        }

        let context = self.context.get::<ExpressionContext>()?;
        context
            .is_preset(&Value::Object(object))
            .then(|| context.expression().clone())
    }

    /// Binds `expression` to `object` unless it is already bound.
    ///
    /// Bindings made while a preset context for `object` is active are
    /// flagged preset.
    pub fn set_expression(&mut self, object: ObjectId, expression: Expression, preset: bool) {
        let preset = preset
            || self
                .context
                .get::<ExpressionContext>()
                .is_some_and(|c| c.is_preset(&Value::Object(object)));
        if !self.expressions.insert(object, expression, preset) {
            trace!("expression of {object} already bound");
        }
    }

    // -------------------------------------------------------------------------
    // Serialization entry points

    /// Chooses the serializer for `value`.
    pub fn select(&self, value: &Value) -> SerializerKind {
        SerializerKind::select(self.registry(), self.value_type(value))
    }

    /// Serializes `value` with its serializer.
    ///
    /// Statement results are preceded by any declarations the pass had to
    /// emit, such as the resource manager local.
    pub fn serialize(&mut self, value: &Value) -> Result<Serialized, SerializeError> {
        let serializer = self.select(value).serializer();
        let result = serializer.serialize(self, value)?;
        Ok(match result {
            Serialized::Statements(statements) if !self.prologue.is_empty() => {
                let mut all = core::mem::take(&mut self.prologue);
                all.extend(statements);
                Serialized::Statements(all)
            }
            other => other,
        })
    }

    /// Serializes every member of `value`, defaults included.
    pub fn serialize_absolute(&mut self, value: &Value) -> Result<Serialized, SerializeError> {
        let serializer = self.select(value).serializer();
        let result = serializer.serialize_absolute(self, value)?;
        Ok(match result {
            Serialized::Statements(statements) if !self.prologue.is_empty() => {
                let mut all = core::mem::take(&mut self.prologue);
                all.extend(statements);
                Serialized::Statements(all)
            }
            other => other,
        })
    }

    /// Produces an expression for `value`.
    ///
    /// Objects already bound are referenced directly. Statements produced
    /// along the way go to the object's slot of the active statement
    /// table, or to `statements` when it has none.
    pub fn serialize_to_expression(
        &mut self,
        value: &Value,
        statements: &mut Vec<Statement>,
    ) -> Result<Option<Expression>, SerializeError> {
        let object = value.as_object();
        if let Some(object) = object
            && self.is_serialized(object, false)
        {
            return Ok(self.get_expression(object));
        }

        let serializer = self.select(value).serializer();
        match serializer.serialize(self, value)? {
            Serialized::Expression(expression) => Ok(Some(expression)),
            Serialized::Statements(produced) => {
                let expression = match object {
                    Some(object) => self.get_expression(object),
                    None => None,
                };
                let slot = object.and_then(|object| {
                    self.context
                        .get_mut::<StatementContext>()
                        .and_then(|table| table.statements_mut(object))
                });
                match slot {
                    Some(slot) => slot.extend(produced),
                    None => statements.extend(produced),
                }
                Ok(expression)
            }
        }
    }

    /// Runs serialization of `value` with every member forced.
    pub fn serialize_to_expression_absolute(
        &mut self,
        value: &Value,
        statements: &mut Vec<Statement>,
    ) -> Result<Option<Expression>, SerializeError> {
        self.with_context(AbsoluteContext::all(), |m| {
            m.serialize_to_expression(value, statements)
        })
    }

    /// Declarations emitted once per pass, to be placed before everything
    /// else.
    pub fn take_prologue(&mut self) -> Vec<Statement> {
        core::mem::take(&mut self.prologue)
    }

    // -------------------------------------------------------------------------
    // Deserialization entry points

    /// Deserializes `input` with the serializer selected for `ty`.
    pub fn deserialize(
        &mut self,
        ty: Option<TypeKey>,
        input: DeserializeInput<'_>,
    ) -> Result<Value, DeserializeError> {
        let serializer = SerializerKind::select(self.registry(), ty).serializer();
        serializer.deserialize(self, input)
    }

    /// Evaluates `expression`. `name` is given to an object it creates.
    pub fn deserialize_expression(
        &mut self,
        name: Option<&str>,
        expression: &Expression,
    ) -> Result<Value, DeserializeError> {
        let interpreter = self.interpreter;
        interpreter.evaluate(self, name, expression)
    }

    /// Interprets one statement, reporting a failure instead of returning it.
    pub fn interpret(&mut self, statement: &Statement) {
        let interpreter = self.interpreter;
        if let Err(err) = interpreter.interpret(self, statement) {
            self.report(err.at(statement.line()));
        }
    }

    // -------------------------------------------------------------------------
    // Cache

    /// Whether component results are read from and written to the cache.
    ///
    /// Absolute passes never touch the cache.
    pub(crate) fn cache_active(&self) -> bool {
        self.cache.as_deref().is_some_and(ComponentCache::enabled)
            && self.context.get::<AbsoluteContext>().is_none()
    }

    /// Replays the cached statements of `component`, restoring its
    /// expression, resources and metadata.
    pub(crate) fn replay_cached(&mut self, component: ObjectId) -> Option<Vec<Statement>> {
        if !self.cache_active() {
            return None;
        }
        let entry = match self.cache.as_deref().and_then(|cache| cache.get(component)) {
            Some(entry) => entry.clone(),
            None => {
                self.stats.cache_misses += 1;
                return None;
            }
        };
        trace!("cache hit for {component}");
        self.stats.cache_hits += 1;

        if let Some(expression) = entry.expression() {
            self.set_expression(component, expression.clone(), false);
        }
        if let Some(parent) = self.building.last_mut() {
            parent.add_dependency(component);
        }
        for resource in entry.resources() {
            self.replay_resource(resource);
        }
        for metadata in entry.metadata() {
            self.store_metadata(&metadata.name, metadata.value.clone(), metadata.should_serialize, true);
        }
        if entry.is_localized() {
            self.localized.insert(component);
        }
        Some(entry.statements().to_vec())
    }

    /// Starts recording a cache entry. Returns `false` when the cache is
    /// not in use.
    pub(crate) fn begin_entry(&mut self, component: ObjectId) -> bool {
        if !self.cache_active() {
            return false;
        }
        self.building.push(CacheEntry::new(component));
        true
    }

    /// Finishes the entry begun for `component`, storing it when the
    /// serialization succeeded.
    pub(crate) fn end_entry(&mut self, component: ObjectId, result: Option<&Serialized>) {
        if self.building.last().is_none_or(|entry| entry.component() != component) {
            return;
        }
        let Some(mut entry) = self.building.pop() else {
            return;
        };
        let Some(Serialized::Statements(statements)) = result else {
            return;
        };
        let expression = self.expressions.get(component).cloned();
        entry.complete(expression, statements.clone());
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.insert(entry);
        }
    }

    /// Flags the entry being recorded as depending on sibling state.
    pub(crate) fn mark_tracking(&mut self) {
        if let Some(entry) = self.building.last_mut() {
            entry.set_tracking();
        }
    }

    /// Records that resources were applied to `object` in this pass.
    /// Returns `true` the first time.
    pub(crate) fn mark_localized(&mut self, object: ObjectId) -> bool {
        let first = self.localized.insert(object);
        if first
            && let Some(entry) = self.building.last_mut()
            && entry.component() == object
        {
            entry.set_localized();
        }
        first
    }
}

#[cfg(test)]
mod tests {
    use vc_codedom::Expression;

    use super::SerializationManager;
    use crate::Value;
    use crate::error::{DeserializeError, ManagerError};
    use crate::fixtures;
    use crate::host::DesignHost;
    use crate::options::DesignerOptions;

    #[test]
    fn session_names() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let label = demo.add("label1", demo.types.label);
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        assert_eq!(manager.get_name(button).as_deref(), Some("button1"));
        manager.set_name(label, "caption").unwrap();
        assert_eq!(manager.get_name(label).as_deref(), Some("caption"));
        assert_eq!(
            manager.set_name(button, "caption"),
            Err(ManagerError::NameInUse("caption".into()))
        );
        assert!(matches!(
            manager.set_name(label, "other"),
            Err(ManagerError::AlreadyNamed { .. })
        ));
        assert_eq!(manager.get_instance("caption"), Some(label));
        assert_eq!(manager.get_instance("button1"), Some(button));
    }

    #[test]
    fn dotted_instances() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        let sub = demo.host.get_value(button, "FlatAppearance").unwrap();
        assert_eq!(manager.get_instance("button1.FlatAppearance"), sub.as_object());
        assert_eq!(manager.get_instance("button1.Missing"), None);
    }

    #[test]
    fn create_instance_rules() {
        let demo = fixtures::demo();
        let existing = demo.add("button1", demo.types.button);

        // The container picks a fresh name for a taken one.
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        let fresh = manager
            .create_instance(demo.types.button, &[], Some("button1"), true)
            .unwrap();
        assert_ne!(fresh, existing);
        assert_eq!(demo.host.component_name(fresh).as_deref(), Some("button2"));
        assert_eq!(manager.get_instance("button1"), Some(fresh));
        assert_eq!(
            manager.create_instance(demo.types.button, &[], Some("button1"), true),
            Err(DeserializeError::Manager(ManagerError::DuplicateDeclaration(
                "button1".into()
            )))
        );

        // Recycling returns the sited component, checking its type.
        let options = DesignerOptions::default().with_recycle_instances(true, true);
        let mut manager = SerializationManager::new(&demo.host, &options);
        assert_eq!(
            manager.create_instance(demo.types.button, &[], Some("button1"), true),
            Ok(existing)
        );
        let mut manager = SerializationManager::new(&demo.host, &options);
        assert!(matches!(
            manager.create_instance(demo.types.label, &[], Some("button1"), true),
            Err(DeserializeError::Manager(ManagerError::RecycledTypeMismatch { .. }))
        ));
    }

    #[test]
    fn unique_names_skip_taken_ones() {
        let demo = fixtures::demo();
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        let first = demo
            .host
            .create_instance(demo.types.point, &[Value::from(1_i64), Value::from(2_i64)], None, false)
            .unwrap();
        let second = demo
            .host
            .create_instance(demo.types.point, &[Value::from(3_i64), Value::from(4_i64)], None, false)
            .unwrap();
        assert_eq!(manager.unique_name(first).unwrap(), "point1");
        assert_eq!(manager.unique_name(first).unwrap(), "point1");
        assert_eq!(manager.unique_name(second).unwrap(), "point2");
    }

    #[test]
    fn expressions_bind_once() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        assert!(!manager.is_serialized(button, true));
        let field = Expression::field(Expression::This, "button1");
        manager.set_expression(button, field.clone(), false);
        manager.set_expression(button, Expression::variable("other"), false);
        assert!(manager.is_serialized(button, false));
        assert_eq!(manager.get_expression(button), Some(field.clone()));

        // Sub-objects are reached through their owner.
        let sub = demo.host.get_value(button, "FlatAppearance").unwrap();
        assert_eq!(
            manager.get_expression(sub.as_object().unwrap()),
            Some(Expression::property(field, "FlatAppearance"))
        );
    }
}
