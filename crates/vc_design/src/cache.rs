//! Cross-pass cache of per-component serialization results.
//!
//! An entry holds everything a pass produced for one component: its
//! statements, the resources and metadata it wrote, the names it
//! reserved and the objects its statements refer to. Host change
//! notifications are applied in batches before the next pass.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;
use vc_codedom::{Expression, Statement};

use crate::Value;
use crate::context::ExpressionContext;
use crate::descriptor::{PropertyDescriptor, TypeFlags};
use crate::hash::{HashMap, HashSet};
use crate::host::{ChangeKind, ChangeNotification, DesignHost, ObjectId};
use crate::options::DesignerOptions;

// -----------------------------------------------------------------------------
// ResourceEntry

/// A resource or metadata write recorded while a cache entry was built.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceEntry {
    pub name: String,
    pub value: Value,
    pub force_invariant: bool,
    pub ensure_invariant: bool,
    pub should_serialize: bool,
    pub property: Option<PropertyDescriptor>,
    pub expression: Option<ExpressionContext>,
}

// -----------------------------------------------------------------------------
// CacheEntry

#[derive(Clone, Debug)]
pub struct CacheEntry {
    component: ObjectId,
    expression: Option<Expression>,
    statements: Vec<Statement>,
    resources: Vec<ResourceEntry>,
    metadata: Vec<ResourceEntry>,
    dependencies: HashSet<ObjectId>,
    local_names: Vec<String>,
    tracking: bool,
    localized: bool,
}

impl CacheEntry {
    pub(crate) fn new(component: ObjectId) -> Self {
        Self {
            component,
            expression: None,
            statements: Vec::new(),
            resources: Vec::new(),
            metadata: Vec::new(),
            dependencies: HashSet::default(),
            local_names: Vec::new(),
            tracking: false,
            localized: false,
        }
    }

    #[inline]
    pub fn component(&self) -> ObjectId {
        self.component
    }

    /// The expression that references the component.
    #[inline]
    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    #[inline]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    #[inline]
    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    #[inline]
    pub fn metadata(&self) -> &[ResourceEntry] {
        &self.metadata
    }

    /// Objects whose expressions the statements embed.
    pub fn dependencies(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.dependencies.iter().copied()
    }

    #[inline]
    pub fn local_names(&self) -> &[String] {
        &self.local_names
    }

    /// A tracking entry depends on sibling state that cannot be followed
    /// per object; invalidating it clears the whole cache.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    #[inline]
    pub fn is_localized(&self) -> bool {
        self.localized
    }

    pub(crate) fn complete(&mut self, expression: Option<Expression>, statements: Vec<Statement>) {
        self.expression = expression;
        self.statements = statements;
    }

    pub(crate) fn add_dependency(&mut self, object: ObjectId) {
        self.dependencies.insert(object);
    }

    pub(crate) fn add_local_name(&mut self, name: String) {
        self.local_names.push(name);
    }

    pub(crate) fn record_resource(&mut self, entry: ResourceEntry) {
        self.resources.push(entry);
    }

    pub(crate) fn record_metadata(&mut self, entry: ResourceEntry) {
        self.metadata.push(entry);
    }

    pub(crate) fn set_tracking(&mut self) {
        self.tracking = true;
    }

    pub(crate) fn set_localized(&mut self) {
        self.localized = true;
    }
}

// -----------------------------------------------------------------------------
// ComponentCache

/// Serialization results of unchanged components, reused across passes.
pub struct ComponentCache {
    enabled: bool,
    entries: HashMap<ObjectId, CacheEntry>,
}

impl ComponentCache {
    pub fn new(options: &DesignerOptions) -> Self {
        Self {
            enabled: options.cache_enabled,
            entries: HashMap::default(),
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, component: ObjectId) -> Option<&CacheEntry> {
        self.entries.get(&component)
    }

    pub(crate) fn insert(&mut self, entry: CacheEntry) {
        if self.enabled {
            self.entries.insert(entry.component, entry);
        }
    }

    /// Returns `true` when a cached entry reserved `name` for one of its
    /// local objects.
    pub fn contains_local_name(&self, name: &str) -> bool {
        self.entries
            .values()
            .any(|entry| entry.local_names.iter().any(|n| n == name))
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("component cache cleared ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }

    /// Drops the entry of `component` and, transitively, every entry
    /// depending on it. Dropping a tracking entry clears the cache.
    pub fn remove_entry(&mut self, component: ObjectId) {
        let mut queue = vec![component];
        let mut visited: HashSet<ObjectId> = HashSet::default();

        while let Some(current) = queue.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(entry) = self.entries.remove(&current) {
                debug!("component cache invalidated {current}");
                if entry.tracking {
                    self.clear();
                    return;
                }
            }
            queue.extend(
                self.entries
                    .values()
                    .filter(|entry| entry.dependencies.contains(&current))
                    .map(|entry| entry.component),
            );
        }
    }

    /// Applies a batch of host change notifications.
    ///
    /// Renames and removals of extender providers clear everything. A
    /// change to an object that is not a sited component invalidates
    /// its owning component, or clears everything when no owner is known.
    pub fn apply(&mut self, host: &dyn DesignHost, changes: &[ChangeNotification]) {
        let registry = host.registry();
        for change in changes {
            if self.entries.is_empty() {
                return;
            }
            let provider = change
                .ty
                .is_some_and(|ty| registry.flags(ty).contains(TypeFlags::EXTENDER_PROVIDER));
            match change.kind {
                ChangeKind::Rename => self.clear(),
                ChangeKind::Removing | ChangeKind::Removed if provider => self.clear(),
                _ if change.component => self.remove_entry(change.object),
                _ => match host.references().and_then(|r| r.owner_of(change.object)) {
                    Some(owner) => self.remove_entry(owner),
                    None => self.clear(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheEntry, ComponentCache};
    use crate::Value;
    use crate::fixtures;
    use crate::host::{DesignHost, ObjectId};
    use crate::options::DesignerOptions;

    fn entry(component: ObjectId, dependencies: &[ObjectId]) -> CacheEntry {
        let mut entry = CacheEntry::new(component);
        for &dep in dependencies {
            entry.add_dependency(dep);
        }
        entry
    }

    #[test]
    fn invalidation_cascades_to_dependents() {
        let demo = fixtures::demo();
        let panel = demo.add("panel1", demo.types.panel);
        let button = demo.add("button1", demo.types.button);
        let label = demo.add("label1", demo.types.label);

        let mut cache = ComponentCache::new(&DesignerOptions::default());
        cache.insert(entry(demo.root, &[panel]));
        cache.insert(entry(panel, &[button]));
        cache.insert(entry(button, &[]));
        cache.insert(entry(label, &[]));

        cache.remove_entry(button);
        assert!(cache.get(button).is_none());
        assert!(cache.get(panel).is_none());
        assert!(cache.get(demo.root).is_none());
        assert!(cache.get(label).is_some());
    }

    #[test]
    fn tracking_entry_clears_everything() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let label = demo.add("label1", demo.types.label);

        let mut cache = ComponentCache::new(&DesignerOptions::default());
        let mut tracked = entry(button, &[]);
        tracked.set_tracking();
        cache.insert(tracked);
        cache.insert(entry(label, &[]));

        cache.remove_entry(button);
        assert!(cache.is_empty());
    }

    #[test]
    fn notifications() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let label = demo.add("label1", demo.types.label);
        let mut cache = ComponentCache::new(&DesignerOptions::default());
        let fill = |cache: &mut ComponentCache| {
            cache.insert(entry(button, &[]));
            cache.insert(entry(label, &[]));
        };
        demo.host.drain_changes();

        // A change to a sub-object invalidates its owning component only.
        fill(&mut cache);
        let appearance = demo.host.get_value(button, "FlatAppearance").unwrap();
        let sub = appearance.as_object().unwrap();
        demo.host.set_value(sub, "BorderSize", Value::from(3_i64)).unwrap();
        cache.apply(&demo.host, &demo.host.drain_changes());
        assert!(cache.get(button).is_none());
        assert!(cache.get(label).is_some());

        // Renames clear everything.
        fill(&mut cache);
        demo.host.rename(label, "caption").unwrap();
        cache.apply(&demo.host, &demo.host.drain_changes());
        assert!(cache.is_empty());

        // Removing an extender provider clears everything.
        let tip = demo.add("toolTip1", demo.types.tooltip);
        fill(&mut cache);
        demo.host.remove_component(tip).unwrap();
        cache.apply(&demo.host, &demo.host.drain_changes());
        assert!(cache.is_empty());
    }

    #[test]
    fn disabled_cache_stays_empty() {
        let demo = fixtures::demo();
        let mut cache = ComponentCache::new(&DesignerOptions::default().with_cache(false));
        cache.insert(entry(demo.root, &[]));
        assert!(cache.is_empty());
        assert!(!cache.enabled());
    }
}
