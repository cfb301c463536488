use alloc::format;
use alloc::string::String;
use alloc::vec;

use log::trace;
use vc_codedom::{Expression, Statement};

use super::SerializationManager;
use crate::Value;
use crate::cache::ResourceEntry;
use crate::context::{ExpressionContext, MemberContext};
use crate::descriptor::TypeKey;
use crate::error::SerializeError;
use crate::hash::HashMap;
use crate::host::{ObjectId, ResourceStore, parent_culture};

/// Name of the local the resource manager is stored in.
pub(crate) const RESOURCES_VARIABLE: &str = "resources";

/// Resource name prefix standing for the root object.
pub(crate) const ROOT_RESOURCE_NAME: &str = "$this";

/// How a resource write treats the invariant culture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourcePolicy {
    /// Write to the invariant culture regardless of the current one.
    pub force_invariant: bool,
    /// Also write a new value to the invariant culture so every culture
    /// can fall back to it.
    pub ensure_invariant: bool,
    /// With `force_invariant`, `false` removes the entry instead.
    pub should_serialize: bool,
}

impl ResourcePolicy {
    pub const CURRENT: Self = Self {
        force_invariant: false,
        ensure_invariant: false,
        should_serialize: true,
    };

    pub const ENSURE_INVARIANT: Self = Self {
        force_invariant: false,
        ensure_invariant: true,
        should_serialize: true,
    };
}

#[derive(Default)]
pub(crate) struct ResourceState {
    declared: bool,
    name_counts: HashMap<String, usize>,
}

#[derive(PartialEq, Eq)]
enum ParentComparison {
    Same,
    Different,
    New,
}

fn compare_with_parent(store: &dyn ResourceStore, culture: &str, name: &str, value: &Value) -> ParentComparison {
    let mut current = parent_culture(culture);
    while let Some(culture) = current {
        if let Some(inherited) = store.get(culture, name) {
            return match inherited == *value {
                true => ParentComparison::Same,
                false => ParentComparison::Different,
            };
        }
        current = parent_culture(culture);
    }
    ParentComparison::New
}

impl SerializationManager<'_> {
    /// The expression of the resource manager, declaring it on first use.
    pub fn resource_manager_expression(&mut self) -> Expression {
        if !self.resources.declared {
            self.resources.declared = true;
            let registry = self.registry();
            let ty = registry
                .get(TypeKey::RESOURCE_MANAGER)
                .map(|desc| desc.type_ref())
                .unwrap_or_else(|| registry.path_of(TypeKey::RESOURCE_MANAGER).into());
            let args = self
                .root()
                .and_then(|root| self.host.type_of(root))
                .and_then(|root_ty| registry.get(root_ty))
                .map(|desc| vec![Expression::TypeOf(desc.type_ref())])
                .unwrap_or_default();
            let init = Expression::create(ty.clone(), args);
            self.prologue
                .push(Statement::declare(ty, RESOURCES_VARIABLE, Some(init)));
        }
        Expression::variable(RESOURCES_VARIABLE)
    }

    /// The resource name prefix of `object`: `$this` for the root,
    /// otherwise its name.
    pub fn resource_owner_name(&self, object: ObjectId) -> Option<String> {
        if self.root() == Some(object) {
            return Some(ROOT_RESOURCE_NAME.into());
        }
        self.get_name(object)
            .or_else(|| self.host.references().and_then(|r| r.name_of(object)))
    }

    /// A resource name unique in this pass, derived from the expression
    /// context: `owner.Member`, `$this.Member`, or `resource` plus a counter.
    pub fn resource_name(&mut self) -> String {
        let base = self.context.get::<ExpressionContext>().map(|context| {
            let owner = context.owner().and_then(|o| self.resource_owner_name(o));
            let member = member_name(context.expression());
            (owner, member)
        });
        let member_context = self
            .context
            .get::<MemberContext>()
            .map(|c| (self.resource_owner_name(c.owner()), Some(String::from(c.property().name()))));

        let name = match base.or(member_context) {
            Some((Some(owner), Some(member))) => format!("{owner}.{member}"),
            Some((Some(owner), None)) => owner,
            Some((None, Some(member))) => member,
            _ => {
                let count = self.resources.name_counts.entry("resource".into()).or_insert(0);
                *count += 1;
                return format!("resource{count}");
            }
        };

        let count = self.resources.name_counts.entry(name.clone()).or_insert(0);
        *count += 1;
        match *count {
            1 => name,
            n => format!("{name}{n}"),
        }
    }

    /// Writes `value` as a resource and returns the expression reading it
    /// back, or `None` when the host has no resource store.
    pub fn serialize_to_resource_expression(
        &mut self,
        value: &Value,
        ensure_invariant: bool,
    ) -> Result<Option<Expression>, SerializeError> {
        if self.host.resources().is_none() {
            return Ok(None);
        }
        let name = self.resource_name();
        let policy = match ensure_invariant {
            true => ResourcePolicy::ENSURE_INVARIANT,
            false => ResourcePolicy::CURRENT,
        };
        self.write_resource(&name, value.clone(), policy);
        let target = self.resource_manager_expression();
        Ok(Some(self.resource_lookup(target, &name, value)))
    }

    /// Writes `value` as a resource without producing an expression.
    pub fn serialize_to_resource(&mut self, value: &Value, ensure_invariant: bool) -> Option<String> {
        self.host.resources()?;
        let name = self.resource_name();
        let policy = match ensure_invariant {
            true => ResourcePolicy::ENSURE_INVARIANT,
            false => ResourcePolicy::CURRENT,
        };
        self.write_resource(&name, value.clone(), policy);
        Some(name)
    }

    fn resource_lookup(&self, target: Expression, name: &str, value: &Value) -> Expression {
        if let Value::Str(_) = value {
            return Expression::invoke(target, "GetString", vec![Expression::string(name)]);
        }
        let lookup = Expression::invoke(target, "GetObject", vec![Expression::string(name)]);
        match self.value_type(value).and_then(|ty| self.registry().get(ty)) {
            Some(desc) => Expression::cast(desc.type_ref(), lookup),
            None => lookup,
        }
    }

    /// Writes a resource under the given culture policy.
    ///
    /// Outside the invariant culture, a value equal to the one inherited
    /// from a parent culture is skipped.
    pub fn write_resource(&mut self, name: &str, value: Value, policy: ResourcePolicy) {
        self.store_resource(name, value, policy, false);
    }

    pub(crate) fn store_resource(
        &mut self,
        name: &str,
        value: Value,
        policy: ResourcePolicy,
        applying_cached: bool,
    ) {
        let Some(store) = self.host.resources() else {
            return;
        };
        let culture = store.culture();

        if policy.force_invariant {
            match policy.should_serialize {
                true => store.set("", name, value.clone()),
                false => store.remove("", name),
            }
        } else {
            match compare_with_parent(store, &culture, name, &value) {
                ParentComparison::Same => trace!("resource `{name}` inherited unchanged"),
                ParentComparison::Different => store.set(&culture, name, value.clone()),
                ParentComparison::New => {
                    store.set(&culture, name, value.clone());
                    if policy.ensure_invariant && !culture.is_empty() {
                        store.set("", name, value.clone());
                    }
                }
            }
        }

        if !applying_cached && let Some(entry) = self.building.last_mut() {
            entry.record_resource(ResourceEntry {
                name: name.into(),
                value,
                force_invariant: policy.force_invariant,
                ensure_invariant: policy.ensure_invariant,
                should_serialize: policy.should_serialize,
                property: self.context.get::<MemberContext>().map(|c| c.property().clone()),
                expression: self.context.get::<ExpressionContext>().cloned(),
            });
        }
    }

    /// Writes design-time metadata. Values left at their default are
    /// removed instead.
    pub fn write_metadata(&mut self, name: &str, value: Value, should_serialize: bool) {
        self.store_metadata(name, value, should_serialize, false);
    }

    pub(crate) fn store_metadata(
        &mut self,
        name: &str,
        value: Value,
        should_serialize: bool,
        applying_cached: bool,
    ) {
        let Some(store) = self.host.resources() else {
            return;
        };
        match should_serialize {
            true => store.set_metadata(name, value.clone()),
            false => store.set_metadata(name, Value::Null),
        }
        if !applying_cached && let Some(entry) = self.building.last_mut() {
            entry.record_metadata(ResourceEntry {
                name: name.into(),
                value,
                force_invariant: true,
                ensure_invariant: false,
                should_serialize,
                property: None,
                expression: None,
            });
        }
    }

    pub(crate) fn replay_resource(&mut self, entry: &ResourceEntry) {
        self.resource_manager_expression();
        let policy = ResourcePolicy {
            force_invariant: entry.force_invariant,
            ensure_invariant: entry.ensure_invariant,
            should_serialize: entry.should_serialize,
        };
        let depth = entry
            .expression
            .clone()
            .map(|context| self.context.push(context));
        self.store_resource(&entry.name, entry.value.clone(), policy, true);
        if let Some(depth) = depth {
            self.context.restore(depth);
        }
    }
}

/// The member an expression refers to, with `Get`/`Set` accessor
/// prefixes of extender calls stripped.
fn member_name(expression: &Expression) -> Option<String> {
    match expression {
        Expression::MethodInvoke { method, .. } => {
            let member = method
                .strip_prefix("Set")
                .or_else(|| method.strip_prefix("Get"))
                .unwrap_or(method);
            Some(member.into())
        }
        other => other.member_name().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use vc_codedom::Expression;

    use super::ResourcePolicy;
    use crate::Value;
    use crate::context::ExpressionContext;
    use crate::fixtures;
    use crate::host::ResourceStore;
    use crate::manager::SerializationManager;
    use crate::options::DesignerOptions;

    #[test]
    fn names_follow_the_expression_context() {
        let demo = fixtures::demo();
        let button = demo.add("button1", demo.types.button);
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        let text = |owner| {
            ExpressionContext::new(
                Expression::property(Expression::This, "Text"),
                None,
                Some(owner),
            )
        };
        let (a, b, c) = manager.with_context(text(button), |m| {
            (m.resource_name(), m.resource_name(), m.with_context(text(demo.root), |m| m.resource_name()))
        });
        assert_eq!(a, "button1.Text");
        assert_eq!(b, "button1.Text2");
        assert_eq!(c, "$this.Text");
        assert_eq!(manager.resource_name(), "resource1");
        assert_eq!(manager.resource_name(), "resource2");
    }

    #[test]
    fn culture_policies() {
        let demo = fixtures::demo();
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);
        let store: &dyn ResourceStore = &demo.host;

        store.set("", "title", Value::from("Hello"));
        store.set_culture("fr-FR");

        // Equal to the inherited invariant value: skipped.
        manager.write_resource("title", Value::from("Hello"), ResourcePolicy::CURRENT);
        assert_eq!(store.get("fr-FR", "title"), None);

        manager.write_resource("title", Value::from("Bonjour"), ResourcePolicy::CURRENT);
        assert_eq!(store.get("fr-FR", "title"), Some(Value::from("Bonjour")));

        manager.write_resource("caption", Value::from("Salut"), ResourcePolicy::ENSURE_INVARIANT);
        assert_eq!(store.get("", "caption"), Some(Value::from("Salut")));

        let remove = ResourcePolicy {
            force_invariant: true,
            ensure_invariant: false,
            should_serialize: false,
        };
        manager.write_resource("caption", Value::Null, remove);
        assert_eq!(store.get("", "caption"), None);
    }

    #[test]
    fn manager_is_declared_once() {
        let demo = fixtures::demo();
        let options = DesignerOptions::default();
        let mut manager = SerializationManager::new(&demo.host, &options);

        let first = manager.resource_manager_expression();
        let second = manager.resource_manager_expression();
        assert_eq!(first, second);
        let prologue = manager.take_prologue();
        assert_eq!(prologue.len(), 1);
        assert_eq!(
            alloc::format!("{}", prologue[0]),
            "System.ComponentModel.ComponentResourceManager resources = \
             new System.ComponentModel.ComponentResourceManager(typeof(Demo.Form));"
        );
    }
}
